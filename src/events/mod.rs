use crate::id::Id;
use crate::network::Link;
use crate::population::InternalPerson;
use crate::vehicles::InternalVehicle;
use crate::zones::Zone;
use derive_builder::Builder;
use std::fmt::{self, Display};

/// A vehicle entering a link, dispatched by the kernel for every link the vehicle traverses.
/// `VehicleEntersTraffic` is modelled as its own event (below) rather than reusing this one,
/// since it additionally carries the driving person — but is treated as a link-entry for
/// the vehicle's starting link all the same.
#[derive(Builder, Debug, Clone)]
pub struct LinkEnterEvent {
    pub time: u32,
    pub link: Id<Link>,
    pub vehicle: Id<InternalVehicle>,
}

impl LinkEnterEvent {
    pub const TYPE: &'static str = "entered link";
}

/// A vehicle entering traffic for the first time in an iteration, at the start of its driver's
/// trip. Carries the driver's person id so `EnforcementHandler` can populate its
/// vehicle-to-person table before any money event needs to reference a person.
#[derive(Builder, Debug, Clone)]
pub struct VehicleEntersTrafficEvent {
    pub time: u32,
    pub vehicle: Id<InternalVehicle>,
    pub link: Id<Link>,
    pub driver: Id<InternalPerson>,
}

impl VehicleEntersTrafficEvent {
    pub const TYPE: &'static str = "vehicle enters traffic";
}

/// The reason a `PersonMoneyEvent` was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyPurpose {
    ZoneBan,
    ZonePenalty,
}

impl Display for MoneyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoneyPurpose::ZoneBan => "zone_ban",
            MoneyPurpose::ZonePenalty => "zone_penalty",
        };
        f.write_str(s)
    }
}

/// A monetary adjustment to an agent's score, pushed back into the kernel's event manager.
/// `amount` is always negative for the purposes this core emits.
#[derive(Builder, Debug, Clone)]
pub struct PersonMoneyEvent {
    pub time: u32,
    pub person: Id<InternalPerson>,
    pub amount: f64,
    pub purpose: MoneyPurpose,
    pub reference: Id<Zone>,
}

/// The core's only outbound capability: handing a `PersonMoneyEvent` back to the kernel. The
/// kernel's event manager is the synchronization boundary — this trait does not promise
/// anything about when the event becomes visible to other subscribers, only that it has been
/// handed off.
pub trait MoneyEventSink: Send + Sync {
    fn emit_money_event(&self, event: PersonMoneyEvent);
}

/// A `MoneyEventSink` that just records what it was given, for tests and example wiring.
#[cfg(any(test, feature = "test_util"))]
pub mod test_support {
    use super::{MoneyEventSink, PersonMoneyEvent};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<PersonMoneyEvent>>,
    }

    impl MoneyEventSink for RecordingSink {
        fn emit_money_event(&self, event: PersonMoneyEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
