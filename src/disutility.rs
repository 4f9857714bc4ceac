use crate::id::Id;
use crate::network::Link;
use crate::policy_index::ZonePolicyIndex;
use crate::population::InternalPerson;
use crate::vehicles::{InternalVehicle, VehicleClass};
use std::sync::Arc;

/// A cost large enough that no plausible base cost makes a banned link competitive with an
/// alternative, without actually being infinite (so arithmetic on it stays well-defined).
pub const BAN_COST: f64 = f64::MAX / 2.0;

/// The base travel-cost function this wrapper delegates to. Mirrors the minimal
/// `linkLookup`/`emitEvent`/`vehicleClassOf` capability-set pattern from the design notes: the
/// router brings its own cost function, we only ever add to it.
pub trait TravelDisutility: Send + Sync {
    fn cost(
        &self,
        link: &Id<Link>,
        time_sec: u32,
        person: Option<&Id<InternalPerson>>,
        vehicle: Option<&Id<InternalVehicle>>,
    ) -> f64;

    /// An admissible lower-bound estimate for A*-style searches. Never ban-aware, since a
    /// vehicle's banned-status is time-dependent and the heuristic must stay a valid lower
    /// bound regardless of arrival time.
    fn min_cost(&self, link: &Id<Link>) -> f64;
}

/// Wraps a base [`TravelDisutility`] so that any link banned for the querying vehicle's class
/// at the query time costs `base + BAN_COST` instead of `base`. Installed only when
/// `index.has_any_bans()` — see the scenario assembler.
pub struct BanAwareDisutility<D: TravelDisutility> {
    index: Arc<ZonePolicyIndex>,
    delegate: D,
    vehicle_classes: Arc<dyn crate::vehicles::VehicleClassLookup>,
}

impl<D: TravelDisutility> BanAwareDisutility<D> {
    pub fn new(
        index: Arc<ZonePolicyIndex>,
        delegate: D,
        vehicle_classes: Arc<dyn crate::vehicles::VehicleClassLookup>,
    ) -> Self {
        Self {
            index,
            delegate,
            vehicle_classes,
        }
    }
}

impl<D: TravelDisutility> TravelDisutility for BanAwareDisutility<D> {
    fn cost(
        &self,
        link: &Id<Link>,
        time_sec: u32,
        person: Option<&Id<InternalPerson>>,
        vehicle: Option<&Id<InternalVehicle>>,
    ) -> f64 {
        let base = self.delegate.cost(link, time_sec, person, vehicle);
        let class: Option<VehicleClass> =
            vehicle.and_then(|v| self.vehicle_classes.vehicle_class_of(v));
        match (vehicle, class) {
            (Some(_), Some(class)) if self.index.is_banned(link, class, time_sec) => {
                base + BAN_COST
            }
            _ => base,
        }
    }

    fn min_cost(&self, link: &Id<Link>) -> f64 {
        self.delegate.min_cost(link)
    }
}
