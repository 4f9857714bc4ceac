use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A simulated vehicle. The core never owns a vehicle's full state (that belongs to the
/// kernel); it only ever needs the id to index its own runtime tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalVehicle;

/// The emission class a vehicle type is rated at. Tier-3 policies ban, tier-2 policies
/// congestion-charge, and tier-1 policies exempt a (class, zone) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleClass {
    ZeroEmission,
    NearZeroEmission,
    LowEmission,
    MidEmission,
    HighEmission,
}

impl Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleClass::ZeroEmission => "zeroEmission",
            VehicleClass::NearZeroEmission => "nearZeroEmission",
            VehicleClass::LowEmission => "lowEmission",
            VehicleClass::MidEmission => "midEmission",
            VehicleClass::HighEmission => "highEmission",
        };
        f.write_str(s)
    }
}

/// Minimal capability the core needs from the scenario's vehicle table: resolve a vehicle to
/// its emission class. The source looks this up at every event rather than caching it, so a
/// kernel that mutates vehicle types mid-run is reflected immediately; we adopt the same
/// lookup-at-event-time semantics.
pub trait VehicleClassLookup: Send + Sync {
    fn vehicle_class_of(&self, vehicle: &Id<InternalVehicle>) -> Option<VehicleClass>;
}
