use crate::error::CoreError;
use crate::id::Id;
use crate::vehicles::VehicleClass;
use std::collections::HashSet;

pub mod link_set;

/// A single (lon, lat) vertex of a zone ring, in WGS84.
pub type LonLat = (f64, f64);

/// How a zone selects trips out of the source population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripMatchMode {
    Start,
    End,
    Pass,
}

/// Enforcement tier of a policy. Tier 1 is exempt and never reaches the index; tiers 2 and 3
/// are the only ones `ZonePolicyIndex` ever stores rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exempt,
    Congestion,
    Ban,
}

/// A half-open time-of-day window, in seconds since midnight. `start < end` is an invariant
/// enforced at construction; there is no support for windows that wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start_sec: u32,
    pub end_sec: u32,
}

impl Period {
    pub fn new(start_sec: u32, end_sec: u32) -> Result<Self, CoreError> {
        if start_sec >= end_sec {
            return Err(CoreError::InvalidPolicy(format!(
                "period start {start_sec} must be before end {end_sec}"
            )));
        }
        Ok(Self { start_sec, end_sec })
    }

    pub fn contains(&self, time_sec: u32) -> bool {
        time_sec >= self.start_sec && time_sec < self.end_sec
    }
}

/// One rule attached to a zone: who it applies to, how strict it is, and when it is active.
/// Tier-2 carries a penalty and billing interval; both are required and must be positive.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub vehicle_class: VehicleClass,
    pub tier: Tier,
    pub period: Period,
    pub penalty: Option<f64>,
    pub interval_sec: Option<u32>,
}

impl Policy {
    pub fn exempt(vehicle_class: VehicleClass, period: Period) -> Self {
        Self {
            vehicle_class,
            tier: Tier::Exempt,
            period,
            penalty: None,
            interval_sec: None,
        }
    }

    pub fn ban(vehicle_class: VehicleClass, period: Period) -> Self {
        Self {
            vehicle_class,
            tier: Tier::Ban,
            period,
            penalty: None,
            interval_sec: None,
        }
    }

    pub fn congestion(
        vehicle_class: VehicleClass,
        period: Period,
        penalty: f64,
        interval_sec: u32,
    ) -> Result<Self, CoreError> {
        if penalty <= 0.0 {
            return Err(CoreError::InvalidPolicy(format!(
                "tier-2 penalty must be positive, got {penalty}"
            )));
        }
        if interval_sec == 0 {
            return Err(CoreError::InvalidPolicy(
                "tier-2 interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            vehicle_class,
            tier: Tier::Congestion,
            period,
            penalty: Some(penalty),
            interval_sec: Some(interval_sec),
        })
    }
}

/// A polygonal urban zone with its attached enforcement policies. Rings are WGS84 lon/lat,
/// first ring is the outer boundary, the rest are holes; immutable once constructed.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: Id<Zone>,
    pub rings: Vec<Vec<LonLat>>,
    pub match_modes: HashSet<TripMatchMode>,
    pub policies: Vec<Policy>,
}

impl Zone {
    /// Mints a fresh zone identifier as a uuid-v4, for collaborators that construct a `Zone`
    /// without one already assigned by the request layer.
    pub fn new_id() -> Id<Zone> {
        Id::create(&uuid::Uuid::new_v4().to_string())
    }

    pub fn new(
        id: Id<Zone>,
        rings: Vec<Vec<LonLat>>,
        match_modes: HashSet<TripMatchMode>,
        policies: Vec<Policy>,
    ) -> Result<Self, CoreError> {
        if rings.is_empty() {
            return Err(CoreError::InvalidGeometry(
                "zone has no rings".to_string(),
            ));
        }
        if match_modes.is_empty() {
            return Err(CoreError::InvalidPolicy(
                "zone has no trip-match modes".to_string(),
            ));
        }
        if policies.is_empty() {
            return Err(CoreError::InvalidPolicy(
                "zone has no policies".to_string(),
            ));
        }
        for ring in &rings {
            if ring.len() < 4 {
                return Err(CoreError::InvalidGeometry(format!(
                    "ring has {} points, need at least 4",
                    ring.len()
                )));
            }
            if ring.first() != ring.last() {
                return Err(CoreError::InvalidGeometry(
                    "ring is not closed (first != last)".to_string(),
                ));
            }
        }
        Ok(Self {
            id,
            rings,
            match_modes,
            policies,
        })
    }
}
