//! Zone-policy enforcement core for a traffic microsimulation.
//!
//! Resolves polygonal urban zones against a road network into entry/exit/interior link sets,
//! indexes time-windowed, vehicle-class-conditioned enforcement rules for O(1) per-event
//! lookup, intercepts per-vehicle link-entry events to emit bans and interval-based congestion
//! charges, biases route search so banned vehicles reroute around forbidden links, and selects
//! the working population a zone-aware run needs loaded. [`scenario_assembler`] binds all of
//! the above together once per run.
//!
//! The core owns no I/O and no persisted state: networks, populations, vehicle tables and the
//! event sink are all handed in through the trait objects in [`network`], [`population`],
//! [`vehicles`] and [`events`].

pub mod config;
pub mod disutility;
pub mod enforcement;
pub mod error;
pub mod events;
pub mod geodesy;
pub mod id;
pub mod logging;
pub mod network;
pub mod policy_index;
pub mod population;
pub mod population_filter;
pub mod resolver;
pub mod scenario_assembler;
pub mod spatial;
pub mod vehicles;
pub mod zones;
