use serde::{Deserialize, Serialize};

/// Construction-time knobs for the core. Everything else about a run — network, population,
/// zones, policies — is handed in directly rather than read from this struct; `Config` only
/// carries the handful of values that are genuinely configurable per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// First-wins overlap resolution when two zones claim the same link. The default; kept as a
    /// knob rather than hardcoded so a deployment can flip it without a code change.
    #[serde(default = "default_overlap_first_wins")]
    pub overlap_first_wins: bool,

    /// The run's projected metric CRS, e.g. `"EPSG:25832"`. Zone/network coordinates are
    /// assumed already expressed in it; must match the `Projection` passed into
    /// [`crate::scenario_assembler::ScenarioAssembler::assemble`], which transforms
    /// *from* `EPSG:4326` into it.
    pub target_crs: String,
}

fn default_overlap_first_wins() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlap_first_wins: true,
            target_crs: "EPSG:4326".to_string(),
        }
    }
}
