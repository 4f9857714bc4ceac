use thiserror::Error;

/// Errors the core can raise. Construction-time variants are fatal to the run; `OrphanedEvent`
/// is the only one ever produced at runtime, and is logged and dropped rather than propagated —
/// callers that want the drop-count for diagnostics read it off `EnforcementHandler` rather than
/// catching this variant.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("network inconsistent: {0}")]
    NetworkInconsistent(String),

    #[error("empty population: {0}")]
    EmptyPopulation(String),

    #[error("orphaned event: {0}")]
    OrphanedEvent(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("configured CRS mismatch: {0}")]
    CrsMismatch(String),
}
