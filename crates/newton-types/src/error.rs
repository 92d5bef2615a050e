// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for the governor and its collaborators.
///
/// Classification itself never fails; these cover configuration,
/// downstream generation, and raw phase codes coming across the FFI.
#[derive(Error, Debug)]
pub enum NewtonError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The downstream generator failed (transport or model).
    #[error("generation error: {0}")]
    Generation(String),

    /// A raw phase code outside {0, 1, 7, 8, 9}.
    #[error("invalid phase code: {0} (valid codes are 0, 1, 7, 8, 9)")]
    InvalidPhase(u8),
}

pub type NewtonResult<T> = Result<T, NewtonError>;
