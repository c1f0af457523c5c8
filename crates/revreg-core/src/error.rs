use thiserror::Error;

/// Crate-wide error enum, one variant per kind named in the error-handling
/// design: malformed input, invalid credentials, timing, duplicates,
/// persistence, and configuration.
#[derive(Debug, Error)]
pub enum RevRegError {
    // ── Wire / validation errors ─────────────────────────────────────────────
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid proof-of-work: {0}")]
    InvalidPoW(String),

    #[error("record expired at {expired_at} (now {now})")]
    Expired { expired_at: i64, now: i64 },

    #[error("record not yet valid (timestamp {timestamp} is in the future of {now})")]
    NotYetValid { timestamp: i64, now: i64 },

    #[error("duplicate record for key {0}")]
    Duplicate(String),

    // ── Storage ───────────────────────────────────────────────────────────────
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // ── Configuration ─────────────────────────────────────────────────────────
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    // ── General ───────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}
