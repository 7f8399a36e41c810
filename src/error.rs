//! Z-Secure Vault - Error Types

use thiserror::Error;

use crate::liveness::LivenessReport;

/// Result type for Z-Secure operations
pub type ZsecureResult<T> = Result<T, ZsecureError>;

/// Z-Secure error types
///
/// Every core operation fails closed: input that cannot be proven valid is
/// rejected with a specific variant, and the calling layer decides retry
/// policy and user-facing messaging.
#[derive(Error, Debug)]
pub enum ZsecureError {
    // ═══════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("encoding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // ═══════════════════════════════════════════════════════════════
    // CRYPTO ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    /// Block decryption succeeded but the PKCS#7 padding is malformed.
    /// Almost always indicates a wrong key.
    #[error("padding validation failed - wrong key or corrupted ciphertext")]
    PaddingInvalid,

    // ═══════════════════════════════════════════════════════════════
    // CONTAINER ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("invalid container format: {0}")]
    FormatInvalid(String),

    // ═══════════════════════════════════════════════════════════════
    // BIOMETRIC ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("match rejected: distance {distance:.4} is suspiciously close, potential replay")]
    PotentialSpoofing { distance: f64 },

    #[error(
        "liveness check failed: {}/{} signals passed (score {:.2})",
        .report.signals_passed,
        .report.total_signals,
        .report.score
    )]
    LivenessFailed { report: Box<LivenessReport> },

    // ═══════════════════════════════════════════════════════════════
    // IO / SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ZsecureError {
    /// Check if this error indicates a possible attack rather than bad input
    pub fn is_security_critical(&self) -> bool {
        matches!(
            self,
            ZsecureError::PaddingInvalid
                | ZsecureError::PotentialSpoofing { .. }
                | ZsecureError::LivenessFailed { .. }
        )
    }
}

impl From<serde_json::Error> for ZsecureError {
    fn from(e: serde_json::Error) -> Self {
        ZsecureError::Serialization(e.to_string())
    }
}
