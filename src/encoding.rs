//! Z-Secure Vault - Face Encodings
//!
//! Fixed-length face-encoding vectors, validity checks, and the
//! distance-based match decision with anti-replay heuristics. Encodings are
//! produced by an external geometry/embedding provider; this module never
//! mutates one, only compares or consumes it.

use serde::{Deserialize, Serialize};

use crate::error::{ZsecureError, ZsecureResult};

/// Canonical encoding dimension produced by the upstream provider
pub const ENCODING_DIM: usize = 128;

/// Fixed-length face-encoding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceEncoding {
    values: Vec<f64>,
}

impl FaceEncoding {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Serialize to the deterministic byte layout used for key derivation:
    /// consecutive little-endian f64 words in encoding order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.values.len() * 8);
        for v in &self.values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    /// Population variance of the encoding values
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        self.values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64
    }
}

/// Euclidean distance between two encodings of equal length
pub fn distance(a: &FaceEncoding, b: &FaceEncoding) -> ZsecureResult<f64> {
    if a.len() != b.len() {
        return Err(ZsecureError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let sum_sq: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).powi(2))
        .sum();

    Ok(sum_sq.sqrt())
}

// ═══════════════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════════════

/// Encoding validity thresholds
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Required encoding length
    pub dimension: usize,
    /// Minimum population variance for a non-degenerate encoding
    pub min_variance: f64,
    /// Maximum absolute value of any component
    pub max_magnitude: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            dimension: ENCODING_DIM,
            min_variance: 0.001,
            max_magnitude: 5.0,
        }
    }
}

/// Validity checks for face encodings
#[derive(Debug, Clone, Default)]
pub struct EncodingValidator {
    config: ValidatorConfig,
}

impl EncodingValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// True iff the encoding has the right dimension, is not degenerate
    /// (all-zero, all-one, or near-constant) and stays within magnitude
    /// bounds.
    pub fn is_valid(&self, encoding: &FaceEncoding) -> bool {
        let values = encoding.as_slice();

        if values.len() != self.config.dimension {
            return false;
        }
        if values.iter().all(|&v| v == 0.0) || values.iter().all(|&v| v == 1.0) {
            return false;
        }
        if encoding.variance() < self.config.min_variance {
            return false;
        }
        if values.iter().any(|v| v.abs() > self.config.max_magnitude) {
            return false;
        }

        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════════════════════

/// Match decision thresholds
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Maximum distance still considered the same identity
    pub tolerance: f64,
    /// Distances below this are treated as a replay of the stored encoding
    pub spoof_floor: f64,
    /// Secondary bound: a match must also fall inside `margin * tolerance`
    pub margin: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.4,
            spoof_floor: 0.1,
            margin: 0.8,
        }
    }
}

/// Distance-based face matcher with anti-replay heuristics
#[derive(Debug, Clone, Default)]
pub struct FaceMatcher {
    config: MatcherConfig,
    validator: EncodingValidator,
}

impl FaceMatcher {
    pub fn new(config: MatcherConfig, validator: EncodingValidator) -> Self {
        Self { config, validator }
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    /// Decide whether `probe` matches `stored`.
    ///
    /// Returns `Ok(false)` when either encoding fails validity checks,
    /// `Err(PotentialSpoofing)` when the distance is suspiciously small
    /// (a near-perfect replay of the stored encoding), and otherwise
    /// accepts only well inside the tolerance band: the distance must
    /// satisfy both `d <= tolerance` and `d <= margin * tolerance`.
    pub fn matches(
        &self,
        stored: &FaceEncoding,
        probe: &FaceEncoding,
    ) -> ZsecureResult<bool> {
        if !self.validator.is_valid(stored) || !self.validator.is_valid(probe) {
            return Ok(false);
        }

        let d = distance(stored, probe)?;
        if d < self.config.spoof_floor {
            return Err(ZsecureError::PotentialSpoofing { distance: d });
        }

        // Both bounds are enforced on purpose; do not collapse them.
        let within_tolerance = d <= self.config.tolerance;
        let within_margin = d <= self.config.tolerance * self.config.margin;

        Ok(within_tolerance && within_margin)
    }
}
