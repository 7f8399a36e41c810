//! Z-Secure Vault - Liveness Scoring
//!
//! Combines the four signal measurements into a weighted pass/fail report.
//! Stateless and single-frame: no history is kept across captures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signals::{LivenessConfig, LivenessSignals};
use crate::error::{ZsecureError, ZsecureResult};

/// Contribution of each passing signal to the overall score
const SIGNAL_WEIGHT: f64 = 0.25;

/// Outcome of a liveness check for one capture frame.
///
/// Produced fresh per check and used only to gate the current
/// authentication or registration attempt; never persisted long-term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessReport {
    pub passed: bool,
    /// Weighted score in [0, 1]
    pub score: f64,
    pub signals_passed: u32,
    pub total_signals: u32,
    pub signals: LivenessSignals,
    pub timestamp: DateTime<Utc>,
}

impl LivenessReport {
    /// Turn a failing report into a `LivenessFailed` error carrying the
    /// full report for caller-side diagnostics.
    pub fn require_passed(self) -> ZsecureResult<Self> {
        if self.passed {
            Ok(self)
        } else {
            Err(ZsecureError::LivenessFailed {
                report: Box::new(self),
            })
        }
    }
}

/// Weighted multi-signal scorer
#[derive(Debug, Clone, Default)]
pub struct LivenessScorer {
    config: LivenessConfig,
}

impl LivenessScorer {
    pub fn new(config: LivenessConfig) -> Self {
        Self { config }
    }

    /// Score a set of signal measurements.
    ///
    /// Each passing signal contributes 0.25. The overall check passes when
    /// at least `min_signals_passed` signals pass OR the score reaches
    /// `min_score`; both predicates are evaluated explicitly so the rule
    /// survives a future change to per-signal weights.
    pub fn score(&self, signals: LivenessSignals) -> LivenessReport {
        let passes = [
            self.blink_passes(&signals),
            signals.head_pose.movement_detected,
            signals.texture.is_real,
            signals.quality.size_sufficient && signals.quality.brightness_ok,
        ];

        let signals_passed = passes.iter().filter(|&&p| p).count() as u32;
        let score = f64::from(signals_passed) * SIGNAL_WEIGHT;

        let passed =
            signals_passed >= self.config.min_signals_passed || score >= self.config.min_score;

        LivenessReport {
            passed,
            score,
            signals_passed,
            total_signals: passes.len() as u32,
            signals,
            timestamp: Utc::now(),
        }
    }

    /// A blink signal passes on an active blink or on normally open eyes;
    /// it fails when no face was detected.
    fn blink_passes(&self, signals: &LivenessSignals) -> bool {
        signals.blink.blink_detected
            || signals.blink.avg_ear > self.config.open_eye_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::signals::{
        BlinkSignal, HeadPoseSignal, QualitySignal, TextureSignal,
    };

    fn passing_blink() -> BlinkSignal {
        BlinkSignal {
            face_detected: true,
            left_ear: 0.3,
            right_ear: 0.3,
            avg_ear: 0.3,
            blink_detected: false,
        }
    }

    fn passing_pose() -> HeadPoseSignal {
        HeadPoseSignal {
            face_detected: true,
            yaw: 20.0,
            pitch: 2.0,
            roll: 1.0,
            movement_detected: true,
        }
    }

    fn passing_texture() -> TextureSignal {
        TextureSignal {
            face_detected: true,
            variance: 120.0,
            is_real: true,
        }
    }

    fn passing_quality() -> QualitySignal {
        QualitySignal {
            face_detected: true,
            face_size: 200,
            area_ratio: 0.25,
            size_sufficient: true,
            brightness: 128.0,
            brightness_ok: true,
        }
    }

    fn signals(blink: bool, pose: bool, texture: bool, quality: bool) -> LivenessSignals {
        LivenessSignals {
            blink: if blink { passing_blink() } else { BlinkSignal::default() },
            head_pose: if pose { passing_pose() } else { HeadPoseSignal::default() },
            texture: if texture { passing_texture() } else { TextureSignal::default() },
            quality: if quality { passing_quality() } else { QualitySignal::default() },
        }
    }

    #[test]
    fn test_all_signals_pass() {
        let report = LivenessScorer::default().score(signals(true, true, true, true));

        assert!(report.passed);
        assert_eq!(report.signals_passed, 4);
        assert_eq!(report.total_signals, 4);
        assert!((report.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_signals_pass_at_threshold() {
        let report = LivenessScorer::default().score(signals(true, false, true, false));

        assert!(report.passed);
        assert_eq!(report.signals_passed, 2);
        assert!((report.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_one_signal_fails_check() {
        let report = LivenessScorer::default().score(signals(false, true, false, false));

        assert!(!report.passed);
        assert_eq!(report.signals_passed, 1);
        assert!((report.score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_signals() {
        let report = LivenessScorer::default().score(signals(false, false, false, false));

        assert!(!report.passed);
        assert_eq!(report.signals_passed, 0);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_active_blink_counts_as_pass() {
        let mut s = signals(false, true, false, false);
        s.blink = BlinkSignal {
            face_detected: true,
            left_ear: 0.08,
            right_ear: 0.08,
            avg_ear: 0.08,
            blink_detected: true,
        };

        let report = LivenessScorer::default().score(s);
        assert_eq!(report.signals_passed, 2);
        assert!(report.passed);
    }

    #[test]
    fn test_require_passed_attaches_report() {
        let report = LivenessScorer::default().score(signals(false, false, true, false));
        let err = report.require_passed().unwrap_err();

        assert!(err.is_security_critical());
        match err {
            ZsecureError::LivenessFailed { report } => {
                assert_eq!(report.signals_passed, 1);
                assert!(!report.passed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_require_passed_passthrough() {
        let report = LivenessScorer::default().score(signals(true, true, true, false));
        assert!(report.require_passed().is_ok());
    }
}
