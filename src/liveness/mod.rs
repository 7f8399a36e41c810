//! Z-Secure Vault - Liveness Detection
//!
//! Single-frame liveness scoring from four independent signals: blink
//! (eye aspect ratio), head-pose deviation, texture variance, and face
//! quality. Each signal is a stateless pure function over one capture
//! frame; the scorer combines them into a weighted pass/fail report that
//! gates registration and authentication upstream.
//!
//! Face detection itself is out of scope: callers hand in the grayscale
//! frame together with the detector's output (bounding box + normalized
//! landmarks), or `None` when no face was found. Signals degrade to a
//! "not detected" measurement instead of failing.

pub mod scorer;
pub mod signals;

use image::GrayImage;
use serde::{Deserialize, Serialize};

pub use scorer::{LivenessReport, LivenessScorer};
pub use signals::{
    BlinkSignal, HeadPoseSignal, LivenessConfig, LivenessSignals, QualitySignal,
    SignalExtractor, TextureSignal,
};

/// A 2D landmark point in normalized image coordinates ([0,1] per axis)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Face bounding box in frame pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    /// Shorter side of the box
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Landmark set handed over by the external face-geometry provider.
///
/// Eye points follow the 6-point EAR convention: index 0 is the outer
/// corner, 3 the inner corner, 1/5 and 2/4 the upper/lower lid pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: [Point; 6],
    pub right_eye: [Point; 6],
    pub nose_tip: Point,
    /// Outer corner of the left eye (pose estimation)
    pub left_eye_corner: Point,
    /// Outer corner of the right eye (pose estimation)
    pub right_eye_corner: Point,
}

/// Detector output for one face in one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: FaceBox,
    pub landmarks: FaceLandmarks,
}

/// One capture frame plus the (optional) detected face
#[derive(Debug, Clone, Copy)]
pub struct CaptureFrame<'a> {
    pub image: &'a GrayImage,
    pub face: Option<&'a DetectedFace>,
}

impl<'a> CaptureFrame<'a> {
    pub fn new(image: &'a GrayImage, face: Option<&'a DetectedFace>) -> Self {
        Self { image, face }
    }
}

/// Full liveness pipeline: signal extraction followed by scoring
#[derive(Debug, Clone, Default)]
pub struct LivenessAnalyzer {
    extractor: SignalExtractor,
    scorer: LivenessScorer,
}

impl LivenessAnalyzer {
    pub fn new(config: LivenessConfig) -> Self {
        Self {
            extractor: SignalExtractor::new(config.clone()),
            scorer: LivenessScorer::new(config),
        }
    }

    /// Run all four signals over a frame and score the result
    pub fn assess(&self, frame: &CaptureFrame<'_>) -> LivenessReport {
        let signals = self.extractor.extract_all(frame);
        self.scorer.score(signals)
    }
}
