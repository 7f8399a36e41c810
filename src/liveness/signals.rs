//! Z-Secure Vault - Liveness Signals
//!
//! The four independent feature extractors. Each one is stateless, takes
//! a single [`CaptureFrame`], and tolerates a missing face by reporting
//! `face_detected: false` rather than erroring.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::{CaptureFrame, FaceBox, Point};

/// Thresholds for the liveness pipeline.
///
/// Injected explicitly into the extractor and scorer; there is no ambient
/// global configuration.
#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// EAR below this counts as an active blink
    pub blink_threshold: f64,
    /// EAR above this counts as eyes open normally
    pub open_eye_threshold: f64,
    /// Degrees of yaw/pitch/roll that count as head movement
    pub head_turn_threshold: f64,
    /// Minimum Laplacian variance of a real (non-reproduced) face region
    pub texture_variance_threshold: f64,
    /// Minimum face side length in pixels
    pub min_face_size: u32,
    /// Minimum face area as a fraction of the frame
    pub min_area_ratio: f64,
    /// Acceptable mean brightness of the face region (inclusive)
    pub min_brightness: f64,
    pub max_brightness: f64,
    /// Signals that must pass for the overall check to pass
    pub min_signals_passed: u32,
    /// Alternative pass criterion on the weighted score
    pub min_score: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            blink_threshold: 0.2,
            open_eye_threshold: 0.15,
            head_turn_threshold: 15.0,
            texture_variance_threshold: 50.0,
            min_face_size: 100,
            min_area_ratio: 0.1,
            min_brightness: 50.0,
            max_brightness: 200.0,
            min_signals_passed: 2,
            min_score: 0.5,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Signal measurements
// ═══════════════════════════════════════════════════════════════════════════

/// Blink detection via eye aspect ratio
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlinkSignal {
    pub face_detected: bool,
    pub left_ear: f64,
    pub right_ear: f64,
    pub avg_ear: f64,
    pub blink_detected: bool,
}

/// Head-pose deviation from frontal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadPoseSignal {
    pub face_detected: bool,
    /// Left-right rotation, degrees
    pub yaw: f64,
    /// Up-down rotation, degrees
    pub pitch: f64,
    /// Tilt, degrees
    pub roll: f64,
    pub movement_detected: bool,
}

/// Texture variance of the face region
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureSignal {
    pub face_detected: bool,
    /// Laplacian variance; print/screen reproductions attenuate this
    pub variance: f64,
    pub is_real: bool,
}

/// Face size, coverage, and brightness
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualitySignal {
    pub face_detected: bool,
    pub face_size: u32,
    pub area_ratio: f64,
    pub size_sufficient: bool,
    pub brightness: f64,
    pub brightness_ok: bool,
}

/// Measurements of all four signals over one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessSignals {
    pub blink: BlinkSignal,
    pub head_pose: HeadPoseSignal,
    pub texture: TextureSignal,
    pub quality: QualitySignal,
}

// ═══════════════════════════════════════════════════════════════════════════
// Extraction
// ═══════════════════════════════════════════════════════════════════════════

/// Runs the four independent extractors
#[derive(Debug, Clone, Default)]
pub struct SignalExtractor {
    config: LivenessConfig,
}

impl SignalExtractor {
    pub fn new(config: LivenessConfig) -> Self {
        Self { config }
    }

    pub fn extract_all(&self, frame: &CaptureFrame<'_>) -> LivenessSignals {
        LivenessSignals {
            blink: self.detect_blink(frame),
            head_pose: self.detect_head_pose(frame),
            texture: self.analyze_texture(frame),
            quality: self.check_quality(frame),
        }
    }

    /// Eye-aspect-ratio blink detection, averaged over both eyes
    pub fn detect_blink(&self, frame: &CaptureFrame<'_>) -> BlinkSignal {
        let Some(face) = frame.face else {
            return BlinkSignal::default();
        };

        let left_ear = eye_aspect_ratio(&face.landmarks.left_eye);
        let right_ear = eye_aspect_ratio(&face.landmarks.right_eye);
        let avg_ear = (left_ear + right_ear) / 2.0;

        BlinkSignal {
            face_detected: true,
            left_ear,
            right_ear,
            avg_ear,
            blink_detected: avg_ear < self.config.blink_threshold,
        }
    }

    /// Approximate yaw/pitch from nose-tip offsets, roll from the eye line
    pub fn detect_head_pose(&self, frame: &CaptureFrame<'_>) -> HeadPoseSignal {
        let Some(face) = frame.face else {
            return HeadPoseSignal::default();
        };
        let lm = &face.landmarks;

        let eye_center_x = (lm.left_eye_corner.x + lm.right_eye_corner.x) / 2.0;
        let eye_center_y = (lm.left_eye_corner.y + lm.right_eye_corner.y) / 2.0;

        let yaw = (lm.nose_tip.x - eye_center_x) * 180.0;
        let pitch = (lm.nose_tip.y - eye_center_y) * 180.0;

        let eye_slope = (lm.right_eye_corner.y - lm.left_eye_corner.y)
            / (lm.right_eye_corner.x - lm.left_eye_corner.x + 1e-6);
        let roll = eye_slope.atan().to_degrees();

        let threshold = self.config.head_turn_threshold;
        let movement_detected =
            yaw.abs() > threshold || pitch.abs() > threshold || roll.abs() > threshold;

        HeadPoseSignal {
            face_detected: true,
            yaw,
            pitch,
            roll,
            movement_detected,
        }
    }

    /// Laplacian variance over the face region of the grayscale frame
    pub fn analyze_texture(&self, frame: &CaptureFrame<'_>) -> TextureSignal {
        let Some(face) = frame.face else {
            return TextureSignal::default();
        };

        let Some(region) = clamp_region(frame.image, &face.bounds) else {
            return TextureSignal::default();
        };

        let variance = laplacian_variance(frame.image, &region);

        TextureSignal {
            face_detected: true,
            variance,
            is_real: variance > self.config.texture_variance_threshold,
        }
    }

    /// Face size, frame coverage, and mean brightness checks
    pub fn check_quality(&self, frame: &CaptureFrame<'_>) -> QualitySignal {
        let Some(face) = frame.face else {
            return QualitySignal::default();
        };

        let frame_area =
            u64::from(frame.image.width()) * u64::from(frame.image.height());
        let area_ratio = if frame_area > 0 {
            face.bounds.area() as f64 / frame_area as f64
        } else {
            0.0
        };

        let face_size = face.bounds.min_side();
        let size_sufficient = face_size >= self.config.min_face_size
            && area_ratio >= self.config.min_area_ratio;

        let (brightness, brightness_ok) = match clamp_region(frame.image, &face.bounds)
            .map(|region| mean_brightness(frame.image, &region))
        {
            Some(mean) => (
                mean,
                mean >= self.config.min_brightness && mean <= self.config.max_brightness,
            ),
            None => (0.0, false),
        };

        QualitySignal {
            face_detected: true,
            face_size,
            area_ratio,
            size_sufficient,
            brightness,
            brightness_ok,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Geometry / pixel helpers
// ═══════════════════════════════════════════════════════════════════════════

/// `EAR = (v1 + v2) / (2h)` over the 6-point eye landmark convention.
/// Returns 0 for a degenerate (zero-width) eye.
fn eye_aspect_ratio(eye: &[Point; 6]) -> f64 {
    let v1 = eye[1].distance_to(&eye[5]);
    let v2 = eye[2].distance_to(&eye[4]);
    let h = eye[0].distance_to(&eye[3]);

    if h > 0.0 {
        (v1 + v2) / (2.0 * h)
    } else {
        0.0
    }
}

/// Face box intersected with the frame; `None` when nothing remains
fn clamp_region(image: &GrayImage, bounds: &FaceBox) -> Option<FaceBox> {
    let x0 = bounds.x.min(image.width());
    let y0 = bounds.y.min(image.height());
    let x1 = bounds.x.saturating_add(bounds.width).min(image.width());
    let y1 = bounds.y.saturating_add(bounds.height).min(image.height());

    if x1 > x0 && y1 > y0 {
        Some(FaceBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    } else {
        None
    }
}

/// Population variance of the 3x3 Laplacian response over the region
/// interior. Regions thinner than 3 pixels have no interior and yield 0.
fn laplacian_variance(image: &GrayImage, region: &FaceBox) -> f64 {
    if region.width < 3 || region.height < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| -> f64 { f64::from(image.get_pixel(x, y).0[0]) };

    let mut responses = Vec::with_capacity(
        (region.width as usize - 2) * (region.height as usize - 2),
    );
    for y in region.y + 1..region.y + region.height - 1 {
        for x in region.x + 1..region.x + region.width - 1 {
            let lap = px(x, y - 1) + px(x, y + 1) + px(x - 1, y) + px(x + 1, y)
                - 4.0 * px(x, y);
            responses.push(lap);
        }
    }

    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
}

/// Mean pixel value over the region
fn mean_brightness(image: &GrayImage, region: &FaceBox) -> f64 {
    let mut sum = 0u64;
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            sum += u64::from(image.get_pixel(x, y).0[0]);
        }
    }
    sum as f64 / region.area() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::{DetectedFace, FaceLandmarks};

    /// Eye landmarks with a given width and lid opening
    fn eye_points(cx: f64, cy: f64, half_width: f64, half_open: f64) -> [Point; 6] {
        [
            Point::new(cx - half_width, cy),
            Point::new(cx - half_width / 2.0, cy - half_open),
            Point::new(cx + half_width / 2.0, cy - half_open),
            Point::new(cx + half_width, cy),
            Point::new(cx + half_width / 2.0, cy + half_open),
            Point::new(cx - half_width / 2.0, cy + half_open),
        ]
    }

    fn frontal_landmarks(ear_half_open: f64) -> FaceLandmarks {
        FaceLandmarks {
            left_eye: eye_points(0.35, 0.4, 0.05, ear_half_open),
            right_eye: eye_points(0.65, 0.4, 0.05, ear_half_open),
            nose_tip: Point::new(0.5, 0.4),
            left_eye_corner: Point::new(0.3, 0.4),
            right_eye_corner: Point::new(0.7, 0.4),
        }
    }

    fn face(bounds: FaceBox, landmarks: FaceLandmarks) -> DetectedFace {
        DetectedFace { bounds, landmarks }
    }

    fn uniform_frame(w: u32, h: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, image::Luma([value]))
    }

    fn checkerboard_frame(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            image::Luma([if (x + y) % 2 == 0 { 255 } else { 0 }])
        })
    }

    #[test]
    fn test_ear_geometry() {
        // half_width 0.05 => h = 0.1; half_open 0.015 => v1 = v2 = 0.03
        // EAR = (0.03 + 0.03) / (2 * 0.1) = 0.3
        let ear = eye_aspect_ratio(&eye_points(0.5, 0.5, 0.05, 0.015));
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_ear_degenerate_eye() {
        let collapsed = [Point::new(0.5, 0.5); 6];
        assert_eq!(eye_aspect_ratio(&collapsed), 0.0);
    }

    #[test]
    fn test_blink_open_eyes() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let blink = extractor.detect_blink(&frame);
        assert!(blink.face_detected);
        assert!((blink.avg_ear - 0.3).abs() < 1e-9);
        assert!(!blink.blink_detected);
    }

    #[test]
    fn test_blink_closed_eyes() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        // half_open 0.004 => EAR = 0.08 < 0.2
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.004),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let blink = extractor.detect_blink(&frame);
        assert!(blink.blink_detected);
    }

    #[test]
    fn test_blink_no_face() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let frame = CaptureFrame::new(&frame_img, None);

        let blink = extractor.detect_blink(&frame);
        assert!(!blink.face_detected);
        assert!(!blink.blink_detected);
        assert_eq!(blink.avg_ear, 0.0);
    }

    #[test]
    fn test_head_pose_frontal() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let pose = extractor.detect_head_pose(&frame);
        assert!(pose.face_detected);
        assert!(pose.yaw.abs() < 1.0);
        assert!(pose.pitch.abs() < 1.0);
        assert!(pose.roll.abs() < 1.0);
        assert!(!pose.movement_detected);
    }

    #[test]
    fn test_head_pose_turned() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let mut landmarks = frontal_landmarks(0.015);
        // Nose displaced 0.12 from the eye center => yaw = 21.6 degrees
        landmarks.nose_tip = Point::new(0.62, 0.4);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            landmarks,
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let pose = extractor.detect_head_pose(&frame);
        assert!((pose.yaw - 21.6).abs() < 1e-6);
        assert!(pose.movement_detected);
    }

    #[test]
    fn test_head_pose_rolled() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let mut landmarks = frontal_landmarks(0.015);
        // Eye line sloped 0.4/0.4 => 45 degree roll
        landmarks.left_eye_corner = Point::new(0.3, 0.2);
        landmarks.right_eye_corner = Point::new(0.7, 0.6);
        landmarks.nose_tip = Point::new(0.5, 0.4);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            landmarks,
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let pose = extractor.detect_head_pose(&frame);
        assert!((pose.roll - 45.0).abs() < 0.01);
        assert!(pose.movement_detected);
    }

    #[test]
    fn test_texture_flat_region_fails() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let texture = extractor.analyze_texture(&frame);
        assert!(texture.face_detected);
        assert_eq!(texture.variance, 0.0);
        assert!(!texture.is_real);
    }

    #[test]
    fn test_texture_detailed_region_passes() {
        let extractor = SignalExtractor::default();
        let frame_img = checkerboard_frame(400, 400);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let texture = extractor.analyze_texture(&frame);
        assert!(texture.is_real);
        assert!(texture.variance > 50.0);
    }

    #[test]
    fn test_texture_out_of_frame_box() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(100, 100, 128);
        let f = face(
            FaceBox { x: 500, y: 500, width: 50, height: 50 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let texture = extractor.analyze_texture(&frame);
        assert!(!texture.face_detected);
    }

    #[test]
    fn test_quality_good_face() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        // 200x200 in 400x400: min side 200, area ratio 0.25
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let quality = extractor.check_quality(&frame);
        assert!(quality.size_sufficient);
        assert!(quality.brightness_ok);
        assert!((quality.brightness - 128.0).abs() < 1e-9);
        assert!((quality.area_ratio - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_quality_small_face() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let f = face(
            FaceBox { x: 10, y: 10, width: 50, height: 50 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let quality = extractor.check_quality(&frame);
        assert!(!quality.size_sufficient);
    }

    #[test]
    fn test_quality_dark_face() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 30);
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );
        let frame = CaptureFrame::new(&frame_img, Some(&f));

        let quality = extractor.check_quality(&frame);
        assert!(!quality.brightness_ok);
    }

    #[test]
    fn test_quality_brightness_bounds_inclusive() {
        let extractor = SignalExtractor::default();
        let f = face(
            FaceBox { x: 100, y: 100, width: 200, height: 200 },
            frontal_landmarks(0.015),
        );

        let low = uniform_frame(400, 400, 50);
        let quality = extractor.check_quality(&CaptureFrame::new(&low, Some(&f)));
        assert!(quality.brightness_ok);

        let high = uniform_frame(400, 400, 200);
        let quality = extractor.check_quality(&CaptureFrame::new(&high, Some(&f)));
        assert!(quality.brightness_ok);
    }

    #[test]
    fn test_all_signals_degrade_without_face() {
        let extractor = SignalExtractor::default();
        let frame_img = uniform_frame(400, 400, 128);
        let frame = CaptureFrame::new(&frame_img, None);

        let signals = extractor.extract_all(&frame);
        assert!(!signals.blink.face_detected);
        assert!(!signals.head_pose.face_detected);
        assert!(!signals.texture.face_detected);
        assert!(!signals.quality.face_detected);
    }
}
