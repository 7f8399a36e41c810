//! Z-Secure Vault - Face Geometry Provider
//!
//! Capability seam for the out-of-scope face detection/embedding step.
//! The engine never fabricates biometric data on its own: whoever calls it
//! injects a provider explicitly, and the only in-crate implementation is
//! a fixture loader that reads pre-extracted JSON (used by the CLI and by
//! tests). Real detector backends implement this trait in the application
//! layer.

use std::path::Path;

use image::GrayImage;

use crate::encoding::FaceEncoding;
use crate::error::ZsecureResult;
use crate::liveness::DetectedFace;

/// External face-geometry/embedding capability.
///
/// `Ok(None)` means "no face found" and is a normal outcome, distinct from
/// provider failure.
pub trait FaceGeometryProvider {
    /// Extract a face-encoding vector from raw image bytes
    fn face_encoding(&self, image: &[u8]) -> ZsecureResult<Option<FaceEncoding>>;

    /// Locate a face (bounding box + landmarks) in a grayscale frame
    fn detect_face(&self, frame: &GrayImage) -> ZsecureResult<Option<DetectedFace>>;
}

/// Fixture-backed provider: serves pre-extracted geometry from JSON files.
///
/// An explicit test double, constructed by the caller; it ignores the
/// actual image content.
#[derive(Debug, Clone, Default)]
pub struct JsonFixtureProvider {
    encoding: Option<FaceEncoding>,
    face: Option<DetectedFace>,
}

impl JsonFixtureProvider {
    pub fn new(encoding: Option<FaceEncoding>, face: Option<DetectedFace>) -> Self {
        Self { encoding, face }
    }

    /// Load fixtures from JSON files; either side may be absent.
    pub fn from_files(
        encoding_path: Option<&Path>,
        face_path: Option<&Path>,
    ) -> ZsecureResult<Self> {
        let encoding = match encoding_path {
            Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
            None => None,
        };
        let face = match face_path {
            Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
            None => None,
        };

        Ok(Self { encoding, face })
    }
}

impl FaceGeometryProvider for JsonFixtureProvider {
    fn face_encoding(&self, _image: &[u8]) -> ZsecureResult<Option<FaceEncoding>> {
        Ok(self.encoding.clone())
    }

    fn detect_face(&self, _frame: &GrayImage) -> ZsecureResult<Option<DetectedFace>> {
        Ok(self.face.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ENCODING_DIM;

    #[test]
    fn test_fixture_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();

        let encoding = FaceEncoding::new(
            (0..ENCODING_DIM).map(|i| (i as f64) * 0.001).collect(),
        );
        let enc_path = dir.path().join("encoding.json");
        std::fs::write(&enc_path, serde_json::to_string(&encoding).unwrap()).unwrap();

        let provider = JsonFixtureProvider::from_files(Some(enc_path.as_path()), None).unwrap();

        let loaded = provider.face_encoding(b"ignored").unwrap().unwrap();
        assert_eq!(loaded, encoding);

        let frame = GrayImage::new(4, 4);
        assert!(provider.detect_face(&frame).unwrap().is_none());
    }

    #[test]
    fn test_empty_provider_reports_no_face() {
        let provider = JsonFixtureProvider::default();

        assert!(provider.face_encoding(b"img").unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = Path::new("/nonexistent/encoding.json");
        assert!(JsonFixtureProvider::from_files(Some(missing), None).is_err());
    }
}
