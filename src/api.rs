//! Z-Secure Vault - Unified Public API
//!
//! Single entry point for collaborating layers (request handlers, storage,
//! CLI). Bundles key derivation, the image cipher, face matching, and
//! liveness assessment behind one engine with explicit configuration.
//!
//! The engine itself holds no mutable state and may be shared freely
//! across threads; file helpers live here so the cryptographic core stays
//! free of I/O.

use std::path::Path;

use crate::container::{Container, ContainerMetadata};
use crate::crypto::chaos::{ChaosConfig, ChaosMixer};
use crate::crypto::cipher::ImageCipher;
use crate::crypto::keys::{KdfConfig, KeyDeriver, SymmetricKey, AUDIT_SALT_LEN, KEY_LEN};
use crate::encoding::{
    EncodingValidator, FaceEncoding, FaceMatcher, MatcherConfig, ValidatorConfig,
};
use crate::error::ZsecureResult;
use crate::liveness::{CaptureFrame, LivenessAnalyzer, LivenessConfig, LivenessReport};

/// Engine configuration: one explicit struct per component, no globals
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub validator: ValidatorConfig,
    pub matcher: MatcherConfig,
    pub chaos: ChaosConfig,
    pub kdf: KdfConfig,
    pub liveness: LivenessConfig,
}

/// Z-Secure engine
///
/// # Example
///
/// ```rust,ignore
/// use zsecure_vault::ZsecureEngine;
///
/// let engine = ZsecureEngine::default();
///
/// // Registration: derive the key from the enrolled face encoding
/// let key = engine.derive_key(&encoding, "user@example.com")?;
/// let container = engine.encrypt_image(&photo_bytes, &key)?;
///
/// // Later: re-derive the identical key and decrypt
/// let key = engine.derive_key(&encoding, "user@example.com")?;
/// let photo = engine.decrypt_image(&container, &key)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZsecureEngine {
    deriver: KeyDeriver,
    cipher: ImageCipher,
    matcher: FaceMatcher,
    analyzer: LivenessAnalyzer,
}

impl ZsecureEngine {
    pub fn new(config: EngineConfig) -> Self {
        let validator = EncodingValidator::new(config.validator);
        Self {
            deriver: KeyDeriver::new(
                config.kdf,
                ChaosMixer::new(config.chaos),
                validator.clone(),
            ),
            cipher: ImageCipher::new(),
            matcher: FaceMatcher::new(config.matcher, validator),
            analyzer: LivenessAnalyzer::new(config.liveness),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // KEY DERIVATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Derive the symmetric key bound to `(encoding, identity)`
    pub fn derive_key(
        &self,
        encoding: &FaceEncoding,
        identity: &str,
    ) -> ZsecureResult<SymmetricKey> {
        self.deriver.derive_key(encoding, identity)
    }

    /// Salted key fingerprint for the storage layer's audit trail
    pub fn key_fingerprint(
        &self,
        key: &SymmetricKey,
        salt: &[u8; AUDIT_SALT_LEN],
    ) -> [u8; KEY_LEN] {
        self.deriver.audit_fingerprint(key, salt)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // IMAGE ENCRYPTION
    // ═══════════════════════════════════════════════════════════════════════

    /// Encrypt image bytes into Z-Secure container bytes
    pub fn encrypt_image(
        &self,
        plaintext: &[u8],
        key: &SymmetricKey,
    ) -> ZsecureResult<Vec<u8>> {
        self.cipher.encrypt(plaintext, key)
    }

    /// Decrypt Z-Secure container bytes back into image bytes
    pub fn decrypt_image(&self, data: &[u8], key: &SymmetricKey) -> ZsecureResult<Vec<u8>> {
        self.cipher.decrypt(data, key)
    }

    /// True iff the buffer carries the Z-Secure signature
    pub fn is_encrypted_container(&self, data: &[u8]) -> bool {
        Container::detect(data)
    }

    /// Container metadata without decryption
    pub fn container_metadata(&self, data: &[u8]) -> ZsecureResult<ContainerMetadata> {
        Container::peek_metadata(data)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AUTHENTICATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Distance-based match between a stored and a probe encoding
    pub fn match_face(
        &self,
        stored: &FaceEncoding,
        probe: &FaceEncoding,
    ) -> ZsecureResult<bool> {
        self.matcher.matches(stored, probe)
    }

    /// Score one capture frame for liveness
    pub fn assess_liveness(&self, frame: &CaptureFrame<'_>) -> LivenessReport {
        self.analyzer.assess(frame)
    }

    /// Full authentication gate: the capture must pass liveness before the
    /// probe encoding is matched against the stored one.
    pub fn authenticate(
        &self,
        frame: &CaptureFrame<'_>,
        stored: &FaceEncoding,
        probe: &FaceEncoding,
    ) -> ZsecureResult<bool> {
        let report = self.assess_liveness(frame).require_passed()?;
        log::debug!(
            "liveness passed ({}/{} signals), matching probe",
            report.signals_passed,
            report.total_signals
        );
        self.match_face(stored, probe)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FILE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Encrypt a file on disk; returns the number of container bytes written
    pub fn encrypt_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        key: &SymmetricKey,
    ) -> ZsecureResult<usize> {
        let plaintext = std::fs::read(input.as_ref())?;
        let container = self.encrypt_image(&plaintext, key)?;
        std::fs::write(output.as_ref(), &container)?;
        log::info!(
            "encrypted {} -> {} ({} bytes)",
            input.as_ref().display(),
            output.as_ref().display(),
            container.len()
        );
        Ok(container.len())
    }

    /// Decrypt a container file on disk into plaintext bytes
    pub fn decrypt_file<P: AsRef<Path>>(
        &self,
        input: P,
        key: &SymmetricKey,
    ) -> ZsecureResult<Vec<u8>> {
        let data = std::fs::read(input.as_ref())?;
        self.decrypt_image(&data, key)
    }
}
