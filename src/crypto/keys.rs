//! Z-Secure Vault - Biometric Key Derivation
//!
//! Turns a face-encoding vector plus an identity string into a 256-bit
//! symmetric key: chaos mixing over the serialized encoding, then
//! PBKDF2-HMAC-SHA256 stretching with an identity-derived salt.
//!
//! Determinism is load-bearing. The key is never persisted; it is
//! recomputed from the stored encoding every time it is needed, so the same
//! `(encoding, identity)` pair must always reproduce the same bytes.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::crypto::chaos::ChaosMixer;
use crate::encoding::{EncodingValidator, FaceEncoding};
use crate::error::{ZsecureError, ZsecureResult};

/// Key length for AES-256
pub const KEY_LEN: usize = 32;

/// Salt length for the PBKDF2 step (first half of SHA-256(identity))
pub const SALT_LEN: usize = 16;

/// Salt length for audit fingerprints
pub const AUDIT_SALT_LEN: usize = 32;

/// 256-bit symmetric key with automatic zeroization
///
/// Derived, never randomly generated: the only production source is
/// [`KeyDeriver::derive_key`].
#[derive(Clone, ZeroizeOnDrop)]
pub struct SymmetricKey {
    #[zeroize(skip)]
    inner: Secret<[u8; KEY_LEN]>,
}

impl SymmetricKey {
    /// Wrap raw key bytes (tests and callers transporting a derived key)
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            inner: Secret::new(bytes),
        }
    }

    /// Expose the key bytes (use with caution)
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Key-stretching configuration
#[derive(Debug, Clone)]
pub struct KdfConfig {
    /// PBKDF2-HMAC-SHA256 iteration count
    pub pbkdf2_iterations: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 100_000,
        }
    }
}

/// Biometric key deriver
#[derive(Debug, Clone, Default)]
pub struct KeyDeriver {
    config: KdfConfig,
    mixer: ChaosMixer,
    validator: EncodingValidator,
}

impl KeyDeriver {
    pub fn new(config: KdfConfig, mixer: ChaosMixer, validator: EncodingValidator) -> Self {
        Self {
            config,
            mixer,
            validator,
        }
    }

    /// Derive the symmetric key for `(encoding, identity)`.
    ///
    /// Fails with `DerivationFailed` when the encoding does not pass
    /// validity checks or the identity is empty.
    pub fn derive_key(
        &self,
        encoding: &FaceEncoding,
        identity: &str,
    ) -> ZsecureResult<SymmetricKey> {
        if identity.is_empty() {
            return Err(ZsecureError::DerivationFailed(
                "identity must not be empty".into(),
            ));
        }
        if !self.validator.is_valid(encoding) {
            return Err(ZsecureError::DerivationFailed(
                "face encoding failed validity checks".into(),
            ));
        }

        // Encoding bytes + identity bytes feed the chaos mixer
        let mut buffer = encoding.to_le_bytes();
        buffer.extend_from_slice(identity.as_bytes());

        let chaos_digest = self.mixer.mix(&buffer)?;
        let salt = identity_salt(identity);

        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(
            &chaos_digest,
            &salt,
            self.config.pbkdf2_iterations,
            &mut key,
        );

        Ok(SymmetricKey::new(key))
    }

    /// Salted fingerprint of a derived key, safe for a storing collaborator
    /// to persist for auditing. The key itself never leaves memory.
    pub fn audit_fingerprint(
        &self,
        key: &SymmetricKey,
        salt: &[u8; AUDIT_SALT_LEN],
    ) -> [u8; KEY_LEN] {
        let mut fingerprint = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(
            key.expose(),
            salt,
            self.config.pbkdf2_iterations,
            &mut fingerprint,
        );
        fingerprint
    }
}

/// PBKDF2 salt: first 16 bytes of SHA-256 over the identity's UTF-8 bytes
fn identity_salt(identity: &str) -> [u8; SALT_LEN] {
    let digest = Sha256::digest(identity.as_bytes());
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&digest[..SALT_LEN]);
    salt
}

/// Generate a random salt for audit fingerprints
pub fn generate_audit_salt() -> [u8; AUDIT_SALT_LEN] {
    let mut salt = [0u8; AUDIT_SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
