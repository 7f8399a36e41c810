//! Z-Secure Vault - Cryptographic Core
//!
//! Chaos mixing, biometric key derivation, and the AES-256-CBC image
//! cipher. All operations are pure and synchronous; nothing here performs
//! I/O or holds cross-call state.

pub mod chaos;
pub mod cipher;
pub mod keys;

pub use chaos::{ChaosConfig, ChaosMixer};
pub use cipher::ImageCipher;
pub use keys::{generate_audit_salt, KdfConfig, KeyDeriver, SymmetricKey, KEY_LEN};
