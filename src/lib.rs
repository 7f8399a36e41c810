//! # Z-Secure Vault
//!
//! Biometric-keyed image encryption with multi-signal liveness gating.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Z-SECURE VAULT                       │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────┐   │
//! │  │  ENCODING   │  │  CRYPTO CORE │  │   LIVENESS     │   │
//! │  │  validate + │  │  chaos → KDF │  │  blink/pose/   │   │
//! │  │  match      │  │  AES-256-CBC │  │  texture/qual  │   │
//! │  └──────┬──────┘  └──────┬───────┘  └───────┬────────┘   │
//! │         │                │                  │            │
//! │  ┌──────┴────────────────┴──────────────────┴─────────┐  │
//! │  │              ZSECURE ENGINE (api)                  │  │
//! │  │   derive → encrypt/decrypt → ZSEC container        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Model
//!
//! - The symmetric key is a deterministic function of the enrolled face
//!   encoding and the identity string; it is recomputed on demand and
//!   never persisted (storage keeps only a salted fingerprint).
//! - Images travel in the self-describing `ZSEC` container:
//!   AES-256-CBC ciphertext plus JSON metadata carrying the IV.
//! - Authentication is gated twice: a single-frame liveness check over
//!   four independent signals, then a distance match with an anti-replay
//!   floor and a tightened acceptance band.
//! - Key material is zeroized on drop.

pub mod api;
pub mod container;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod liveness;
pub mod provider;

pub use api::{EngineConfig, ZsecureEngine};
pub use container::{Container, ContainerMetadata, ALGORITHM_ID, SIGNATURE};
pub use crypto::{ChaosMixer, ImageCipher, KeyDeriver, SymmetricKey};
pub use encoding::{distance, EncodingValidator, FaceEncoding, FaceMatcher, ENCODING_DIM};
pub use error::{ZsecureError, ZsecureResult};
pub use liveness::{CaptureFrame, LivenessAnalyzer, LivenessReport};
pub use provider::{FaceGeometryProvider, JsonFixtureProvider};

/// Z-Secure Vault version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
