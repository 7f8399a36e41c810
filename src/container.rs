//! Z-Secure Vault - Container Format
//!
//! Self-describing binary wrapper around ciphertext, all integers
//! big-endian:
//!
//! ```text
//! [SIGNATURE 4B]["ZSEC"]
//! [METADATA LEN 4B][u32 BE]
//! [METADATA variable][UTF-8 JSON: encrypted, algorithm, timestamp, iv]
//! [CIPHERTEXT variable][AES-256-CBC, multiple of 16]
//! ```
//!
//! The codec only frames bytes; reading and writing them is the caller's
//! responsibility, and decoding never mutates the input.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{ZsecureError, ZsecureResult};

/// Signature identifying a Z-Secure container
pub const SIGNATURE: &[u8; 4] = b"ZSEC";

/// Algorithm identifier written into container metadata
pub const ALGORITHM_ID: &str = "Z-Secure-v2";

/// AES block size; ciphertext length must be a multiple of this
pub const BLOCK_SIZE: usize = 16;

/// IV length for AES-256-CBC
pub const IV_LEN: usize = 16;

/// Header size: SIGNATURE(4) + METADATA LEN(4)
const HEADER_SIZE: usize = 8;

/// Container metadata, serialized as UTF-8 JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMetadata {
    /// Always true; carried for format compatibility
    #[serde(default = "default_encrypted")]
    pub encrypted: bool,
    /// Algorithm identifier, `Z-Secure-v2`
    pub algorithm: String,
    /// Creation timestamp (RFC 3339)
    pub timestamp: String,
    /// Base64 of the 16-byte IV
    pub iv: String,
}

fn default_encrypted() -> bool {
    true
}

impl ContainerMetadata {
    pub fn new(timestamp: String, iv: &[u8; IV_LEN]) -> Self {
        Self {
            encrypted: true,
            algorithm: ALGORITHM_ID.to_string(),
            timestamp,
            iv: BASE64.encode(iv),
        }
    }

    /// Decode the base64 IV field into raw bytes
    pub fn iv_bytes(&self) -> ZsecureResult<[u8; IV_LEN]> {
        let raw = BASE64
            .decode(&self.iv)
            .map_err(|e| ZsecureError::FormatInvalid(format!("invalid IV encoding: {e}")))?;
        raw.as_slice().try_into().map_err(|_| {
            ZsecureError::FormatInvalid(format!(
                "IV must be {IV_LEN} bytes, got {}",
                raw.len()
            ))
        })
    }
}

/// Decoded Z-Secure container
#[derive(Debug, Clone)]
pub struct Container {
    pub metadata: ContainerMetadata,
    pub ciphertext: Vec<u8>,
}

impl Container {
    /// Serialize to wire bytes
    pub fn encode(&self) -> ZsecureResult<Vec<u8>> {
        let metadata_bytes = serde_json::to_vec(&self.metadata)?;

        let mut out =
            Vec::with_capacity(HEADER_SIZE + metadata_bytes.len() + self.ciphertext.len());
        out.extend_from_slice(SIGNATURE);
        out.extend_from_slice(&(metadata_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&metadata_bytes);
        out.extend_from_slice(&self.ciphertext);

        Ok(out)
    }

    /// Parse wire bytes into a container, validating framing invariants.
    ///
    /// Any structural violation (bad signature, out-of-bounds metadata
    /// length, unparsable JSON, malformed IV, empty or non-block-aligned
    /// ciphertext) fails with `FormatInvalid`.
    pub fn decode(data: &[u8]) -> ZsecureResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ZsecureError::FormatInvalid(
                "container shorter than header".into(),
            ));
        }
        if &data[0..4] != SIGNATURE {
            return Err(ZsecureError::FormatInvalid("bad signature".into()));
        }

        let metadata_len = u32::from_be_bytes(
            data[4..8].try_into().expect("slice length checked"),
        ) as usize;

        let ciphertext_start = HEADER_SIZE
            .checked_add(metadata_len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                ZsecureError::FormatInvalid("metadata length out of bounds".into())
            })?;

        let metadata: ContainerMetadata =
            serde_json::from_slice(&data[HEADER_SIZE..ciphertext_start]).map_err(|e| {
                ZsecureError::FormatInvalid(format!("unparsable metadata: {e}"))
            })?;
        // Surface IV problems at decode time, not decrypt time
        metadata.iv_bytes()?;

        let ciphertext = data[ciphertext_start..].to_vec();
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(ZsecureError::FormatInvalid(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }

        Ok(Self {
            metadata,
            ciphertext,
        })
    }

    /// True iff the buffer starts with the Z-Secure signature.
    ///
    /// Used by upload handlers to route files to encrypt vs decrypt.
    pub fn detect(data: &[u8]) -> bool {
        data.len() >= SIGNATURE.len() && &data[..SIGNATURE.len()] == SIGNATURE
    }

    /// Parse only the metadata block, without validating the ciphertext.
    pub fn peek_metadata(data: &[u8]) -> ZsecureResult<ContainerMetadata> {
        if data.len() < HEADER_SIZE || &data[0..4] != SIGNATURE {
            return Err(ZsecureError::FormatInvalid(
                "not a Z-Secure container".into(),
            ));
        }

        let metadata_len = u32::from_be_bytes(
            data[4..8].try_into().expect("slice length checked"),
        ) as usize;
        let end = HEADER_SIZE
            .checked_add(metadata_len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                ZsecureError::FormatInvalid("metadata length out of bounds".into())
            })?;

        serde_json::from_slice(&data[HEADER_SIZE..end])
            .map_err(|e| ZsecureError::FormatInvalid(format!("unparsable metadata: {e}")))
    }
}
