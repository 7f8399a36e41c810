//! Z-Secure Vault - Image Cipher
//!
//! AES-256-CBC encryption of image bytes through the Z-Secure container
//! codec. PKCS#7 padding; a fresh random 16-byte IV per encryption, carried
//! in the container metadata.
//!
//! Failure modes are distinct on purpose: bad framing fails with
//! `FormatInvalid`, while a wrong key surfaces as `PaddingInvalid` after
//! block decryption.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::Utc;
use rand::RngCore;

use crate::container::{Container, ContainerMetadata, IV_LEN};
use crate::crypto::keys::SymmetricKey;
use crate::error::{ZsecureError, ZsecureResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC image cipher over the Z-Secure container format
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCipher;

impl ImageCipher {
    pub fn new() -> Self {
        Self
    }

    /// Encrypt a plaintext buffer into container bytes.
    ///
    /// Empty plaintext is allowed; PKCS#7 pads it to one full block.
    pub fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey) -> ZsecureResult<Vec<u8>> {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let container = self.encrypt_with_iv(plaintext, key, iv)?;
        container.encode()
    }

    /// Decrypt container bytes back into the original plaintext.
    pub fn decrypt(&self, data: &[u8], key: &SymmetricKey) -> ZsecureResult<Vec<u8>> {
        let container = Container::decode(data)?;
        self.decrypt_container(&container, key)
    }

    /// Decrypt an already-decoded container.
    pub fn decrypt_container(
        &self,
        container: &Container,
        key: &SymmetricKey,
    ) -> ZsecureResult<Vec<u8>> {
        let iv = container.metadata.iv_bytes()?;

        Aes256CbcDec::new(key.expose().into(), (&iv).into())
            .decrypt_padded_vec_mut::<Pkcs7>(&container.ciphertext)
            .map_err(|_| ZsecureError::PaddingInvalid)
    }

    /// Deterministic encryption core; IV injection keeps tests exact.
    pub(crate) fn encrypt_with_iv(
        &self,
        plaintext: &[u8],
        key: &SymmetricKey,
        iv: [u8; IV_LEN],
    ) -> ZsecureResult<Container> {
        let ciphertext = Aes256CbcEnc::new(key.expose().into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        Ok(Container {
            metadata: ContainerMetadata::new(Utc::now().to_rfc3339(), &iv),
            ciphertext,
        })
    }
}
