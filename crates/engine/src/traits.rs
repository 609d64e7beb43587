//! Cipher trait for swappable authenticated encryption backends.

use crate::{error::Result, kdf::KEY_LEN};

/// Nonce length fixed by container format version 1.
pub const NONCE_LEN: usize = 24;

/// Authentication tag length fixed by container format version 1.
pub const TAG_LEN: usize = 16;

pub type Nonce = [u8; NONCE_LEN];
pub type Tag = [u8; TAG_LEN];

/// Trait for authenticated encryption with associated data (AEAD).
///
/// The tag is detached so the container can store it as its own field.
/// Implementations can be swapped without changing the schemes.
pub trait Cipher: Send + Sync {
    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Encrypt `plaintext` under `key` and `nonce`, binding `aad` into the tag.
    fn seal(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &Nonce,
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Tag)>;

    /// Verify `tag` over `ciphertext` and `aad`, then decrypt.
    ///
    /// Must fail with [`DecryptionFailure`](crate::EngineError::DecryptionFailure)
    /// and return no plaintext when verification fails.
    fn open(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &Nonce,
        ciphertext: &[u8],
        tag: &Tag,
        aad: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Generate a fresh random nonce.
pub fn generate_nonce() -> Nonce {
    use rand::RngCore;

    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}
