//! XChaCha20-Poly1305 implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    Tag as PolyTag, XChaCha20Poly1305, XNonce,
    aead::{AeadInPlace, KeyInit},
};

use crate::{
    error::{EngineError, Result},
    kdf::KEY_LEN,
    traits::{Cipher, Nonce, TAG_LEN, Tag},
};

/// XChaCha20-Poly1305 AEAD cipher with a detached 16-byte Poly1305 tag.
///
/// The 24-byte nonce makes random nonces safe for any realistic number of
/// messages under one key.
#[derive(Debug, Clone, Copy, Default)]
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn name(&self) -> &'static str {
        "xchacha20-poly1305"
    }

    #[allow(deprecated)]
    fn seal(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &Nonce,
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Tag)> {
        let cipher = XChaCha20Poly1305::new(key.into());

        let mut buffer = plaintext.to_vec();
        let poly_tag = cipher
            .encrypt_in_place_detached(XNonce::from_slice(nonce), aad, &mut buffer)
            .map_err(|e| EngineError::EncryptionFailure(e.to_string()))?;

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(poly_tag.as_slice());
        Ok((buffer, tag))
    }

    #[allow(deprecated)]
    fn open(
        &self,
        key: &[u8; KEY_LEN],
        nonce: &Nonce,
        ciphertext: &[u8],
        tag: &Tag,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());

        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                XNonce::from_slice(nonce),
                aad,
                &mut buffer,
                PolyTag::from_slice(tag),
            )
            .map_err(|_| EngineError::DecryptionFailure)?;
        Ok(buffer)
    }
}
