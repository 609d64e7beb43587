//! RSA-hybrid scheme: a random session key seals the payload and is itself
//! wrapped with RSA-OAEP (SHA-256) under the recipient's public key.

use {
    rand::RngCore,
    rsa::{Oaep, RsaPrivateKey, RsaPublicKey},
    sha2::Sha256,
    zeroize::Zeroizing,
};

use crate::{
    container::{Container, MethodParams},
    error::{EngineError, Result},
    kdf::KEY_LEN,
    traits::{Cipher, TAG_LEN, generate_nonce},
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Hybrid (RSA-OAEP + AEAD) encryption.
#[derive(Debug, Clone, Default)]
pub struct HybridScheme<C: Cipher = XChaCha20Poly1305Cipher> {
    cipher: C,
}

impl HybridScheme<XChaCha20Poly1305Cipher> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Cipher> HybridScheme<C> {
    pub fn encrypt(&self, plaintext: &[u8], public_key: &RsaPublicKey) -> Result<Container> {
        let mut session_key = Zeroizing::new([0u8; KEY_LEN]);
        rand::rng().fill_bytes(session_key.as_mut());

        let wrapped_key = public_key
            .encrypt(
                &mut rsa::rand_core::OsRng,
                Oaep::new::<Sha256>(),
                &session_key[..],
            )
            .map_err(|e| EngineError::EncryptionFailure(format!("session key wrap: {e}")))?;

        let mut container = Container {
            params: MethodParams::Hybrid { wrapped_key },
            nonce: generate_nonce(),
            ciphertext: Vec::new(),
            tag: [0u8; TAG_LEN],
        };
        let aad = container.header_bytes()?;
        let (ciphertext, tag) = self
            .cipher
            .seal(&session_key, &container.nonce, plaintext, &aad)?;
        container.ciphertext = ciphertext;
        container.tag = tag;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cipher = self.cipher.name(),
            plaintext_len = plaintext.len(),
            key_bits = rsa::traits::PublicKeyParts::size(public_key) * 8,
            "sealed hybrid container"
        );

        Ok(container)
    }

    /// Decrypt a hybrid container.
    ///
    /// Unwrap failures (wrong private key, corrupted wrapped key) are
    /// [`EngineError::KeyDecryptionFailure`]; payload authentication failures
    /// are [`EngineError::DecryptionFailure`].
    pub fn decrypt(&self, container: &Container, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
        let MethodParams::Hybrid { wrapped_key } = &container.params else {
            return Err(EngineError::CredentialTypeMismatch {
                expected: "password",
                actual: "private key",
            });
        };

        let session_key = unwrap_session_key(private_key, wrapped_key)?;
        let aad = container.header_bytes()?;
        let plaintext = self.cipher.open(
            &session_key,
            &container.nonce,
            &container.ciphertext,
            &container.tag,
            &aad,
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(plaintext_len = plaintext.len(), "opened hybrid container");

        Ok(plaintext)
    }
}

fn unwrap_session_key(
    private_key: &RsaPrivateKey,
    wrapped_key: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let raw = Zeroizing::new(
        private_key
            .decrypt_blinded(&mut rsa::rand_core::OsRng, Oaep::new::<Sha256>(), wrapped_key)
            .map_err(|_| EngineError::KeyDecryptionFailure)?,
    );
    if raw.len() != KEY_LEN {
        return Err(EngineError::KeyDecryptionFailure);
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&raw);
    Ok(key)
}
