//! Password-based scheme: Argon2id-derived key sealing the payload.

use crate::{
    container::{Container, MethodParams},
    error::{EngineError, Result},
    kdf::{self, KdfParams},
    traits::{Cipher, generate_nonce},
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Password-based encryption.
///
/// Each call draws a fresh salt and nonce. The KDF cost parameters used for
/// encryption are written into the container, so decryption always uses the
/// parameters the container was made with.
#[derive(Debug, Clone)]
pub struct SymmetricScheme<C: Cipher = XChaCha20Poly1305Cipher> {
    cipher: C,
    kdf: KdfParams,
}

impl SymmetricScheme<XChaCha20Poly1305Cipher> {
    /// Create a scheme with the default cipher.
    pub fn new(kdf: KdfParams) -> Result<Self> {
        Self::with_cipher(XChaCha20Poly1305Cipher, kdf)
    }
}

impl Default for SymmetricScheme<XChaCha20Poly1305Cipher> {
    fn default() -> Self {
        Self {
            cipher: XChaCha20Poly1305Cipher,
            kdf: KdfParams::default(),
        }
    }
}

impl<C: Cipher> SymmetricScheme<C> {
    /// Create a scheme with a custom cipher.
    pub fn with_cipher(cipher: C, kdf: KdfParams) -> Result<Self> {
        kdf.validate()?;
        Ok(Self { cipher, kdf })
    }

    /// KDF parameters written into new containers.
    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf
    }

    pub fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<Container> {
        let salt = kdf::generate_salt();
        let key = kdf::derive_key(password.as_bytes(), &salt, &self.kdf)?;

        let mut container = Container {
            params: MethodParams::Symmetric {
                salt,
                kdf: self.kdf,
            },
            nonce: generate_nonce(),
            ciphertext: Vec::new(),
            tag: [0u8; crate::traits::TAG_LEN],
        };
        let aad = container.header_bytes()?;
        let (ciphertext, tag) = self
            .cipher
            .seal(&key, &container.nonce, plaintext, &aad)?;
        container.ciphertext = ciphertext;
        container.tag = tag;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cipher = self.cipher.name(),
            plaintext_len = plaintext.len(),
            m_cost = self.kdf.m_cost,
            t_cost = self.kdf.t_cost,
            "sealed symmetric container"
        );

        Ok(container)
    }

    /// Decrypt a symmetric container.
    ///
    /// A wrong password and tampered bytes both surface as
    /// [`EngineError::DecryptionFailure`].
    pub fn decrypt(&self, container: &Container, password: &str) -> Result<Vec<u8>> {
        let MethodParams::Symmetric { salt, kdf } = &container.params else {
            return Err(EngineError::CredentialTypeMismatch {
                expected: "private key",
                actual: "password",
            });
        };

        let key = kdf::derive_key(password.as_bytes(), salt, kdf)?;
        let aad = container.header_bytes()?;
        let plaintext = self.cipher.open(
            &key,
            &container.nonce,
            &container.ciphertext,
            &container.tag,
            &aad,
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(plaintext_len = plaintext.len(), "opened symmetric container");

        Ok(plaintext)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::container::Method, rstest::rstest};

    fn scheme() -> SymmetricScheme {
        SymmetricScheme::new(KdfParams {
            m_cost: 256, // Low cost for tests
            t_cost: 1,
            p_cost: 1,
        })
        .unwrap()
    }

    #[rstest]
    #[case::text(b"hello world".as_slice())]
    #[case::empty(b"".as_slice())]
    #[case::binary(&[0u8, 1, 2, 255, 254])]
    #[case::large(&[0x5A; 70_000])]
    fn round_trip(#[case] plaintext: &[u8]) {
        let scheme = scheme();
        let container = scheme.encrypt(plaintext, "pw123").unwrap();
        assert_eq!(container.method(), Method::Symmetric);
        assert_eq!(scheme.decrypt(&container, "pw123").unwrap(), plaintext);
    }

    #[test]
    fn wrong_password_fails_closed() {
        let scheme = scheme();
        let container = scheme.encrypt(b"hello world", "pw123").unwrap();
        assert!(matches!(
            scheme.decrypt(&container, "wrongpw"),
            Err(EngineError::DecryptionFailure)
        ));
    }

    #[test]
    fn unicode_password_round_trip() {
        let scheme = scheme();
        let container = scheme.encrypt(b"data", "mật khẩu 🔑").unwrap();
        assert_eq!(scheme.decrypt(&container, "mật khẩu 🔑").unwrap(), b"data");
    }

    #[test]
    fn fresh_salt_and_nonce_per_call() {
        let scheme = scheme();
        let a = scheme.encrypt(b"same", "pw").unwrap();
        let b = scheme.encrypt(b"same", "pw").unwrap();

        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.params, b.params);
        assert_ne!(a.encode().unwrap(), b.encode().unwrap());
        assert_eq!(scheme.decrypt(&a, "pw").unwrap(), b"same");
        assert_eq!(scheme.decrypt(&b, "pw").unwrap(), b"same");
    }

    #[test]
    fn tampered_salt_fails() {
        let scheme = scheme();
        let mut container = scheme.encrypt(b"payload", "pw").unwrap();
        if let MethodParams::Symmetric { salt, .. } = &mut container.params {
            salt[0] ^= 0x01;
        }
        assert!(matches!(
            scheme.decrypt(&container, "pw"),
            Err(EngineError::DecryptionFailure)
        ));
    }

    #[test]
    fn container_params_take_precedence_over_scheme_params() {
        let writer = scheme();
        let reader = SymmetricScheme::new(KdfParams {
            m_cost: 512,
            t_cost: 2,
            p_cost: 1,
        })
        .unwrap();

        let container = writer.encrypt(b"portable", "pw").unwrap();
        assert_eq!(reader.decrypt(&container, "pw").unwrap(), b"portable");
    }

    #[test]
    fn hybrid_container_rejected() {
        let container = Container {
            params: MethodParams::Hybrid {
                wrapped_key: vec![1; 256],
            },
            nonce: [0; crate::traits::NONCE_LEN],
            ciphertext: Vec::new(),
            tag: [0; crate::traits::TAG_LEN],
        };
        assert!(matches!(
            scheme().decrypt(&container, "pw"),
            Err(EngineError::CredentialTypeMismatch { .. })
        ));
    }

    #[test]
    fn invalid_params_rejected_up_front() {
        let err = SymmetricScheme::new(KdfParams {
            m_cost: 1,
            t_cost: 1,
            p_cost: 1,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidKdfParams(_)));
    }
}
