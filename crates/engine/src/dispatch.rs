//! Routes decryption to the scheme named by a container's method tag.

use crate::{
    container::{Container, Method, method_of},
    credential::{Credential, decrypt_credential_for},
    error::{EngineError, Result},
    hybrid::HybridScheme,
    keypair::parse_private_key_pem,
    symmetric::SymmetricScheme,
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};

/// Method-tag dispatcher over the two schemes.
#[derive(Debug, Clone)]
pub struct Dispatcher<C: Cipher = XChaCha20Poly1305Cipher> {
    symmetric: SymmetricScheme<C>,
    hybrid: HybridScheme<C>,
}

impl Default for Dispatcher<XChaCha20Poly1305Cipher> {
    fn default() -> Self {
        Self::from_schemes(SymmetricScheme::default(), HybridScheme::new())
    }
}

impl<C: Cipher> Dispatcher<C> {
    pub fn from_schemes(symmetric: SymmetricScheme<C>, hybrid: HybridScheme<C>) -> Self {
        Self { symmetric, hybrid }
    }

    pub fn symmetric(&self) -> &SymmetricScheme<C> {
        &self.symmetric
    }

    pub fn hybrid(&self) -> &HybridScheme<C> {
        &self.hybrid
    }

    /// Decode `raw` and decrypt it with whichever scheme its tag names.
    ///
    /// A credential that cannot open the tagged method is rejected before
    /// the rest of the container is parsed.
    pub fn decrypt_auto(&self, raw: &[u8], credential: &Credential) -> Result<Vec<u8>> {
        check_credential(method_of(raw)?, credential)?;
        let container = Container::decode(raw)?;
        self.decrypt_container(&container, credential)
    }

    /// Decrypt an already-decoded container.
    ///
    /// The credential variant is checked against the method before any KDF
    /// or RSA work, and private-key PEM is parsed only after that check.
    pub fn decrypt_container(
        &self,
        container: &Container,
        credential: &Credential,
    ) -> Result<Vec<u8>> {
        let method = container.method();

        #[cfg(feature = "tracing")]
        tracing::debug!(%method, credential = credential.kind(), "dispatching decrypt");

        match (method, credential) {
            (Method::Symmetric, Credential::Password(password)) => {
                self.symmetric.decrypt(container, password)
            },
            (Method::Hybrid, Credential::PrivateKeyPem(pem)) => {
                let private_key = parse_private_key_pem(pem)?;
                self.hybrid.decrypt(container, &private_key)
            },
            (method, other) => Err(mismatch(method, other)),
        }
    }
}

fn check_credential(method: Method, credential: &Credential) -> Result<()> {
    match (method, credential) {
        (Method::Symmetric, Credential::Password(_))
        | (Method::Hybrid, Credential::PrivateKeyPem(_)) => Ok(()),
        (method, other) => Err(mismatch(method, other)),
    }
}

fn mismatch(method: Method, credential: &Credential) -> EngineError {
    EngineError::CredentialTypeMismatch {
        expected: decrypt_credential_for(method),
        actual: credential.kind(),
    }
}
