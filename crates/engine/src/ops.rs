//! Byte-level entry points: plaintext and credentials in, container bytes out.

use crate::{
    container::{Container, ContainerInfo, Method},
    credential::Credential,
    dispatch::Dispatcher,
    error::{EngineError, Result},
    hybrid::HybridScheme,
    kdf::KdfParams,
    keypair::{self, PemKeyPair, parse_public_key_pem},
    symmetric::SymmetricScheme,
};

/// The container engine.
///
/// Stateless apart from the KDF parameters used for new symmetric
/// containers; safe to share across threads and call concurrently.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    dispatcher: Dispatcher,
}

impl Engine {
    /// Create an engine that writes symmetric containers with `kdf`.
    pub fn new(kdf: KdfParams) -> Result<Self> {
        let symmetric = SymmetricScheme::new(kdf)?;
        Ok(Self {
            dispatcher: Dispatcher::from_schemes(symmetric, HybridScheme::new()),
        })
    }

    pub fn kdf_params(&self) -> &KdfParams {
        self.dispatcher.symmetric().kdf_params()
    }

    /// Encrypt under a password.
    pub fn encrypt_symmetric(&self, plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
        self.dispatcher
            .symmetric()
            .encrypt(plaintext, password)?
            .encode()
    }

    /// Encrypt for the holder of the private half of `public_key_pem`.
    pub fn encrypt_hybrid(&self, plaintext: &[u8], public_key_pem: &str) -> Result<Vec<u8>> {
        let public_key = parse_public_key_pem(public_key_pem)?;
        self.dispatcher
            .hybrid()
            .encrypt(plaintext, &public_key)?
            .encode()
    }

    /// Encrypt with whichever scheme the credential selects.
    pub fn encrypt(&self, plaintext: &[u8], credential: &Credential) -> Result<Vec<u8>> {
        match credential {
            Credential::Password(password) => self.encrypt_symmetric(plaintext, password),
            Credential::PublicKeyPem(pem) => self.encrypt_hybrid(plaintext, pem),
            Credential::PrivateKeyPem(_) => Err(EngineError::CredentialTypeMismatch {
                expected: "password or public key",
                actual: credential.kind(),
            }),
        }
    }

    /// Encrypt with an explicitly named method.
    ///
    /// The credential must be the kind that method encrypts with.
    pub fn encrypt_with_method(
        &self,
        plaintext: &[u8],
        method: Method,
        credential: &Credential,
    ) -> Result<Vec<u8>> {
        if credential.encrypt_method() != Some(method) {
            return Err(EngineError::CredentialTypeMismatch {
                expected: match method {
                    Method::Symmetric => "password",
                    Method::Hybrid => "public key",
                },
                actual: credential.kind(),
            });
        }
        self.encrypt(plaintext, credential)
    }

    /// Decrypt any container, choosing the scheme from its method tag.
    pub fn decrypt_auto(&self, raw: &[u8], credential: &Credential) -> Result<Vec<u8>> {
        self.dispatcher.decrypt_auto(raw, credential)
    }

    /// Decode a container and summarize its non-secret fields.
    pub fn inspect(&self, raw: &[u8]) -> Result<ContainerInfo> {
        Container::decode(raw).map(|container| container.info())
    }
}

/// Generate an RSA key pair and return both halves as PEM text.
pub fn generate_key_pair(bits: usize) -> Result<PemKeyPair> {
    keypair::generate(bits)?.to_pem()
}
