//! Self-describing encryption containers.
//!
//! Two schemes produce the same container layout:
//!
//! - **symmetric**: a password is stretched with Argon2id and seals the
//!   payload with XChaCha20-Poly1305.
//! - **hybrid**: a random session key seals the payload and is wrapped with
//!   RSA-OAEP (SHA-256) under the recipient's public key.
//!
//! The first byte of every container names its scheme, so [`Engine::decrypt_auto`]
//! needs nothing but the bytes and a credential. The whole header is bound
//! into the AEAD tag; any modification fails authentication. Trait-based
//! [`Cipher`] design allows swapping the AEAD backend.

pub mod container;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod hybrid;
pub mod kdf;
pub mod keypair;
pub mod ops;
pub mod symmetric;
pub mod traits;
pub mod xchacha20;

#[cfg(test)]
mod test_keys;

pub use {
    container::{
        Container, ContainerInfo, MAX_CONTAINER_OVERHEAD, Method, MethodParams, ParseMethodError,
        method_of,
    },
    credential::Credential,
    dispatch::Dispatcher,
    error::EngineError,
    hybrid::HybridScheme,
    kdf::KdfParams,
    keypair::{KeyPair, PemKeyPair},
    ops::{Engine, generate_key_pair},
    symmetric::SymmetricScheme,
    traits::Cipher,
    xchacha20::XChaCha20Poly1305Cipher,
};
