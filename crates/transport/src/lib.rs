//! Text and file surfaces over the container engine.
//!
//! The text surface carries containers as standard base64 and insists that
//! decrypted text is UTF-8. The file surface moves raw container bytes and
//! names outputs with the `.enc` convention. Both enforce a payload size
//! limit before any cryptographic work, and run the CPU-heavy engine calls
//! off the async runtime.
//!
//! The limit applies to plaintext. Containers on the decrypt and inspect
//! paths may exceed it by [`MAX_CONTAINER_OVERHEAD`], so anything encrypted
//! under a limit also decrypts under it.

pub mod error;
pub mod file;
pub mod keys;
pub mod text;

use std::sync::Arc;

use encfile_engine::{Credential, Engine, MAX_CONTAINER_OVERHEAD, Method};

pub use {
    error::{Result, TransportError},
    file::{decrypted_file_name, encrypted_file_name},
    keys::{KeyFiles, read_pem, write_key_pair},
};

/// Default cap on plaintext size (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Engine plus the limits the surfaces enforce.
///
/// Cheap to clone; clones share one engine.
#[derive(Debug, Clone)]
pub struct Transport {
    engine: Arc<Engine>,
    max_payload_bytes: u64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Engine::default(), DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl Transport {
    pub fn new(engine: Engine, max_payload_bytes: u64) -> Self {
        Self {
            engine: Arc::new(engine),
            max_payload_bytes,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes
    }

    /// Largest container accepted for decryption or inspection.
    pub fn max_container_bytes(&self) -> u64 {
        self.max_payload_bytes
            .saturating_add(MAX_CONTAINER_OVERHEAD as u64)
    }

    /// Reject plaintext over the configured limit.
    pub fn check_size(&self, size: u64) -> Result<()> {
        check_limit(size, self.max_payload_bytes)
    }

    /// Reject containers that could not have been produced under the limit.
    pub fn check_container_size(&self, size: u64) -> Result<()> {
        check_limit(size, self.max_container_bytes())
    }

    /// Run an engine call on the blocking pool.
    pub(crate) async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Engine) -> Result<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| TransportError::Io {
                context: "engine task".into(),
                source: std::io::Error::other(e),
            })?
    }
}

/// Encrypt with the named method, or the one the credential selects.
fn seal(
    engine: &Engine,
    plaintext: &[u8],
    method: Option<Method>,
    credential: &Credential,
) -> Result<Vec<u8>> {
    let container = match method {
        Some(method) => engine.encrypt_with_method(plaintext, method, credential)?,
        None => engine.encrypt(plaintext, credential)?,
    };
    Ok(container)
}

fn check_limit(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        tracing::warn!(size, limit, "payload over limit");
        return Err(TransportError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_is_inclusive() {
        let transport = Transport::new(Engine::default(), 4);
        assert!(transport.check_size(4).is_ok());
        assert!(matches!(
            transport.check_size(5),
            Err(TransportError::PayloadTooLarge { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn containers_get_overhead_headroom() {
        let transport = Transport::new(Engine::default(), 4);
        let limit = 4 + MAX_CONTAINER_OVERHEAD as u64;
        assert_eq!(transport.max_container_bytes(), limit);
        assert!(transport.check_container_size(limit).is_ok());
        assert!(matches!(
            transport.check_container_size(limit + 1),
            Err(TransportError::PayloadTooLarge { limit: l, .. }) if l == limit
        ));
    }

    #[test]
    fn container_limit_saturates() {
        let transport = Transport::new(Engine::default(), u64::MAX);
        assert_eq!(transport.max_container_bytes(), u64::MAX);
    }

    #[tokio::test]
    async fn blocking_calls_see_the_engine() {
        let transport = Transport::default();
        let m_cost = transport
            .run_blocking(|engine| Ok(engine.kdf_params().m_cost))
            .await
            .unwrap();
        assert_eq!(m_cost, 65536);
    }
}
