//! Base64 text surface.

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    encfile_engine::{ContainerInfo, Credential, Method},
    tracing::debug,
    zeroize::Zeroizing,
};

use crate::{
    Transport,
    error::{Result, TransportError},
    seal,
};

impl Transport {
    /// Encrypt text with the scheme the credential selects; returns base64.
    pub async fn encrypt_text(&self, plaintext: &str, credential: &Credential) -> Result<String> {
        self.encrypt_text_with_method(plaintext, None, credential).await
    }

    /// Like [`Transport::encrypt_text`], optionally pinning the method the
    /// credential must match.
    pub async fn encrypt_text_with_method(
        &self,
        plaintext: &str,
        method: Option<Method>,
        credential: &Credential,
    ) -> Result<String> {
        self.check_size(plaintext.len() as u64)?;
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let credential = credential.clone();
        let container = self
            .run_blocking(move |engine| seal(engine, plaintext.as_bytes(), method, &credential))
            .await?;
        debug!(container_len = container.len(), "encrypted text");
        Ok(STANDARD.encode(container))
    }

    /// Decrypt a base64 container back to text.
    pub async fn decrypt_text(&self, encoded: &str, credential: &Credential) -> Result<String> {
        let container = self.decode_container(encoded)?;
        let credential = credential.clone();
        let plaintext = self
            .run_blocking(move |engine| Ok(engine.decrypt_auto(&container, &credential)?))
            .await?;

        String::from_utf8(plaintext).map_err(|e| {
            drop(Zeroizing::new(e.into_bytes()));
            TransportError::InvalidUtf8
        })
    }

    /// Summarize a base64 container without decrypting it.
    pub fn inspect_text(&self, encoded: &str) -> Result<ContainerInfo> {
        let container = self.decode_container(encoded)?;
        Ok(self.engine().inspect(&container)?)
    }

    fn decode_container(&self, encoded: &str) -> Result<Vec<u8>> {
        let encoded = encoded.trim();
        self.check_container_size(padded_decoded_len(encoded))?;
        let container = STANDARD.decode(encoded)?;
        self.check_container_size(container.len() as u64)?;
        Ok(container)
    }
}

/// Decoded length of padded base64, exact for well-formed input.
fn padded_decoded_len(encoded: &str) -> u64 {
    let padding = encoded.bytes().rev().take_while(|&b| b == b'=').count();
    (encoded.len() / 4 * 3).saturating_sub(padding) as u64
}
