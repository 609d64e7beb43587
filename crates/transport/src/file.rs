//! Raw-bytes file surface and the `.enc` naming convention.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use {
    encfile_engine::{ContainerInfo, Credential, Method},
    tracing::{debug, info},
    zeroize::Zeroizing,
};

use crate::{
    Transport,
    check_limit,
    error::{Result, io_context},
    seal,
};

const ENCRYPTED_SUFFIX: &str = ".enc";
const DECRYPTED_SUFFIX: &str = ".dec";

/// Output name for an encrypted file: `report.pdf` → `report.pdf.enc`.
pub fn encrypted_file_name(input: &Path) -> PathBuf {
    with_file_name(input, |name| {
        let mut name = name.to_os_string();
        name.push(ENCRYPTED_SUFFIX);
        name
    })
}

/// Output name for a decrypted file.
///
/// A trailing `.enc` is stripped (`report.pdf.enc` → `report.pdf`); anything
/// else gets `.dec` appended so the input is never overwritten.
pub fn decrypted_file_name(input: &Path) -> PathBuf {
    with_file_name(input, |name| {
        let stripped = name
            .to_str()
            .and_then(|s| s.strip_suffix(ENCRYPTED_SUFFIX))
            .filter(|s| !s.is_empty());
        match stripped {
            Some(stem) => OsString::from(stem),
            None => {
                let mut name = name.to_os_string();
                name.push(DECRYPTED_SUFFIX);
                name
            },
        }
    })
}

fn with_file_name(input: &Path, rename: impl FnOnce(&OsStr) -> OsString) -> PathBuf {
    let name = input.file_name().unwrap_or(input.as_os_str());
    input.with_file_name(rename(name))
}

impl Transport {
    /// Encrypt `input` into `output` (default: `<input>.enc`).
    pub async fn encrypt_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        credential: &Credential,
    ) -> Result<PathBuf> {
        self.encrypt_file_with_method(input, output, None, credential).await
    }

    /// Like [`Transport::encrypt_file`], optionally pinning the method the
    /// credential must match.
    pub async fn encrypt_file_with_method(
        &self,
        input: &Path,
        output: Option<&Path>,
        method: Option<Method>,
        credential: &Credential,
    ) -> Result<PathBuf> {
        let plaintext = Zeroizing::new(read_limited(input, self.max_payload_bytes()).await?);
        let credential = credential.clone();
        let container = self
            .run_blocking(move |engine| seal(engine, &plaintext, method, &credential))
            .await?;

        let output = output.map_or_else(|| encrypted_file_name(input), Path::to_path_buf);
        tokio::fs::write(&output, &container)
            .await
            .map_err(io_context(format!("write {}", output.display())))?;

        info!(input = %input.display(), output = %output.display(), bytes = container.len(), "encrypted file");
        Ok(output)
    }

    /// Decrypt `input` into `output` (default: `input` without `.enc`).
    pub async fn decrypt_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        credential: &Credential,
    ) -> Result<PathBuf> {
        let container = read_limited(input, self.max_container_bytes()).await?;
        let credential = credential.clone();
        let plaintext = self
            .run_blocking(move |engine| {
                Ok(Zeroizing::new(engine.decrypt_auto(&container, &credential)?))
            })
            .await?;

        let output = output.map_or_else(|| decrypted_file_name(input), Path::to_path_buf);
        tokio::fs::write(&output, plaintext.as_slice())
            .await
            .map_err(io_context(format!("write {}", output.display())))?;

        info!(input = %input.display(), output = %output.display(), bytes = plaintext.len(), "decrypted file");
        Ok(output)
    }

    /// Summarize a container file without decrypting it.
    pub async fn inspect_file(&self, input: &Path) -> Result<ContainerInfo> {
        let container = read_limited(input, self.max_container_bytes()).await?;
        Ok(self.engine().inspect(&container)?)
    }
}

/// Read a whole file after checking its size against `limit`.
async fn read_limited(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(io_context(format!("stat {}", path.display())))?;
    check_limit(metadata.len(), limit)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(io_context(format!("read {}", path.display())))?;
    // The file may have grown between stat and read.
    check_limit(bytes.len() as u64, limit)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read input");
    Ok(bytes)
}
