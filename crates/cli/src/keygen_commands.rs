use std::path::PathBuf;

use {
    anyhow::{Context, Result},
    encfile_engine::generate_key_pair,
    encfile_transport::write_key_pair,
    tracing::info,
};

/// Generate an RSA key pair and either write it to `out_dir` or print it.
pub async fn keygen(bits: usize, out_dir: Option<PathBuf>) -> Result<()> {
    info!(bits, "generating RSA key pair");
    let pair = tokio::task::spawn_blocking(move || generate_key_pair(bits))
        .await
        .context("key generation task failed")??;

    match out_dir {
        Some(dir) => {
            let files = write_key_pair(&dir, &pair).await?;
            eprintln!("Public key:  {}", files.public.display());
            eprintln!(
                "Private key: {} (keep this file secret)",
                files.private.display()
            );
        },
        None => {
            print!("{}", pair.public_pem);
            print!("{}", pair.private_pem.as_str());
            eprintln!("warning: the private key above is unencrypted; store it safely");
        },
    }
    Ok(())
}
