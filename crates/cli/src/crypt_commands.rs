use std::{convert::Infallible, path::PathBuf};

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    encfile_engine::{Credential, Method},
    encfile_transport::{Transport, read_pem},
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

/// Where the payload comes from. Exactly one is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Inline text: plaintext for `encrypt`, a base64 container otherwise.
    #[arg(long)]
    pub text: Option<String>,
    /// Read the payload from a file (raw bytes).
    #[arg(long, short, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Args)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub source: Source,
    /// Password for symmetric encryption.
    #[arg(long, env = "ENCFILE_PASSWORD", hide_env_values = true, value_parser = parse_secret)]
    pub password: Option<Secret<String>>,
    /// Recipient's public key (PEM file) for hybrid encryption. Takes
    /// precedence over a password.
    #[arg(long, value_name = "FILE")]
    pub public_key: Option<PathBuf>,
    /// Require a specific method: `aes`/`symmetric` or `hybrid`/`rsa`.
    #[arg(long)]
    pub method: Option<Method>,
    /// Output file. Text defaults to stdout, files to `<input>.enc`.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DecryptArgs {
    #[command(flatten)]
    pub source: Source,
    /// Password for symmetric containers.
    #[arg(long, env = "ENCFILE_PASSWORD", hide_env_values = true, value_parser = parse_secret)]
    pub password: Option<Secret<String>>,
    /// Private key (PEM file) for hybrid containers. Takes precedence over a
    /// password.
    #[arg(long, value_name = "FILE")]
    pub private_key: Option<PathBuf>,
    /// Output file. Text defaults to stdout, files to the input without `.enc`.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_secret(s: &str) -> std::result::Result<Secret<String>, Infallible> {
    Ok(Secret::new(s.to_owned()))
}

pub async fn encrypt(transport: &Transport, args: EncryptArgs) -> Result<()> {
    let credential = match &args.public_key {
        Some(path) => Credential::public_key_pem(
            read_pem(path)
                .await
                .with_context(|| format!("reading public key {}", path.display()))?,
        ),
        None => password_credential(args.password.as_ref())?,
    };
    debug!(credential = credential.kind(), method = ?args.method, "encrypting");

    match (args.source.text, args.source.input) {
        (Some(text), _) => {
            let encoded = transport
                .encrypt_text_with_method(&text, args.method, &credential)
                .await?;
            emit(&encoded, args.output).await
        },
        (None, Some(input)) => {
            let output = transport
                .encrypt_file_with_method(
                    &input,
                    args.output.as_deref(),
                    args.method,
                    &credential,
                )
                .await?;
            eprintln!("Encrypted {} -> {}", input.display(), output.display());
            Ok(())
        },
        (None, None) => bail!("provide --text or --input"),
    }
}

pub async fn decrypt(transport: &Transport, args: DecryptArgs) -> Result<()> {
    let credential = match &args.private_key {
        Some(path) => Credential::private_key_pem(
            read_pem(path)
                .await
                .with_context(|| format!("reading private key {}", path.display()))?,
        ),
        None => password_credential(args.password.as_ref())?,
    };
    debug!(credential = credential.kind(), "decrypting");

    match (args.source.text, args.source.input) {
        (Some(encoded), _) => {
            let plaintext = transport.decrypt_text(&encoded, &credential).await?;
            emit(&plaintext, args.output).await
        },
        (None, Some(input)) => {
            let output = transport
                .decrypt_file(&input, args.output.as_deref(), &credential)
                .await?;
            eprintln!("Decrypted {} -> {}", input.display(), output.display());
            Ok(())
        },
        (None, None) => bail!("provide --text or --input"),
    }
}

pub async fn inspect(transport: &Transport, source: Source) -> Result<()> {
    let info = match (source.text, source.input) {
        (Some(encoded), _) => transport.inspect_text(&encoded)?,
        (None, Some(input)) => transport.inspect_file(&input).await?,
        (None, None) => bail!("provide --text or --input"),
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn password_credential(password: Option<&Secret<String>>) -> Result<Credential> {
    match password {
        Some(secret) => Ok(Credential::password(secret.expose_secret().as_str())),
        None => bail!("no credential: pass --password (or set ENCFILE_PASSWORD) or a key file"),
    }
}

/// Write `text` to `output` byte for byte, or print it as a line on stdout.
async fn emit(text: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        },
    }
}
