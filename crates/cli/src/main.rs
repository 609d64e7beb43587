mod config_commands;
mod crypt_commands;
mod keygen_commands;

use std::path::PathBuf;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    encfile_config::{EncfileConfig, LoggingConfig},
    encfile_engine::Engine,
    encfile_transport::Transport,
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "encfile",
    version,
    about = "encfile: password and RSA-hybrid encryption for text and files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level or filter directive. Defaults to the config value.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the discovered one.
    #[arg(long, global = true, env = "ENCFILE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text or a file with a password or a public key.
    Encrypt(crypt_commands::EncryptArgs),
    /// Decrypt text or a file; the scheme is read from the container.
    Decrypt(crypt_commands::DecryptArgs),
    /// Generate an RSA key pair.
    Keygen {
        /// Modulus size in bits (default from config, normally 2048).
        #[arg(long)]
        bits: Option<usize>,
        /// Write `public_key.pem` and `private_key.pem` here instead of
        /// printing them.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Show a container's method and sizes without decrypting it.
    Inspect {
        #[command(flatten)]
        source: crypt_commands::Source,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Initialise tracing on stderr so stdout carries only payloads.
fn init_telemetry(cli: &Cli, logging: &LoggingConfig) {
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs || logging.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EncfileConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = encfile_config::load_config(path)?;
            encfile_config::apply_env_overrides(&mut config);
            Ok(config)
        },
        None => encfile_config::try_discover_and_load(),
    }
}

fn build_transport(config: &EncfileConfig) -> anyhow::Result<Transport> {
    let engine = Engine::new(config.kdf.into()).context("invalid [kdf] settings")?;
    Ok(Transport::new(engine, config.limits.max_payload_bytes))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // A broken config file is fatal, except for `config`, which must still
    // be able to check it. Logging is not up yet, so report on stderr.
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Config { .. }) => {
            eprintln!("warning: {e:#}; continuing with defaults");
            EncfileConfig::default()
        },
        Err(e) => return Err(e),
    };
    init_telemetry(&cli, &config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "encfile starting");
    debug!(?config, "effective config");

    match cli.command {
        Commands::Encrypt(args) => crypt_commands::encrypt(&build_transport(&config)?, args).await,
        Commands::Decrypt(args) => crypt_commands::decrypt(&build_transport(&config)?, args).await,
        Commands::Inspect { source } => {
            crypt_commands::inspect(&build_transport(&config)?, source).await
        },
        Commands::Keygen { bits, out_dir } => {
            let bits = bits.unwrap_or(config.keys.bits);
            let out_dir = out_dir.or_else(|| config.keys.out_dir.clone());
            keygen_commands::keygen(bits, out_dir).await
        },
        Commands::Config { action } => {
            config_commands::handle_config(action, cli.config.as_deref(), &config)
        },
    }
}
