/// Config schema types (kdf, keys, limits, logging).
use std::path::PathBuf;

use {
    encfile_engine::{KdfParams, keypair::DEFAULT_KEY_BITS},
    encfile_transport::DEFAULT_MAX_PAYLOAD_BYTES,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncfileConfig {
    pub kdf: KdfConfig,
    pub keys: KeysConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

/// Argon2id cost parameters for new password containers.
///
/// Existing containers always decrypt with the parameters stored in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Memory cost in KiB.
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        KdfParams::default().into()
    }
}

impl From<KdfParams> for KdfConfig {
    fn from(p: KdfParams) -> Self {
        Self {
            m_cost: p.m_cost,
            t_cost: p.t_cost,
            p_cost: p.p_cost,
        }
    }
}

impl From<KdfConfig> for KdfParams {
    fn from(c: KdfConfig) -> Self {
        Self {
            m_cost: c.m_cost,
            t_cost: c.t_cost,
            p_cost: c.p_cost,
        }
    }
}

/// RSA key generation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Modulus size for `keygen` when `--bits` is not given.
    pub bits: usize,
    /// Directory `keygen` writes PEM files into when `--out-dir` is not given.
    /// Unset means print to stdout.
    pub out_dir: Option<PathBuf>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            out_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest payload accepted by the text and file surfaces.
    pub max_payload_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` and `--log-level` take precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg: EncfileConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, EncfileConfig::default());
        assert_eq!(cfg.kdf.m_cost, 65536);
        assert_eq!(cfg.keys.bits, 2048);
        assert_eq!(cfg.limits.max_payload_bytes, 64 * 1024 * 1024);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg: EncfileConfig = toml::from_str("[kdf]\nt_cost = 4\n").unwrap();
        assert_eq!(cfg.kdf.t_cost, 4);
        assert_eq!(cfg.kdf.m_cost, 65536);
        assert_eq!(cfg.kdf.p_cost, 1);
    }

    #[test]
    fn kdf_config_converts_to_engine_params() {
        let params: KdfParams = KdfConfig {
            m_cost: 256,
            t_cost: 1,
            p_cost: 1,
        }
        .into();
        assert_eq!(params.m_cost, 256);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = EncfileConfig::default();
        cfg.keys.out_dir = Some(PathBuf::from("/tmp/keys"));
        cfg.logging.json = true;
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(toml::from_str::<EncfileConfig>(&text).unwrap(), cfg);
    }
}
