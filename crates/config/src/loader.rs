use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::EncfileConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "encfile.toml",
    "encfile.yaml",
    "encfile.yml",
    "encfile.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<EncfileConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply
/// `ENCFILE_*` environment overrides.
///
/// Search order:
/// 1. `./encfile.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/encfile/encfile.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `EncfileConfig::default()` if no file is found or the file
/// fails to load.
pub fn discover_and_load() -> EncfileConfig {
    try_discover_and_load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        let mut config = EncfileConfig::default();
        apply_env_overrides(&mut config);
        config
    })
}

/// Like [`discover_and_load`], but a discovered file that fails to load is
/// an error instead of a silent fallback. No file at all still yields the
/// defaults.
pub fn try_discover_and_load() -> anyhow::Result<EncfileConfig> {
    load_discovered(find_config_file().as_deref())
}

fn load_discovered(found: Option<&Path>) -> anyhow::Result<EncfileConfig> {
    let mut config = match found {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => {
            debug!("no config file found, using defaults");
            EncfileConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Find the first config file in standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    find_config_in(Path::new(".")).or_else(|| config_dir().and_then(|d| find_config_in(&d)))
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "encfile").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("encfile.toml")
}

/// Serialize `config` to TOML at `path`, creating parent directories.
pub fn save_config_to(config: &EncfileConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Override config values from `ENCFILE_*` environment variables.
///
/// Unparsable values are logged and ignored.
pub fn apply_env_overrides(config: &mut EncfileConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_env_overrides_with(
    config: &mut EncfileConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    override_from(&lookup, "ENCFILE_KDF_M_COST", &mut config.kdf.m_cost);
    override_from(&lookup, "ENCFILE_KDF_T_COST", &mut config.kdf.t_cost);
    override_from(&lookup, "ENCFILE_KDF_P_COST", &mut config.kdf.p_cost);
    override_from(&lookup, "ENCFILE_KEY_BITS", &mut config.keys.bits);
    override_from(
        &lookup,
        "ENCFILE_MAX_PAYLOAD_BYTES",
        &mut config.limits.max_payload_bytes,
    );
}

fn override_from<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, slot: &mut T)
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(var) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => {
            debug!(var, "config override from environment");
            *slot = value;
        },
        Err(e) => warn!(var, value = %raw, error = %e, "ignoring invalid environment override"),
    }
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> anyhow::Result<EncfileConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Parse raw config text into a format-neutral JSON tree.
pub(crate) fn parse_config_value(raw: &str, path: &Path) -> anyhow::Result<serde_json::Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
