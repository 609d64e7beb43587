//! Configuration loading, validation, and env substitution.
//!
//! Config files: `encfile.toml`, `encfile.yaml`, or `encfile.json`
//! Searched in `./` then the user config directory.
//!
//! Supports `${ENV_VAR}` substitution in all string values and `ENCFILE_*`
//! environment overrides for the common knobs.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_or_default_config_path,
        load_config, save_config_to, try_discover_and_load,
    },
    schema::{EncfileConfig, KdfConfig, KeysConfig, LimitsConfig, LoggingConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
