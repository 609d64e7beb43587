//! Configuration validation.
//!
//! Checks a config file against the known schema, flags unknown or
//! misspelled fields, and reports weak or unusable crypto settings.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use encfile_engine::{
    KdfParams,
    keypair::{MAX_KEY_BITS, MIN_KEY_BITS},
};

use crate::{env_subst::substitute_env, loader, schema::EncfileConfig};

/// Memory cost below which Argon2id is considered weak (19 MiB).
const WEAK_M_COST: u32 = 19 * 1024;

/// Filter levels accepted without a target prefix.
const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "security",
    /// "limits", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "kdf.m_cost"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

/// Mirrors every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "kdf",
            Struct(HashMap::from([
                ("m_cost", Leaf),
                ("t_cost", Leaf),
                ("p_cost", Leaf),
            ])),
        ),
        (
            "keys",
            Struct(HashMap::from([("bits", Leaf), ("out_dir", Leaf)])),
        ),
        (
            "limits",
            Struct(HashMap::from([("max_payload_bytes", Leaf)])),
        ),
        (
            "logging",
            Struct(HashMap::from([("level", Leaf), ("json", Leaf)])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut curr = Vec::with_capacity(prev.len());
        curr.push(i + 1);
        for (j, cb) in b_chars.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != *cb);
            curr.push(substitute.min(prev[j + 1] + 1).min(curr[j] + 1));
        }
        prev = curr;
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let mut result = match std::fs::read_to_string(&actual_path) {
        Ok(content) => validate_str(&substitute_env(&content), &actual_path),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate TOML text without touching the file system.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    validate_str(toml_str, Path::new("encfile.toml"))
}

/// Validate raw config text; the format is chosen by `path`'s extension.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let value = match loader::parse_config_value(raw, path) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    // An empty YAML document parses as null.
    let value = if value.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        value
    };

    check_unknown_fields(&value, &build_schema_map(), "", &mut diagnostics);

    match serde_json::from_value::<EncfileConfig>(value) {
        Ok(config) => check_semantics(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (serde_json::Value::Object(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known: Vec<&str> = fields.keys().copied().collect();

    for (key, child) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child, child_schema, &path, diagnostics);
            continue;
        }
        let message = match suggest(key, &known, 3) {
            Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
            None => "unknown field".to_string(),
        };
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-field",
            path,
            message,
        ));
    }
}

/// Run semantic checks on a successfully parsed config.
fn check_semantics(config: &EncfileConfig, diagnostics: &mut Vec<Diagnostic>) {
    let kdf: KdfParams = config.kdf.into();
    if let Err(e) = kdf.validate() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "security",
            "kdf",
            e.to_string(),
        ));
    } else if kdf.m_cost < WEAK_M_COST {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "security",
            "kdf.m_cost",
            format!(
                "memory cost {} KiB is below {WEAK_M_COST} KiB; passwords are cheap to brute-force",
                kdf.m_cost
            ),
        ));
    }

    let bits = config.keys.bits;
    if bits < MIN_KEY_BITS {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "security",
            "keys.bits",
            format!("RSA keys below {MIN_KEY_BITS} bits are refused"),
        ));
    } else if bits > MAX_KEY_BITS || bits % 8 != 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "security",
            "keys.bits",
            format!("key size must be a multiple of 8 up to {MAX_KEY_BITS} bits"),
        ));
    }

    if let Some(dir) = &config.keys.out_dir
        && dir.exists()
        && !dir.is_dir()
    {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "file-ref",
            "keys.out_dir",
            format!("{} exists but is not a directory", dir.display()),
        ));
    }

    if config.limits.max_payload_bytes == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "limits",
            "limits.max_payload_bytes",
            "payload limit of 0 rejects every input",
        ));
    }

    let level = config.logging.level.trim();
    if !level.contains('=')
        && !KNOWN_LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
    {
        let message = match suggest(level, KNOWN_LOG_LEVELS, 2) {
            Some(s) => format!("unknown log level \"{level}\" (did you mean \"{s}\"?)"),
            None => format!(
                "unknown log level \"{level}\"; expected one of: {}",
                KNOWN_LOG_LEVELS.join(", ")
            ),
        };
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "unknown-field",
            "logging.level",
            message,
        ));
    }
}
