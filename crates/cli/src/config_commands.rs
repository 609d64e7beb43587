use std::path::Path;

use {anyhow::Result, clap::Subcommand};

use encfile_config::{
    EncfileConfig,
    validate::{self, Severity, ValidationResult},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration (file, env overrides, defaults).
    Show,
    /// Write a default config file if none exists.
    Init,
}

pub fn handle_config(
    action: ConfigAction,
    path: Option<&Path>,
    effective: &EncfileConfig,
) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(path, verbose),
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(effective)?);
            Ok(())
        },
        ConfigAction::Init => init(path),
    }
}

fn init(path: Option<&Path>) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => encfile_config::find_or_default_config_path(),
    };
    if target.exists() {
        eprintln!("Config already exists at {}", target.display());
        return Ok(());
    }
    encfile_config::save_config_to(&EncfileConfig::default(), &target)?;
    eprintln!("Wrote default config to {}", target.display());
    Ok(())
}

fn check(path: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate::validate(path);
    match &result.config_path {
        Some(path) => eprintln!("Checking {}\n", path.display()),
        None => eprintln!("No config file found; checking defaults.\n"),
    }
    eprint!("{}", render_report(&result, verbose));

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[1;31m",
        Severity::Warning => "\x1b[1;33m",
        Severity::Info => "\x1b[1;36m",
    }
}

/// One line per diagnostic, most severe first, then a tally.
///
/// Info diagnostics are listed only when `verbose`.
fn render_report(result: &ValidationResult, verbose: bool) -> String {
    const RESET: &str = "\x1b[0m";
    const ORDER: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    let mut out = String::new();
    for severity in ORDER {
        if severity == Severity::Info && !verbose {
            continue;
        }
        for d in result.diagnostics.iter().filter(|d| d.severity == severity) {
            let at = if d.path.is_empty() {
                String::new()
            } else {
                format!(" {}:", d.path)
            };
            out.push_str(&format!(
                "  {}{severity}{RESET} [{}]{at} {}\n",
                color(severity),
                d.category,
                d.message
            ));
        }
    }

    let tally: Vec<String> = ORDER[..2]
        .iter()
        .map(|&s| (s, result.count(s)))
        .filter(|&(_, n)| n > 0)
        .map(|(s, n)| format!("{n} {s}{}", if n == 1 { "" } else { "s" }))
        .collect();
    if !out.is_empty() {
        out.push('\n');
    }
    if tally.is_empty() {
        out.push_str("No issues found.\n");
    } else {
        out.push_str(&tally.join(", "));
        out.push('\n');
    }
    out
}
