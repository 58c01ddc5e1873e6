//! Info command: show package and effective configuration.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use chalog_core::config::{self, Config};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    config_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    #[serde(rename = "in")]
    input: String,
    out: String,
    repo: String,
    unreleased: String,
    target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
}

impl ConfigInfo {
    fn from_config(config: &Config, config_files: &[Utf8PathBuf]) -> Self {
        Self {
            config_files: config_files.iter().map(ToString::to_string).collect(),
            user_config_dir: config::user_config_dir().map(|p| p.to_string()),
            input: config.input.to_string(),
            out: config.out.to_string(),
            repo: config.repo.clone(),
            unreleased: config.unreleased.clone(),
            target: config.target.as_str(),
            preamble: config.preamble.as_ref().map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

impl FullInfo {
    fn new(config: &Config, config_files: &[Utf8PathBuf]) -> Self {
        Self {
            package: PackageInfo::new(),
            config: ConfigInfo::from_config(config, config_files),
        }
    }
}

/// Print package information and the configuration a run would use.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `config_files` - The files `config` was merged from, lowest precedence first
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    config_files: &[Utf8PathBuf],
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let info = FullInfo::new(config, config_files);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let package = &info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }

    let cfg = &info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    if cfg.config_files.is_empty() {
        println!("{}: {}", "Config files".dimmed(), "none found".yellow());
    }
    for path in &cfg.config_files {
        println!("{}: {}", "Config file".dimmed(), path.cyan());
    }
    if let Some(ref dir) = cfg.user_config_dir {
        println!("{}: {}", "User config dir".dimmed(), dir);
    }
    println!("{}: {}", "Input".dimmed(), cfg.input);
    println!("{}: {}", "Output".dimmed(), cfg.out);
    println!("{}: {}", "Target".dimmed(), cfg.target);
    if cfg.repo.is_empty() {
        println!("{}: {}", "Repository".dimmed(), "none (no links)".yellow());
    } else {
        println!("{}: {}", "Repository".dimmed(), cfg.repo.cyan());
    }
    println!("{}: {}", "Unreleased".dimmed(), cfg.unreleased);
    match cfg.preamble {
        Some(ref path) => println!("{}: {}", "Preamble".dimmed(), path),
        None => println!("{}: {}", "Preamble".dimmed(), "built-in"),
    }
    println!("{}: {}", "Log level".dimmed(), cfg.log_level);
    if let Some(ref dir) = cfg.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }

    Ok(())
}
