//! Observability setup: human-readable logs on stderr, optional JSONL file.
//!
//! stdout carries the changelog when the `stdout` target is selected, so
//! nothing here ever writes to it.
//!
//! | Flag(s)   | stderr level |
//! |-----------|--------------|
//! | (none)    | `RUST_LOG`, else warn |
//! | `-v`      | info         |
//! | `-vv`     | debug        |
//! | `-vvv`    | trace        |
//! | `--quiet` | error        |
//!
//! The file layer is only installed when a log directory is configured,
//! through `CHALOG_LOG_DIR` or `log_dir` in the config file. It records at
//! the configured `log_level`, independent of the stderr verbosity.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

const ENV_LOG_DIR: &str = "CHALOG_LOG_DIR";
const LOG_FILE_NAME: &str = "chalog.jsonl";
const DEFAULT_STDERR_LEVEL: &str = "warn";

/// Settings for [`init_observability`].
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Directory for JSONL log files; `None` disables file logging.
    pub log_dir: Option<Utf8PathBuf>,
    /// Level recorded in the log file.
    pub file_level: String,
    /// Whether stderr output carries ANSI styling.
    pub ansi: bool,
}

impl ObservabilityConfig {
    /// Resolve the log directory from the environment, falling back to the
    /// configured one.
    pub fn from_env_with_overrides(
        config_log_dir: Option<&Utf8Path>,
        file_level: &str,
        ansi: bool,
    ) -> Self {
        let env_dir = std::env::var(ENV_LOG_DIR).ok();
        Self {
            log_dir: resolve_log_dir(env_dir.as_deref(), config_log_dir),
            file_level: file_level.to_string(),
            ansi,
        }
    }
}

/// Keeps the background log writer alive; drop it last.
pub struct ObservabilityGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    stderr_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg.ansi)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let (file_layer, file_guard) = match cfg.log_dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {dir}"))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_filter(EnvFilter::new(&cfg.file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    tracing::debug!(log_dir = ?cfg.log_dir, "observability initialized");

    Ok(ObservabilityGuard {
        _file_guard: file_guard,
    })
}

/// Build the stderr filter from the CLI flags.
///
/// Priority: quiet flag > verbose flag > `RUST_LOG` > warn.
pub fn env_filter(quiet: bool, verbose: u8) -> EnvFilter {
    match stderr_level(quiet, verbose) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDERR_LEVEL)),
    }
}

const fn stderr_level(quiet: bool, verbose: u8) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn resolve_log_dir(env_dir: Option<&str>, config_dir: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    env_dir
        .filter(|dir| !dir.is_empty())
        .map(Utf8PathBuf::from)
        .or_else(|| config_dir.map(Utf8Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(stderr_level(true, 3), Some("error"));
        assert_eq!(env_filter(true, 0).to_string(), "error");
    }

    #[test]
    fn verbosity_steps_through_levels() {
        assert_eq!(stderr_level(false, 0), None);
        assert_eq!(stderr_level(false, 1), Some("info"));
        assert_eq!(stderr_level(false, 2), Some("debug"));
        assert_eq!(stderr_level(false, 3), Some("trace"));
        assert_eq!(stderr_level(false, 9), Some("trace"));
    }

    #[test]
    fn verbose_filter_ignores_rust_log() {
        assert_eq!(env_filter(false, 2).to_string(), "debug");
    }

    #[test]
    fn env_log_dir_wins_over_config() {
        let config_dir = Utf8PathBuf::from("/from/config");
        let dir = resolve_log_dir(Some("/from/env"), Some(&config_dir));
        assert_eq!(dir.as_deref(), Some(Utf8Path::new("/from/env")));
    }

    #[test]
    fn empty_env_log_dir_falls_back_to_config() {
        let config_dir = Utf8PathBuf::from("/from/config");
        let dir = resolve_log_dir(Some(""), Some(&config_dir));
        assert_eq!(dir, Some(config_dir));
    }

    #[test]
    fn no_log_dir_disables_file_logging() {
        assert_eq!(resolve_log_dir(None, None), None);
    }
}
