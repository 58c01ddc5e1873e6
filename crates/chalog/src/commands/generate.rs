//! Generate command: thin CLI layer over `chalog_core::generate`.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

use chalog_core::config::{Config, Target};
use chalog_core::generate::{self, Generator};
use chalog_core::render::render_changelog;

use super::InputArgs;

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Changelog file to write [default: CHANGELOG.md]
    #[arg(long, value_name = "FILE")]
    pub out: Option<Utf8PathBuf>,

    /// Repository base URL for comparison links, including the scheme
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Release name treated as the unreleased section [default: Unreleased]
    #[arg(long, value_name = "NAME")]
    pub unreleased: Option<String>,

    /// File whose contents replace the default preamble
    #[arg(long, value_name = "FILE")]
    pub preamble: Option<Utf8PathBuf>,

    /// Where to send the changelog [default: file]
    #[arg(long, value_enum)]
    pub target: Option<Target>,
}

impl GenerateArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(self, config: &mut Config) {
        self.input.apply(config);
        if let Some(out) = self.out {
            config.out = out;
        }
        if let Some(repo) = self.repo {
            config.repo = repo;
        }
        if let Some(unreleased) = self.unreleased {
            config.unreleased = unreleased;
        }
        if let Some(preamble) = self.preamble {
            config.preamble = Some(preamble);
        }
        if let Some(target) = self.target {
            config.target = target;
        }
    }
}

#[derive(Serialize)]
struct GenerateSummary<'a> {
    target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog: Option<&'a str>,
    releases: usize,
}

/// Execute the generate command.
///
/// The output file is only written once the whole changelog has been built,
/// so a failed run leaves any existing file untouched.
#[instrument(name = "cmd_generate", skip_all)]
pub fn cmd_generate(args: GenerateArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let mut config = config.clone();
    args.apply(&mut config);
    debug!(
        input = %config.input,
        target = config.target.as_str(),
        repo = %config.repo,
        "generating changelog"
    );

    let options = generate::render_options(&config).context("failed to load preamble")?;
    let releases = Generator::new()
        .releases(&config.input)
        .with_context(|| format!("failed to read changelog fragments from {}", config.input))?;
    let changelog = render_changelog(&releases, &options);

    match config.target {
        Target::Stdout => {
            if global_json {
                let summary = GenerateSummary {
                    target: config.target.as_str(),
                    path: None,
                    changelog: Some(&changelog),
                    releases: releases.len(),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{changelog}");
            }
        }
        Target::File => {
            std::fs::write(&config.out, &changelog)
                .with_context(|| format!("failed to write {}", config.out))?;
            info!(path = %config.out, releases = releases.len(), "changelog written");

            if global_json {
                let summary = GenerateSummary {
                    target: config.target.as_str(),
                    path: Some(config.out.as_str()),
                    changelog: None,
                    releases: releases.len(),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} {} ({} releases)",
                    "Wrote".green().bold(),
                    config.out.cyan(),
                    releases.len()
                );
            }
        }
    }

    Ok(())
}
