//! Releases command: list the releases a changelog would contain.

use anyhow::Context;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use chalog_core::config::Config;
use chalog_core::generate::Generator;
use chalog_core::release::Release;

use super::InputArgs;

/// Arguments for the `releases` subcommand.
#[derive(Args, Debug, Default)]
pub struct ReleasesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Print the releases found under the input directory, in changelog order.
#[instrument(name = "cmd_releases", skip_all)]
pub fn cmd_releases(args: ReleasesArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let mut config = config.clone();
    args.input.apply(&mut config);
    debug!(input = %config.input, "listing releases");

    let releases = Generator::new()
        .releases(&config.input)
        .with_context(|| format!("failed to read changelog fragments from {}", config.input))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&releases)?);
        return Ok(());
    }

    if releases.is_empty() {
        println!("{}", "No releases found".yellow());
        return Ok(());
    }
    for release in &releases {
        println!("{}", release_line(release));
    }

    Ok(())
}

fn release_line(release: &Release) -> String {
    let mut line = release
        .name
        .if_supports_color(Stream::Stdout, |s| s.bold())
        .to_string();
    if !release.meta.is_empty() {
        let meta = release.meta.if_supports_color(Stream::Stdout, |s| s.dimmed());
        line.push_str(&format!(" {meta}"));
    }
    if !release.categories.is_empty() {
        let names: Vec<&str> = release.categories.keys().map(String::as_str).collect();
        let names = names.join(", ");
        let names = names.if_supports_color(Stream::Stdout, |s| s.cyan());
        line.push_str(&format!(" ({names})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn release_line_lists_meta_and_categories() {
        owo_colors::set_override(false);
        let mut release = Release::new("1.0.0").with_meta("2024-01-01");
        release.categories.insert("Added".into(), "- a\n".into());
        release.categories.insert("Fixed".into(), "- b\n".into());
        assert_eq!(release_line(&release), "1.0.0 2024-01-01 (Added, Fixed)");
    }

    #[test]
    fn release_line_for_bare_release() {
        owo_colors::set_override(false);
        assert_eq!(release_line(&Release::new("Unreleased")), "Unreleased");
    }

    #[test]
    fn missing_input_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config {
            input: root.join("nope"),
            ..Config::default()
        };
        assert!(cmd_releases(ReleasesArgs::default(), false, &config).is_err());
    }

    #[test]
    fn lists_releases_as_json() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("0.1.0")).unwrap();
        let config = Config {
            input: root,
            ..Config::default()
        };
        assert!(cmd_releases(ReleasesArgs::default(), true, &config).is_ok());
    }
}
