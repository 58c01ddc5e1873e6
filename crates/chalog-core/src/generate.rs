//! Changelog generation: manifest, fragment aggregation, ordering, rendering.
//!
//! [`collect_releases`] produces the ordered release collection and
//! [`generate`] renders it; [`Generator`] bundles both with a formatter.
//! Nothing is produced if any input fails to read.

use camino::Utf8Path;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{ChangelogError, ChangelogResult};
use crate::markdown::{CmarkFormatter, MarkdownFormatter};
use crate::release::Release;
use crate::render::{DEFAULT_PREAMBLE, RenderOptions, render_changelog};
use crate::{fragment, manifest, version};

/// Collect the releases under `input_dir` in changelog order.
///
/// The manifest order is kept when `releases.txt` exists; otherwise
/// releases are sorted by version.
///
/// # Errors
///
/// Returns an error if the manifest, a directory, or a fragment cannot be
/// read.
#[instrument(skip(formatter), fields(%input_dir))]
pub fn collect_releases<F: MarkdownFormatter + ?Sized>(
    input_dir: &Utf8Path,
    formatter: &F,
) -> ChangelogResult<Vec<Release>> {
    let manifest = manifest::read_manifest(input_dir)?;
    let has_manifest = manifest.is_some();
    let mut releases = manifest.unwrap_or_default();

    fragment::aggregate(formatter, input_dir, &mut releases)?;

    if has_manifest {
        debug!("keeping manifest order");
    } else {
        version::sort_releases(&mut releases);
    }

    Ok(releases)
}

/// Generate the changelog text for `input_dir`.
///
/// # Errors
///
/// Returns an error if any input cannot be read or rendered.
#[instrument(skip(options, formatter), fields(%input_dir))]
pub fn generate<F: MarkdownFormatter + ?Sized>(
    input_dir: &Utf8Path,
    options: &RenderOptions,
    formatter: &F,
) -> ChangelogResult<String> {
    let releases = collect_releases(input_dir, formatter)?;
    let changelog = render_changelog(&releases, options);
    info!(
        releases = releases.len(),
        bytes = changelog.len(),
        "changelog generated"
    );
    Ok(changelog)
}

/// Builds changelogs with a fixed markdown formatter.
#[derive(Debug, Clone, Default)]
pub struct Generator<F = CmarkFormatter> {
    formatter: F,
}

impl Generator {
    /// Create a generator using [`CmarkFormatter`].
    pub const fn new() -> Self {
        Self {
            formatter: CmarkFormatter::new(),
        }
    }
}

impl<F: MarkdownFormatter> Generator<F> {
    /// Create a generator using a custom markdown formatter.
    pub const fn with_formatter(formatter: F) -> Self {
        Self { formatter }
    }

    /// See [`collect_releases`].
    ///
    /// # Errors
    ///
    /// Returns an error if any input cannot be read.
    pub fn releases(&self, input_dir: &Utf8Path) -> ChangelogResult<Vec<Release>> {
        collect_releases(input_dir, &self.formatter)
    }

    /// See [`generate`].
    ///
    /// # Errors
    ///
    /// Returns an error if any input cannot be read or rendered.
    pub fn generate(&self, input_dir: &Utf8Path, options: &RenderOptions) -> ChangelogResult<String> {
        generate(input_dir, options, &self.formatter)
    }
}

/// Build [`RenderOptions`] from configuration, reading the preamble file if
/// one is configured.
///
/// # Errors
///
/// Returns [`ChangelogError::ReadPreamble`] if the preamble file cannot be
/// read.
pub fn render_options(config: &Config) -> ChangelogResult<RenderOptions> {
    Ok(RenderOptions {
        preamble: load_preamble(config.preamble.as_deref())?,
        repo: config.repo.clone(),
        unreleased: config.unreleased.clone(),
    })
}

/// Read the preamble at `path`, or return [`DEFAULT_PREAMBLE`].
///
/// # Errors
///
/// Returns [`ChangelogError::ReadPreamble`] if the file cannot be read.
pub fn load_preamble(path: Option<&Utf8Path>) -> ChangelogResult<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ChangelogError::ReadPreamble {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(DEFAULT_PREAMBLE.to_string()),
    }
}
