//! Rendering releases into a Keep a Changelog document.

use crate::release::Release;

/// Preamble used when none is configured.
pub const DEFAULT_PREAMBLE: &str = "\
# Changelog
All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.0.0/), and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).
";

/// Inputs to [`render_changelog`] besides the releases themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Text placed verbatim at the top of the document.
    pub preamble: String,
    /// Repository base URL used for comparison links; empty disables links.
    pub repo: String,
    /// Name of the release treated as the unreleased section.
    pub unreleased: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            repo: String::new(),
            unreleased: "Unreleased".to_string(),
        }
    }
}

/// Render ordered releases into the final changelog text.
///
/// The result starts with the preamble and always ends with exactly one
/// newline.
pub fn render_changelog(releases: &[Release], options: &RenderOptions) -> String {
    let mut output = options.preamble.clone();
    output.push_str(&render_releases(releases));

    let links = release_links(releases, &options.repo, &options.unreleased);
    if !links.is_empty() {
        output.push('\n');
        output.push_str(&links.join("\n"));
    }

    let trimmed = output.trim_end_matches('\n').len();
    output.truncate(trimmed);
    output.push('\n');
    output
}

/// Render the release headings and their categories.
fn render_releases(releases: &[Release]) -> String {
    let mut output = String::new();
    for release in releases {
        if release.meta.is_empty() {
            output.push_str(&format!("\n## [{}]\n", release.name));
        } else {
            output.push_str(&format!("\n## [{}] - {}\n", release.name, release.meta));
        }
        for (category, body) in &release.categories {
            output.push_str(&format!("### {category}\n"));
            output.push_str(body);
        }
    }
    output
}

/// Build the reference-style link lines for each release.
///
/// Each release links to a diff against the release that follows it in the
/// list, which is the one before it in history. The last release links to
/// its own tag. The unreleased section diffs against `HEAD` and gets no
/// link at all when it is the only release.
pub fn release_links(releases: &[Release], repo: &str, unreleased: &str) -> Vec<String> {
    let repo = repo.trim_end_matches('/');
    if repo.is_empty() {
        return Vec::new();
    }

    let mut links = Vec::with_capacity(releases.len());
    for (i, release) in releases.iter().enumerate() {
        let name = &release.name;
        let previous = releases.get(i + 1).map(|r| &r.name);
        match previous {
            Some(previous) if *name == unreleased => {
                links.push(format!("[{name}]: {repo}/compare/{previous}...HEAD"));
            }
            None if *name == unreleased => {}
            Some(previous) => {
                links.push(format!("[{name}]: {repo}/compare/{previous}...{name}"));
            }
            None => links.push(format!("[{name}]: {repo}/releases/tag/{name}")),
        }
    }
    links
}
