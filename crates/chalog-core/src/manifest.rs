//! The optional release manifest.
//!
//! A `releases.txt` file at the root of the changelog directory pins the
//! order of releases and attaches metadata to them:
//!
//! ```text
//! Unreleased
//! 1.1.0,2021-03-02
//! 1.0.0,2020-12-24
//! ```
//!
//! When the manifest is present its order is authoritative and releases are
//! never re-sorted by version.

use std::io::ErrorKind;

use camino::Utf8Path;
use tracing::debug;

use crate::error::{ChangelogError, ChangelogResult};
use crate::release::Release;

/// File name of the manifest inside the changelog directory.
pub const MANIFEST_FILE_NAME: &str = "releases.txt";

/// Read the manifest from `input_dir`.
///
/// Returns `Ok(None)` when no manifest exists; that is the normal case for
/// projects that rely on version ordering.
///
/// # Errors
///
/// Returns [`ChangelogError::ReadManifest`] for any I/O failure other than
/// the file not existing.
pub fn read_manifest(input_dir: &Utf8Path) -> ChangelogResult<Option<Vec<Release>>> {
    let path = input_dir.join(MANIFEST_FILE_NAME);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(%path, "no release manifest");
            return Ok(None);
        }
        Err(source) => return Err(ChangelogError::ReadManifest { path, source }),
    };

    let releases = parse_manifest(&contents);
    debug!(%path, count = releases.len(), "release manifest loaded");
    Ok(Some(releases))
}

/// Parse manifest text into releases with empty categories.
///
/// Each non-blank line is `name` or `name,meta`, split on the first comma.
/// Later lines repeating a name are ignored.
pub fn parse_manifest(contents: &str) -> Vec<Release> {
    let mut releases: Vec<Release> = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (name, meta) = match line.split_once(',') {
            Some((name, meta)) => (name.trim(), meta.trim()),
            None => (line, ""),
        };

        if releases.iter().any(|r| r.name == name) {
            debug!(name, "duplicate manifest entry ignored");
            continue;
        }

        releases.push(Release::new(name).with_meta(meta));
    }

    releases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names_and_meta(releases: &[Release]) -> Vec<(&str, &str)> {
        releases
            .iter()
            .map(|r| (r.name.as_str(), r.meta.as_str()))
            .collect()
    }

    #[test]
    fn parses_names_and_meta_in_order() {
        let releases = parse_manifest("Unreleased\n1.1.0,2021-03-02\n1.0.0, 2020-12-24\n");
        assert_eq!(
            names_and_meta(&releases),
            [
                ("Unreleased", ""),
                ("1.1.0", "2021-03-02"),
                ("1.0.0", "2020-12-24")
            ]
        );
        assert!(releases.iter().all(Release::is_empty));
    }

    #[test]
    fn skips_blank_lines() {
        let releases = parse_manifest("\n1.0.0\n   \n\n0.1.0\n");
        assert_eq!(names_and_meta(&releases), [("1.0.0", ""), ("0.1.0", "")]);
    }

    #[test]
    fn splits_on_first_comma_only() {
        let releases = parse_manifest("1.0.0,2020-12-24, yanked\n");
        assert_eq!(releases[0].meta, "2020-12-24, yanked");
    }

    #[test]
    fn first_duplicate_wins() {
        let releases = parse_manifest("1.0.0,first\n1.0.0,second\n");
        assert_eq!(names_and_meta(&releases), [("1.0.0", "first")]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let releases = parse_manifest("1.0.0,2020-12-24\r\n0.1.0\r\n");
        assert_eq!(
            names_and_meta(&releases),
            [("1.0.0", "2020-12-24"), ("0.1.0", "")]
        );
    }

    #[test]
    fn missing_manifest_is_none() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        assert!(read_manifest(dir).unwrap().is_none());
    }

    #[test]
    fn reads_manifest_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_FILE_NAME), "2.0.0\n1.0.0,2020\n").unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();

        let releases = read_manifest(dir).unwrap().unwrap();
        assert_eq!(names_and_meta(&releases), [("2.0.0", ""), ("1.0.0", "2020")]);
    }

    #[test]
    fn unreadable_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        // A directory where the manifest file should be cannot be read as text.
        fs::create_dir(tmp.path().join(MANIFEST_FILE_NAME)).unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();

        let result = read_manifest(dir);
        assert!(matches!(result, Err(ChangelogError::ReadManifest { .. })));
    }
}
