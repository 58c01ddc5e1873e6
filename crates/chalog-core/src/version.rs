//! Version-aware release ordering.
//!
//! Without a manifest, releases are ordered newest first by semantic
//! version. Names that are not versions (such as `Unreleased`) sort ahead of
//! all versions, alphabetically among themselves.

use std::cmp::Ordering;

use semver::Version;

use crate::release::Release;

/// Parse a release name as a version, stripping an optional `v` prefix.
pub fn parse_version(name: &str) -> Result<Version, semver::Error> {
    let s = name.strip_prefix('v').unwrap_or(name);
    Version::parse(s)
}

/// Compare two release names for changelog order.
///
/// - both versions: higher version first (build metadata ignored)
/// - neither a version: lexicographic
/// - exactly one a version: the non-version first
pub fn compare_names(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Ok(va), Ok(vb)) => vb.cmp_precedence(&va),
        (Err(_), Err(_)) => a.cmp(b),
        (Err(_), Ok(_)) => Ordering::Less,
        (Ok(_), Err(_)) => Ordering::Greater,
    }
}

/// Sort releases into changelog order. The sort is stable.
pub fn sort_releases(releases: &mut [Release]) {
    releases.sort_by(|a, b| compare_names(&a.name, &b.name));
}
