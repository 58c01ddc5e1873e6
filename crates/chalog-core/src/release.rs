//! The in-memory release model.

use indexmap::IndexMap;
use serde::Serialize;

/// Category name to accumulated, already-rendered body text.
///
/// Iteration follows first-insertion order.
pub type Categories = IndexMap<String, String>;

/// A single release: its name, optional metadata, and the change text
/// grouped by category (e.g. `Added`, `Changed`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Release name, unique within a collection (e.g. `1.2.0`, `Unreleased`).
    pub name: String,
    /// Free-text annotation shown next to the name, usually a date.
    /// Empty means no metadata.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meta: String,
    /// Categorized change text.
    pub categories: Categories,
}

impl Release {
    /// Create a release with no metadata and no categories.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the release metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = meta.into();
        self
    }

    /// Set the release categories.
    #[must_use]
    pub fn with_categories(mut self, categories: Categories) -> Self {
        self.categories = categories;
        self
    }

    /// Whether any category has been recorded for this release.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Insert `release` into `releases`, merging by name.
///
/// An existing release with the same name keeps its position and metadata
/// but has its categories replaced; otherwise the release is appended.
pub fn merge_release(releases: &mut Vec<Release>, release: Release) {
    match releases.iter_mut().find(|r| r.name == release.name) {
        Some(existing) => existing.categories = release.categories,
        None => releases.push(release),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(pairs: &[(&str, &str)]) -> Categories {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn merge_appends_unknown_release() {
        let mut releases = vec![Release::new("1.0.0")];
        merge_release(&mut releases, Release::new("1.1.0"));
        let names: Vec<_> = releases.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["1.0.0", "1.1.0"]);
    }

    #[test]
    fn merge_replaces_categories_and_keeps_meta() {
        let mut releases = vec![
            Release::new("1.0.0")
                .with_meta("2020-01-01")
                .with_categories(categories(&[("Removed", "- old\n")])),
        ];

        merge_release(
            &mut releases,
            Release::new("1.0.0").with_categories(categories(&[("Added", "- new\n")])),
        );

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].meta, "2020-01-01");
        assert_eq!(releases[0].categories, categories(&[("Added", "- new\n")]));
    }

    #[test]
    fn serializes_without_empty_meta() {
        let release = Release::new("Unreleased");
        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["name"], "Unreleased");
        assert!(json.get("meta").is_none());
    }
}
