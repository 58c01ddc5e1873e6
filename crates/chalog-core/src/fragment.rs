//! Fragment aggregation.
//!
//! Every immediate subdirectory of the changelog directory is a release, and
//! every file inside it is a fragment. A fragment is markdown whose level-1
//! headings name categories:
//!
//! ```markdown
//! # Added
//! - Support for `releases.txt` metadata.
//!
//! # Fixed
//! - Crash on empty fragment files.
//! ```
//!
//! Content before the first level-1 heading belongs to no category and is
//! dropped. So is content after a level-1 heading with no text (`#`), which
//! closes the current category without opening another.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::error::{ChangelogError, ChangelogResult};
use crate::markdown::MarkdownFormatter;
use crate::release::{Categories, Release, merge_release};

/// Where the fragment walk currently is.
enum CategoryState {
    /// No level-1 heading seen yet in this fragment.
    NoCategory,
    /// Collecting text for the named category.
    InCategory { name: String, buffer: String },
}

impl CategoryState {
    /// Enter `name`, resuming any text it already has.
    fn enter(name: &str, categories: &Categories) -> Self {
        Self::InCategory {
            name: name.to_string(),
            buffer: categories.get(name).cloned().unwrap_or_default(),
        }
    }

    /// Store the open category, if any, and leave the state empty.
    fn flush(&mut self, categories: &mut Categories) {
        if let Self::InCategory { name, buffer } = std::mem::replace(self, Self::NoCategory) {
            categories.insert(name, buffer);
        }
    }
}

/// Parse one fragment and accumulate its categories into `categories`.
///
/// # Errors
///
/// Propagates formatter render failures.
pub fn collect_categories<F: MarkdownFormatter + ?Sized>(
    formatter: &F,
    source: &str,
    categories: &mut Categories,
) -> ChangelogResult<()> {
    let document = formatter.parse(source);
    let mut state = CategoryState::NoCategory;

    for block in &document.blocks {
        if block.is_category_heading() {
            state.flush(categories);
            if let Some(name) = block.category_name() {
                state = CategoryState::enter(name, categories);
            }
            continue;
        }

        if let CategoryState::InCategory { buffer, .. } = &mut state {
            let rendered = formatter.render(block, source)?;
            buffer.push_str(rendered.trim_start_matches('\n'));
        }
    }

    state.flush(categories);
    Ok(())
}

/// Parse every fragment file in `release_dir` into one category map.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a fragment cannot
/// be read or rendered.
pub fn read_release_dir<F: MarkdownFormatter + ?Sized>(
    formatter: &F,
    release_dir: &Utf8Path,
) -> ChangelogResult<Categories> {
    let mut categories = Categories::new();

    for path in list_entries(release_dir, EntryKind::File)? {
        let source =
            std::fs::read_to_string(&path).map_err(|source| ChangelogError::ReadFragment {
                path: path.clone(),
                source,
            })?;
        collect_categories(formatter, &source, &mut categories)?;
        debug!(%path, categories = categories.len(), "fragment parsed");
    }

    Ok(categories)
}

/// Read every release directory under `input_dir` and merge the results
/// into `releases`.
///
/// Releases already present (for instance from the manifest) keep their
/// position and metadata but have their categories replaced.
///
/// # Errors
///
/// Returns an error on any listing or read failure; `releases` may then be
/// partially updated and should be discarded.
#[instrument(skip(formatter, releases), fields(%input_dir))]
pub fn aggregate<F: MarkdownFormatter + ?Sized>(
    formatter: &F,
    input_dir: &Utf8Path,
    releases: &mut Vec<Release>,
) -> ChangelogResult<()> {
    for release_dir in list_entries(input_dir, EntryKind::Dir)? {
        let Some(name) = release_dir.file_name() else {
            continue;
        };
        let categories = read_release_dir(formatter, &release_dir)?;
        debug!(release = name, categories = categories.len(), "release aggregated");
        merge_release(releases, Release::new(name).with_categories(categories));
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

/// List non-hidden entries of `dir` of the given kind, sorted by name.
fn list_entries(dir: &Utf8Path, kind: EntryKind) -> ChangelogResult<Vec<Utf8PathBuf>> {
    let list_error = |source| ChangelogError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(ChangelogError::NonUtf8Path)?;
        if path.file_name().is_some_and(|name| name.starts_with('.')) {
            continue;
        }
        // Follows symlinks, so linked fragments and release dirs are honored.
        let is_dir = path.is_dir();
        let wanted = match kind {
            EntryKind::Dir => is_dir,
            EntryKind::File => !is_dir,
        };
        if wanted {
            entries.push(path);
        }
    }

    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{Block, CmarkFormatter, Document};
    use std::fs;
    use tempfile::TempDir;

    /// Splits with pulldown-cmark but renders blocks as their raw source.
    struct VerbatimFormatter;

    impl MarkdownFormatter for VerbatimFormatter {
        fn parse(&self, source: &str) -> Document {
            CmarkFormatter::new().parse(source)
        }

        fn render(&self, block: &Block, source: &str) -> ChangelogResult<String> {
            Ok(format!("\n{}\n", source[block.span.clone()].trim_end()))
        }
    }

    fn categories_of(source: &str) -> Categories {
        let mut categories = Categories::new();
        collect_categories(&VerbatimFormatter, source, &mut categories).unwrap();
        categories
    }

    fn utf8(tmp: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(tmp.path()).unwrap()
    }

    #[test]
    fn groups_blocks_under_level_one_headings() {
        let categories = categories_of("# Added\n\n- a\n\n# Fixed\n\n- b\n\nMore.\n");
        let pairs: Vec<_> = categories
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, [("Added", "- a\n"), ("Fixed", "- b\nMore.\n")]);
    }

    #[test]
    fn text_before_first_heading_is_dropped() {
        let categories = categories_of("Intro paragraph.\n\n# Changed\n\n- c\n");
        assert_eq!(categories.len(), 1);
        assert_eq!(categories["Changed"], "- c\n");
    }

    #[test]
    fn fragment_without_headings_contributes_nothing() {
        assert!(categories_of("just some notes\n\n- and a list\n").is_empty());
    }

    #[test]
    fn repeated_heading_resumes_category() {
        let categories = categories_of("# Added\n\n- a\n\n# Fixed\n\n- b\n\n# Added\n\n- c\n");
        assert_eq!(categories["Added"], "- a\n- c\n");
        assert_eq!(categories.get_index(0).map(|(k, _)| k.as_str()), Some("Added"));
    }

    #[test]
    fn deeper_headings_are_content() {
        let categories = categories_of("# Added\n\n## Parser\n\n- a\n");
        assert_eq!(categories["Added"], "## Parser\n- a\n");
    }

    #[test]
    fn empty_category_is_still_recorded() {
        let categories = categories_of("# Removed\n");
        assert_eq!(categories["Removed"], "");
    }

    #[test]
    fn same_category_across_files_concatenates_in_file_order() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("1.0.0");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("b-second.md"), "# Added\n\n- second\n").unwrap();
        fs::write(dir.join("a-first.md"), "# Added\n\n- first\n\n# Fixed\n\n- fix\n").unwrap();

        let categories =
            read_release_dir(&VerbatimFormatter, &utf8(&tmp).join("1.0.0")).unwrap();

        assert_eq!(categories["Added"], "- first\n- second\n");
        assert_eq!(categories["Fixed"], "- fix\n");
    }

    #[test]
    fn skips_hidden_files_and_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("1.0.0");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join(".gitkeep"), "# Hidden\n\n- no\n").unwrap();
        fs::write(dir.join("nested").join("inner.md"), "# Nested\n\n- no\n").unwrap();
        fs::write(dir.join("change.md"), "# Added\n\n- yes\n").unwrap();

        let categories =
            read_release_dir(&VerbatimFormatter, &utf8(&tmp).join("1.0.0")).unwrap();

        assert_eq!(categories.keys().collect::<Vec<_>>(), ["Added"]);
    }

    #[test]
    fn aggregate_appends_releases_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["b", "a", "c"] {
            let dir = tmp.path().join(name);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("x.md"), format!("# Added\n\n- {name}\n")).unwrap();
        }
        fs::write(tmp.path().join("releases.md"), "# Not a release\n").unwrap();

        let mut releases = Vec::new();
        aggregate(&VerbatimFormatter, utf8(&tmp), &mut releases).unwrap();

        let names: Vec<_> = releases.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(releases[1].categories["Added"], "- b\n");
    }

    #[test]
    fn aggregate_replaces_categories_of_known_release() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("1.0.0");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("x.md"), "# Added\n\n- new\n").unwrap();

        let mut releases = vec![Release::new("2.0.0"), Release::new("1.0.0").with_meta("2020")];
        aggregate(&VerbatimFormatter, utf8(&tmp), &mut releases).unwrap();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[1].name, "1.0.0");
        assert_eq!(releases[1].meta, "2020");
        assert_eq!(releases[1].categories["Added"], "- new\n");
        assert!(releases[0].is_empty());
    }

    #[test]
    fn empty_release_directory_yields_empty_release() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Unreleased")).unwrap();

        let mut releases = Vec::new();
        aggregate(&VerbatimFormatter, utf8(&tmp), &mut releases).unwrap();

        assert_eq!(releases, [Release::new("Unreleased")]);
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = utf8(&tmp).join("does-not-exist");

        let mut releases = Vec::new();
        let result = aggregate(&VerbatimFormatter, &missing, &mut releases);
        assert!(matches!(result, Err(ChangelogError::ListDirectory { .. })));
    }

    #[test]
    fn non_utf8_fragment_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("1.0.0");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = read_release_dir(&VerbatimFormatter, &utf8(&tmp).join("1.0.0"));
        assert!(matches!(result, Err(ChangelogError::ReadFragment { .. })));
    }

    #[test]
    fn cmark_formatter_normalizes_fragment_lists() {
        let mut categories = Categories::new();
        collect_categories(
            &CmarkFormatter::new(),
            "# Added\n\n* one\n* two\n",
            &mut categories,
        )
        .unwrap();
        assert_eq!(categories["Added"], "- one\n- two\n");
    }

    fn cmark_categories_of(source: &str) -> Categories {
        let mut categories = Categories::new();
        collect_categories(&CmarkFormatter::new(), source, &mut categories).unwrap();
        categories
    }

    #[test]
    fn bare_hash_heading_closes_the_category() {
        let categories = cmark_categories_of("#\n\n- orphan\n");
        assert!(categories.is_empty());

        let categories = cmark_categories_of("# Added\n\n- kept\n\n#\n\n- orphan\n");
        assert_eq!(categories.len(), 1);
        assert_eq!(categories["Added"], "- kept\n");
    }

    #[test]
    fn indented_code_keeps_its_indentation() {
        let categories = cmark_categories_of("# Added\n\n    indented code\n    line2\n");
        assert_eq!(categories["Added"], "    indented code\n    line2\n");
    }

    #[test]
    fn reference_links_keep_their_definitions() {
        let categories =
            cmark_categories_of("# Added\n\n- See [the issue][i]\n\n[i]: https://example.com/1\n");
        assert_eq!(
            categories["Added"],
            "- See [the issue][i]\n\n[i]: https://example.com/1\n"
        );
    }

    #[test]
    fn footnotes_stay_footnotes() {
        let categories = cmark_categories_of("# Added\n\n- a[^1]\n\n[^1]: footnote\n");
        let added = &categories["Added"];
        assert!(added.contains("- a[^1]"), "{added}");
        assert!(added.contains("[^1]: footnote"), "{added}");
        assert!(!added.contains("\\["), "{added}");
    }

    #[test]
    fn ordered_lists_keep_their_numbers() {
        let categories = cmark_categories_of("# Added\n\n1. one\n2. two\n");
        assert_eq!(categories["Added"], "1. one\n2. two\n");

        let categories = cmark_categories_of("# Added\n\n3. three\n4. four\n");
        assert_eq!(categories["Added"], "3. three\n4. four\n");
    }

    #[test]
    fn block_quotes_render_with_plain_prefix() {
        let categories = cmark_categories_of("# Added\n\n> quoted\n");
        assert_eq!(categories["Added"], "> quoted\n");
    }

    #[test]
    fn tables_render_in_compact_form() {
        let categories = cmark_categories_of("# Added\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(categories["Added"], "|a|b|\n|-|-|\n|1|2|\n");
    }
}
