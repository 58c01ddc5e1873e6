//! Error types for chalog-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from reading the changelog directory and rendering its contents.
///
/// Every variant is fatal to a generation run: nothing is produced unless
/// all inputs were read successfully.
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// The release manifest exists but could not be read.
    #[error("failed to read release manifest {path}: {source}")]
    ReadManifest {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A directory could not be listed.
    #[error("failed to list directory {path}: {source}")]
    ListDirectory {
        /// Directory being listed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A fragment file could not be read.
    #[error("failed to read fragment {path}: {source}")]
    ReadFragment {
        /// Path to the fragment.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A preamble file could not be read.
    #[error("failed to read preamble {path}: {source}")]
    ReadPreamble {
        /// Path to the preamble file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A directory entry's name is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The markdown formatter could not serialize a block.
    #[error("failed to render markdown block: {0}")]
    Render(String),
}

/// Result type alias using [`ChangelogError`].
pub type ChangelogResult<T> = Result<T, ChangelogError>;
