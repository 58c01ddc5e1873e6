//! Core library for chalog.
//!
//! Builds a Keep a Changelog document from a directory of per-release change
//! fragments, so contributors never edit a shared `CHANGELOG.md`.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`fragment`] - Reading release directories and fragment files
//! - [`generate`] - End-to-end changelog generation
//! - [`manifest`] - The optional `releases.txt` release manifest
//! - [`markdown`] - Markdown block splitting and re-serialization
//! - [`release`] - The release model
//! - [`render`] - Rendering releases and comparison links
//! - [`version`] - Version-aware release ordering
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use chalog_core::{Generator, RenderOptions};
//!
//! let changelog = Generator::new()
//!     .generate(Utf8Path::new(".changelog"), &RenderOptions::default())
//!     .expect("failed to generate changelog");
//!
//! print!("{changelog}");
//! ```
#![deny(unsafe_code)]

pub mod config;

pub mod error;

pub mod fragment;

pub mod generate;

pub mod manifest;

pub mod markdown;

pub mod release;

pub mod render;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel, Target};

pub use error::{ChangelogError, ChangelogResult, ConfigError, ConfigResult};

pub use generate::Generator;

pub use markdown::{CmarkFormatter, MarkdownFormatter};

pub use release::Release;

pub use render::RenderOptions;
