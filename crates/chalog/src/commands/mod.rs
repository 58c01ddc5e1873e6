//! Command implementations

pub mod generate;

pub mod info;

pub mod releases;

use camino::Utf8PathBuf;
use clap::Args;

use chalog_core::config::Config;

/// Location of the changelog fragments, shared by commands that read them.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    /// Directory holding release directories [default: .changelog]
    #[arg(long = "in", value_name = "DIR")]
    pub input: Option<Utf8PathBuf>,
}

impl InputArgs {
    /// Override the configured input directory, if given.
    pub fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.input = input;
        }
    }
}
