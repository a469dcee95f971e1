//! Command definitions.

use clap::Subcommand;
use std::path::PathBuf;

/// Top-level commands available in zanzibar.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every secret in the Zanzifile that is missing or changed locally
    Bundle,
    /// Re-download every secret in the Zanzifile, even if unchanged locally
    Update,
    /// Fetch a single secret by id
    Get {
        /// Secret id
        id: i64,

        /// Field to fetch. "Password" prints the value; any other field is downloaded as a file
        #[arg(short, long, default_value = "Password")]
        label: String,

        /// Directory to download file fields into (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Create a template Zanzifile in the project directory
    Init {
        /// Overwrite an existing Zanzifile
        #[arg(short, long)]
        force: bool,
    },
}
