//! Command-line interface definitions.

mod args;
mod commands;

pub use args::{Cli, ConnectionArgs};
pub use commands::Commands;
