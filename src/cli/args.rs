//! CLI argument parsing structures.

use clap::{Args, Parser};
use std::path::PathBuf;

use super::commands::Commands;
use crate::credentials::ConnectionOverrides;

/// Main CLI structure for zanzibar.
#[derive(Parser, Debug)]
#[command(name = "zanzibar", version)]
#[command(about = "Fetch secrets from Secret Server into your project", long_about = None)]
pub struct Cli {
    /// Project directory containing the Zanzifile
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings that override the Zanzifile and config file.
#[derive(Debug, Default, Args)]
pub struct ConnectionArgs {
    /// Secret Server username (defaults to the current user)
    #[arg(short, long, global = true, env = "ZANZIBAR_USER")]
    pub username: Option<String>,

    /// URL of the Secret Server WSDL
    #[arg(short, long, global = true, env = "ZANZIBAR_WSDL")]
    pub wsdl: Option<String>,

    /// Secret Server login domain
    #[arg(short, long, global = true, env = "ZANZIBAR_DOMAIN")]
    pub domain: Option<String>,

    /// Do not verify the server's TLS certificate
    #[arg(short = 'k', long, global = true)]
    pub ignore_ssl: bool,

    /// Secret Server password
    #[arg(long, env = "ZANZIBAR_PASSWORD", hide = true, hide_env_values = true)]
    pub password: Option<String>,
}

impl From<&ConnectionArgs> for ConnectionOverrides {
    fn from(args: &ConnectionArgs) -> Self {
        Self {
            username: args.username.clone(),
            password: args.password.clone(),
            wsdl: args.wsdl.clone(),
            domain: args.domain.clone(),
            ignore_ssl: args.ignore_ssl,
        }
    }
}
