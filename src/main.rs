use std::process::ExitCode;

use clap::Parser;

use zanzibar::Config;
use zanzibar::cli::{Cli, Commands};
use zanzibar::commands::{handle_bundle, handle_get, handle_init};
use zanzibar::credentials::ConnectionOverrides;
use zanzibar::error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    zanzibar::logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let overrides = ConnectionOverrides::from(&cli.connection);

    match cli.command {
        Commands::Bundle => handle_bundle(&config, &overrides, &cli.dir, false).await,
        Commands::Update => handle_bundle(&config, &overrides, &cli.dir, true).await,
        Commands::Get { id, label, path } => {
            handle_get(&config, &overrides, &cli.dir, id, &label, path).await
        }
        Commands::Init { force } => handle_init(&config, &overrides, &cli.dir, force),
    }
}
