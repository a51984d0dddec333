// Entrypoint for the CLI application.
// - Parses arguments, sets up logging and loads the credential file.
// - A missing or unreadable credential file ends the run with an error.

use clap::Parser;
use reporter_cli::cli::Cli;
use reporter_cli::{logging, ui, CredentialStore, ReportingClient};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{e}");
    }

    let path = CredentialStore::locate(cli.config.as_deref());
    let store = CredentialStore::load(&path)?;
    if !store.has_token() {
        println!("You don't have token. Please generate it first.");
    }

    let mut client = ReportingClient::from_store(store)?;
    ui::run(&mut client, cli.command)?;
    Ok(())
}
