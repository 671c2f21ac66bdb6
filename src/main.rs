mod cli;
mod dates;
mod downloads;
mod error;
mod fmt;
mod importer;
mod models;
mod reconciler;
mod reshaper;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => cli::update::run(&cli.update),
        Some(Commands::Init) => cli::init::run(&cli.update.dirs),
        Some(Commands::Status) => cli::status::run(&cli.update.dirs),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
