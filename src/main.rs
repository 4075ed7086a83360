//! Booklend Server - library loan service
//!
//! Serves loan, return and renewal requests arriving on a named pipe.

use std::path::PathBuf;

use clap::Parser;

use booklend::{
    config::AppConfig,
    logging,
    server::{console, Server, ServerOptions},
};

/// Library loan server.
#[derive(Parser)]
#[command(name = "booklend-server", version, about = "Library loan server")]
struct Cli {
    /// Inbound pipe that requesters write to.
    #[arg(short = 'p', long = "pipe")]
    pipe: PathBuf,

    /// Catalog file to load at startup.
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Log every received request.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Write the final catalog here on shutdown.
    #[arg(short = 's', long = "save")]
    save: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    logging::init(&config.logging, cli.verbose);
    tracing::info!("Starting Booklend Server v{}", env!("CARGO_PKG_VERSION"));

    let options = ServerOptions {
        inbound: cli.pipe,
        catalog: cli.file,
        save_to: cli.save,
        verbose: cli.verbose,
    };

    let summary = Server::new(config, options)
        .run(console::spawn_stdin_reader(), tokio::io::stdout())
        .await?;

    tracing::info!(
        loans = summary.ingress.loans,
        settled = summary.settled,
        dropped = summary.ingress.dropped,
        "Goodbye"
    );
    Ok(())
}
