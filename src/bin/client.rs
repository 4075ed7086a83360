//! Booklend Client - sends loan requests to a running server
//!
//! Request lines (`<type>, <name>, <isbn>`) come from a batch file or, if
//! none is given, from stdin.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::BufReader;

use booklend::{
    client::{self, Requester},
    config::AppConfig,
    logging,
};

/// Library loan client.
#[derive(Parser)]
#[command(name = "booklend-client", version, about = "Library loan client")]
struct Cli {
    /// Server inbound pipe.
    #[arg(short = 'p', long = "pipe")]
    pipe: PathBuf,

    /// Batch file of request lines.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    logging::init(&config.logging, false);

    let mut requester = Requester::connect(&cli.pipe, &config.reply.directory, config.client.clone()).await?;
    tracing::info!(id = requester.id(), "Connected to {}", cli.pipe.display());

    let mut stdout = tokio::io::stdout();
    let summary = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            client::run_batch(&mut requester, BufReader::new(file), &mut stdout).await?
        }
        None => client::run_batch(&mut requester, BufReader::new(tokio::io::stdin()), &mut stdout).await?,
    };

    if !summary.quit_sent {
        tracing::info!("No quit request was sent; the server keeps running");
    }
    tracing::info!(
        sent = summary.sent,
        answered = summary.answered,
        skipped = summary.skipped,
        "Done"
    );
    Ok(())
}
