//! game-scrape CLI — scrape review and catalog indexes into CSV files.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use game_scrape::{CatalogConfig, FetchConfig, ReviewsConfig, catalog, reviews};

#[derive(Debug, Parser)]
#[command(
    name = "game-scrape",
    version,
    about = "Scrape game review and catalog indexes into CSV"
)]
struct Cli {
    /// Print per-page and per-record progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pull review metadata from the JSON review API
    Reviews(ReviewsArgs),
    /// Pull the game catalog from the HTML index
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
struct ReviewsArgs {
    /// API key for the review service
    api_key: String,

    /// Offset at which to start
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Offset at which to end (inclusive); omit to discover the total from
    /// the first page
    #[arg(long)]
    end: Option<u64>,

    /// File to write CSV records to
    #[arg(short = 'w', long = "write-to-file", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Attempts per page before giving up on it
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Override the review API endpoint (debugging hook)
    #[arg(long, hide = true)]
    base_url: Option<String>,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Offset through which to scrape; must be a multiple of 50
    end: u64,

    /// Offset at which to start; must be a multiple of 50
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// File to write CSV records to
    #[arg(short = 'w', long = "write-to-file", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only keep games with a real score (drop not-rated entries)
    #[arg(long)]
    scores_only: bool,

    /// Attempts per page before giving up on it
    #[arg(long, default_value_t = 5)]
    retries: u32,

    /// Maximum number of pages fetched concurrently
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Override the catalog index endpoint (debugging hook)
    #[arg(long, hide = true)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let written = match cli.command {
        Command::Reviews(args) => reviews::run(&reviews_config(args, cli.verbose)).await?,
        Command::Catalog(args) => catalog::run(&catalog_config(args, cli.verbose)).await?,
    };
    tracing::info!(records = written, "scrape finished");
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn reviews_config(args: ReviewsArgs, verbose: bool) -> ReviewsConfig {
    let mut config = ReviewsConfig {
        api_key: args.api_key,
        start: args.start,
        end: args.end,
        output: args.output,
        verbose,
        fetch: FetchConfig {
            retry_bound: args.retries,
        },
        ..ReviewsConfig::default()
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    config
}

fn catalog_config(args: CatalogArgs, verbose: bool) -> CatalogConfig {
    let mut config = CatalogConfig {
        start: args.start,
        end: args.end,
        output: args.output,
        verbose,
        scores_only: args.scores_only,
        max_workers: args.workers,
        fetch: FetchConfig {
            retry_bound: args.retries,
        },
        ..CatalogConfig::default()
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    config
}
