//! One-shot CLI over the searcrawl pipeline
//!
//! Uses the same environment configuration and renderer lifecycle as the
//! server, runs a single search or crawl, and prints the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use searcrawl::{CrawlRequest, SearchRequest};
use server_core::kernel::{logging::init_tracing, ServerDeps};
use server_core::Config;

#[derive(Parser)]
#[command(name = "searcrawl_cli")]
#[command(about = "Search the web and extract page content as plain text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, then crawl every result URL
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Comma-separated SearXNG engine ids to disable
        #[arg(long)]
        disabled_engines: Option<String>,
        /// Comma-separated SearXNG engine ids to enable
        #[arg(long)]
        enabled_engines: Option<String>,
    },

    /// Crawl the given URLs
    Crawl {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value = "")]
        instruction: String,
    },

    /// Print the effective configuration
    Config,
}

/// What the pipeline is asked to do.
enum Job {
    Search(SearchRequest),
    Crawl(CrawlRequest),
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let job = match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.summary())?);
            return Ok(());
        }
        Commands::Search {
            query,
            limit,
            disabled_engines,
            enabled_engines,
        } => Job::Search(SearchRequest {
            query,
            limit,
            disabled_engines,
            enabled_engines,
        }),
        Commands::Crawl { urls, instruction } => Job::Crawl(CrawlRequest::new(urls, instruction)),
    };

    let deps = ServerDeps::from_config(&config)?;
    deps.start().await?;

    let outcome = match &job {
        Job::Search(request) => deps.pipeline.search(request).await,
        Job::Crawl(request) => deps.pipeline.crawl(request).await,
    };
    deps.shutdown().await;

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
