mod cache;
mod config;
mod error;
mod finder;
mod render;
mod server;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use metric_common::normalize::{build_table, decode_body, ResultTable};
use metric_common::redis::RedisCache;
use metric_common::webhook::WebhookClient;

use cache::ResponseCache;
use config::Config;
use error::AppError;
use finder::MetricFinder;
use render::OutputFormat;
use server::MetricFinderServer;

#[derive(Parser)]
#[command(name = "metric-finder", version, about = "Rank the product metrics reviewers mention most")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a product idea to the research webhook and print the ranked metrics.
    Query {
        /// Product idea. Read from stdin when omitted.
        idea: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Also print the raw webhook response (debug view) to stderr.
        #[arg(long)]
        raw: bool,
        /// Ignore any cached response and call the webhook again.
        #[arg(long)]
        no_cache: bool,
    },
    /// Normalize a saved webhook response without calling the webhook.
    Parse {
        /// Response body file. Read from stdin when omitted.
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Serve the finder as an MCP tool on stdio.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the table or MCP JSON-RPC.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match Cli::parse().command {
        Command::Query { idea, format, raw, no_cache } => {
            let idea = match idea {
                Some(idea) => idea,
                None => read_stdin()?.trim().to_string(),
            };
            let finder = build_finder().await?;
            let lookup = finder.find(&idea, no_cache).await?;
            print!("{}", render_output(&lookup.table, format)?);
            if raw {
                eprintln!("Raw webhook response (debug):\n{}", render::render_raw(&lookup.raw));
            }
        }
        Command::Parse { file, format } => {
            let body = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_stdin()?,
            };
            let table = build_table(&decode_body(&body));
            print!("{}", render_output(&table, format)?);
        }
        Command::Serve => serve().await?,
    }
    Ok(())
}

async fn build_finder() -> Result<MetricFinder, AppError> {
    let config = Config::from_env()?;
    info!(
        url = %config.webhook.url,
        timeout_ms = config.webhook.timeout.as_millis(),
        max_retries = config.webhook.max_retries,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    let cache = match config.redis_url.as_deref() {
        Some(url) => {
            let cache = ResponseCache::new(RedisCache::new(Some(url)), config.cache_ttl_secs);
            if cache.is_available().await {
                info!(ttl_secs = config.cache_ttl_secs, "redis connected");
                cache
            } else {
                info!("redis unavailable, running without response cache");
                ResponseCache::disabled()
            }
        }
        None => {
            info!("REDIS_URL not set, running without response cache");
            ResponseCache::disabled()
        }
    };

    let client = WebhookClient::new(config.webhook)?;
    Ok(MetricFinder::new(client, cache))
}

async fn serve() -> anyhow::Result<()> {
    info!("starting metric-finder MCP server");
    let finder = Arc::new(build_finder().await?);
    let server = MetricFinderServer::new(finder);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

fn render_output(table: &ResultTable, format: OutputFormat) -> anyhow::Result<String> {
    Ok(render::render(table, format)?)
}

fn read_stdin() -> Result<String, AppError> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
