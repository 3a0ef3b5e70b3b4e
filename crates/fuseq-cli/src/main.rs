//! fuseq CLI - Hybrid retrieval queries from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use fuseq_core::{FuseConfig, QueryRequest};
use fuseq_server::QueryService;

/// fuseq - Hybrid vector + lexical retrieval with RRF fusion
#[derive(Parser)]
#[command(name = "fuseq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (default: ~/.config/fuseq/config.toml, then ./fuseq.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a hybrid query against the configured indices
    Query {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Diversity factor 0..1 (0 = pure relevance); omit to skip reranking
        #[arg(long)]
        mmr: Option<f32>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP query server
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_config(path: Option<PathBuf>) -> Result<FuseConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(FuseConfig::load(&path)?),
        None => Ok(FuseConfig::load_default()?),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Query {
            query,
            top_k,
            mmr,
            json,
        } => {
            let service = QueryService::from_config(config)?;
            run_query(&service, &query, top_k, mmr, json).await;
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let service = Arc::new(QueryService::from_config(config)?);
            fuseq_server::serve(service, &bind).await?;
        }
    }

    Ok(())
}

async fn run_query(
    service: &QueryService,
    query: &str,
    top_k: Option<usize>,
    mmr: Option<f32>,
    json: bool,
) {
    let mut request = QueryRequest::new(query);
    request.k = top_k;
    request.mmr = mmr;

    match service.search(&request).await {
        Ok(response) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&response)
                        .expect("response serializes")
                );
            } else {
                print_response(&response);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_response(response: &fuseq_core::QueryResponse) {
    if response.explain.degraded {
        eprintln!("warning: running degraded, at least one source was unavailable");
    }

    if response.results.is_empty() {
        println!("No results.");
        return;
    }

    for hit in &response.results {
        println!("{:>3}. [{:.4}] {}", hit.rank, hit.score, hit.doc_id);
        if let Some(text) = &hit.text {
            let snippet: String = text.chars().take(120).collect();
            println!("     {}", snippet);
        }
    }

    println!(
        "\n{} result(s) in {}ms (strategy: {})",
        response.total_results, response.latency_ms, response.explain.weight_strategy
    );
}
