use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use exa_retrieval::http::HttpClient;
use exa_retrieval::rate_limit::RateLimitTracker;
use exa_retrieval::{
    ExaConfig, ExaContentsProvider, ExaSimilarProvider, ExtractDepth, ProcessingProvider,
    ProcessingResult,
};

/// exa-retrieval - fetch page contents and similar pages from Exa
///
/// The API key is read from --api-key or the EXA_API_KEY environment variable.
///
/// Examples:
///   exa-retrieval contents <ID>...          # Full text for search result IDs
///   exa-retrieval similar https://site.tld  # Pages similar to a URL
#[derive(Parser, Debug)]
#[command(author, version = env!("EXA_RETRIEVAL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Exa API key
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Exa API base URL (defaults to https://api.exa.ai)
    #[arg(long = "base-url", env = "EXA_BASE_URL", value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Maximum number of attempts per request, including the first one
    #[arg(long = "max-attempts", value_name = "N", global = true)]
    max_attempts: Option<usize>,

    /// Print the whole result as JSON instead of the combined document
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch full contents for previously returned result IDs
    Contents(ContentsArgs),

    /// Find pages similar to a URL (only the first URL is used)
    Similar(SimilarArgs),
}

#[derive(clap::Args, Debug)]
struct ContentsArgs {
    /// Exa result IDs
    #[arg(value_name = "ID", required = true)]
    ids: Vec<String>,

    /// Extraction depth: basic or advanced
    #[arg(long, short = 'd', default_value = "basic")]
    depth: ExtractDepth,
}

#[derive(clap::Args, Debug)]
struct SimilarArgs {
    /// Page URL to compare against
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Extraction depth: basic or advanced
    #[arg(long, short = 'd', default_value = "basic")]
    depth: ExtractDepth,
}

fn build_config(cli: &Cli) -> ExaConfig {
    let mut config = ExaConfig::new(cli.api_key.clone());
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    config
}

fn print_result(result: &ProcessingResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        println!("{}", out);
    } else {
        print!("{}", result.content);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = build_config(&cli);
    let http_client = HttpClient::from_config(&config, Arc::new(RateLimitTracker::new()))?;

    let result = match cli.command {
        Commands::Contents(ref args) => {
            let provider = ExaContentsProvider::new(http_client, &config)?;
            provider.process(args.ids.clone().into(), args.depth).await?
        }
        Commands::Similar(ref args) => {
            let provider = ExaSimilarProvider::new(http_client, &config)?;
            provider.process(args.urls.clone().into(), args.depth).await?
        }
    };

    print_result(&result, cli.json)
}
