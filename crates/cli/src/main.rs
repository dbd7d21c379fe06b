// ABOUTME: smartyshop command line front-end over the product service.
// ABOUTME: Scrapes listings, prints the top-rated view, asks the assistant; output is JSON on stdout.

use std::fs;
use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use smartyshop_scrapers::Product;
use smartyshop_service::{ProductService, Settings};
use tracing_subscriber::EnvFilter;

/// Search Turkish e-commerce sites and ask a shopping assistant about the results.
#[derive(Parser, Debug)]
#[command(name = "smartyshop")]
#[command(about = "Scrape product listings and query a shopping assistant", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    /// Assistant model (overrides GEMINI_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    /// Assistant API origin (overrides GEMINI_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// User agent sent to the shops (overrides SMARTYSHOP_USER_AGENT).
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Timeout for every outbound request in seconds (overrides SMARTYSHOP_TIMEOUT_SECS).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch listings for a query, served from the cache while fresh.
    Products {
        /// Site identifier, see `smartyshop sites`.
        #[arg(long)]
        site: String,

        /// Search query.
        #[arg(long)]
        query: String,

        /// Print only the N best-rated listings.
        #[arg(long, num_args = 0..=1, default_missing_value = "10")]
        top: Option<usize>,
    },

    /// Ask the assistant a question about a product list.
    Ask {
        /// The question.
        #[arg(long)]
        question: String,

        /// JSON array of products to analyze. Use "-" for stdin. Without it the
        /// default site is scraped for the question.
        #[arg(long)]
        products: Option<String>,
    },

    /// List the supported site identifiers.
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let settings = settings(&args)?;

    let output = match &args.command {
        Command::Products { site, query, top } => {
            let service = ProductService::from_settings(&settings)?;
            let products = service.products(site, query).await?;
            match top {
                Some(n) => serde_json::to_value(service.top(site, query, *n)?)?,
                None => serde_json::to_value(products)?,
            }
        }
        Command::Ask { question, products } => {
            settings.require_api_key()?;
            let supplied = match products {
                Some(source) => load_products(source)?,
                None => Vec::new(),
            };
            let service = ProductService::from_settings(&settings)?;
            serde_json::to_value(service.ask(question, supplied).await?)?
        }
        Command::Sites => {
            let service = ProductService::from_settings(&settings)?;
            serde_json::to_value(service.sites())?
        }
    };

    print_json(&output, args.compact)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Environment settings with command line overrides applied.
fn settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(user_agent) = &args.user_agent {
        settings.user_agent = user_agent.clone();
    }
    if let Some(secs) = args.timeout_secs {
        settings.timeout = Duration::from_secs(secs);
    }
    Ok(settings)
}

fn load_products(source: &str) -> Result<Vec<Product>> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("reading products from {source}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("parsing products from {source}"))
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use smartyshop_service::TOP_N;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn top_flag_defaults_to_ten() {
        let args = Args::parse_from(["smartyshop", "products", "--site", "amazon", "--query", "tv", "--top"]);
        match args.command {
            Command::Products { top, .. } => assert_eq!(top, Some(TOP_N)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Args::try_parse_from(["smartyshop", "sites", "--timeout-secs", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        let args = Args::try_parse_from(["smartyshop", "sites", "--timeout-secs", "5"]).unwrap();
        assert_eq!(args.timeout_secs, Some(5));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::parse_from(["smartyshop", "sites", "--compact", "--model", "m"]);
        assert!(args.compact);
        assert_eq!(args.model.as_deref(), Some("m"));
    }
}
