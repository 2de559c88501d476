use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use scamcheck::config::Config;
use scamcheck::scoring::{analyze_url, RuleSet};
use scamcheck::web::handlers::analyze::AnalyzeResponse;

/// scamcheck: heuristic scam-likelihood scoring for URLs.
///
/// Flags scam keywords, unusual domain extensions and impersonation of
/// South African government sites and institutions. This is a fixed rule
/// list, not a threat-intelligence lookup.
#[derive(Parser)]
#[command(name = "scamcheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (POST /analyze)
    Serve {
        /// Address to bind (overrides SCAMCHECK_BIND)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides SCAMCHECK_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Score a single URL and print the verdict
    Check {
        /// The URL to score
        url: String,

        /// Print the API's JSON response instead of the formatted view
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("scamcheck=info,tower_http=info")
                }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, port } => {
            let mut config = Config::load()?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting scamcheck API...");
            scamcheck::web::run_server(config).await?;
        }

        Commands::Check { url, json } => {
            let verdict = analyze_url(&url, &RuleSet::default());
            if json {
                let body = AnalyzeResponse::from(verdict);
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                scamcheck::output::terminal::display_verdict(&url, &verdict);
            }
        }
    }

    Ok(())
}
