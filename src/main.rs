//! Terminal front-end for the URL shortener API.
//!
//! Logs in with the same cookie-based session a browser would use, then lets
//! the user shorten URLs, browse and delete their own links, and read visit
//! analytics.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session (default)
//! cargo run --bin shortener
//!
//! # Shorten one URL without logging in
//! cargo run --bin shortener -- shorten https://example.com/some/long/path
//!
//! # Point at another deployment
//! cargo run --bin shortener -- --api-url https://short.example.com/api
//!
//! # Show the effective configuration
//! cargo run --bin shortener -- config
//! ```
//!
//! # Environment Variables
//!
//! See [`url_shortener_client::config`]. A `.env` file in the working directory
//! is loaded first.

mod shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use url_shortener_client::config::ClientConfig;
use url_shortener_client::{ApiClient, logging};

/// Terminal client for the URL shortener.
#[derive(Parser)]
#[command(name = "shortener")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API root URL
    #[arg(long, global = true, env = "SHORTENER_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Shell,

    /// Shorten a URL anonymously and print its short ID
    Shorten {
        /// The long URL to shorten
        url: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()?.with_api_url(cli.api_url);
    config.validate().context("Invalid configuration")?;

    logging::init(&config)?;
    config.print_summary();

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let client = ApiClient::new(&config)?;
            shell::run(&client).await?;
        }
        Commands::Shorten { url } => {
            let client = ApiClient::new(&config)?;
            shorten_once(&client, &url).await?;
        }
        Commands::Config => print_config(&config),
    }

    Ok(())
}

/// Shortens one URL without a session.
async fn shorten_once(client: &ApiClient, url: &str) -> Result<()> {
    let short_id = client
        .urls()
        .generate_random_short_id(url)
        .await
        .with_context(|| format!("Failed to shorten {url}"))?;

    println!("{} {}", "Short ID:".bright_white().bold(), short_id.bright_yellow());
    println!(
        "{} {}",
        "Link:    ".bright_white().bold(),
        shell::render::short_link(client, &short_id).cyan()
    );

    Ok(())
}

/// Prints the configuration summary to stdout.
fn print_config(config: &ClientConfig) {
    println!("{}", "Configuration".bright_blue().bold());
    println!();
    for (label, value) in config.summary_lines() {
        println!("  {:<12} {}", label.bright_white(), value.cyan());
    }
    println!();
}
