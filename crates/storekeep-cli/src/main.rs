mod catalog;
mod env_check;
mod stamp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storekeep")]
#[command(about = "Storefront catalog checks and build helpers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare Supabase products against active and archived Polar products
    Status {
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Exit with an error when any product is not OK
        #[arg(long)]
        fail_on_problems: bool,
    },
    /// Find Supabase products sharing a handle, title, or Polar product id
    Duplicates {
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List active Polar products with their current price
    Products,
    /// Link products that are not OK to active Polar products with a matching title
    FixMappings {
        /// Print the proposed changes without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Show which configuration variables are set
    EnvCheck,
    /// Write the commit hash and branch into index.html meta tags
    StampVersion {
        /// Path to the HTML file (defaults to STOREKEEP_INDEX_HTML)
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

/// `RUST_LOG` first, then `STOREKEEP_LOG_LEVEL`, then `info`. Read straight
/// from the environment so logging works even when the rest of the
/// configuration does not parse.
fn log_directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["RUST_LOG", "STOREKEEP_LOG_LEVEL"]
        .into_iter()
        .filter_map(&lookup)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty() && EnvFilter::try_new(v).is_ok())
        .unwrap_or_else(|| "info".to_string())
}

fn load_config() -> anyhow::Result<storekeep_core::AppConfig> {
    Ok(storekeep_core::load_app_config_from_env()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directive(|var| std::env::var(var).ok())))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Status {
            json,
            fail_on_problems,
        } => catalog::run_status(&load_config()?, json, fail_on_problems).await?,
        Commands::Duplicates { json } => catalog::run_duplicates(&load_config()?, json).await?,
        Commands::Products => catalog::run_products(&load_config()?).await?,
        Commands::FixMappings { dry_run } => {
            catalog::run_fix_mappings(&load_config()?, dry_run).await?;
        }
        Commands::EnvCheck => env_check::run_env_check()?,
        Commands::StampVersion { index } => {
            let path = match index {
                Some(path) => path,
                None => load_config()?.index_html_path,
            };
            stamp::run_stamp_version(&path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
