use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gearscout_client::{ReqwestFetcher, default_sites};
use gearscout_core::{AggregationEngine, AppError, ScoutConfig, SearchService};

#[derive(Parser)]
#[command(name = "gearscout", version, about = "Search tactical gear across Ukrainian shops")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every shop for a product and print the merged report
    Search {
        /// Product phrase; `_` and `-` work as word separators (сумка_скидання)
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,

        /// List every matching product under its shop
        #[arg(short, long, env = "GEARSCOUT_DETAILS", default_value_t = false)]
        details: bool,

        /// Print the result records as JSON instead of the text report
        #[arg(short, long, default_value_t = false)]
        json: bool,

        /// Give up on unfinished shops after this many seconds (0 = wait for all)
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Only search these shops (repeatable)
        #[arg(short, long = "site")]
        sites: Vec<String>,
    },

    /// List the supported shops and their contacts
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gearscout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            phrase,
            details,
            json,
            deadline_secs,
            sites,
        } => {
            let mut config = ScoutConfig::from_env().context("Invalid configuration")?;
            if let Some(secs) = deadline_secs {
                config = config.with_deadline((secs > 0).then(|| Duration::from_secs(secs)));
            }
            let details = details || config.include_details;
            cmd_search(&phrase.join(" "), config, details, json, &sites).await?;
        }
        Commands::Sites => cmd_sites()?,
    }

    Ok(())
}

async fn cmd_search(
    phrase: &str,
    config: ScoutConfig,
    details: bool,
    json: bool,
    sites: &[String],
) -> Result<()> {
    let fetcher = ReqwestFetcher::with_timeout(config.request_timeout)
        .context("Failed to create HTTP client")?;
    let adapters = default_sites().context("Failed to build the shop catalog")?;
    let service = SearchService::new(AggregationEngine::new(fetcher, config), adapters)
        .only_sites(sites)?;

    tracing::info!(shops = service.adapters().len(), %phrase, "Searching");

    let outcome = match service.search(phrase).await {
        Ok(outcome) => outcome,
        Err(AppError::NoResults { query }) => {
            println!("Нічого не знайдено за запитом «{query}»");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", outcome.to_json(details)?);
    } else {
        println!("{}", outcome.render(details));
    }

    Ok(())
}

fn cmd_sites() -> Result<()> {
    let adapters = default_sites().context("Failed to build the shop catalog")?;

    for adapter in &adapters {
        let contacts = adapter.contacts();
        println!("{}", adapter.name());
        println!("  {}", adapter.search_url("…"));
        for value in [
            &contacts.social_network,
            &contacts.tel_vodafone,
            &contacts.tel_kyivstar,
        ] {
            if !value.is_empty() {
                println!("  {value}");
            }
        }
    }

    println!("\nTotal: {} shops", adapters.len());
    Ok(())
}
