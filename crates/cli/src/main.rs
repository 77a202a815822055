//! redletter command-line entry point.
//!
//! Setup and maintenance commands for the quote cache: seeding the curated
//! quotes, bulk warming, and one-off verse lookups and searches.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "redletter")]
#[command(version, about = "Curated words of Jesus backed by a local verse cache", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
enum Commands {
    /// Create the supported books and curated quotes
    Setup,
    /// Cache verses for every quote
    Warm {
        /// Only warm the first N quotes
        #[arg(long)]
        limit: Option<usize>,
        /// Seconds to wait between quotes
        #[arg(long, default_value_t = 0.0)]
        delay: f64,
    },
    /// Cache uncached quotes one at a time, pausing between them
    WarmSafe {
        /// Number of uncached quotes to process
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Seconds to wait between quotes
        #[arg(long, default_value_t = 2.0)]
        delay: f64,
    },
    /// Look up one verse, e.g. MAT.5.3
    Verse {
        /// Verse identifier
        verse_id: String,
    },
    /// Search verse text through API.Bible
    Search {
        /// Search query
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// 1-based page
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// canonical, relevance or reverse-canonical
        #[arg(long, default_value = "canonical")]
        sort: String,
    },
    /// Delete cached searches older than the freshness window
    PurgeSearch {
        /// Override the age cutoff in hours
        #[arg(long)]
        older_than_hours: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "redletter=info,warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load().await?;

    match cli.command {
        Commands::Setup => commands::setup(&ctx).await,
        Commands::Warm { limit, delay } => commands::warm(&ctx, limit, delay).await,
        Commands::WarmSafe { limit, delay } => commands::warm_safe(&ctx, limit, delay).await,
        Commands::Verse { verse_id } => commands::verse(&ctx, &verse_id).await,
        Commands::Search { query, limit, page, sort } => commands::search(&ctx, query, limit, page, &sort).await,
        Commands::PurgeSearch { older_than_hours } => commands::purge_search(&ctx, older_than_hours).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_warm_safe_defaults() {
        let cli = Cli::try_parse_from(["redletter", "warm-safe"]).unwrap();
        assert_eq!(cli.command, Commands::WarmSafe { limit: 10, delay: 2.0 });
    }

    #[test]
    fn test_warm_flags() {
        let cli = Cli::try_parse_from(["redletter", "warm", "--limit", "5", "--delay", "0.5"]).unwrap();
        assert_eq!(cli.command, Commands::Warm { limit: Some(5), delay: 0.5 });
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from(["redletter", "search", "living water", "--page", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Search { query: "living water".into(), limit: 20, page: 2, sort: "canonical".into() }
        );
    }

    #[test]
    fn test_verse_requires_id() {
        assert!(Cli::try_parse_from(["redletter", "verse"]).is_err());
    }
}
