//! Command implementations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use redletter_client::{
    ApiBibleClient, ApiBibleConfig, QuoteWarmer, SearchRequest, SearchResolver, SearchSort, VerseCdnClient,
    VerseCdnConfig, VerseResolver, WarmSummary,
};
use redletter_core::{AppConfig, CacheDb, seed};

/// Everything a command needs, built from configuration.
pub struct Context {
    pub config: AppConfig,
    pub db: CacheDb,
    pub api: ApiBibleClient,
    pub verses: VerseResolver,
    pub search: SearchResolver,
    pub warmer: QuoteWarmer,
}

impl Context {
    pub async fn load() -> Result<Self> {
        let config = AppConfig::load().context("failed to load configuration")?;
        let db = CacheDb::open(&config.db_path)
            .await
            .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;

        let api = ApiBibleClient::new(ApiBibleConfig::from(&config))?;
        let cdn = VerseCdnClient::new(VerseCdnConfig::from(&config))?;
        let verses = VerseResolver::new(db.clone(), Arc::new(cdn));
        let search = SearchResolver::new(db.clone(), Arc::new(api.clone()), config.search_freshness());
        let warmer = QuoteWarmer::new(verses.clone(), config.warm_delay());

        Ok(Self { config, db, api, verses, search, warmer })
    }
}

/// Seconds from the command line as a Duration.
fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid delay: {value}"))
}

pub async fn setup(ctx: &Context) -> Result<()> {
    let names = if ctx.api.has_api_key() {
        match ctx.api.books().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch book names, using built-in names");
                HashMap::new()
            }
        }
    } else {
        tracing::info!("no API.Bible key, using built-in book names");
        HashMap::new()
    };

    let report = seed::seed(&ctx.db, &names).await?;
    println!("Created {} books and {} quotes", report.books_created, report.quotes_created);
    for skipped in &report.skipped {
        println!("Skipped malformed reference: {skipped}");
    }
    Ok(())
}

fn print_summary(summary: &WarmSummary) {
    let total = summary.quotes.len();
    for (i, quote) in summary.quotes.iter().enumerate() {
        if quote.fetched > 0 {
            println!("[{}/{total}] Cached {} {} ({} verses)", i + 1, quote.book_name, quote.reference, quote.fetched);
        } else {
            println!("[{}/{total}] Already cached: {} {}", i + 1, quote.book_name, quote.reference);
        }
    }
    println!(
        "Processed {total} quotes, cached {} new ones ({} verses)",
        summary.newly_cached(),
        summary.fetched()
    );
}

pub async fn warm(ctx: &Context, limit: Option<usize>, delay: f64) -> Result<()> {
    let between = seconds(delay)?;
    let Some(summary) = ctx.warmer.warm_all(limit, between).await else {
        bail!("another warm pass is already running");
    };
    print_summary(&summary);
    Ok(())
}

pub async fn warm_safe(ctx: &Context, limit: usize, delay: f64) -> Result<()> {
    let between = seconds(delay)?;
    let quotes = ctx.db.uncached_quotes(limit).await?;
    println!("Found {} uncached quotes", quotes.len());

    let Some(summary) = ctx.warmer.warm_batch(&quotes, between).await else {
        bail!("another warm pass is already running");
    };
    print_summary(&summary);
    Ok(())
}

pub async fn verse(ctx: &Context, verse_id: &str) -> Result<()> {
    let verse = ctx.verses.try_resolve(verse_id.trim()).await?;
    let source = if verse.cached { "cache" } else { "remote" };
    println!("{} ({source})", verse.reference);
    println!("{}", verse.text);
    Ok(())
}

pub async fn search(ctx: &Context, query: String, limit: u32, page: u32, sort: &str) -> Result<()> {
    let sort: SearchSort = sort.parse()?;
    let offset = page.max(1).saturating_sub(1).saturating_mul(limit);
    let req = SearchRequest { query, limit, offset, sort };
    req.validate()?;

    if !ctx.api.has_api_key() {
        tracing::warn!("REDLETTER_API_BIBLE_KEY not set; search will return no results");
    }

    let outcome = ctx.search.search(&req).await;
    let results = outcome.results;
    println!(
        "{} of {} results for \"{}\"{}",
        results.verses.len(),
        results.total,
        results.query,
        if outcome.cache_hit { " (cached)" } else { "" }
    );
    for verse in &results.verses {
        println!("{}: {}", verse.reference, verse.text);
    }
    Ok(())
}

pub async fn purge_search(ctx: &Context, older_than_hours: Option<u64>) -> Result<()> {
    let max_age = match older_than_hours {
        Some(hours) => i64::try_from(hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .context("age out of range")?,
        None => ctx.config.search_freshness(),
    };
    let deleted = ctx.db.purge_stale_search(max_age).await?;
    println!("Deleted {deleted} cached searches");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(2.0).unwrap(), Duration::from_secs(2));
        assert_eq!(seconds(0.5).unwrap(), Duration::from_millis(500));
        assert!(seconds(-1.0).is_err());
        assert!(seconds(f64::NAN).is_err());
    }
}
