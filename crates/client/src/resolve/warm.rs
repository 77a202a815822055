//! Quote cache warming.
//!
//! Warming walks a quote's verse identifiers, attaching verses that are
//! already cached and fetching the rest. Only one pass runs at a time per
//! warmer: a call made while another pass holds the guard returns at once
//! with nothing done.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use redletter_core::{Quote, VerseId};
use serde::Serialize;

use super::verse::VerseResolver;

/// Held for the duration of a warm pass; dropping it releases the warmer.
#[derive(Debug)]
pub struct WarmGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for WarmGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Per-quote line of a bulk pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteWarmReport {
    pub quote_id: i64,
    pub book_name: String,
    pub reference: String,
    /// Verses fetched remotely for this quote.
    pub fetched: usize,
}

/// Result of a bulk pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmSummary {
    pub quotes: Vec<QuoteWarmReport>,
}

impl WarmSummary {
    pub fn fetched(&self) -> usize {
        self.quotes.iter().map(|q| q.fetched).sum()
    }

    /// Quotes that needed at least one remote fetch.
    pub fn newly_cached(&self) -> usize {
        self.quotes.iter().filter(|q| q.fetched > 0).count()
    }
}

/// Spaces remote fetches within one pass: the first goes out immediately,
/// every later one waits `delay`.
struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self { delay, started: false }
    }

    async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

/// Populates the verse cache for quotes.
///
/// Clones share the same guard, so cloning a warmer into a background task
/// keeps passes single-flight.
#[derive(Clone)]
pub struct QuoteWarmer {
    resolver: VerseResolver,
    busy: Arc<AtomicBool>,
    delay: Duration,
}

impl QuoteWarmer {
    pub fn new(resolver: VerseResolver, delay: Duration) -> Self {
        Self { resolver, busy: Arc::new(AtomicBool::new(false)), delay }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the warmer, or `None` while another pass holds it.
    pub fn try_acquire(&self) -> Option<WarmGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WarmGuard { flag: Arc::clone(&self.busy) })
    }

    /// Warm one quote. Returns the number of verses fetched remotely, or 0
    /// when another pass is running.
    pub async fn warm_quote(&self, quote: &Quote) -> usize {
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!(quote_id = quote.id, "warm already in progress");
            return 0;
        };

        let mut pacer = Pacer::new(self.delay);
        self.warm_locked(quote, &mut pacer).await
    }

    /// Warm up to `max` quotes that have no cached verses yet, under one
    /// guard. Returns the total number of verses fetched.
    pub async fn warm_uncached(&self, max: usize) -> usize {
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!("warm already in progress");
            return 0;
        };

        let quotes = match self.resolver.db().uncached_quotes(max).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load uncached quotes");
                return 0;
            }
        };

        let mut pacer = Pacer::new(self.delay);
        let mut fetched = 0;
        for quote in &quotes {
            fetched += self.warm_locked(quote, &mut pacer).await;
        }

        if fetched > 0 {
            tracing::info!(quotes = quotes.len(), fetched, "warmed uncached quotes");
        }
        fetched
    }

    /// Warm every quote, or the first `limit` in listing order.
    ///
    /// Returns `None` when another pass is running.
    pub async fn warm_all(&self, limit: Option<usize>, between_quotes: Duration) -> Option<WarmSummary> {
        let quotes = match self.resolver.db().all_quotes(limit).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load quotes");
                Vec::new()
            }
        };
        self.warm_batch(&quotes, between_quotes).await
    }

    /// Warm the given quotes in order under one guard, pausing
    /// `between_quotes` between consecutive quotes.
    pub async fn warm_batch(&self, quotes: &[Quote], between_quotes: Duration) -> Option<WarmSummary> {
        let _guard = self.try_acquire()?;

        let mut pacer = Pacer::new(self.delay);
        let mut summary = WarmSummary::default();
        for (i, quote) in quotes.iter().enumerate() {
            if i > 0 && !between_quotes.is_zero() {
                tokio::time::sleep(between_quotes).await;
            }

            let fetched = self.warm_locked(quote, &mut pacer).await;
            tracing::info!(
                index = i + 1,
                total = quotes.len(),
                book = %quote.book_name,
                reference = %quote.reference,
                fetched,
                "warmed quote"
            );
            summary.quotes.push(QuoteWarmReport {
                quote_id: quote.id,
                book_name: quote.book_name.clone(),
                reference: quote.reference.clone(),
                fetched,
            });
        }

        Some(summary)
    }

    async fn warm_locked(&self, quote: &Quote, pacer: &mut Pacer) -> usize {
        let mut fetched = 0;

        for verse_id in &quote.verse_ids {
            if self.resolver.lookup_cached(verse_id).await.is_some() {
                self.attach(quote.id, verse_id).await;
                continue;
            }

            let id = match VerseId::parse(verse_id).and_then(|id| id.book().map(|_| id)) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(quote_id = quote.id, %verse_id, error = %e, "skipping verse");
                    continue;
                }
            };

            pacer.wait().await;
            match self.resolver.fetch_remote(verse_id, &id).await {
                Ok(_) => {
                    fetched += 1;
                    self.attach(quote.id, verse_id).await;
                }
                Err(e) => tracing::warn!(quote_id = quote.id, %verse_id, error = %e, "failed to warm verse"),
            }
        }

        fetched
    }

    async fn attach(&self, quote_id: i64, verse_id: &str) {
        if let Err(e) = self.resolver.db().attach_verse(quote_id, verse_id).await {
            tracing::warn!(quote_id, verse_id, error = %e, "failed to attach verse");
        }
    }
}
