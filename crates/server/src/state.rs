//! Shared server state.

use std::sync::Arc;

use redletter_client::{
    ApiBibleClient, ApiBibleConfig, QuoteWarmer, SearchResolver, SearchSource, VerseCdnClient, VerseCdnConfig,
    VerseResolver, VerseSource,
};
use redletter_core::{AppConfig, CacheDb, Error};

use crate::schedule::WarmScheduler;

/// Everything a tool call needs. Built once at startup and shared by
/// reference, so the warm guard and scheduler state are process-wide.
pub struct AppState {
    pub db: CacheDb,
    pub config: AppConfig,
    pub verses: VerseResolver,
    pub search: SearchResolver,
    pub warmer: QuoteWarmer,
    pub scheduler: WarmScheduler,
}

impl AppState {
    /// Wire up the HTTP clients described by `config`.
    pub fn new(db: CacheDb, config: AppConfig) -> Result<Self, Error> {
        if let Err(e) = config.require_api_bible_key() {
            tracing::warn!(error = %e, "verse search will return no results");
        }

        let verse_source = Arc::new(VerseCdnClient::new(VerseCdnConfig::from(&config))?);
        let search_source = Arc::new(ApiBibleClient::new(ApiBibleConfig::from(&config))?);
        let scheduler = WarmScheduler::from_config(&config);
        Ok(Self::with_sources(db, config, verse_source, search_source, scheduler))
    }

    /// Build state around explicit collaborators.
    pub fn with_sources(
        db: CacheDb, config: AppConfig, verse_source: Arc<dyn VerseSource>, search_source: Arc<dyn SearchSource>,
        scheduler: WarmScheduler,
    ) -> Self {
        let verses = VerseResolver::new(db.clone(), verse_source);
        let search = SearchResolver::new(db.clone(), search_source, config.search_freshness());
        let warmer = QuoteWarmer::new(verses.clone(), config.warm_delay());

        Self { db, config, verses, search, warmer, scheduler }
    }
}
