//! Fixtures for tool tests: a seeded in-memory database and fake remotes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redletter_client::{
    ApiError, FetchedVerse, SearchRequest, SearchResponse, SearchSource, SearchVerse, VerseSource,
};
use redletter_core::{AppConfig, CacheDb, seed};

use crate::schedule::WarmScheduler;
use crate::state::AppState;

#[derive(Default)]
pub struct FakeVerses {
    texts: HashMap<(String, u32, u32), String>,
    calls: AtomicUsize,
}

impl FakeVerses {
    pub fn with(mut self, slug: &str, chapter: u32, verse: u32, text: &str) -> Self {
        self.texts.insert((slug.to_string(), chapter, verse), text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerseSource for FakeVerses {
    async fn fetch_verse(&self, slug: &str, chapter: u32, verse: u32) -> Result<FetchedVerse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .get(&(slug.to_string(), chapter, verse))
            .map(|text| FetchedVerse { text: text.clone() })
            .ok_or(ApiError::HttpError { status: 404 })
    }
}

/// Answers every search with two hits for `MAT.7.7` and `MAT.7.8`, echoing
/// the requested window in `total`.
#[derive(Default)]
pub struct FakeSearch {
    calls: AtomicUsize,
}

impl FakeSearch {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchSource for FakeSearch {
    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hit = |verse: u32, text: &str| SearchVerse {
            id: format!("MAT.7.{verse}"),
            reference: format!("Matthew 7:{verse}"),
            text: format!("{verse} <span>{text}</span>"),
            book_id: "MAT".into(),
            chapter_id: "MAT.7".into(),
        };
        Ok(SearchResponse {
            verses: vec![hit(7, "Ask, and it shall be given you"), hit(8, "For every one that asketh receiveth")],
            total: 45,
            query: req.query.clone(),
        })
    }
}

pub struct Fixture {
    pub state: AppState,
    pub verses: Arc<FakeVerses>,
    pub search: Arc<FakeSearch>,
}

/// Seeded state whose scheduler never fires.
pub async fn fixture(verses: FakeVerses) -> Fixture {
    fixture_with_scheduler(verses, WarmScheduler::with_roll(0.0, Duration::ZERO, 2, || 0.0)).await
}

pub async fn fixture_with_scheduler(verses: FakeVerses, scheduler: WarmScheduler) -> Fixture {
    let db = CacheDb::open_in_memory().await.unwrap();
    seed::seed(&db, &HashMap::new()).await.unwrap();

    let config = AppConfig { warm_delay_ms: 0, ..AppConfig::default() };
    let verses = Arc::new(verses);
    let search = Arc::new(FakeSearch::default());
    let state = AppState::with_sources(db, config, verses.clone(), search.clone(), scheduler);
    Fixture { state, verses, search }
}
