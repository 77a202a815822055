//! Cache-backed resolution of verses and searches, and quote warming.

pub mod clean;
pub mod search;
pub mod verse;
pub mod warm;

pub use clean::clean_verse_text;
pub use search::{SearchOutcome, SearchResolver};
pub use verse::{ResolvedVerse, VerseResolver};
pub use warm::{QuoteWarmer, WarmGuard, WarmSummary};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators shared by the resolver tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use redletter_core::books::BOOKS;
    use redletter_core::{Book, CacheDb};
    use tokio::sync::Semaphore;
    use tokio::time::Instant;

    use crate::api_bible::{SearchRequest, SearchResponse};
    use crate::error::ApiError;
    use crate::source::{FetchedVerse, SearchSource, VerseSource};

    /// Database with every static book and nothing else.
    pub async fn db_with_books() -> CacheDb {
        let db = CacheDb::open_in_memory().await.unwrap();
        for info in BOOKS {
            let book =
                Book { code: info.code.to_string(), name: info.display_name(), canonical_order: info.canonical_order };
            db.ensure_book(&book).await.unwrap();
        }
        db
    }

    /// Verse source serving a fixed table. Unknown verses answer 404.
    #[derive(Default)]
    pub struct FakeVerses {
        texts: Mutex<HashMap<(String, u32, u32), String>>,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
        gate: Option<Semaphore>,
    }

    impl FakeVerses {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// A source whose fetches block until [`FakeVerses::release`].
        pub fn gated() -> Arc<Self> {
            Arc::new(Self { gate: Some(Semaphore::new(0)), ..Self::default() })
        }

        pub fn with(self: Arc<Self>, slug: &str, chapter: u32, verse: u32, text: &str) -> Arc<Self> {
            self.texts
                .lock()
                .unwrap()
                .insert((slug.to_string(), chapter, verse), text.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn call_times(&self) -> Vec<Instant> {
            self.call_times.lock().unwrap().clone()
        }

        pub fn release(&self, permits: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(permits);
            }
        }
    }

    #[async_trait]
    impl VerseSource for FakeVerses {
        async fn fetch_verse(&self, slug: &str, chapter: u32, verse: u32) -> Result<FetchedVerse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            let text = self
                .texts
                .lock()
                .unwrap()
                .get(&(slug.to_string(), chapter, verse))
                .cloned();
            text.map(|text| FetchedVerse { text }).ok_or(ApiError::HttpError { status: 404 })
        }
    }

    /// Search source returning a canned response, or an error when none is set.
    #[derive(Default)]
    pub struct FakeSearch {
        response: Option<SearchResponse>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        pub fn returning(response: SearchResponse) -> Arc<Self> {
            Arc::new(Self { response: Some(response), ..Self::default() })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchSource for FakeSearch {
        async fn search(&self, _req: &SearchRequest) -> Result<SearchResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(ApiError::Timeout)
        }
    }
}
