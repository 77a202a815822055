//! Opportunistic cache warming.
//!
//! Listing requests occasionally kick off a small background warm pass so
//! the cache fills up without a dedicated job. A pass starts only when a
//! probability roll passes and the cooldown since the last attempt has
//! elapsed.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use redletter_client::QuoteWarmer;
use redletter_core::AppConfig;
use tokio::task::JoinHandle;
use tokio::time::Instant;

type Roll = Box<dyn Fn() -> f64 + Send + Sync>;

/// Probability- and time-gated trigger for background warm passes.
pub struct WarmScheduler {
    probability: f64,
    cooldown: Duration,
    batch: usize,
    last_attempt: Mutex<Option<Instant>>,
    roll: Roll,
}

impl WarmScheduler {
    pub fn new(probability: f64, cooldown: Duration, batch: usize) -> Self {
        Self::with_roll(probability, cooldown, batch, rand::random::<f64>)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.warm_probability, config.warm_cooldown(), config.warm_batch_size)
    }

    /// Scheduler with a custom random source.
    pub fn with_roll(
        probability: f64, cooldown: Duration, batch: usize, roll: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self { probability, cooldown, batch, last_attempt: Mutex::new(None), roll: Box::new(roll) }
    }

    /// Decide whether this request should warm, recording the attempt if so.
    pub fn should_warm(&self) -> bool {
        if self.batch == 0 || (self.roll)() >= self.probability {
            return false;
        }

        let mut last = self.last_attempt.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if let Some(previous) = *last
            && now.duration_since(previous) < self.cooldown
        {
            return false;
        }
        *last = Some(now);
        true
    }

    /// Spawn a background `warm_uncached` pass when the gate allows it.
    pub fn maybe_spawn(&self, warmer: &QuoteWarmer) -> Option<JoinHandle<usize>> {
        if !self.should_warm() {
            return None;
        }

        let warmer = warmer.clone();
        let batch = self.batch;
        tracing::debug!(batch, "scheduling opportunistic warm");
        Some(tokio::spawn(async move { warmer.warm_uncached(batch).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(cooldown: Duration) -> WarmScheduler {
        WarmScheduler::with_roll(0.2, cooldown, 2, || 0.0)
    }

    #[test]
    fn test_default_roll_respects_bounds() {
        let certain = WarmScheduler::new(1.0, Duration::ZERO, 2);
        let never = WarmScheduler::new(0.0, Duration::ZERO, 2);
        for _ in 0..200 {
            assert!(certain.should_warm());
            assert!(!never.should_warm());
        }
    }

    #[test]
    fn test_roll_gate() {
        let pass = WarmScheduler::with_roll(0.2, Duration::ZERO, 2, || 0.19);
        assert!(pass.should_warm());

        let fail = WarmScheduler::with_roll(0.2, Duration::ZERO, 2, || 0.2);
        assert!(!fail.should_warm());
    }

    #[test]
    fn test_zero_probability_never_warms() {
        let scheduler = WarmScheduler::with_roll(0.0, Duration::ZERO, 2, || 0.0);
        assert!(!scheduler.should_warm());
    }

    #[test]
    fn test_zero_batch_never_warms() {
        let scheduler = WarmScheduler::with_roll(1.0, Duration::ZERO, 0, || 0.0);
        assert!(!scheduler.should_warm());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown() {
        let scheduler = always(Duration::from_secs(300));
        assert!(scheduler.should_warm());
        assert!(!scheduler.should_warm());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(!scheduler.should_warm());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(scheduler.should_warm());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_roll_does_not_start_cooldown() {
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        let scheduler = WarmScheduler::with_roll(0.5, Duration::from_secs(300), 2, move || {
            // First roll fails, every later roll passes.
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 { 0.9 } else { 0.1 }
        });

        assert!(!scheduler.should_warm());
        assert!(scheduler.should_warm());
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
