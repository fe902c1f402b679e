//! Token bucket admission control.
//!
//! Refill is lazy: no background task ticks the bucket, every access first
//! credits `elapsed * refill_rate` tokens (capped at capacity) and then
//! decides. `wait_for_tokens` polls with a floor of [`MIN_WAIT`] between
//! attempts so a tiny deficit cannot turn into a hot loop.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Minimum suspension between two admission attempts.
pub const MIN_WAIT: Duration = Duration::from_millis(100);

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket. `refill_rate` is tokens per second.
    pub fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            state: Mutex::new(BucketState { tokens: capacity, last_refill: Instant::now() }),
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
    }

    /// Refill, then take `count` tokens if available.
    ///
    /// Returns `Ok(())` when admitted, otherwise `Err(tokens)` with the
    /// balance observed under the same lock.
    fn try_take(&self, count: f64) -> Result<(), f64> {
        let mut state = self.state.lock();
        self.refill(&mut state);
        if state.tokens >= count {
            state.tokens -= count;
            Ok(())
        } else {
            Err(state.tokens)
        }
    }

    /// Attempt to remove `count` tokens. A denied attempt leaves the balance
    /// untouched apart from the refill.
    pub fn consume(&self, count: f64) -> bool {
        self.try_take(count).is_ok()
    }

    /// Current balance after refilling.
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Suspend until `count` tokens could be taken.
    ///
    /// There is no upper bound: asking for more than `capacity` never returns.
    pub async fn wait_for_tokens(&self, count: f64) {
        let mut attempts: u32 = 0;
        loop {
            let tokens = match self.try_take(count) {
                Ok(()) => {
                    if attempts > 0 {
                        tracing::debug!(attempts, "Admitted after waiting for tokens");
                    }
                    return;
                },
                Err(tokens) => tokens,
            };
            attempts = attempts.saturating_add(1);
            let wait = self.deficit_wait(count, tokens);
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                available = tokens,
                requested = count,
                "Token bucket empty, waiting"
            );
            sleep(wait).await;
        }
    }

    /// `max(100ms, (count - tokens) / refill_rate)`.
    fn deficit_wait(&self, count: f64, tokens: f64) -> Duration {
        let secs = (count - tokens) / self.refill_rate;
        Duration::try_from_secs_f64(secs).map_or(MIN_WAIT, |wait| wait.max(MIN_WAIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_deny_then_refill() {
        let bucket = TokenBucket::new(10.0, 5.0);

        for i in 0..10 {
            assert!(bucket.consume(1.0), "call {} should be admitted", i + 1);
        }
        assert!(!bucket.consume(1.0), "11th call should be denied");

        advance(Duration::from_millis(200)).await;
        assert!(bucket.consume(1.0));
        assert!(!bucket.consume(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_whole_capacity() {
        for (capacity, rate) in [(1.0, 1.0), (3.0, 2.0), (50.0, 25.0)] {
            let bucket = TokenBucket::new(capacity, rate);
            assert!(bucket.consume(capacity));
            assert!(!bucket.consume(1.0));

            advance(Duration::from_millis((1000.0 / rate).ceil() as u64)).await;
            assert!(bucket.consume(1.0), "capacity={} rate={}", capacity, rate);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_capped_at_capacity() {
        let bucket = TokenBucket::new(4.0, 10.0);
        assert!(bucket.consume(4.0));

        advance(Duration::from_secs(60)).await;
        assert_eq!(bucket.available(), 4.0);
        assert!(!bucket.consume(5.0));
        assert!(bucket.consume(4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_consume_keeps_balance() {
        let bucket = TokenBucket::new(2.0, 1.0);
        assert!(bucket.consume(1.5));
        assert!(!bucket.consume(1.0));
        assert!((bucket.available() - 0.5).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_tokens_waits_for_accrual() {
        let bucket = TokenBucket::new(2.0, 2.0);
        assert!(bucket.consume(2.0));

        let start = Instant::now();
        bucket.wait_for_tokens(1.0).await;
        let waited = start.elapsed();

        assert!(waited >= Duration::from_millis(500), "returned too early: {:?}", waited);
        assert!(waited < Duration::from_millis(700), "waited too long: {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_never_polls_faster_than_floor() {
        // One token at 100/s is a 10ms deficit; the floor stretches it to 100ms.
        let bucket = TokenBucket::new(1.0, 100.0);
        assert!(bucket.consume(1.0));

        let start = Instant::now();
        bucket.wait_for_tokens(1.0).await;
        assert!(start.elapsed() >= MIN_WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_with_tokens() {
        let bucket = TokenBucket::new(5.0, 1.0);
        let start = Instant::now();
        bucket.wait_for_tokens(3.0).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!((bucket.available() - 2.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_all_admitted() {
        let bucket = Arc::new(TokenBucket::new(2.0, 4.0));
        let start = Instant::now();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let bucket = bucket.clone();
                tokio::spawn(async move { bucket.wait_for_tokens(1.0).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("waiter panicked");
        }

        // Two from the initial burst, four more need at least one second of refill.
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_deficit_wait_floor_and_scale() {
        let bucket = TokenBucket::new(10.0, 5.0);
        assert_eq!(bucket.deficit_wait(1.0, 0.99), MIN_WAIT);
        assert_eq!(bucket.deficit_wait(1.0, 0.0), Duration::from_millis(200));
        assert_eq!(bucket.deficit_wait(5.0, 0.0), Duration::from_secs(1));
    }
}
