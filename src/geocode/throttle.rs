//! Per-provider rate limiting.
//!
//! External geocoders meter requests per API key, not per caller, so the
//! gate here is global for a provider: workers reserve consecutive slots on
//! a shared timeline spaced `min_interval` apart, regardless of how many of
//! them run concurrently. The slot is reserved under the lock but the wait
//! happens outside it, so a slow sleeper never blocks reservation.

use std::time::Duration;

use tokio::time::Instant;

/// A global minimum-interval gate for one provider.
pub struct Throttle {
    min_interval: Duration,
    next_slot: tokio::sync::Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: tokio::sync::Mutex::new(None),
        }
    }

    /// Wait until this caller's reserved slot arrives.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.min_interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_spaces_concurrent_callers() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(100)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                tokio::spawn(async move {
                    throttle.acquire().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut elapsed = Vec::new();
        for handle in handles {
            elapsed.push(handle.await.unwrap());
        }
        elapsed.sort();

        // First slot is immediate, each later one at least an interval apart.
        assert!(elapsed[0] < Duration::from_millis(100));
        assert!(elapsed[1] >= Duration::from_millis(100));
        assert!(elapsed[2] >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_gap_resets_timeline() {
        let throttle = Throttle::new(Duration::from_millis(50));
        throttle.acquire().await;

        // After a long idle period the next slot is "now", not a backlog.
        tokio::time::sleep(Duration::from_secs(10)).await;
        let start = Instant::now();
        throttle.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
