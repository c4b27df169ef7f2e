//! Request pacing.
//!
//! One request per minimum interval: `acquire` waits until the interval since
//! the previous request has elapsed, then stamps the new request.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Time left before the next request may start
    pub async fn time_until_ready(&self) -> Duration {
        match *self.last_request.lock().await {
            Some(last) => (last + self.interval).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Wait for the slot, then mark a request as started
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            let now = Instant::now();
            if ready_at > now {
                debug!("Pacing request: waiting {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_secs(2));
        let start = Instant::now();
        pacer.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_requests_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_secs(2));
        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(4100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_work_absorbs_the_interval() {
        let pacer = RequestPacer::new(Duration::from_secs(1));
        pacer.acquire().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(pacer.time_until_ready().await, Duration::ZERO);

        let before = Instant::now();
        pacer.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_waits() {
        let pacer = RequestPacer::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
