//! Outbound call throttling for the forecast API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Gate every outbound call passes before it starts
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn acquire(&self);
}

#[async_trait]
impl<T: Throttle + ?Sized> Throttle for Arc<T> {
    async fn acquire(&self) {
        (**self).acquire().await
    }
}

/// Enforces a minimum spacing between the starts of consecutive calls.
///
/// The first call goes through immediately. Shared by all harvest workers, so
/// the spacing holds regardless of concurrency. Built on `tokio::time`, which
/// lets tests run it under a paused clock.
#[derive(Debug)]
pub struct MinIntervalGate {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Throttle for MinIntervalGate {
    async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last_start = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_not_delayed() {
        let gate = MinIntervalGate::new(Duration::from_millis(1500));
        let started = Instant::now();
        gate.acquire().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let gate = MinIntervalGate::new(Duration::from_millis(1500));
        let started = Instant::now();
        for _ in 0..3 {
            gate.acquire().await;
        }
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_needs_no_extra_wait() {
        let gate = MinIntervalGate::new(Duration::from_millis(1500));
        gate.acquire().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        let before = Instant::now();
        gate.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_spacing() {
        let gate = Arc::new(MinIntervalGate::new(Duration::from_secs(1)));
        let started = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move {
                    gate.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap().duration_since(started));
        }
        starts.sort();
        assert_eq!(
            starts,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ]
        );
    }
}
