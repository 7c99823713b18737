//! Quiz countdown.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Countdown with one recurring tick. Runs `on_expire` once when it
/// reaches zero. Dropping the timer stops the countdown, but an expiry
/// action already started runs to completion on its own task.
#[derive(Debug)]
pub struct QuizTimer {
    remaining: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl QuizTimer {
    /// Count down `ticks` times, one every `tick`.
    pub fn start<F, Fut>(ticks: u64, tick: Duration, on_expire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let remaining = Arc::new(AtomicU64::new(ticks));
        let counter = Arc::clone(&remaining);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // First tick completes immediately.
            interval.tick().await;

            while counter.load(Ordering::SeqCst) > 0 {
                interval.tick().await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }

            tracing::debug!("quiz countdown expired");
            tokio::spawn(on_expire());
        });

        Self { remaining, handle }
    }

    /// Ticks left before expiry.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for QuizTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_at_zero() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let timer = QuizTimer::start(3, Duration::from_secs(1), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.remaining(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.remaining(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_after_expiry_keeps_action() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let timer = QuizTimer::start(1, Duration::from_secs(1), move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1010)).await;
        drop(timer);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let timer = QuizTimer::start(2, Duration::from_secs(1), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(timer);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
