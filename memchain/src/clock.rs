//! Clock abstraction for block timestamps.
//!
//! The chain stamps mined blocks from an injected clock so that
//! time-dependent suites (vesting, time locks) can advance time manually
//! instead of sleeping.

use std::future::Future;
use std::pin::Pin;

use tokio::time::{self, Duration, Instant};

/// Time source injected into [`MemoryChain`](crate::MemoryChain).
///
/// Production-like runs use [`SystemClock`]; deterministic tests use
/// [`PausedClock`] together with `#[tokio::test(start_paused = true)]`.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Sleep for `d`. Under a paused tokio runtime this cooperates with
    /// auto-advance instead of waiting in real time.
    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

/// Manually-advanced clock for paused tokio time.
///
/// Requires the runtime's time to be paused (`start_paused = true` or an
/// explicit `tokio::time::pause()`); `advance` then moves time forward
/// without any real waiting.
#[derive(Default)]
pub struct PausedClock;

impl PausedClock {
    /// Create a paused clock.
    pub fn new() -> Self {
        Self
    }

    /// Advance the runtime's time by `d`.
    pub async fn advance(&self, d: Duration) {
        time::advance(d).await;
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}
