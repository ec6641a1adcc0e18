use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Pause inserted after every page request
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleeps a fixed base delay plus a uniformly random extra in `[0, max_jitter)`
pub struct JitteredDelay {
    base: Duration,
    max_jitter: Duration,
}

impl JitteredDelay {
    pub fn new(base: Duration, max_jitter: Duration) -> Self {
        Self { base, max_jitter }
    }

    pub fn next_delay(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return self.base;
        }

        let extra = rand::rng().random_range(0.0..self.max_jitter.as_secs_f64());
        self.base.saturating_add(Duration::from_secs_f64(extra))
    }
}

#[async_trait]
impl Pacer for JitteredDelay {
    async fn pause(&self) {
        let delay = self.next_delay();
        tracing::trace!("Sleeping {:.2}s before next request", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}
