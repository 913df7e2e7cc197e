//! Randomized pauses between outbound actions to stay under rate limits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
    rng: StdRng,
}

impl Pacer {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms,
            rng: StdRng::from_entropy(),
        }
    }

    /// A pacer that never sleeps.
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.max_ms > 0
    }

    /// Uniform in `[min_ms, max_ms]`.
    pub fn next_delay(&mut self) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }

    pub async fn pause(&mut self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
