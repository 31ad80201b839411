//! Bounded random delays.
//!
//! Used for the politeness pause between result pages and for the backoff
//! before retrying a page that answered with a transient status. Both are
//! deliberately randomized so consecutive requests do not land on a fixed
//! beat.

use std::time::Duration;

use rand::Rng;

/// A closed range of delays; each call to [`sample`](Self::sample) picks one
/// uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// Create a range; the bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A range that always yields the same delay.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    /// No delay at all. Handy in tests.
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Pause between result pages of one site: 1–3 seconds.
    pub fn politeness() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }

    /// Backoff before retrying a blocked page: 5–10 seconds.
    pub fn retry_backoff() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10))
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Pick a delay in `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    /// Parse `"<min>-<max>"` in milliseconds, or a single value for a fixed
    /// delay.
    pub fn parse_millis(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('-') {
            Some((lo, hi)) => {
                let lo = lo.trim().parse().ok()?;
                let hi = hi.trim().parse().ok()?;
                Some(Self::new(Duration::from_millis(lo), Duration::from_millis(hi)))
            }
            None => raw.parse().ok().map(|ms| Self::fixed(Duration::from_millis(ms))),
        }
    }

    /// Sleep for one sampled delay.
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::politeness()
    }
}
