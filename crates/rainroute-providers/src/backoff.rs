//! Exponential backoff with jitter for provider retries.
//!
//! Keeps transient upstream failures (rate limits, 5xx, timeouts) from
//! turning into tight retry loops within a request.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
            jitter_ratio: 0.2,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }

    /// Register a failure and return how long to wait before retrying.
    pub fn fail(&mut self) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.max);
        add_jitter(self.current, self.jitter_ratio)
    }
}

fn add_jitter(delay: Duration, ratio: f64) -> Duration {
    if !(0.0..=1.0).contains(&ratio) {
        return delay;
    }

    let delay_ms = delay.as_millis();
    if delay_ms == 0 {
        return delay;
    }

    let jitter_ms_max = ((delay_ms as f64) * ratio) as u128;
    if jitter_ms_max == 0 {
        return delay;
    }

    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    let jitter_ms = (now_nanos as u128) % (jitter_ms_max + 1);
    delay + Duration::from_millis(jitter_ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_doubles_up_to_max() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        let first = backoff.fail();
        assert!(first >= Duration::from_millis(200));
        assert!(first <= Duration::from_millis(240));

        let second = backoff.fail();
        assert!(second >= Duration::from_millis(400));
    }

    #[test]
    fn fail_saturates_at_max() {
        let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(20));
        let delay1 = backoff.fail();
        assert!(delay1 >= Duration::from_millis(20));
        assert!(delay1 <= Duration::from_millis(24));

        let delay2 = backoff.fail();
        assert!(delay2 >= Duration::from_millis(20));
        assert!(delay2 <= Duration::from_millis(24));
    }

    #[test]
    fn reset_returns_to_base() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        backoff.fail();
        backoff.reset();
        let delay = backoff.fail();
        assert!(delay >= Duration::from_millis(200));
        assert!(delay <= Duration::from_millis(240));
    }
}
