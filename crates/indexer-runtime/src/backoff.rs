//! Exponential backoff with a cap, for classified-retryable errors.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            initial: Duration::from_millis(200),
            max: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

impl BackoffPolicy {
    /// The delay to use after `current`, capped at `max`.
    pub fn next(&self, current: Duration) -> Duration {
        (current * self.multiplier).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_the_cap() {
        let policy = BackoffPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(500),
            multiplier: 2,
        };
        let mut delay = policy.initial;
        delay = policy.next(delay);
        assert_eq!(delay, Duration::from_millis(200));
        delay = policy.next(delay);
        assert_eq!(delay, Duration::from_millis(400));
        delay = policy.next(delay);
        assert_eq!(delay, Duration::from_millis(500));
        delay = policy.next(delay);
        assert_eq!(delay, Duration::from_millis(500));
    }
}
