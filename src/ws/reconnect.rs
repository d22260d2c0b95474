//! Pluggable reconnection policy for the real-time connection.

use std::time::Duration;

/// Decides whether, and after how long, a dropped connection is retried.
///
/// Reconnecting always forces a fresh room snapshot: events pushed while
/// the link was down are never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Stay disconnected until the caller connects again.
    #[default]
    Never,
    /// Retry with exponential backoff: `base * 2^attempt`, capped at `max`.
    Backoff {
        /// Delay before the first retry.
        base: Duration,
        /// Upper bound on any single delay.
        max: Duration,
        /// Give up after this many attempts (`None` = retry forever).
        max_attempts: Option<u32>,
    },
}

impl ReconnectPolicy {
    /// Returns the delay before retry number `attempt` (0-based), or `None`
    /// if no further retry should happen.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            Self::Never => None,
            Self::Backoff {
                base,
                max,
                max_attempts,
            } => {
                if max_attempts.is_some_and(|limit| attempt >= limit) {
                    return None;
                }
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                Some(base.saturating_mul(factor).min(max))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_gives_no_delay() {
        assert_eq!(ReconnectPolicy::Never.delay(0), None);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::Backoff {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
            max_attempts: None,
        };
        assert_eq!(policy.delay(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay(1), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay(2), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay(3), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay(40), Some(Duration::from_millis(500)));
    }

    #[test]
    fn backoff_respects_attempt_limit() {
        let policy = ReconnectPolicy::Backoff {
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
            max_attempts: Some(2),
        };
        assert!(policy.delay(1).is_some());
        assert_eq!(policy.delay(2), None);
    }
}
