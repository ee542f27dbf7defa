// Retry / backoff policy
//
// Fixed backoff table: 1->10s, 2->30s, 3->90s, >=4->300s.
// Wall-clock only, no jitter. attempts_after_this_failure is the
// post-increment attempt count (1 on the first failure, 2 on the second...).

use crate::application::constants::BACKOFF_SCHEDULE_SECS;

/// Decision returned by `RetryPolicy::decide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the job; `next_run_at` is the absolute epoch-ms backoff target.
    Retry { next_run_at: i64 },
    /// Attempts are exhausted; the job goes to `dead`.
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy;

impl RetryPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `attempts_after_this_failure` (the post-increment
    /// attempt count) still has budget against `max_attempts`, and if so,
    /// compute the backoff target relative to `now_millis`.
    pub fn decide(
        &self,
        attempts_after_this_failure: i32,
        max_attempts: i32,
        now_millis: i64,
    ) -> RetryDecision {
        if attempts_after_this_failure >= max_attempts {
            return RetryDecision::Exhausted;
        }

        let delay_secs = Self::backoff_seconds(attempts_after_this_failure);
        RetryDecision::Retry {
            next_run_at: now_millis + delay_secs * 1000,
        }
    }

    fn backoff_seconds(attempts: i32) -> i64 {
        let idx = (attempts - 1).max(0) as usize;
        BACKOFF_SCHEDULE_SECS
            .get(idx)
            .copied()
            .unwrap_or(*BACKOFF_SCHEDULE_SECS.last().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_when_attempts_reach_max() {
        let policy = RetryPolicy::new();
        let decision = policy.decide(3, 3, 0);
        assert_eq!(decision, RetryDecision::Exhausted);
    }

    #[test]
    fn follows_fixed_schedule() {
        let policy = RetryPolicy::new();
        assert_eq!(
            policy.decide(1, 5, 0),
            RetryDecision::Retry { next_run_at: 10_000 }
        );
        assert_eq!(
            policy.decide(2, 5, 0),
            RetryDecision::Retry { next_run_at: 30_000 }
        );
        assert_eq!(
            policy.decide(3, 5, 0),
            RetryDecision::Retry { next_run_at: 90_000 }
        );
        assert_eq!(
            policy.decide(4, 5, 0),
            RetryDecision::Retry { next_run_at: 300_000 }
        );
        assert_eq!(
            policy.decide(9, 10, 0),
            RetryDecision::Retry { next_run_at: 300_000 }
        );
    }

    #[test]
    fn is_deterministic() {
        let policy = RetryPolicy::new();
        let a = policy.decide(1, 5, 0);
        let b = policy.decide(1, 5, 0);
        assert_eq!(a, b);
    }
}
