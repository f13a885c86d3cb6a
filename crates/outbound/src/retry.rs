//! Attempt cap and backoff between sync attempts.

use std::time::Duration;

/// Delay applied after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Delay indexed by the attempt just completed (1-based). The last entry
    /// repeats when attempts outnumber the schedule.
    Schedule(Vec<Duration>),
    /// `base * factor^(attempt - 1)`, capped at `max`.
    Exponential {
        base: Duration,
        factor: u32,
        max: Duration,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Three attempts; 0 s before the second, 5 s before the third.
    pub fn standard() -> Self {
        Self::new(
            3,
            Backoff::Schedule(vec![
                Duration::ZERO,
                Duration::from_millis(5_000),
                Duration::from_millis(30_000),
            ]),
        )
    }

    /// `max_attempts` attempts with no waiting in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Backoff::Schedule(Vec::new()))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after `attempt` failed, before the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let index = attempt.saturating_sub(1);
        match &self.backoff {
            Backoff::Schedule(delays) => delays
                .get(index as usize)
                .or_else(|| delays.last())
                .copied()
                .unwrap_or(Duration::ZERO),
            Backoff::Exponential { base, factor, max } => {
                let multiplier = factor.checked_pow(index).unwrap_or(u32::MAX);
                base.checked_mul(multiplier).map_or(*max, |d| d.min(*max))
            }
        }
    }

    /// Longest one call can take when every attempt runs into
    /// `attempt_timeout`: all backoff waits plus every attempt timing out.
    pub fn worst_case(&self, attempt_timeout: Duration) -> Duration {
        let waits = (1..self.max_attempts)
            .map(|attempt| self.delay_after(attempt))
            .fold(Duration::ZERO, Duration::saturating_add);
        waits.saturating_add(attempt_timeout.saturating_mul(self.max_attempts))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
