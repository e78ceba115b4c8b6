//! Jittered exponential backoff between rate-limited attempts.

use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter_range};

/// Delays slept between attempts of one call.
///
/// The delay before retry `n` (counting from 1) is
/// `min(random() * base * 2^n + base, cap)`, so it always lies in
/// `[base, min(base * (2^n + 1), cap)]`. The iterator yields one delay fewer
/// than `max_attempts`: there is nothing to wait for after the last attempt.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use turnstile_cache::backoff_delays;
///
/// let delays: Vec<_> = backoff_delays(
///     Duration::from_secs(1),
///     Duration::from_secs(30),
///     3,
/// )
/// .collect();
/// assert_eq!(delays.len(), 2);
/// assert!(delays[0] >= Duration::from_secs(1) && delays[0] <= Duration::from_secs(3));
/// ```
pub fn backoff_delays(
    base: Duration,
    cap: Duration,
    max_attempts: u32,
) -> impl Iterator<Item = Duration> {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);

    // Growth base 2, scaled to milliseconds by the factor: base * 2^n.
    // Jitter scales it by a uniform factor in [0, 1).
    ExponentialBackoff::from_millis(2)
        .factor(base_ms)
        .map(jitter_range(0.0, 1.0))
        .map(move |delay| delay.saturating_add(base).min(cap))
        .take(max_attempts.saturating_sub(1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_within_jitter_bounds() {
        let base = Duration::from_millis(1000);
        let cap = Duration::from_millis(30_000);

        for _ in 0..2000 {
            let delays: Vec<_> = backoff_delays(base, cap, 3).collect();
            assert_eq!(delays.len(), 2);
            assert!(delays[0] >= base && delays[0] < Duration::from_millis(3000));
            assert!(delays[1] >= base && delays[1] < Duration::from_millis(5000));
        }
    }

    #[test]
    fn first_delay_covers_the_lower_half_of_its_range() {
        let base = Duration::from_millis(1000);
        let cap = Duration::from_millis(30_000);

        // A factor drawn from [0, 1) lands below 2s about half the time.
        let low = (0..2000)
            .filter_map(|_| backoff_delays(base, cap, 2).next())
            .filter(|delay| *delay < Duration::from_millis(2000))
            .count();
        assert!(low > 500, "only {low} of 2000 first delays below 2s");
    }

    #[test]
    fn delays_are_capped() {
        let base = Duration::from_millis(1000);
        let cap = Duration::from_millis(4000);

        for delay in backoff_delays(base, cap, 8) {
            assert!(delay <= cap);
        }
    }

    #[test]
    fn single_attempt_never_sleeps() {
        assert_eq!(
            backoff_delays(Duration::from_secs(1), Duration::from_secs(30), 1).count(),
            0
        );
        assert_eq!(
            backoff_delays(Duration::from_secs(1), Duration::from_secs(30), 0).count(),
            0
        );
    }
}
