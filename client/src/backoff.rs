//! Exponential backoff for retrying transient failures.

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5000);

const JITTER_FLOOR: Duration = Duration::from_millis(100);
const JITTER_RATIO: f64 = 0.25;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at `max`. Attempt 0 is treated like attempt 1.
pub fn backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exp = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exp).min(max)
}

/// [`backoff`] with a uniform ±25% offset, never below 100ms.
pub fn backoff_with_jitter(attempt: u32, base: Duration, max: Duration) -> Duration {
    backoff_with_jitter_from(&mut rand::rng(), attempt, base, max)
}

/// Jittered backoff drawing from the given generator, so a seeded
/// generator gives reproducible delays.
pub fn backoff_with_jitter_from<R: Rng + ?Sized>(
    rng: &mut R,
    attempt: u32,
    base: Duration,
    max: Duration,
) -> Duration {
    let delay = backoff(attempt, base, max).as_secs_f64() * 1000.0;
    let jitter = delay * JITTER_RATIO;
    let offset = if jitter > 0.0 {
        rng.random_range(-jitter..=jitter)
    } else {
        0.0
    };
    let millis = (delay + offset).floor().max(0.0) as u64;
    Duration::from_millis(millis).max(JITTER_FLOOR)
}
