//! Poll loop timing helpers

use std::time::Duration;

/// Elapsed time after which the buy waiter may abort on low volume / no data
///
/// `total * fraction_pct / 100`. The fraction is clamped to 0..=100 and a
/// non-finite fraction is treated as 100 (abort rules only at the very end).
pub fn grace_deadline(total: Duration, fraction_pct: f64) -> Duration {
    let fraction = if fraction_pct.is_finite() {
        fraction_pct.clamp(0.0, 100.0)
    } else {
        100.0
    };
    total.mul_f64(fraction / 100.0)
}

/// `ceil(duration / interval)` poll iterations, zero if either is zero
pub fn poll_iterations(duration: Duration, interval: Duration) -> u64 {
    let interval_ms = interval.as_millis();
    if interval_ms == 0 || duration.is_zero() {
        return 0;
    }
    let iterations = duration.as_millis().div_ceil(interval_ms);
    u64::try_from(iterations).unwrap_or(u64::MAX)
}
