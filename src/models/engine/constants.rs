//! Shared gameplay constants and time-unit helpers.

/// Microseconds per millisecond.
pub const US_PER_MS: i64 = 1_000;

/// Microseconds per second.
pub const US_PER_SECOND: i64 = 1_000_000;

/// Score reached by a full perfect run.
pub const MAX_SCORE: f64 = 1_000_000.0;

/// Smallest supported key mode.
pub const MIN_KEY_COUNT: usize = 1;

/// Largest supported key mode.
pub const MAX_KEY_COUNT: usize = 18;

/// Playback rate bounds (inclusive).
pub const MIN_RATE: f64 = 0.5;
pub const MAX_RATE: f64 = 2.0;

/// OD / HP bounds after mod adjustment.
pub const MIN_DIFFICULTY: f64 = 0.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Converts milliseconds to whole microseconds (rounded to nearest).
#[inline]
pub fn ms_to_us(ms: f64) -> i64 {
    (ms * US_PER_MS as f64).round() as i64
}

/// Converts microseconds back to milliseconds.
#[inline]
pub fn us_to_ms(us: i64) -> f64 {
    us as f64 / US_PER_MS as f64
}
