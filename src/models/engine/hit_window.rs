//! Definitions and constructors for hit window timing thresholds.

use super::constants::{MAX_DIFFICULTY, MIN_DIFFICULTY, ms_to_us};
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};

/// Half-widths of the six judgement windows, in song-time milliseconds.
///
/// Windows are never scaled by the playback rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitWindow {
    pub marv_ms: f64,
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
    pub bad_ms: f64,
    pub miss_ms: f64,
}

impl HitWindow {
    /// Creates windows from osu!mania Overall Difficulty (clamped to 0..=10).
    pub fn from_osu_od(od: f64) -> Self {
        let od = if od.is_nan() {
            MIN_DIFFICULTY
        } else {
            od.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
        };

        let marv_ms = if od <= 5.0 {
            22.4 - 0.6 * od
        } else {
            24.9 - 1.1 * od
        };

        Self {
            marv_ms,
            perfect_ms: 64.0 - 3.0 * od,
            great_ms: 97.0 - 3.0 * od,
            good_ms: 127.0 - 3.0 * od,
            bad_ms: 151.0 - 3.0 * od,
            miss_ms: 188.0 - 3.0 * od,
        }
    }

    /// Window for a tier, in ms.
    pub fn window_ms(&self, judgement: Judgement) -> f64 {
        match judgement {
            Judgement::Marv => self.marv_ms,
            Judgement::Perfect => self.perfect_ms,
            Judgement::Great => self.great_ms,
            Judgement::Good => self.good_ms,
            Judgement::Bad => self.bad_ms,
            Judgement::Miss => self.miss_ms,
        }
    }

    /// Window for a tier, rounded to whole µs.
    #[inline]
    pub fn window_us(&self, judgement: Judgement) -> i64 {
        ms_to_us(self.window_ms(judgement))
    }

    /// Outermost window: inputs farther than this never touch the object.
    #[inline]
    pub fn miss_us(&self) -> i64 {
        self.window_us(Judgement::Miss)
    }

    /// All six windows ordered 320 → 0.
    pub fn as_array(&self) -> [f64; 6] {
        Judgement::ALL.map(|j| self.window_ms(j))
    }

    /// Classifies a signed timing error.
    ///
    /// Returns `None` when the error is outside the outermost window; the
    /// input then cannot be matched to the object at all.
    pub fn judge(&self, error_us: i64) -> Option<Judgement> {
        let abs_diff = error_us.abs();
        if abs_diff > self.miss_us() {
            return None;
        }

        Judgement::ALL
            .into_iter()
            .find(|&j| abs_diff <= self.window_us(j))
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::from_osu_od(5.0)
    }
}
