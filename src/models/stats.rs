//! Hit statistics and judgement types.
//!
//! This module defines the judgement tiers used for scoring,
//! the per-object judgement record and the running tally.

use crate::models::engine::constants::us_to_ms;
use serde::{Deserialize, Serialize};

/// Hit judgement tiers from best to worst.
///
/// The numeric tier (`320`, `300`, ...) is what scoring and health key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    /// 320, rainbow timing.
    Marv,
    /// 300.
    Perfect,
    /// 200.
    Great,
    /// 100.
    Good,
    /// 50.
    Bad,
    /// 0, missed object.
    Miss,
}

impl Judgement {
    /// All tiers, best first. Index order matches `HitWindows`.
    pub const ALL: [Judgement; 6] = [
        Judgement::Marv,
        Judgement::Perfect,
        Judgement::Great,
        Judgement::Good,
        Judgement::Bad,
        Judgement::Miss,
    ];

    /// Numeric tier value.
    pub const fn value(self) -> u32 {
        match self {
            Judgement::Marv => 320,
            Judgement::Perfect => 300,
            Judgement::Great => 200,
            Judgement::Good => 100,
            Judgement::Bad => 50,
            Judgement::Miss => 0,
        }
    }

    /// Position in [`Judgement::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Judgement::Marv => 0,
            Judgement::Perfect => 1,
            Judgement::Great => 2,
            Judgement::Good => 3,
            Judgement::Bad => 4,
            Judgement::Miss => 5,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.value() == value)
    }

    pub const fn is_miss(self) -> bool {
        matches!(self, Judgement::Miss)
    }
}

/// Which part of a hit object a judgement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotePart {
    Tap,
    Head,
    Tail,
}

/// One resolved judgement. Created once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementResult {
    pub judgement: Judgement,
    /// Input time minus object time in µs (negative = early).
    pub error_us: i64,
    /// Index of the object in the effective beatmap.
    pub object_id: usize,
    pub part: NotePart,
}

impl JudgementResult {
    /// Signed timing error in milliseconds.
    pub fn error_ms(&self) -> f64 {
        us_to_ms(self.error_us)
    }
}

/// Hit error entry exposed with the final results (graphs, UR).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitError {
    pub error_ms: f64,
    pub judgement: Judgement,
}

impl From<&JudgementResult> for HitError {
    fn from(result: &JudgementResult) -> Self {
        Self {
            error_ms: result.error_ms(),
            judgement: result.judgement,
        }
    }
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitStats {
    pub marv: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
    /// Key presses no pending object could consume (not judged).
    pub ghost_tap: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Marv => self.marv += 1,
            Judgement::Perfect => self.perfect += 1,
            Judgement::Great => self.great += 1,
            Judgement::Good => self.good += 1,
            Judgement::Bad => self.bad += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn count(&self, judgement: Judgement) -> u32 {
        match judgement {
            Judgement::Marv => self.marv,
            Judgement::Perfect => self.perfect,
            Judgement::Great => self.great,
            Judgement::Good => self.good,
            Judgement::Bad => self.bad,
            Judgement::Miss => self.miss,
        }
    }

    /// Number of judged object parts (ghost taps excluded).
    pub fn judged(&self) -> u32 {
        self.marv + self.perfect + self.great + self.good + self.bad + self.miss
    }

    /// Calculates accuracy as a fraction in `[0, 1]`.
    ///
    /// 320 and 300 both weigh 300, so a run made only of those is exactly 1.0.
    /// Returns 1.0 before anything has been judged.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.judged();
        if total == 0 {
            return 1.0;
        }

        let points = 300 * u64::from(self.marv + self.perfect)
            + 200 * u64::from(self.great)
            + 100 * u64::from(self.good)
            + 50 * u64::from(self.bad);

        points as f64 / (300 * u64::from(total)) as f64
    }
}
