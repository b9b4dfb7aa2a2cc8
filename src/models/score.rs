//! osu!mania style score processor.
//!
//! Half of `MAX_SCORE` comes from timing (`base`), the other half from a
//! bonus term scaled by a pool that rewards consistent accuracy.

use crate::models::engine::constants::MAX_SCORE;
use crate::models::stats::{HitStats, Judgement};
use serde::{Deserialize, Serialize};

const BONUS_POOL_MAX: f64 = 100.0;

fn bonus_pool_delta(judgement: Judgement) -> f64 {
    match judgement {
        Judgement::Marv => 2.0,
        Judgement::Perfect => 1.0,
        Judgement::Great => -8.0,
        Judgement::Good => -24.0,
        Judgement::Bad => -44.0,
        Judgement::Miss => -100.0,
    }
}

fn bonus_value(judgement: Judgement) -> f64 {
    match judgement {
        Judgement::Marv | Judgement::Perfect => 32.0,
        Judgement::Great => 16.0,
        Judgement::Good => 8.0,
        Judgement::Bad => 4.0,
        Judgement::Miss => 0.0,
    }
}

/// Read-only view of the running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub tally: HitStats,
    pub accuracy: f64,
}

/// Accumulates judgements into score, combo and accuracy.
#[derive(Debug, Clone)]
pub struct ScoringSystem {
    total_judgements: usize,
    mods_multiplier: f64,
    bonus_pool: f64,
    /// Unrounded score; `ScoreState::score` is derived from it.
    raw_score: f64,
    state: ScoreState,
}

impl ScoringSystem {
    /// `total_judgements` counts every scored part (hold head and tail separately).
    pub fn new(total_judgements: usize, mods_multiplier: f64) -> Self {
        Self {
            total_judgements: total_judgements.max(1),
            mods_multiplier,
            bonus_pool: BONUS_POOL_MAX,
            raw_score: 0.0,
            state: ScoreState {
                score: 0,
                combo: 0,
                max_combo: 0,
                tally: HitStats::new(),
                accuracy: 1.0,
            },
        }
    }

    pub fn hit(&mut self, judgement: Judgement) {
        let per_object = MAX_SCORE / 2.0 / self.total_judgements as f64;
        let tier = f64::from(judgement.value());

        let base = per_object * tier / 320.0;

        self.bonus_pool =
            (self.bonus_pool + bonus_pool_delta(judgement)).clamp(0.0, BONUS_POOL_MAX);
        let bonus = per_object * bonus_value(judgement) * self.bonus_pool.sqrt() / 320.0;

        self.raw_score += (base + bonus) * self.mods_multiplier;
        self.state.score = self.raw_score.round() as u64;

        if judgement.is_miss() {
            self.state.combo = 0;
        } else {
            self.state.combo += 1;
            self.state.max_combo = self.state.max_combo.max(self.state.combo);
        }

        self.state.tally.add(judgement);
        self.state.accuracy = self.state.tally.calculate_accuracy();
    }

    /// Counts a press that matched no object. Does not touch combo or score.
    pub fn ghost_tap(&mut self) {
        self.state.tally.ghost_tap += 1;
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn bonus_pool(&self) -> f64 {
        self.bonus_pool
    }
}
