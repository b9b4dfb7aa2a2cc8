//! Health bar and failure rules.

use crate::models::engine::constants::MAX_DIFFICULTY;
use crate::models::settings::HealthConfig;
use crate::models::stats::Judgement;

/// Read-only view of the health bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthState {
    /// Always within `[0, 1]`.
    pub health: f64,
}

/// Applies per-tier health deltas scaled by HP drain rate.
///
/// Higher HP shrinks gains (down to half at HP 10) and grows losses
/// (up to double at HP 10).
#[derive(Debug, Clone)]
pub struct HealthSystem {
    deltas: [f64; 6],
    sudden_death: bool,
    no_fail: bool,
    state: HealthState,
}

impl HealthSystem {
    pub fn new(config: &HealthConfig, hp: f64, sudden_death: bool, no_fail: bool) -> Self {
        let hp_ratio = (hp / MAX_DIFFICULTY).clamp(0.0, 1.0);
        let deltas = Judgement::ALL.map(|j| {
            let base = config.base_delta(j);
            if base >= 0.0 {
                base * (1.0 - 0.5 * hp_ratio)
            } else {
                base * (1.0 + hp_ratio)
            }
        });

        Self {
            deltas,
            sudden_death,
            no_fail,
            state: HealthState {
                health: config.initial.clamp(0.0, 1.0),
            },
        }
    }

    pub fn hit(&mut self, judgement: Judgement) {
        if self.sudden_death && judgement.is_miss() {
            self.state.health = 0.0;
            return;
        }
        let delta = self.deltas[judgement.index()];
        self.state.health = (self.state.health + delta).clamp(0.0, 1.0);
    }

    /// Delta applied for a tier after HP scaling.
    pub fn delta(&self, judgement: Judgement) -> f64 {
        self.deltas[judgement.index()]
    }

    /// Sudden Death fails on the first miss; otherwise an empty bar fails
    /// unless No Fail is active.
    pub fn has_failed(&self) -> bool {
        if self.no_fail {
            return false;
        }
        self.state.health <= 0.0
    }

    pub fn state(&self) -> HealthState {
        self.state
    }
}
