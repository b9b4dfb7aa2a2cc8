//! End-of-session results handed to the results screen and leaderboards.

use crate::models::mods::EncodedMods;
use crate::models::stats::{HitError, HitStats};
use serde::{Deserialize, Serialize};

/// A press that matched no object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostTap {
    pub time_ms: f64,
    pub column: usize,
}

/// Complete outcome of one play, live or replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResults {
    pub beatmap_id: i64,
    pub score: u64,
    /// Fraction in `[0, 1]`.
    pub accuracy: f64,
    pub max_combo: u32,
    pub tally: HitStats,
    pub failed: bool,
    /// In judgement order; hold heads and tails appear separately.
    pub hit_errors: Vec<HitError>,
    pub ghost_taps: Vec<GhostTap>,
    pub mods: EncodedMods,
    /// Autoplay runs are references only and never reach a leaderboard.
    pub autoplay: bool,
}

impl PlayResults {
    /// Whether this play may be stored as a score.
    pub fn is_rankable(&self) -> bool {
        !self.autoplay && !self.failed
    }

    /// Mean signed hit error in ms, ignoring misses.
    pub fn mean_error_ms(&self) -> Option<f64> {
        let hits: Vec<f64> = self
            .hit_errors
            .iter()
            .filter(|e| !e.judgement.is_miss())
            .map(|e| e.error_ms)
            .collect();
        if hits.is_empty() {
            return None;
        }
        Some(hits.iter().sum::<f64>() / hits.len() as f64)
    }

    /// Unstable rate: ten times the standard deviation of hit errors.
    pub fn unstable_rate(&self) -> Option<f64> {
        let mean = self.mean_error_ms()?;
        let hits: Vec<f64> = self
            .hit_errors
            .iter()
            .filter(|e| !e.judgement.is_miss())
            .map(|e| e.error_ms)
            .collect();
        let variance = hits.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / hits.len() as f64;
        Some(variance.sqrt() * 10.0)
    }
}
