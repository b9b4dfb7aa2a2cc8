//! Snapshot creation for GameEngine - get_snapshot
//!
//! All times are in microseconds internally, converted to ms for GameplaySnapshot.

use super::{GameEngine, SessionStatus};
use crate::models::engine::constants::us_to_ms;
use crate::models::score::ScoreState;
use crate::models::stats::JudgementResult;

/// Read-only view of a session for HUD rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct GameplaySnapshot {
    /// Song time of the last tick in milliseconds.
    pub song_time: f64,
    /// Playback rate multiplier.
    pub rate: f64,
    /// Scroll velocity at `song_time`.
    pub scroll_velocity: f64,
    /// Integrated scroll distance at `song_time`.
    pub scroll_position: f64,

    /// Per-column key held state.
    pub keys_held: Vec<bool>,
    pub score: ScoreState,
    /// Health bar in `[0, 1]`.
    pub health: f64,
    /// Objects not fully judged yet.
    pub remaining_objects: usize,

    /// Last judgement (for flash display and hit error bar).
    pub last_judgement: Option<JudgementResult>,
    /// Presses in the last second.
    pub nps: f64,

    pub paused: bool,
    pub failed: bool,
}

impl GameEngine {
    /// Creates a snapshot of the current game state for rendering.
    pub fn get_snapshot(&self) -> GameplaySnapshot {
        let song_time = us_to_ms(self.cursor_us);

        GameplaySnapshot {
            song_time,
            rate: self.effective.rate(),
            scroll_velocity: self.timing.velocity_at(song_time),
            scroll_position: self.timing.position_at(song_time),
            keys_held: self.keys_held.clone(),
            score: self.scoring.state().clone(),
            health: self.health.state().health,
            remaining_objects: self.notes.len() - self.resolved_objects,
            last_judgement: self.last_judgement,
            nps: self.input_timestamps.len() as f64,
            paused: self.status == SessionStatus::Paused,
            failed: self.status == SessionStatus::Failed,
        }
    }
}
