//! Session end for GameEngine - finish
//!
//! Results and the replay are emitted exactly once; the engine rejects
//! every call afterwards.

use super::{GameEngine, SessionStatus};
use crate::models::error::{EngineError, EngineResult};
use crate::models::replay::{ReplayRecord, ReplayRecorder};
use crate::models::results::PlayResults;
use std::mem;

/// What a finished session hands to its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub results: PlayResults,
    /// `None` for autoplay, which never produces a scoring record.
    pub replay: Option<ReplayRecord>,
}

impl GameEngine {
    /// Ends the session (song end or fail) and builds its results.
    pub fn finish(&mut self) -> EngineResult<SessionSummary> {
        if self.status == SessionStatus::Ended {
            return Err(EngineError::SessionEnded);
        }
        if !self.is_finished() {
            log::warn!(
                "ENGINE: Finishing with {} object(s) unjudged",
                self.notes.len() - self.resolved_objects
            );
        }

        let failed = self.status == SessionStatus::Failed;
        self.status = SessionStatus::Ended;

        let map = &self.effective.beatmap;
        let mods = self.effective.mods;
        let score = self.scoring.state();

        let results = PlayResults {
            beatmap_id: map.beatmap_id,
            score: score.score,
            accuracy: score.accuracy,
            max_combo: score.max_combo,
            tally: score.tally.clone(),
            failed,
            hit_errors: mem::take(&mut self.hit_errors),
            ghost_taps: mem::take(&mut self.ghost_taps),
            mods: mods.encode(),
            autoplay: mods.autoplay,
        };

        // Keys still down were consumed by the engine; close them at the
        // last tick so the replay keeps those presses.
        for (column, &held) in self.keys_held.iter().enumerate() {
            if held {
                self.recorder.release(column, self.cursor_us);
            }
        }
        let recorder = mem::replace(&mut self.recorder, ReplayRecorder::new(0));
        let replay = (!mods.autoplay).then(|| {
            recorder.finalize(
                map.beatmap_id,
                map.beatmap_set_id,
                map.checksum.clone(),
                mods.encode(),
                self.effective.persisted_column_map(),
            )
        });

        log::info!(
            "ENGINE: Finished - score {}, accuracy {:.2}%, max combo {}, failed: {}",
            results.score,
            results.accuracy * 100.0,
            results.max_combo,
            results.failed
        );

        Ok(SessionSummary { results, replay })
    }
}
