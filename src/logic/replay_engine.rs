//! Replay player for exact replay reproduction.
//!
//! The player turns a `ReplayRecord` back into key transitions and feeds
//! them through `GameEngine::tick` on a fixed tick grid. The engine cannot
//! tell the difference from live input, so a replay of a live session
//! yields the same judgements, score and combo.

use crate::input::events::{InputEvent, InputKind};
use crate::logic::mod_pipeline::ColumnMapSource;
use crate::models::engine::BeatmapModel;
use crate::models::engine::constants::{US_PER_MS, ms_to_us};
use crate::models::error::{EngineError, EngineResult};
use crate::models::replay::ReplayRecord;
use crate::models::results::PlayResults;
use crate::models::settings::GameplaySettings;
use crate::state::game::{GameEngine, SessionStatus, SessionSummary};

/// Feeds a recorded input stream into a fresh `GameEngine`.
pub struct ReplayPlayer {
    /// The game engine that processes the replay.
    engine: GameEngine,
    /// Replay inputs sorted by timestamp.
    inputs: Vec<InputEvent>,
    /// Current index in the inputs array.
    input_index: usize,
    tick_us: i64,
    time_us: i64,
    finished: bool,
}

impl ReplayPlayer {
    /// Prepares playback of `record` over `beatmap`.
    ///
    /// The replay's mods and stored column map are reapplied, so the
    /// effective beatmap matches the one the replay was recorded on.
    pub fn new(
        beatmap: &BeatmapModel,
        record: &ReplayRecord,
        settings: &GameplaySettings,
    ) -> EngineResult<Self> {
        record.validate()?;
        if let (Some(recorded), Some(current)) = (&record.beatmap_checksum, &beatmap.checksum) {
            if recorded != current {
                return Err(EngineError::ReplayCorrupt(format!(
                    "recorded on beatmap {recorded}, got {current}"
                )));
            }
        }
        if record.beatmap_id != beatmap.beatmap_id {
            log::warn!(
                "REPLAY: Beatmap id mismatch ({} vs {})",
                record.beatmap_id,
                beatmap.beatmap_id
            );
        }

        let mods = record.mods.decode()?;
        let source = match &record.column_map {
            Some(map) => ColumnMapSource::Stored(map.clone()),
            None if mods.random => {
                return Err(EngineError::ReplayCorrupt(
                    "random replay without a column map".into(),
                ));
            }
            None => ColumnMapSource::Seed(0),
        };

        let engine = GameEngine::new(beatmap, &mods, settings, source)?;
        let inputs = flatten_inputs(record);
        let tick_us = ms_to_us(settings.replay_tick_ms).max(US_PER_MS);
        let time_us = engine.cursor_us;

        log::info!(
            "REPLAY: Loaded {} transitions, tick {}µs",
            inputs.len(),
            tick_us
        );

        Ok(Self {
            engine,
            inputs,
            input_index: 0,
            tick_us,
            time_us,
            finished: false,
        })
    }

    /// Advances playback by one tick.
    pub fn update(&mut self) -> EngineResult<()> {
        if self.finished {
            return Ok(());
        }

        self.time_us = self.next_tick_us();
        let start = self.input_index;
        while self
            .inputs
            .get(self.input_index)
            .is_some_and(|input| input.time_us <= self.time_us)
        {
            self.input_index += 1;
        }

        let outcome = self
            .engine
            .tick_us(self.time_us, &self.inputs[start..self.input_index])?;
        if outcome.dropped_inputs > 0 {
            log::warn!(
                "REPLAY: {} transition(s) dropped at {}µs",
                outcome.dropped_inputs,
                self.time_us
            );
        }

        let inputs_done = self.input_index >= self.inputs.len();
        let song_done = self.engine.is_complete() || self.time_us > self.engine.song_end_us();
        if self.engine.status() == SessionStatus::Failed || (inputs_done && song_done) {
            self.finished = true;
        }
        Ok(())
    }

    /// One grid step ahead, or straight to the next input or object deadline
    /// when both lie further away. The engine does not depend on tick
    /// length, so idle spans are crossed in a single tick.
    fn next_tick_us(&self) -> i64 {
        let grid_us = self.time_us.saturating_add(self.tick_us);
        let next_input = self.inputs.get(self.input_index).map(|input| input.time_us);
        let horizon = match (next_input, self.engine.next_due_us()) {
            (Some(input), Some(due)) => Some(input.min(due)),
            (input, due) => input.or(due),
        };
        match horizon {
            Some(horizon) if horizon > grid_us => horizon,
            _ => grid_us,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current playback position in milliseconds.
    pub fn get_time(&self) -> f64 {
        self.time_us as f64 / US_PER_MS as f64
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Plays the rest of the replay and returns the session summary.
    pub fn run(mut self) -> EngineResult<SessionSummary> {
        while !self.finished {
            self.update()?;
        }
        self.engine.finish()
    }
}

/// Two transitions per interval, stably sorted by time. Within a column
/// the interval order is kept, so a release and the next press on the same
/// timestamp stay in that order.
pub fn flatten_inputs(record: &ReplayRecord) -> Vec<InputEvent> {
    let mut events: Vec<InputEvent> = record
        .inputs
        .iter()
        .enumerate()
        .flat_map(|(column, intervals)| {
            intervals.iter().flat_map(move |interval| {
                [
                    InputEvent {
                        time_us: interval.start_us(),
                        column,
                        kind: InputKind::Press,
                    },
                    InputEvent {
                        time_us: interval.end_us(),
                        column,
                        kind: InputKind::Release,
                    },
                ]
            })
        })
        .collect();
    events.sort_by_key(|event| event.time_us);
    events
}

/// Replays `record` headlessly and returns its results.
pub fn simulate(
    beatmap: &BeatmapModel,
    record: &ReplayRecord,
    settings: &GameplaySettings,
) -> EngineResult<PlayResults> {
    Ok(ReplayPlayer::new(beatmap, record, settings)?.run()?.results)
}
