//! Input handling for GameEngine - handle_input, process_press, process_release
//!
//! All times are in microseconds (i64).

use super::{GameEngine, TickOutcome};
use crate::input::events::{InputEvent, InputKind};
use crate::models::engine::HitEvent;
use crate::models::engine::constants::us_to_ms;
use crate::models::error::{EngineError, EngineResult};
use crate::models::results::GhostTap;
use crate::models::stats::{Judgement, NotePart};

impl GameEngine {
    /// Consumes one key transition. Only transitions that change the key
    /// state reach the replay recorder.
    pub(crate) fn handle_input(
        &mut self,
        event: InputEvent,
        outcome: &mut TickOutcome,
    ) -> EngineResult<()> {
        let key_count = self.keys_held.len();
        if event.column >= key_count {
            return Err(EngineError::InvalidInput {
                column: event.column,
                key_count,
            });
        }
        if self.effective.mods.autoplay {
            log::debug!("INPUT: Autoplay active, ignoring column {}", event.column);
            return Ok(());
        }

        let column = event.column;
        match event.kind {
            InputKind::Press => {
                if self.keys_held[column] {
                    log::debug!("INPUT: Column {} already held, ignoring press", column);
                    return Ok(());
                }
                self.keys_held[column] = true;
                self.recorder.press(column, event.time_us);
                self.input_timestamps.push_back(event.time_us);
                self.process_press(column, event.time_us, outcome);
            }
            InputKind::Release => {
                if !self.keys_held[column] {
                    log::debug!("INPUT: Column {} not held, ignoring release", column);
                    return Ok(());
                }
                self.keys_held[column] = false;
                self.recorder.release(column, event.time_us);
                self.process_release(column, event.time_us, outcome);
            }
        }
        Ok(())
    }

    /// Matches a press against the front object of `column`.
    fn process_press(&mut self, column: usize, time_us: i64, outcome: &mut TickOutcome) {
        let Some(&id) = self.columns[column].front() else {
            self.ghost_tap(column, time_us, outcome);
            return;
        };

        let event = self.events()[id];
        match event {
            HitEvent::Tap { time_us: note_us, .. } => {
                let error_us = time_us - note_us;
                match self.hit_window.judge(error_us) {
                    Some(judgement) => {
                        self.pop_front(column, id);
                        self.notes[id].head = Some(judgement);
                        self.apply_judgement(id, NotePart::Tap, judgement, error_us, outcome);
                    }
                    None => self.ghost_tap(column, time_us, outcome),
                }
            }
            HitEvent::Hold { time_us: note_us, .. } => {
                if self.notes[id].head.is_some() {
                    // Head already resolved: grabbing the body again.
                    self.notes[id].holding = true;
                    log::debug!("ENGINE: Hold {} grabbed again at {}µs", id, time_us);
                    return;
                }

                let error_us = time_us - note_us;
                match self.hit_window.judge(error_us) {
                    Some(judgement) => {
                        let state = &mut self.notes[id];
                        state.head = Some(judgement);
                        state.holding = true;
                        state.broken = judgement.is_miss();
                        self.apply_judgement(id, NotePart::Head, judgement, error_us, outcome);
                    }
                    None => self.ghost_tap(column, time_us, outcome),
                }
            }
        }
    }

    /// Resolves or breaks the hold being held in `column`.
    fn process_release(&mut self, column: usize, time_us: i64, outcome: &mut TickOutcome) {
        let Some(&id) = self.columns[column].front() else {
            return;
        };
        let HitEvent::Hold { end_time_us, .. } = self.events()[id] else {
            return;
        };

        let state = &mut self.notes[id];
        if state.head.is_none() || !state.holding {
            return;
        }
        state.holding = false;

        let error_us = time_us - end_time_us;
        if error_us < -self.hit_window.miss_us() {
            state.broken = true;
            log::debug!("ENGINE: Hold {} released early ({}µs)", id, error_us);
            return;
        }

        let judgement = if state.broken {
            Judgement::Bad
        } else {
            self.hit_window.judge(error_us).unwrap_or(Judgement::Miss)
        };
        state.tail = Some(judgement);
        self.pop_front(column, id);
        self.apply_judgement(id, NotePart::Tail, judgement, error_us, outcome);
    }

    fn ghost_tap(&mut self, column: usize, time_us: i64, outcome: &mut TickOutcome) {
        self.scoring.ghost_tap();
        self.ghost_taps.push(GhostTap {
            time_ms: us_to_ms(time_us),
            column,
        });
        outcome.ghost_taps += 1;
    }
}
