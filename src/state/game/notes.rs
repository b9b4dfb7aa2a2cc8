//! Note processing - advance, expire_front, apply_judgement
//!
//! All times are in microseconds (i64).

use super::{GameEngine, SessionStatus, TickOutcome};
use crate::models::engine::HitEvent;
use crate::models::stats::{HitError, Judgement, JudgementResult, NotePart};

/// Runtime state of one hit object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NoteState {
    /// Tap result, or the head result of a hold.
    pub head: Option<Judgement>,
    pub tail: Option<Judgement>,
    /// Key is down on this hold after its head resolved.
    pub holding: bool,
    /// Released before the tail window or head missed; tail caps at 50.
    pub broken: bool,
}

impl GameEngine {
    /// Resolves everything due strictly before `time_us`.
    ///
    /// Fronts of all columns are compared so that objects resolve in
    /// `(deadline, object)` order whatever the column.
    pub(crate) fn advance(&mut self, time_us: i64, outcome: &mut TickOutcome) {
        let autoplay = self.effective.mods.autoplay;
        while self.status == SessionStatus::Playing {
            let due = self
                .columns
                .iter()
                .filter_map(|queue| queue.front().copied())
                .map(|id| (self.due_time(id, autoplay), id))
                .filter(|&(due, _)| if autoplay { due <= time_us } else { due < time_us })
                .min();

            let Some((due, id)) = due else {
                break;
            };
            if autoplay {
                self.autoplay_front(id, due, outcome);
            } else {
                self.expire_front(id, outcome);
            }
        }
    }

    /// Earliest time at which some pending object changes state on its own.
    pub fn next_due_us(&self) -> Option<i64> {
        let autoplay = self.effective.mods.autoplay;
        self.columns
            .iter()
            .filter_map(|queue| queue.front().copied())
            .map(|id| self.due_time(id, autoplay))
            .min()
    }

    /// Next time `id` must change state without input: its miss deadline,
    /// or its nominal time under autoplay.
    fn due_time(&self, id: usize, autoplay: bool) -> i64 {
        let slack = if autoplay { 0 } else { self.hit_window.miss_us() };
        match self.events()[id] {
            HitEvent::Tap { time_us, .. } => time_us + slack,
            HitEvent::Hold {
                time_us,
                end_time_us,
                ..
            } => {
                if self.notes[id].head.is_none() {
                    time_us + slack
                } else {
                    end_time_us + slack
                }
            }
        }
    }

    /// Nothing consumed the object in time: the pending part misses.
    fn expire_front(&mut self, id: usize, outcome: &mut TickOutcome) {
        let late_us = self.hit_window.miss_us();
        let event = self.events()[id];
        match event {
            HitEvent::Tap { column, .. } => {
                self.pop_front(column, id);
                self.notes[id].head = Some(Judgement::Miss);
                self.apply_judgement(id, NotePart::Tap, Judgement::Miss, late_us, outcome);
            }
            HitEvent::Hold { column, .. } => {
                let state = &mut self.notes[id];
                if state.head.is_none() {
                    state.head = Some(Judgement::Miss);
                    state.broken = true;
                    self.apply_judgement(id, NotePart::Head, Judgement::Miss, late_us, outcome);
                } else {
                    state.tail = Some(Judgement::Miss);
                    state.holding = false;
                    self.pop_front(column, id);
                    self.apply_judgement(id, NotePart::Tail, Judgement::Miss, late_us, outcome);
                }
            }
        }
    }

    /// Autoplay: hits the pending part dead on.
    fn autoplay_front(&mut self, id: usize, time_us: i64, outcome: &mut TickOutcome) {
        let event = self.events()[id];
        match event {
            HitEvent::Tap { column, .. } => {
                self.pop_front(column, id);
                self.notes[id].head = Some(Judgement::Marv);
                self.input_timestamps.push_back(time_us);
                self.apply_judgement(id, NotePart::Tap, Judgement::Marv, 0, outcome);
            }
            HitEvent::Hold { column, .. } => {
                if self.notes[id].head.is_none() {
                    self.notes[id].head = Some(Judgement::Marv);
                    self.notes[id].holding = true;
                    self.keys_held[column] = true;
                    self.input_timestamps.push_back(time_us);
                    self.apply_judgement(id, NotePart::Head, Judgement::Marv, 0, outcome);
                } else {
                    self.notes[id].tail = Some(Judgement::Marv);
                    self.notes[id].holding = false;
                    self.keys_held[column] = false;
                    self.pop_front(column, id);
                    self.apply_judgement(id, NotePart::Tail, Judgement::Marv, 0, outcome);
                }
            }
        }
    }

    /// Removes a fully resolved object from its column queue.
    pub(crate) fn pop_front(&mut self, column: usize, id: usize) {
        let popped = self.columns[column].pop_front();
        debug_assert_eq!(popped, Some(id));
        self.resolved_objects += 1;
    }

    /// Applies a judgement to score, health and the result log.
    pub(crate) fn apply_judgement(
        &mut self,
        object_id: usize,
        part: NotePart,
        judgement: Judgement,
        error_us: i64,
        outcome: &mut TickOutcome,
    ) {
        let result = JudgementResult {
            judgement,
            error_us,
            object_id,
            part,
        };

        self.scoring.hit(judgement);
        self.health.hit(judgement);
        self.hit_errors.push(HitError::from(&result));
        self.last_judgement = Some(result);
        outcome.judgements.push(result);

        if self.health.has_failed() {
            log::info!(
                "ENGINE: Failed on object {} ({:?}) at score {}",
                object_id,
                part,
                self.scoring.state().score
            );
            self.status = SessionStatus::Failed;
        }
    }
}
