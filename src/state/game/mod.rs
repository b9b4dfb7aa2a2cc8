//! Per-session gameplay engine.
//!
//! The `GameEngine` matches column inputs against hit objects and feeds the
//! resulting judgements into scoring and health. It is driven exclusively
//! through `tick`, which is deterministic in its inputs:
//! - events are ordered by `(time, column)` before they are consumed
//! - objects expire in `(deadline, object)` order, interleaved with events by time
//! - an event is never placed at or before the previous tick's time
//!
//! Together these make the judgement sequence independent of how the host
//! slices time into ticks, which is what lets a replay played back on a
//! fixed grid reproduce a live session exactly.
//!
//! All times are in microseconds (i64).

mod input;
mod notes;
mod snapshot;

pub mod actions;

pub use actions::SessionSummary;
pub use snapshot::GameplaySnapshot;

use crate::input::events::{InputEvent, InputKind};
use crate::logic::mod_pipeline::{self, ColumnMapSource, EffectiveBeatmap};
use crate::models::engine::constants::{US_PER_SECOND, ms_to_us};
use crate::models::engine::{BeatmapModel, HitEvent, HitWindow, TimingModel};
use crate::models::error::{EngineError, EngineResult};
use crate::models::health::{HealthState, HealthSystem};
use crate::models::mods::Mods;
use crate::models::replay::ReplayRecorder;
use crate::models::results::GhostTap;
use crate::models::score::{ScoreState, ScoringSystem};
use crate::models::settings::GameplaySettings;
use crate::models::stats::{HitError, JudgementResult};
use notes::NoteState;
use std::collections::VecDeque;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    /// Ticks are no-ops and their inputs are discarded.
    Paused,
    /// Health ran out. Results can still be collected.
    Failed,
    /// Finished or aborted. Every further call is rejected.
    Ended,
}

/// Everything one `tick` produced, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub judgements: Vec<JudgementResult>,
    pub ghost_taps: u32,
    /// Inputs rejected as invalid (logged, not consumed).
    pub dropped_inputs: u32,
    pub failed: bool,
    /// Every object has been judged.
    pub complete: bool,
}

/// Main gameplay engine handling note timing, scoring and health.
pub struct GameEngine {
    pub(crate) effective: EffectiveBeatmap,
    pub(crate) hit_window: HitWindow,
    /// Runtime state per object, indexed like the effective events.
    pub(crate) notes: Vec<NoteState>,
    /// Pending object ids per column, in time order. Only the front is eligible.
    pub(crate) columns: Vec<VecDeque<usize>>,
    pub(crate) resolved_objects: usize,

    /// Currently held keys per column.
    pub keys_held: Vec<bool>,
    pub(crate) last_judgement: Option<JudgementResult>,

    pub(crate) scoring: ScoringSystem,
    pub(crate) health: HealthSystem,
    pub(crate) timing: TimingModel,
    pub(crate) recorder: ReplayRecorder,

    /// Time of the last completed tick.
    pub(crate) cursor_us: i64,
    pub(crate) status: SessionStatus,

    pub(crate) hit_errors: Vec<HitError>,
    pub(crate) ghost_taps: Vec<GhostTap>,
    /// Press times within the last second, for NPS display.
    pub(crate) input_timestamps: VecDeque<i64>,
}

impl GameEngine {
    /// Pre-roll time before the first note (in µs).
    const PRE_ROLL_US: i64 = 3 * US_PER_SECOND;

    /// Starts a session: applies `mods` to `beatmap` and wires up the
    /// scoring, health and timing models.
    pub fn new(
        beatmap: &BeatmapModel,
        mods: &Mods,
        settings: &GameplaySettings,
        source: ColumnMapSource,
    ) -> EngineResult<Self> {
        beatmap.validate()?;
        let effective = mod_pipeline::apply(beatmap, mods, source)?;
        Self::from_effective(effective, settings)
    }

    /// Starts a session over an already transformed beatmap.
    pub fn from_effective(
        effective: EffectiveBeatmap,
        settings: &GameplaySettings,
    ) -> EngineResult<Self> {
        let map = effective.beatmap.clone();
        map.validate()?;
        effective.mods.validate()?;

        let key_count = map.key_count();
        let mods = effective.mods;
        let mut columns = vec![VecDeque::new(); key_count];
        for (id, event) in map.events.iter().enumerate() {
            columns[event.column()].push_back(id);
        }

        let scoring = ScoringSystem::new(
            map.total_judgements(),
            settings.multipliers.multiplier_for(&mods),
        );
        let health = HealthSystem::new(
            &settings.health,
            effective.difficulty.hp,
            mods.sudden_death,
            mods.no_fail,
        );
        let timing = TimingModel::from_beatmap(&map, settings.scroll_speed, mods.constant_speed);

        log::info!(
            "ENGINE: Session ready ({} objects, {} judgements, autoplay: {})",
            map.events.len(),
            map.total_judgements(),
            mods.autoplay
        );

        Ok(Self {
            hit_window: effective.hit_window,
            notes: vec![NoteState::default(); map.events.len()],
            columns,
            resolved_objects: 0,
            keys_held: vec![false; key_count],
            last_judgement: None,
            scoring,
            health,
            timing,
            recorder: ReplayRecorder::new(key_count),
            cursor_us: map.start_time_us().min(0) - Self::PRE_ROLL_US,
            status: SessionStatus::Playing,
            hit_errors: Vec::new(),
            ghost_taps: Vec::new(),
            input_timestamps: VecDeque::new(),
            effective,
        })
    }

    /// Advances the session to `time_ms` (song time), consuming `events`.
    pub fn tick(&mut self, time_ms: f64, events: &[InputEvent]) -> EngineResult<TickOutcome> {
        self.tick_us(ms_to_us(time_ms), events)
    }

    /// Same as [`tick`](Self::tick) with the time already in µs.
    ///
    /// Events timed after `now_us` are pulled back to `now_us`; events at
    /// or before the previous tick are pushed just past it.
    pub fn tick_us(&mut self, now_us: i64, events: &[InputEvent]) -> EngineResult<TickOutcome> {
        match self.status {
            SessionStatus::Failed | SessionStatus::Ended => return Err(EngineError::SessionEnded),
            SessionStatus::Paused => {
                if !events.is_empty() {
                    log::debug!("ENGINE: Paused, discarding {} input(s)", events.len());
                }
                return Ok(TickOutcome::default());
            }
            SessionStatus::Playing => {}
        }

        let floor_us = self.cursor_us + 1;
        if now_us < self.cursor_us {
            log::warn!(
                "ENGINE: Clock went backwards ({} < {}), holding",
                now_us,
                self.cursor_us
            );
        }
        let ceiling_us = now_us.max(floor_us);

        let mut ordered: Vec<InputEvent> = events
            .iter()
            .map(|event| InputEvent {
                time_us: event.time_us.clamp(floor_us, ceiling_us),
                ..*event
            })
            .collect();
        ordered.sort_by_key(|event| (event.time_us, event.column));

        let mut outcome = TickOutcome::default();
        let mut last_event_us = self.cursor_us;
        for event in ordered {
            last_event_us = event.time_us;
            self.advance(event.time_us, &mut outcome);
            if self.status != SessionStatus::Playing {
                break;
            }
            if let Err(e) = self.handle_input(event, &mut outcome) {
                log::warn!("INPUT: Dropping event at {}µs: {}", event.time_us, e);
                outcome.dropped_inputs += 1;
            }
            if self.status != SessionStatus::Playing {
                break;
            }
        }

        let end_us = now_us.max(last_event_us);
        if self.status == SessionStatus::Playing {
            self.advance(end_us, &mut outcome);
        }
        self.cursor_us = end_us;
        self.trim_input_timestamps();

        outcome.failed = self.status == SessionStatus::Failed;
        outcome.complete = self.is_complete();
        Ok(outcome)
    }

    /// Freezes the session. Inputs delivered while paused are dropped.
    ///
    /// Keys still down are released 1µs after the last tick, through the
    /// normal tick path, so key state survives the pause and the replay
    /// carries the same release. The returned outcome holds whatever that
    /// release resolved.
    pub fn pause(&mut self) -> EngineResult<TickOutcome> {
        match self.status {
            SessionStatus::Playing => {}
            SessionStatus::Paused => return Ok(TickOutcome::default()),
            SessionStatus::Failed | SessionStatus::Ended => return Err(EngineError::SessionEnded),
        }

        let release_us = self.cursor_us + 1;
        let releases: Vec<InputEvent> = if self.effective.mods.autoplay {
            Vec::new()
        } else {
            self.keys_held
                .iter()
                .enumerate()
                .filter(|&(_, &held)| held)
                .map(|(column, _)| InputEvent {
                    time_us: release_us,
                    column,
                    kind: InputKind::Release,
                })
                .collect()
        };
        let outcome = self.tick_us(release_us, &releases)?;

        if self.status == SessionStatus::Playing {
            self.status = SessionStatus::Paused;
            log::info!(
                "ENGINE: Paused at {}µs ({} key(s) released)",
                self.cursor_us,
                releases.len()
            );
        }
        Ok(outcome)
    }

    pub fn resume(&mut self) -> EngineResult<()> {
        match self.status {
            SessionStatus::Paused => {
                self.status = SessionStatus::Playing;
                log::info!("ENGINE: Resumed at {}µs", self.cursor_us);
                Ok(())
            }
            SessionStatus::Playing => Ok(()),
            SessionStatus::Failed | SessionStatus::Ended => Err(EngineError::SessionEnded),
        }
    }

    /// Ends the session without producing results.
    pub fn abort(&mut self) {
        if self.status != SessionStatus::Ended {
            log::info!("ENGINE: Session aborted at {}µs", self.cursor_us);
            self.status = SessionStatus::Ended;
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Every object has been judged.
    pub fn is_complete(&self) -> bool {
        self.resolved_objects == self.notes.len()
    }

    /// Complete or failed: the host should call `finish`.
    pub fn is_finished(&self) -> bool {
        self.is_complete() || self.status == SessionStatus::Failed
    }

    /// Time after which no object can still be judged.
    pub fn song_end_us(&self) -> i64 {
        self.effective.beatmap.end_time_us() + self.hit_window.miss_us()
    }

    pub fn effective_beatmap(&self) -> &EffectiveBeatmap {
        &self.effective
    }

    pub fn score_state(&self) -> &ScoreState {
        self.scoring.state()
    }

    pub fn health_state(&self) -> HealthState {
        self.health.state()
    }

    pub(crate) fn events(&self) -> &[HitEvent] {
        &self.effective.beatmap.events
    }

    fn trim_input_timestamps(&mut self) {
        let horizon = self.cursor_us - US_PER_SECOND;
        while self
            .input_timestamps
            .front()
            .is_some_and(|&t| t < horizon)
        {
            self.input_timestamps.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::{Difficulty, TimingPoint};
    use crate::models::stats::{Judgement, NotePart};

    fn map(events: Vec<HitEvent>) -> BeatmapModel {
        BeatmapModel::new(
            1,
            2,
            Difficulty {
                key_count: 4,
                od: 5.0,
                hp: 5.0,
            },
            vec![TimingPoint::uninherited(0.0, 500.0)],
            events,
        )
        .unwrap()
    }

    fn engine(events: Vec<HitEvent>, mods: Mods) -> GameEngine {
        GameEngine::new(
            &map(events),
            &mods,
            &GameplaySettings::default(),
            ColumnMapSource::Seed(0),
        )
        .unwrap()
    }

    fn tiers(outcome: &TickOutcome) -> Vec<Judgement> {
        outcome.judgements.iter().map(|j| j.judgement).collect()
    }

    #[test]
    fn test_od5_hit_inside_marv_window() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        let outcome = game
            .tick(1016.0, &[InputEvent::press(0, 1015.0)])
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Marv]);
        assert_eq!(outcome.judgements[0].error_us, 15_000);
        assert!(outcome.complete);
    }

    #[test]
    fn test_od5_late_press_misses_at_deadline() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        let outcome = game.tick(1173.0, &[]).unwrap();
        assert!(outcome.judgements.is_empty());

        let outcome = game
            .tick(1190.0, &[InputEvent::press(0, 1190.0)])
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Miss]);
        assert_eq!(outcome.ghost_taps, 1);
        assert_eq!(game.score_state().combo, 0);
    }

    #[test]
    fn test_column_queue_is_strict() {
        let mut game = engine(
            vec![HitEvent::tap(0, 1000.0), HitEvent::tap(0, 1100.0)],
            Mods::default(),
        );
        let outcome = game
            .tick(1090.0, &[InputEvent::press(0, 1090.0)])
            .unwrap();
        assert_eq!(outcome.judgements.len(), 1);
        assert_eq!(outcome.judgements[0].object_id, 0);
        assert_eq!(outcome.judgements[0].judgement, Judgement::Good);
    }

    #[test]
    fn test_early_press_is_ghost_tap() {
        let mut game = engine(vec![HitEvent::tap(1, 1000.0)], Mods::default());
        let outcome = game
            .tick(800.0, &[InputEvent::press(1, 800.0), InputEvent::press(2, 800.0)])
            .unwrap();
        assert_eq!(outcome.ghost_taps, 2);
        assert!(outcome.judgements.is_empty());
        assert_eq!(game.score_state().tally.ghost_tap, 2);
    }

    #[test]
    fn test_hold_clean_release() {
        let mut game = engine(vec![HitEvent::hold(2, 2000.0, 2500.0)], Mods::default());
        let outcome = game
            .tick(
                2510.0,
                &[InputEvent::press(2, 2005.0), InputEvent::release(2, 2510.0)],
            )
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Marv, Judgement::Marv]);
        assert_eq!(outcome.judgements[1].part, NotePart::Tail);
        assert!(outcome.complete);
    }

    #[test]
    fn test_early_release_breaks_hold() {
        let mut game = engine(vec![HitEvent::hold(0, 2000.0, 2500.0)], Mods::default());
        game.tick(2100.0, &[InputEvent::press(0, 2000.0), InputEvent::release(0, 2100.0)])
            .unwrap();
        let outcome = game
            .tick(
                2500.0,
                &[InputEvent::press(0, 2300.0), InputEvent::release(0, 2500.0)],
            )
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Bad]);
    }

    #[test]
    fn test_broken_hold_without_release_misses() {
        let mut game = engine(vec![HitEvent::hold(0, 2000.0, 2500.0)], Mods::default());
        game.tick(2100.0, &[InputEvent::press(0, 2000.0), InputEvent::release(0, 2100.0)])
            .unwrap();
        let outcome = game.tick(2700.0, &[]).unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Miss]);
        assert!(game.is_complete());
    }

    #[test]
    fn test_hold_never_released_misses_tail() {
        let mut game = engine(vec![HitEvent::hold(0, 2000.0, 2500.0)], Mods::default());
        let outcome = game
            .tick(3000.0, &[InputEvent::press(0, 2000.0)])
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Marv, Judgement::Miss]);
    }

    #[test]
    fn test_untouched_hold_misses_twice() {
        let mut game = engine(vec![HitEvent::hold(0, 2000.0, 2500.0)], Mods::default());
        let outcome = game.tick(3000.0, &[]).unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Miss, Judgement::Miss]);
        assert_eq!(
            outcome.judgements.iter().map(|j| j.part).collect::<Vec<_>>(),
            vec![NotePart::Head, NotePart::Tail]
        );
    }

    #[test]
    fn test_out_of_range_column_is_dropped() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        let outcome = game
            .tick(
                1000.0,
                &[InputEvent::press(7, 990.0), InputEvent::press(0, 1000.0)],
            )
            .unwrap();
        assert_eq!(outcome.dropped_inputs, 1);
        assert_eq!(tiers(&outcome), vec![Judgement::Marv]);
    }

    #[test]
    fn test_expiries_resolve_in_deadline_order() {
        let mut game = engine(
            vec![HitEvent::tap(3, 1000.0), HitEvent::tap(0, 1050.0)],
            Mods::default(),
        );
        let outcome = game.tick(2000.0, &[]).unwrap();
        let ids: Vec<usize> = outcome.judgements.iter().map(|j| j.object_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_results_do_not_depend_on_tick_size() {
        let events = vec![
            HitEvent::tap(0, 1000.0),
            HitEvent::tap(1, 1000.0),
            HitEvent::hold(2, 1200.0, 1600.0),
            HitEvent::tap(3, 1400.0),
            HitEvent::tap(0, 1500.0),
        ];
        let inputs = vec![
            InputEvent::press(1, 1003.0),
            InputEvent::press(0, 1030.0),
            InputEvent::release(0, 1060.0),
            InputEvent::release(1, 1070.0),
            InputEvent::press(2, 1190.0),
            InputEvent::press(3, 1460.0),
            InputEvent::release(3, 1470.0),
            InputEvent::release(2, 1580.0),
        ];

        let mut coarse = engine(events.clone(), Mods::default());
        coarse.tick(2000.0, &inputs).unwrap();

        let mut fine = engine(events, Mods::default());
        let mut time = 900.0;
        while time <= 2000.0 {
            let batch: Vec<InputEvent> = inputs
                .iter()
                .copied()
                .filter(|e| e.time_ms() > time - 7.0 && e.time_ms() <= time)
                .collect();
            fine.tick(time, &batch).unwrap();
            time += 7.0;
        }
        fine.tick(2000.0, &[]).unwrap();

        let coarse = coarse.finish().unwrap();
        let fine = fine.finish().unwrap();
        assert_eq!(coarse.results, fine.results);
        assert_eq!(coarse.replay, fine.replay);
    }

    #[test]
    fn test_late_events_are_pushed_past_previous_tick() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        game.tick(1100.0, &[]).unwrap();
        let outcome = game
            .tick(1120.0, &[InputEvent::press(0, 1000.0)])
            .unwrap();
        assert_eq!(outcome.judgements[0].error_us, 100_001);
        assert_eq!(outcome.judgements[0].judgement, Judgement::Good);
    }

    #[test]
    fn test_pause_discards_inputs() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        game.pause().unwrap();
        let outcome = game
            .tick(1000.0, &[InputEvent::press(0, 1000.0)])
            .unwrap();
        assert_eq!(outcome, TickOutcome::default());
        assert!(game.get_snapshot().paused);

        game.resume().unwrap();
        let outcome = game.tick(1200.0, &[]).unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Miss]);
    }

    #[test]
    fn test_pause_releases_held_keys() {
        let mut game = engine(
            vec![HitEvent::hold(0, 1000.0, 1500.0), HitEvent::tap(0, 2000.0)],
            Mods::default(),
        );
        game.tick(1000.0, &[InputEvent::press(0, 1000.0)]).unwrap();
        assert!(game.keys_held[0]);

        let outcome = game.pause().unwrap();
        assert!(outcome.judgements.is_empty(), "early release only breaks the hold");
        assert!(!game.keys_held[0]);
        // The release of the physical key arrives while paused.
        game.tick(1200.0, &[InputEvent::release(0, 1200.0)]).unwrap();
        game.resume().unwrap();

        let outcome = game.tick(1700.0, &[]).unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Miss]);
        let outcome = game
            .tick(2000.0, &[InputEvent::press(0, 2000.0)])
            .unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Marv]);
        assert_eq!(outcome.ghost_taps, 0);

        let summary = game.finish().unwrap();
        let replay = summary.replay.unwrap();
        assert_eq!(replay.inputs[0].len(), 2);
        assert_eq!(replay.inputs[0][0].end_us(), 1_000_001);
    }

    #[test]
    fn test_session_is_sized_from_played_events() {
        let beatmap = map(vec![HitEvent::tap(3, 1000.0)]);
        let mut effective =
            mod_pipeline::apply(&beatmap, &Mods::default(), ColumnMapSource::Seed(0)).unwrap();
        effective.difficulty.key_count = 2;

        let mut game = GameEngine::from_effective(effective.clone(), &GameplaySettings::default())
            .expect("difficulty key count does not size the session");
        assert_eq!(game.keys_held.len(), 4);
        let outcome = game.tick(1000.0, &[InputEvent::press(3, 1000.0)]).unwrap();
        assert_eq!(tiers(&outcome), vec![Judgement::Marv]);

        effective.mods.random = true;
        effective.mods.mirror = true;
        let result = GameEngine::from_effective(effective, &GameplaySettings::default());
        assert!(matches!(result, Err(EngineError::ModConflict(..))));
    }

    #[test]
    fn test_ended_session_rejects_calls() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        game.tick(1000.0, &[InputEvent::press(0, 1000.0)]).unwrap();
        assert!(game.is_finished());
        game.finish().unwrap();

        assert_eq!(game.tick(1100.0, &[]), Err(EngineError::SessionEnded));
        assert_eq!(game.finish(), Err(EngineError::SessionEnded));
        assert_eq!(game.pause(), Err(EngineError::SessionEnded));

        let mut aborted = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        aborted.abort();
        assert_eq!(aborted.tick(10.0, &[]), Err(EngineError::SessionEnded));
    }

    #[test]
    fn test_autoplay_is_perfect() {
        let mods = Mods {
            autoplay: true,
            ..Mods::default()
        };
        let mut game = engine(
            vec![
                HitEvent::tap(0, 1000.0),
                HitEvent::tap(1, 1000.0),
                HitEvent::hold(2, 1100.0, 1400.0),
                HitEvent::tap(3, 1500.0),
            ],
            mods,
        );
        game.tick(5000.0, &[InputEvent::press(0, 1200.0)]).unwrap();
        let summary = game.finish().unwrap();

        assert_eq!(summary.results.accuracy, 1.0);
        assert_eq!(summary.results.tally.marv, 5);
        assert_eq!(summary.results.score, 1_000_000);
        assert_eq!(summary.results.tally.ghost_tap, 0);
        assert!(summary.results.autoplay);
        assert!(summary.replay.is_none());
    }

    #[test]
    fn test_sudden_death_fails_on_first_miss() {
        let mods = Mods {
            sudden_death: true,
            ..Mods::default()
        };
        let mut game = engine(
            vec![HitEvent::tap(0, 1000.0), HitEvent::tap(1, 1500.0)],
            mods,
        );
        let outcome = game.tick(2000.0, &[]).unwrap();
        assert!(outcome.failed);
        assert_eq!(outcome.judgements.len(), 1);
        assert_eq!(game.status(), SessionStatus::Failed);
        assert_eq!(game.tick(2100.0, &[]), Err(EngineError::SessionEnded));

        let summary = game.finish().unwrap();
        assert!(summary.results.failed);
        assert!(!summary.results.is_rankable());
    }

    #[test]
    fn test_replay_captures_consumed_inputs() {
        let mut game = engine(vec![HitEvent::tap(0, 1000.0)], Mods::default());
        game.tick(
            1100.0,
            &[
                InputEvent::press(0, 1000.0),
                InputEvent::press(0, 1010.0),
                InputEvent::release(0, 1050.0),
            ],
        )
        .unwrap();
        let replay = game.finish().unwrap().replay.unwrap();
        assert_eq!(replay.press_count(), 1);
        assert_eq!(replay.inputs[0][0].start_us(), 1_000_000);
        assert_eq!(replay.inputs[0][0].end_us(), 1_050_000);
        assert_eq!(replay.column_map, None);
    }

    #[test]
    fn test_invalid_beatmap_fails_fast() {
        let mut broken = map(vec![HitEvent::tap(0, 1000.0)]);
        broken.events.clear();
        let result = GameEngine::new(
            &broken,
            &Mods::default(),
            &GameplaySettings::default(),
            ColumnMapSource::Seed(0),
        );
        assert!(matches!(result, Err(EngineError::Data(_))));
    }

    #[test]
    fn test_snapshot_tracks_hud_state() {
        let mut game = engine(
            vec![HitEvent::tap(0, 1000.0), HitEvent::hold(1, 1000.0, 2000.0)],
            Mods::default(),
        );
        game.tick(
            1010.0,
            &[InputEvent::press(0, 1000.0), InputEvent::press(1, 1005.0)],
        )
        .unwrap();
        let snapshot = game.get_snapshot();
        assert_eq!(snapshot.song_time, 1010.0);
        assert_eq!(snapshot.keys_held, vec![true, true, false, false]);
        assert_eq!(snapshot.score.combo, 2);
        assert_eq!(snapshot.remaining_objects, 1);
        assert_eq!(snapshot.nps, 2.0);
        assert_eq!(snapshot.health, 1.0);
        assert_eq!(snapshot.last_judgement.map(|j| j.part), Some(NotePart::Head));
    }
}
