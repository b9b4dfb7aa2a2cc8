//! Immutable beatmap model handed to the engine by the parser.

use super::constants::{MAX_KEY_COUNT, MIN_KEY_COUNT};
use super::note::HitEvent;
use crate::models::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Slider-velocity bounds for inherited points.
const MIN_SCROLL_MULTIPLIER: f64 = 0.1;
const MAX_SCROLL_MULTIPLIER: f64 = 10.0;

/// Difficulty parameters of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub key_count: usize,
    pub od: f64,
    pub hp: f64,
}

/// A tempo (uninherited) or scroll multiplier (inherited) change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub time_ms: f64,
    /// Uninherited: ms per beat. Inherited: negative percentage (`-50` = 2x).
    pub beat_length_ms: f64,
    pub uninherited: bool,
    /// Multiplier carried by this point (1.0 for uninherited points).
    /// Informational: scroll always derives it from `beat_length_ms`.
    pub scroll_velocity: f64,
}

impl TimingPoint {
    pub fn uninherited(time_ms: f64, beat_length_ms: f64) -> Self {
        Self {
            time_ms,
            beat_length_ms,
            uninherited: true,
            scroll_velocity: 1.0,
        }
    }

    /// Inherited point from its stored (negative) beat length.
    pub fn inherited(time_ms: f64, beat_length_ms: f64) -> Self {
        Self {
            time_ms,
            beat_length_ms,
            uninherited: false,
            scroll_velocity: inherited_multiplier(beat_length_ms),
        }
    }

    /// Inherited point from a plain multiplier (`2.0` = twice as fast).
    pub fn from_multiplier(time_ms: f64, multiplier: f64) -> Self {
        let multiplier = clamp_multiplier(multiplier);
        Self::inherited(time_ms, -100.0 / multiplier)
    }
}

/// `100 / -beatLength`, saturated to the supported multiplier range.
pub fn inherited_multiplier(beat_length_ms: f64) -> f64 {
    if beat_length_ms >= 0.0 || !beat_length_ms.is_finite() {
        return 1.0;
    }
    clamp_multiplier(100.0 / -beat_length_ms)
}

fn clamp_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_nan() {
        return 1.0;
    }
    multiplier.clamp(MIN_SCROLL_MULTIPLIER, MAX_SCROLL_MULTIPLIER)
}

/// One parsed difficulty. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatmapModel {
    pub beatmap_id: i64,
    pub beatmap_set_id: i64,
    /// MD5 of the source file, when known.
    pub checksum: Option<String>,
    pub difficulty: Difficulty,
    pub timing_points: Vec<TimingPoint>,
    pub events: Vec<HitEvent>,
}

impl BeatmapModel {
    /// Validates and normalises parser output.
    ///
    /// Events and timing points are stably sorted by time and the first
    /// timing point is moved to time 0.
    pub fn new(
        beatmap_id: i64,
        beatmap_set_id: i64,
        difficulty: Difficulty,
        mut timing_points: Vec<TimingPoint>,
        mut events: Vec<HitEvent>,
    ) -> EngineResult<Self> {
        if timing_points.iter().any(|tp| !tp.time_ms.is_finite()) {
            return Err(EngineError::Data("timing point at non-finite time".into()));
        }
        timing_points.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        if let Some(first) = timing_points.first_mut() {
            first.time_ms = 0.0;
        }
        events.sort_by_key(|e| e.time_us());

        let map = Self {
            beatmap_id,
            beatmap_set_id,
            checksum: None,
            difficulty,
            timing_points,
            events,
        };
        map.validate()?;
        Ok(map)
    }

    /// Checks that the model can be played. Sessions call this again
    /// because the fields are public.
    pub fn validate(&self) -> EngineResult<()> {
        let key_count = self.difficulty.key_count;
        if !(MIN_KEY_COUNT..=MAX_KEY_COUNT).contains(&key_count) {
            return Err(EngineError::Data(format!(
                "key count {key_count} outside {MIN_KEY_COUNT}..={MAX_KEY_COUNT}"
            )));
        }
        if self.events.is_empty() {
            return Err(EngineError::Data("beatmap has no hit objects".into()));
        }
        let Some(first_point) = self.timing_points.first() else {
            return Err(EngineError::Data("beatmap has no timing points".into()));
        };

        for (i, event) in self.events.iter().enumerate() {
            if event.column() >= key_count {
                return Err(EngineError::Data(format!(
                    "object {i} uses column {} in a {key_count}K map",
                    event.column()
                )));
            }
            if event.end_time_us() < event.time_us() {
                return Err(EngineError::Data(format!("hold {i} ends before it starts")));
            }
        }
        if self.events.windows(2).any(|w| w[1].time_us() < w[0].time_us()) {
            return Err(EngineError::Data("hit objects are not time-ordered".into()));
        }

        if !first_point.uninherited {
            return Err(EngineError::Data(
                "first timing point must be uninherited".into(),
            ));
        }
        if let Some(bad) = self
            .timing_points
            .iter()
            .find(|tp| tp.uninherited && !(tp.beat_length_ms.is_finite() && tp.beat_length_ms > 0.0))
        {
            return Err(EngineError::Data(format!(
                "invalid beat length {} at {}ms",
                bad.beat_length_ms, bad.time_ms
            )));
        }
        Ok(())
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn key_count(&self) -> usize {
        self.difficulty.key_count
    }

    /// Total judgements a full run produces (holds count head and tail).
    pub fn total_judgements(&self) -> usize {
        self.events.iter().map(HitEvent::judgement_count).sum()
    }

    /// Time of the first object in µs.
    pub fn start_time_us(&self) -> i64 {
        self.events.first().map_or(0, HitEvent::time_us)
    }

    /// Latest object end in µs.
    pub fn end_time_us(&self) -> i64 {
        self.events
            .iter()
            .map(HitEvent::end_time_us)
            .max()
            .unwrap_or(0)
    }
}
