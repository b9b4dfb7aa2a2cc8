//! Hit object definitions.
//!
//! All times are stored in **microseconds (i64)** so that replayed inputs
//! land on exactly the same values as the live ones.

use super::constants::{ms_to_us, us_to_ms};
use serde::{Deserialize, Serialize};

/// One hit object of a beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitEvent {
    /// Simple tap note - press once.
    Tap { column: usize, time_us: i64 },
    /// Hold/long note - press at `time_us`, release at `end_time_us`.
    Hold {
        column: usize,
        time_us: i64,
        end_time_us: i64,
    },
}

impl HitEvent {
    /// Creates a tap note from a millisecond timestamp.
    pub fn tap(column: usize, time_ms: f64) -> Self {
        HitEvent::Tap {
            column,
            time_us: ms_to_us(time_ms),
        }
    }

    /// Creates a hold note from millisecond timestamps.
    pub fn hold(column: usize, time_ms: f64, end_time_ms: f64) -> Self {
        HitEvent::Hold {
            column,
            time_us: ms_to_us(time_ms),
            end_time_us: ms_to_us(end_time_ms),
        }
    }

    pub fn column(&self) -> usize {
        match *self {
            HitEvent::Tap { column, .. } | HitEvent::Hold { column, .. } => column,
        }
    }

    /// Start (head) time in µs.
    pub fn time_us(&self) -> i64 {
        match *self {
            HitEvent::Tap { time_us, .. } | HitEvent::Hold { time_us, .. } => time_us,
        }
    }

    /// End time in µs. Same as start for taps.
    pub fn end_time_us(&self) -> i64 {
        match *self {
            HitEvent::Tap { time_us, .. } => time_us,
            HitEvent::Hold { end_time_us, .. } => end_time_us,
        }
    }

    pub fn time_ms(&self) -> f64 {
        us_to_ms(self.time_us())
    }

    pub fn end_time_ms(&self) -> f64 {
        us_to_ms(self.end_time_us())
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, HitEvent::Hold { .. })
    }

    /// Number of judgements this object produces (taps 1, holds 2).
    pub fn judgement_count(&self) -> usize {
        match self {
            HitEvent::Tap { .. } => 1,
            HitEvent::Hold { .. } => 2,
        }
    }

    /// Same object moved to another column.
    pub fn with_column(self, new_column: usize) -> Self {
        match self {
            HitEvent::Tap { time_us, .. } => HitEvent::Tap {
                column: new_column,
                time_us,
            },
            HitEvent::Hold {
                time_us,
                end_time_us,
                ..
            } => HitEvent::Hold {
                column: new_column,
                time_us,
                end_time_us,
            },
        }
    }

    /// Drops the tail of a hold, keeping only its head as a tap.
    pub fn into_tap(self) -> Self {
        HitEvent::Tap {
            column: self.column(),
            time_us: self.time_us(),
        }
    }
}
