//! Column input events exchanged between the platform layer and the engine.

use crate::models::engine::constants::{ms_to_us, us_to_ms};
use serde::{Deserialize, Serialize};

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Release,
}

/// A timestamped key transition on a played column.
///
/// `time_us` is on the session clock (song time), not wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub time_us: i64,
    pub column: usize,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn press(column: usize, time_ms: f64) -> Self {
        Self {
            time_us: ms_to_us(time_ms),
            column,
            kind: InputKind::Press,
        }
    }

    pub fn release(column: usize, time_ms: f64) -> Self {
        Self {
            time_us: ms_to_us(time_ms),
            column,
            kind: InputKind::Release,
        }
    }

    pub fn time_ms(&self) -> f64 {
        us_to_ms(self.time_us)
    }

    pub fn is_press(&self) -> bool {
        self.kind == InputKind::Press
    }
}
