//! Error type shared by the gameplay core.

use thiserror::Error;

/// Failures surfaced by session construction, input handling and replay playback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The beatmap cannot be played (no objects, no timing, bad ranges).
    #[error("invalid beatmap data: {0}")]
    Data(String),

    /// An input or replay interval referenced a column outside the key count.
    #[error("invalid input: column {column} out of range for {key_count}K")]
    InvalidInput { column: usize, key_count: usize },

    /// Two mutually exclusive mods were requested together.
    #[error("conflicting mods: {0} and {1} cannot be combined")]
    ModConflict(&'static str, &'static str),

    /// Playback rate outside the supported range.
    #[error("unsupported playback rate: {0}")]
    InvalidRate(f64),

    /// The replay describes an input stream the engine can never observe.
    #[error("corrupt replay: {0}")]
    ReplayCorrupt(String),

    /// The session already ended (song end, fail or abort).
    #[error("session has ended")]
    SessionEnded,
}

pub type EngineResult<T> = Result<T, EngineError>;
