//! Session-level logic built on top of the models.
//!
//! - `mod_pipeline` turns a beatmap and a mod set into the beatmap actually played
//! - `replay_engine` feeds recorded inputs back through the gameplay engine

pub mod mod_pipeline;
pub mod replay_engine;

pub use mod_pipeline::{ColumnMapSource, EffectiveBeatmap};
pub use replay_engine::{ReplayPlayer, simulate};
