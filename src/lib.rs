//! Gameplay core of a vertical-scroll rhythm game.
//!
//! Turns a parsed beatmap plus a stream of column key transitions into
//! judgements, score, health and a replay that reproduces the same session.

pub mod database;
pub mod input;
pub mod logic;
pub mod models;
pub mod state;

pub use logic::{ColumnMapSource, ReplayPlayer};
pub use models::engine::BeatmapModel;
pub use models::error::{EngineError, EngineResult};
pub use models::mods::Mods;
pub use models::results::PlayResults;
pub use models::settings::GameplaySettings;
pub use state::{GameEngine, TickOutcome};
