//! Data types shared by the gameplay core.

pub mod engine;
pub mod error;
pub mod health;
pub mod mods;
pub mod replay;
pub mod results;
pub mod score;
pub mod settings;
pub mod stats;

pub use error::{EngineError, EngineResult};
