//! Session state.
//!
//! `GameEngine` is the only state this crate manages: one per play, live or
//! replayed, driven through `tick`.

pub mod game;

pub use game::{GameEngine, GameplaySnapshot, SessionStatus, SessionSummary, TickOutcome};
