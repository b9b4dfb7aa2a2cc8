//! Input events and the per-tick buffer between platform and engine.

pub mod events;
pub mod queue;

pub use events::{InputEvent, InputKind};
pub use queue::{InputQueue, InputSender};
