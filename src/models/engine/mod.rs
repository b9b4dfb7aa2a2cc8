//! Beatmap data, hit windows and scroll timing.

pub mod beatmap;
pub mod constants;
pub mod hit_window;
pub mod loader;
pub mod note;
pub mod timing;

pub use beatmap::{BeatmapModel, Difficulty, TimingPoint};
pub use constants::*;
pub use hit_window::HitWindow;
pub use loader::{load_beatmap, parse_beatmap};
pub use note::HitEvent;
pub use timing::TimingModel;
