//! Replay persistence.

pub mod replay_storage;

pub use replay_storage::{
    FileReplayStore, MemoryReplayStore, ReplayStore, decode_replay, encode_replay,
};
