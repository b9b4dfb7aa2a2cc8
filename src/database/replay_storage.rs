//! Replay file storage with Zstd compression.
//!
//! Replays are stored as compressed binary blobs, one per key (usually the
//! play's hash), in `{base}/{key}.r`. Records are serialized with `bincode`
//! before compression to minimize size.

use crate::models::replay::ReplayRecord;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zstd::stream::{decode_all, encode_all};

/// Default base directory for replay files.
pub const REPLAY_DIR: &str = "data/r";

/// Zstd level used for replay blobs (maximum).
const COMPRESSION_LEVEL: i32 = 21;

/// Serializes and compresses a record into an opaque blob.
pub fn encode_replay(record: &ReplayRecord) -> io::Result<Vec<u8>> {
    let binary_data =
        bincode::serde::encode_to_vec(record, bincode::config::standard()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;
    encode_all(&binary_data[..], COMPRESSION_LEVEL)
}

/// Inverse of [`encode_replay`].
pub fn decode_replay(blob: &[u8]) -> io::Result<ReplayRecord> {
    let binary_data = decode_all(blob)?;
    let (record, _len): (ReplayRecord, usize) =
        bincode::serde::decode_from_slice(&binary_data, bincode::config::standard()).map_err(
            |e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Deserialization error: {}", e),
                )
            },
        )?;
    Ok(record)
}

/// Persistence collaborator for finalized replays.
pub trait ReplayStore {
    /// Takes ownership of a finalized record.
    fn save(&mut self, key: &str, record: ReplayRecord) -> io::Result<()>;
    fn load(&self, key: &str) -> io::Result<ReplayRecord>;
    fn delete(&mut self, key: &str) -> io::Result<()>;
    fn exists(&self, key: &str) -> bool;
}

/// Stores each replay as a compressed file under a base directory.
#[derive(Debug, Clone)]
pub struct FileReplayStore {
    base_dir: PathBuf,
}

impl FileReplayStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the path for a replay file given its key.
    pub fn replay_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.r", key))
    }
}

impl Default for FileReplayStore {
    fn default() -> Self {
        Self::new(REPLAY_DIR)
    }
}

impl ReplayStore for FileReplayStore {
    fn save(&mut self, key: &str, record: ReplayRecord) -> io::Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.replay_path(key);
        let blob = encode_replay(&record)?;
        let mut file = File::create(&path)?;
        file.write_all(&blob)?;
        log::info!("STORAGE: Saved replay {:?} ({} bytes)", path, blob.len());
        Ok(())
    }

    fn load(&self, key: &str) -> io::Result<ReplayRecord> {
        load_replay_from_path(&self.replay_path(key))
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        let path = self.replay_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("STORAGE: Deleted replay {:?}", path);
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.replay_path(key).exists()
    }
}

/// Load replay data from a specific path.
pub fn load_replay_from_path(path: &Path) -> io::Result<ReplayRecord> {
    let blob = fs::read(path)?;
    decode_replay(&blob)
}

/// Keeps encoded blobs in memory. Used by headless verification and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryReplayStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ReplayStore for MemoryReplayStore {
    fn save(&mut self, key: &str, record: ReplayRecord) -> io::Result<()> {
        self.blobs.insert(key.to_string(), encode_replay(&record)?);
        Ok(())
    }

    fn load(&self, key: &str) -> io::Result<ReplayRecord> {
        let blob = self.blobs.get(key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no replay for {}", key))
        })?;
        decode_replay(blob)
    }

    fn delete(&mut self, key: &str) -> io::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }
}
