//! Serializable replay structures and the live input recorder.
//!
//! A replay stores, per played column, the list of `[start, duration]`
//! intervals the key was held. Engine times are µs; the wire format keeps
//! milliseconds so that `start_ms * 1000` rounds back to the exact µs value.

use crate::models::engine::constants::{ms_to_us, us_to_ms};
use crate::models::error::{EngineError, EngineResult};
use crate::models::mods::EncodedMods;
use serde::{Deserialize, Serialize};

/// Current replay format version. Bump when the layout or mod bits change.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Largest start time or duration a replay interval may carry (24 hours).
pub const MAX_INTERVAL_MS: f64 = 86_400_000.0;

/// One held interval: `[start_ms, duration_ms]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayInterval(pub f64, pub f64);

impl ReplayInterval {
    pub fn from_us(start_us: i64, duration_us: i64) -> Self {
        Self(us_to_ms(start_us), us_to_ms(duration_us))
    }

    pub fn start_ms(&self) -> f64 {
        self.0
    }

    pub fn duration_ms(&self) -> f64 {
        self.1
    }

    pub fn start_us(&self) -> i64 {
        ms_to_us(self.0)
    }

    /// Release time, summed in µs so it matches the recorded value exactly.
    ///
    /// Saturates on intervals that [`ReplayRecord::validate`] would reject.
    pub fn end_us(&self) -> i64 {
        self.start_us().saturating_add(ms_to_us(self.1))
    }

    /// Finite, non-negative duration and both fields within [`MAX_INTERVAL_MS`].
    pub fn is_in_bounds(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && self.0.abs() <= MAX_INTERVAL_MS
            && (0.0..=MAX_INTERVAL_MS).contains(&self.1)
    }
}

/// A finalized replay, handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub version: u8,
    pub beatmap_id: i64,
    pub beatmap_set_id: i64,
    /// MD5 of the beatmap file the replay was recorded on, when known.
    #[serde(default)]
    pub beatmap_checksum: Option<String>,
    pub mods: EncodedMods,
    /// Chart column -> played column, present when a remap mod was active.
    #[serde(default)]
    pub column_map: Option<Vec<usize>>,
    /// Held intervals, indexed by played column.
    pub inputs: Vec<Vec<ReplayInterval>>,
}

impl ReplayRecord {
    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of key presses stored.
    pub fn press_count(&self) -> usize {
        self.inputs.iter().map(Vec::len).sum()
    }

    /// Checks the structural invariants the player relies on.
    ///
    /// Intervals must be finite, bounded, non-negative, time-ordered and
    /// non-overlapping within a column. Columns beyond the key count are
    /// left to the engine, which drops them as invalid input.
    pub fn validate(&self) -> EngineResult<()> {
        if self.version != REPLAY_FORMAT_VERSION {
            return Err(EngineError::ReplayCorrupt(format!(
                "unsupported replay version {} (expected {REPLAY_FORMAT_VERSION})",
                self.version
            )));
        }
        for (column, intervals) in self.inputs.iter().enumerate() {
            let mut previous_end: Option<i64> = None;
            for interval in intervals {
                if !interval.is_in_bounds() {
                    return Err(EngineError::ReplayCorrupt(format!(
                        "column {column}: invalid interval {interval:?}"
                    )));
                }
                if previous_end.is_some_and(|end| interval.start_us() < end) {
                    return Err(EngineError::ReplayCorrupt(format!(
                        "column {column}: interval {interval:?} overlaps or is out of order"
                    )));
                }
                previous_end = Some(interval.end_us());
            }
        }
        Ok(())
    }
}

/// Captures the input stream the engine consumes into per-column intervals.
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    pending: Vec<Option<i64>>,
    inputs: Vec<Vec<ReplayInterval>>,
}

impl ReplayRecorder {
    pub fn new(key_count: usize) -> Self {
        Self {
            pending: vec![None; key_count],
            inputs: vec![Vec::new(); key_count],
        }
    }

    /// Key went down. A repeated down while already held is ignored.
    pub fn press(&mut self, column: usize, time_us: i64) {
        if let Some(slot) = self.pending.get_mut(column) {
            if slot.is_none() {
                *slot = Some(time_us);
            }
        }
    }

    /// Key went up: closes the pending interval, if any.
    pub fn release(&mut self, column: usize, time_us: i64) {
        let Some(start) = self.pending.get_mut(column).and_then(Option::take) else {
            return;
        };
        let duration = (time_us - start).max(0);
        self.inputs[column].push(ReplayInterval::from_us(start, duration));
    }

    /// Drops any key still held: only complete intervals are emitted.
    pub fn finalize(
        self,
        beatmap_id: i64,
        beatmap_set_id: i64,
        beatmap_checksum: Option<String>,
        mods: EncodedMods,
        column_map: Option<Vec<usize>>,
    ) -> ReplayRecord {
        let dangling = self.pending.iter().filter(|p| p.is_some()).count();
        if dangling > 0 {
            log::debug!("REPLAY: Dropping {dangling} unreleased key(s)");
        }

        ReplayRecord {
            version: REPLAY_FORMAT_VERSION,
            beatmap_id,
            beatmap_set_id,
            beatmap_checksum,
            mods,
            column_map,
            inputs: self.inputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mods::Mods;

    fn finalize(recorder: ReplayRecorder) -> ReplayRecord {
        recorder.finalize(1, 2, None, Mods::default().encode(), None)
    }

    #[test]
    fn test_recorder_builds_intervals() {
        let mut recorder = ReplayRecorder::new(4);
        recorder.press(1, 1_000_000);
        recorder.press(2, 1_010_000);
        recorder.release(1, 1_080_500);
        recorder.release(2, 1_200_000);
        recorder.press(1, 1_500_000);
        recorder.release(1, 1_600_000);

        let record = finalize(recorder);
        assert_eq!(
            record.inputs[1],
            vec![ReplayInterval(1000.0, 80.5), ReplayInterval(1500.0, 100.0)]
        );
        assert_eq!(record.inputs[2], vec![ReplayInterval(1010.0, 190.0)]);
        assert!(record.inputs[0].is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_unreleased_key_is_dropped() {
        let mut recorder = ReplayRecorder::new(2);
        recorder.press(0, 100);
        recorder.release(0, 200);
        recorder.press(0, 300);
        let record = finalize(recorder);
        assert_eq!(record.press_count(), 1);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut recorder = ReplayRecorder::new(2);
        recorder.release(1, 500);
        recorder.press(9, 10);
        assert_eq!(finalize(recorder).press_count(), 0);
    }

    #[test]
    fn test_interval_end_is_exact_in_us() {
        let interval = ReplayInterval::from_us(1_000_123, 99_877);
        assert_eq!(interval.start_us(), 1_000_123);
        assert_eq!(interval.end_us(), 1_100_000);
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut record = finalize(ReplayRecorder::new(2));
        record.inputs[0] = vec![ReplayInterval(100.0, 50.0), ReplayInterval(120.0, 10.0)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));

        record.inputs[0] = vec![ReplayInterval(100.0, -5.0)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));

        record.inputs[0] = vec![ReplayInterval(f64::NAN, 5.0)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));
    }

    #[test]
    fn test_validate_rejects_huge_intervals() {
        let mut record = finalize(ReplayRecorder::new(2));
        record.inputs[1] = vec![ReplayInterval(9.2e15, 9.2e15)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));

        record.inputs[1] = vec![ReplayInterval(1000.0, MAX_INTERVAL_MS * 2.0)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));

        record.inputs[1] = vec![ReplayInterval(-MAX_INTERVAL_MS * 2.0, 10.0)];
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));

        record.inputs[1] = vec![ReplayInterval(MAX_INTERVAL_MS, MAX_INTERVAL_MS)];
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_end_saturates_instead_of_overflowing() {
        assert_eq!(ReplayInterval(9.2e15, 9.2e15).end_us(), i64::MAX);
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let mut record = finalize(ReplayRecorder::new(1));
        record.version = REPLAY_FORMAT_VERSION + 1;
        assert!(matches!(record.validate(), Err(EngineError::ReplayCorrupt(_))));
    }

    #[test]
    fn test_json_shape_uses_pairs() {
        let mut recorder = ReplayRecorder::new(1);
        recorder.press(0, 1_000_000);
        recorder.release(0, 1_250_000);
        let json = finalize(recorder).to_json().unwrap();
        assert!(json.contains("\"inputs\":[[[1000.0,250.0]]]"), "{json}");
        let back = ReplayRecord::from_json(&json).unwrap();
        assert_eq!(back.inputs[0][0], ReplayInterval(1000.0, 250.0));
    }
}
