//! Turns a parsed beatmap plus mods into the beatmap actually played.
//!
//! Pure: the same inputs always give the same effective beatmap. Randomness
//! enters only through the seed of a fresh session; replays pass the stored
//! column map instead.

use crate::models::engine::beatmap::{BeatmapModel, Difficulty};
use crate::models::engine::hit_window::HitWindow;
use crate::models::engine::note::HitEvent;
use crate::models::error::{EngineError, EngineResult};
use crate::models::mods::{ColumnMap, Mods};
use std::sync::Arc;

/// Where the column permutation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMapSource {
    /// New session: derive the map (random uses this seed).
    Seed(u64),
    /// Replay playback: reuse the map stored with the replay.
    Stored(Vec<usize>),
}

/// Output of the pipeline, shared read-only by everything in a session.
#[derive(Debug, Clone)]
pub struct EffectiveBeatmap {
    /// Remapped events with adjusted difficulty.
    pub beatmap: Arc<BeatmapModel>,
    pub difficulty: Difficulty,
    pub hit_window: HitWindow,
    pub column_map: ColumnMap,
    pub mods: Mods,
}

impl EffectiveBeatmap {
    /// Key count of the events actually played.
    pub fn key_count(&self) -> usize {
        self.beatmap.key_count()
    }

    pub fn rate(&self) -> f64 {
        self.mods.playback_rate
    }

    /// Song time reached after `real_ms` of wall-clock playback.
    pub fn song_time_from_real(&self, real_ms: f64) -> f64 {
        real_ms * self.rate()
    }

    /// Wall-clock time needed to reach `song_ms`.
    pub fn real_time_from_song(&self, song_ms: f64) -> f64 {
        song_ms / self.rate()
    }

    /// Map to persist with a replay; `None` when no remap mod is active.
    pub fn persisted_column_map(&self) -> Option<Vec<usize>> {
        (self.mods.random || self.mods.mirror).then(|| self.column_map.as_slice().to_vec())
    }
}

/// Applies `mods` to `beatmap`.
pub fn apply(
    beatmap: &BeatmapModel,
    mods: &Mods,
    source: ColumnMapSource,
) -> EngineResult<EffectiveBeatmap> {
    mods.validate()?;

    let key_count = beatmap.key_count();
    let column_map = resolve_column_map(key_count, mods, source)?;

    let events: Vec<HitEvent> = beatmap
        .events
        .iter()
        .map(|event| {
            let event = event.with_column(column_map.apply(event.column()));
            if mods.hold_off { event.into_tap() } else { event }
        })
        .collect();

    let difficulty = Difficulty {
        key_count,
        od: mods.effective_od(beatmap.difficulty.od),
        hp: mods.effective_hp(beatmap.difficulty.hp),
    };
    let hit_window = HitWindow::from_osu_od(difficulty.od);

    log::info!(
        "MODS: {}K OD {:.1} -> {:.1}, HP {:.1} -> {:.1}, rate {:.2}x, columns {:?}",
        key_count,
        beatmap.difficulty.od,
        difficulty.od,
        beatmap.difficulty.hp,
        difficulty.hp,
        mods.playback_rate,
        column_map.as_slice()
    );

    let effective = BeatmapModel {
        beatmap_id: beatmap.beatmap_id,
        beatmap_set_id: beatmap.beatmap_set_id,
        checksum: beatmap.checksum.clone(),
        difficulty,
        timing_points: beatmap.timing_points.clone(),
        events,
    };

    Ok(EffectiveBeatmap {
        beatmap: Arc::new(effective),
        difficulty,
        hit_window,
        column_map,
        mods: *mods,
    })
}

fn resolve_column_map(
    key_count: usize,
    mods: &Mods,
    source: ColumnMapSource,
) -> EngineResult<ColumnMap> {
    match source {
        ColumnMapSource::Seed(seed) => Ok(if mods.random {
            ColumnMap::shuffled(key_count, seed)
        } else if mods.mirror {
            ColumnMap::mirror(key_count)
        } else {
            ColumnMap::identity(key_count)
        }),
        ColumnMapSource::Stored(columns) => {
            let stored = ColumnMap::from_vec(columns, key_count)?;
            let consistent = if mods.random {
                true
            } else if mods.mirror {
                stored == ColumnMap::mirror(key_count)
            } else {
                stored.is_identity()
            };
            if !consistent {
                return Err(EngineError::ReplayCorrupt(format!(
                    "stored column map {:?} does not match the replay mods",
                    stored.as_slice()
                )));
            }
            Ok(stored)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::beatmap::TimingPoint;

    fn map() -> BeatmapModel {
        BeatmapModel::new(
            10,
            20,
            Difficulty {
                key_count: 4,
                od: 8.0,
                hp: 6.0,
            },
            vec![TimingPoint::uninherited(0.0, 500.0)],
            vec![
                HitEvent::tap(0, 1000.0),
                HitEvent::hold(1, 1200.0, 1800.0),
                HitEvent::tap(3, 2000.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_no_mods_is_identity() {
        let source = map();
        let effective = apply(&source, &Mods::default(), ColumnMapSource::Seed(1)).unwrap();
        assert_eq!(effective.beatmap.events, source.events);
        assert!(effective.column_map.is_identity());
        assert_eq!(effective.persisted_column_map(), None);
        assert_eq!(effective.hit_window, HitWindow::from_osu_od(8.0));
    }

    #[test]
    fn test_mirror_reverses_columns() {
        let mods = Mods {
            mirror: true,
            ..Mods::default()
        };
        let effective = apply(&map(), &mods, ColumnMapSource::Seed(0)).unwrap();
        let columns: Vec<usize> = effective.beatmap.events.iter().map(HitEvent::column).collect();
        assert_eq!(columns, vec![3, 2, 0]);
        assert_eq!(effective.persisted_column_map(), Some(vec![3, 2, 1, 0]));
    }

    #[test]
    fn test_random_with_identity_map_equals_nomod() {
        let source = map();
        let mods = Mods {
            random: true,
            ..Mods::default()
        };
        let random = apply(&source, &mods, ColumnMapSource::Stored(vec![0, 1, 2, 3])).unwrap();
        let plain = apply(&source, &Mods::default(), ColumnMapSource::Seed(9)).unwrap();
        assert_eq!(random.beatmap.events, plain.beatmap.events);
        assert_eq!(random.hit_window, plain.hit_window);
    }

    #[test]
    fn test_stored_map_reproduces_random() {
        let source = map();
        let mods = Mods {
            random: true,
            ..Mods::default()
        };
        let live = apply(&source, &mods, ColumnMapSource::Seed(1234)).unwrap();
        let stored = live.persisted_column_map().unwrap();
        let replayed = apply(&source, &mods, ColumnMapSource::Stored(stored)).unwrap();
        assert_eq!(live.beatmap.events, replayed.beatmap.events);
    }

    #[test]
    fn test_inconsistent_stored_map_is_corrupt() {
        let mods = Mods {
            mirror: true,
            ..Mods::default()
        };
        let err = apply(&map(), &mods, ColumnMapSource::Stored(vec![1, 0, 2, 3]));
        assert!(matches!(err, Err(EngineError::ReplayCorrupt(_))));

        let err = apply(&map(), &Mods::default(), ColumnMapSource::Stored(vec![1, 0, 2, 3]));
        assert!(matches!(err, Err(EngineError::ReplayCorrupt(_))));
    }

    #[test]
    fn test_hold_off_keeps_heads_only() {
        let mods = Mods {
            hold_off: true,
            ..Mods::default()
        };
        let effective = apply(&map(), &mods, ColumnMapSource::Seed(0)).unwrap();
        assert!(effective.beatmap.events.iter().all(|e| !e.is_hold()));
        assert_eq!(effective.beatmap.events[1], HitEvent::tap(1, 1200.0));
        assert_eq!(effective.beatmap.total_judgements(), 3);
    }

    #[test]
    fn test_difficulty_mods_shape_windows() {
        let mods = Mods {
            hard_rock: true,
            ..Mods::default()
        };
        let effective = apply(&map(), &mods, ColumnMapSource::Seed(0)).unwrap();
        assert_eq!(effective.difficulty.od, 10.0);
        assert_eq!(effective.hit_window, HitWindow::from_osu_od(10.0));
        assert!((effective.difficulty.hp - 8.4).abs() < 1e-9);
    }

    #[test]
    fn test_conflicting_mods_rejected() {
        let mods = Mods {
            random: true,
            mirror: true,
            ..Mods::default()
        };
        assert!(matches!(
            apply(&map(), &mods, ColumnMapSource::Seed(0)),
            Err(EngineError::ModConflict(..))
        ));
    }

    #[test]
    fn test_rate_converts_time_bases() {
        let mods = Mods {
            playback_rate: 1.5,
            ..Mods::default()
        };
        let effective = apply(&map(), &mods, ColumnMapSource::Seed(0)).unwrap();
        assert_eq!(effective.song_time_from_real(1000.0), 1500.0);
        assert_eq!(effective.real_time_from_song(1500.0), 1000.0);
        // Windows stay in song time.
        assert_eq!(effective.hit_window, HitWindow::from_osu_od(8.0));
    }
}
