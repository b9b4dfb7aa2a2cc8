//! Adapter from `.osu` files to `BeatmapModel`.
//!
//! Only mania circles and holds are kept. Sliders and spinners never
//! appear in converted-free mania charts and are skipped.

use super::beatmap::{BeatmapModel, Difficulty, TimingPoint};
use super::note::HitEvent;
use crate::models::error::{EngineError, EngineResult};
use md5::Context;
use rosu_map::section::general::GameMode;
use rosu_map::section::hit_objects::{HitObject, HitObjectKind};
use std::fs;
use std::path::Path;

/// osu! playfield width used for mania column placement.
const PLAYFIELD_WIDTH: f32 = 512.0;

/// Loads a mania beatmap from disk and tags it with the file's MD5.
pub fn load_beatmap(path: &Path) -> EngineResult<BeatmapModel> {
    let bytes = fs::read(path)
        .map_err(|e| EngineError::Data(format!("failed to read {:?}: {}", path, e)))?;
    let model = parse_beatmap(&bytes)?;
    log::info!(
        "TIMING: Loaded {:?} ({}K, {} objects, {} timing points)",
        path,
        model.key_count(),
        model.events.len(),
        model.timing_points.len()
    );
    Ok(model)
}

/// Parses `.osu` content already in memory.
pub fn parse_beatmap(bytes: &[u8]) -> EngineResult<BeatmapModel> {
    let map = rosu_map::Beatmap::from_bytes(bytes)
        .map_err(|e| EngineError::Data(format!("failed to parse beatmap: {}", e)))?;

    if map.mode != GameMode::Mania {
        return Err(EngineError::Data(format!(
            "unsupported game mode {:?}",
            map.mode
        )));
    }

    let key_count = map.circle_size.round() as usize;
    if key_count == 0 {
        return Err(EngineError::Data(format!(
            "invalid key count {}",
            map.circle_size
        )));
    }

    let mut events = Vec::with_capacity(map.hit_objects.len());
    let mut skipped = 0usize;
    for hit_object in &map.hit_objects {
        match parse_hit_object(hit_object, key_count) {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("TIMING: Skipped {} non-mania hit objects", skipped);
    }

    let mut timing_points: Vec<TimingPoint> = map
        .control_points
        .timing_points
        .iter()
        .map(|tp| TimingPoint::uninherited(tp.time, tp.beat_len))
        .collect();
    timing_points.extend(
        map.control_points
            .difficulty_points
            .iter()
            .map(|dp| TimingPoint::from_multiplier(dp.time, dp.slider_velocity)),
    );

    let difficulty = Difficulty {
        key_count,
        od: f64::from(map.overall_difficulty),
        hp: f64::from(map.hp_drain_rate),
    };

    Ok(BeatmapModel::new(
        i64::from(map.beatmap_id),
        i64::from(map.beatmap_set_id),
        difficulty,
        timing_points,
        events,
    )?
    .with_checksum(checksum(bytes)))
}

/// Hex MD5 of the raw file, used to tie replays to the exact chart.
pub fn checksum(bytes: &[u8]) -> String {
    let mut context = Context::new();
    context.consume(bytes);
    format!("{:x}", context.finalize())
}

fn parse_hit_object(hit_object: &HitObject, key_count: usize) -> Option<HitEvent> {
    match &hit_object.kind {
        HitObjectKind::Circle(circle) => {
            let column = x_to_column(circle.pos.x, key_count)?;
            Some(HitEvent::tap(column, hit_object.start_time))
        }
        HitObjectKind::Hold(hold) => {
            let column = x_to_column(hold.pos_x, key_count)?;
            Some(HitEvent::hold(
                column,
                hit_object.start_time,
                hit_object.start_time + hold.duration,
            ))
        }
        _ => None,
    }
}

/// Converts an osu!mania x position into a column index.
fn x_to_column(x: f32, key_count: usize) -> Option<usize> {
    let column_width = PLAYFIELD_WIDTH / key_count as f32;
    let column = (x / column_width).floor();
    if column < 0.0 {
        return None;
    }
    let column = column as usize;
    (column < key_count).then_some(column)
}
