//! Scroll velocity derived from timing points.
//!
//! The renderer asks for `velocity_at` / `position_at` each frame; the
//! judgement engine never depends on this module.

use super::beatmap::{BeatmapModel, TimingPoint, inherited_multiplier};
use super::constants::us_to_ms;
use ordered_float::OrderedFloat;
use std::collections::HashMap;

/// Velocity active from `time_ms` until the next segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VelocitySegment {
    time_ms: f64,
    velocity: f64,
    /// Integrated scroll distance at `time_ms`.
    position: f64,
}

/// Piecewise-constant scroll velocity over song time.
#[derive(Debug, Clone)]
pub struct TimingModel {
    base_speed: f64,
    reference_beat_length: f64,
    segments: Vec<VelocitySegment>,
}

impl TimingModel {
    /// Builds the model for the playable range `[start_ms, end_ms]`.
    ///
    /// `points` must be time-ordered and start with an uninherited point,
    /// which `BeatmapModel::new` guarantees.
    pub fn new(
        points: &[TimingPoint],
        base_speed: f64,
        constant_speed: bool,
        start_ms: f64,
        end_ms: f64,
    ) -> Self {
        let base_speed = if base_speed.is_finite() && base_speed > 0.0 {
            base_speed
        } else {
            log::warn!("TIMING: Invalid scroll speed {base_speed}, using 1.0");
            1.0
        };

        let reference_beat_length = most_common_beat_length(points, start_ms, end_ms);

        let segments = if constant_speed || points.is_empty() {
            vec![VelocitySegment {
                time_ms: 0.0,
                velocity: base_speed,
                position: 0.0,
            }]
        } else {
            build_segments(points, base_speed, reference_beat_length)
        };

        log::debug!(
            "TIMING: {} segments, reference beat {:.3}ms, constant={}",
            segments.len(),
            reference_beat_length,
            constant_speed
        );

        Self {
            base_speed,
            reference_beat_length,
            segments,
        }
    }

    /// Builds the model over the beatmap's own hit-object range.
    pub fn from_beatmap(map: &BeatmapModel, base_speed: f64, constant_speed: bool) -> Self {
        Self::new(
            &map.timing_points,
            base_speed,
            constant_speed,
            us_to_ms(map.start_time_us()),
            us_to_ms(map.end_time_us()),
        )
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// Beat length that maps to exactly the base speed.
    pub fn reference_beat_length(&self) -> f64 {
        self.reference_beat_length
    }

    fn segment_index(&self, time_ms: f64) -> usize {
        self.segments
            .partition_point(|s| s.time_ms <= time_ms)
            .saturating_sub(1)
    }

    /// Scroll velocity active at `time_ms`.
    pub fn velocity_at(&self, time_ms: f64) -> f64 {
        self.segments[self.segment_index(time_ms)].velocity
    }

    /// Scroll distance travelled from time 0 to `time_ms`.
    ///
    /// A note's on-screen offset is `position_at(note) - position_at(now)`.
    pub fn position_at(&self, time_ms: f64) -> f64 {
        let segment = &self.segments[self.segment_index(time_ms)];
        segment.position + segment.velocity * (time_ms - segment.time_ms)
    }
}

fn build_segments(
    points: &[TimingPoint],
    base_speed: f64,
    reference_beat_length: f64,
) -> Vec<VelocitySegment> {
    let mut segments: Vec<VelocitySegment> = Vec::with_capacity(points.len());
    let mut tempo_velocity = base_speed;

    for point in points {
        let velocity = if point.uninherited {
            tempo_velocity = base_speed * (reference_beat_length / point.beat_length_ms);
            tempo_velocity
        } else {
            tempo_velocity * inherited_multiplier(point.beat_length_ms)
        };

        let position = match segments.last() {
            Some(prev) => prev.position + prev.velocity * (point.time_ms - prev.time_ms),
            // Anchor so that position_at(0) == 0.
            None => velocity * point.time_ms,
        };

        // A later point at the same time replaces the earlier one.
        if let Some(prev) = segments.last_mut() {
            if prev.time_ms == point.time_ms {
                prev.velocity = velocity;
                continue;
            }
        }

        segments.push(VelocitySegment {
            time_ms: point.time_ms,
            velocity,
            position,
        });
    }

    segments
}

/// Most common uninherited beat length, weighted by how long each one is
/// active inside `[start_ms, end_ms]`.
///
/// Equal durations resolve to the first encountered beat length. When the
/// range is empty the beat length active at `start_ms` is used.
pub fn most_common_beat_length(points: &[TimingPoint], start_ms: f64, end_ms: f64) -> f64 {
    let tempo: Vec<&TimingPoint> = points.iter().filter(|p| p.uninherited).collect();
    let Some(first) = tempo.first() else {
        return 1.0;
    };

    // beat length -> (first index, accumulated duration)
    let mut durations: HashMap<OrderedFloat<f64>, (usize, f64)> = HashMap::new();

    for (i, point) in tempo.iter().enumerate() {
        let segment_start = if i == 0 { f64::NEG_INFINITY } else { point.time_ms };
        let segment_end = tempo.get(i + 1).map_or(f64::INFINITY, |next| next.time_ms);

        let active = (segment_end.min(end_ms) - segment_start.max(start_ms)).max(0.0);
        let entry = durations
            .entry(OrderedFloat(point.beat_length_ms))
            .or_insert((i, 0.0));
        entry.1 += active;
    }

    let best = durations
        .iter()
        .filter(|(_, (_, duration))| *duration > 0.0)
        .max_by(|(_, (ia, da)), (_, (ib, db))| da.total_cmp(db).then(ib.cmp(ia)));

    match best {
        Some((beat_length, _)) => beat_length.into_inner(),
        None => tempo
            .iter()
            .rev()
            .find(|p| p.time_ms <= start_ms)
            .unwrap_or(first)
            .beat_length_ms,
    }
}
