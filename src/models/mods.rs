//! Gameplay modifiers and their replay encoding.

use crate::models::engine::constants::{MAX_DIFFICULTY, MAX_RATE, MIN_DIFFICULTY, MIN_RATE};
use crate::models::error::{EngineError, EngineResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Bit positions of `EncodedMods::bits`. Part of the replay wire format.
pub mod bits {
    pub const AUTOPLAY: u32 = 1 << 0;
    pub const EASY: u32 = 1 << 1;
    pub const HARD_ROCK: u32 = 1 << 2;
    pub const MIRROR: u32 = 1 << 3;
    pub const RANDOM: u32 = 1 << 4;
    pub const CONSTANT_SPEED: u32 = 1 << 5;
    pub const HOLD_OFF: u32 = 1 << 6;
    pub const NO_FAIL: u32 = 1 << 7;
    pub const SUDDEN_DEATH: u32 = 1 << 8;

    /// Every bit this format version knows about.
    pub const KNOWN: u32 = (1 << 9) - 1;
}

/// Active modifiers for one play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mods {
    pub easy: bool,
    pub hard_rock: bool,
    pub no_fail: bool,
    pub sudden_death: bool,
    pub autoplay: bool,
    pub random: bool,
    pub mirror: bool,
    pub constant_speed: bool,
    pub hold_off: bool,
    pub playback_rate: f64,
    pub od_override: Option<f64>,
    pub hp_override: Option<f64>,
}

impl Default for Mods {
    fn default() -> Self {
        Self {
            easy: false,
            hard_rock: false,
            no_fail: false,
            sudden_death: false,
            autoplay: false,
            random: false,
            mirror: false,
            constant_speed: false,
            hold_off: false,
            playback_rate: 1.0,
            od_override: None,
            hp_override: None,
        }
    }
}

impl Mods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects ambiguous combinations instead of guessing which one wins.
    ///
    /// Overrides are not a conflict: when set they supersede Easy/Hard Rock.
    pub fn validate(&self) -> EngineResult<()> {
        if self.random && self.mirror {
            return Err(EngineError::ModConflict("random", "mirror"));
        }
        if self.easy && self.hard_rock {
            return Err(EngineError::ModConflict("easy", "hard rock"));
        }
        if self.no_fail && self.sudden_death {
            return Err(EngineError::ModConflict("no fail", "sudden death"));
        }
        let rate = self.playback_rate;
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(EngineError::InvalidRate(rate));
        }
        Ok(())
    }

    /// Adjusted OD: override, else Easy halves / Hard Rock x1.4, clamped to 0..=10.
    pub fn effective_od(&self, base: f64) -> f64 {
        clamp_difficulty(self.od_override.unwrap_or_else(|| self.scale(base)))
    }

    /// Adjusted HP, same rules as OD.
    pub fn effective_hp(&self, base: f64) -> f64 {
        clamp_difficulty(self.hp_override.unwrap_or_else(|| self.scale(base)))
    }

    fn scale(&self, value: f64) -> f64 {
        if self.easy {
            value * 0.5
        } else if self.hard_rock {
            value * 1.4
        } else {
            value
        }
    }

    pub fn encode(&self) -> EncodedMods {
        let flags = [
            (self.autoplay, bits::AUTOPLAY),
            (self.easy, bits::EASY),
            (self.hard_rock, bits::HARD_ROCK),
            (self.mirror, bits::MIRROR),
            (self.random, bits::RANDOM),
            (self.constant_speed, bits::CONSTANT_SPEED),
            (self.hold_off, bits::HOLD_OFF),
            (self.no_fail, bits::NO_FAIL),
            (self.sudden_death, bits::SUDDEN_DEATH),
        ];

        EncodedMods {
            bits: flags
                .iter()
                .filter(|(on, _)| *on)
                .fold(0, |acc, (_, bit)| acc | bit),
            rate: self.playback_rate,
            od_override: self.od_override,
            hp_override: self.hp_override,
        }
    }
}

fn clamp_difficulty(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_DIFFICULTY;
    }
    value.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Wire form of [`Mods`] stored in replays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodedMods {
    pub bits: u32,
    pub rate: f64,
    #[serde(default)]
    pub od_override: Option<f64>,
    #[serde(default)]
    pub hp_override: Option<f64>,
}

impl EncodedMods {
    /// Decodes and validates. Unknown bits mean a newer format.
    pub fn decode(&self) -> EngineResult<Mods> {
        if self.bits & !bits::KNOWN != 0 {
            return Err(EngineError::ReplayCorrupt(format!(
                "unknown mod bits {:#x}",
                self.bits & !bits::KNOWN
            )));
        }
        let has = |bit: u32| self.bits & bit != 0;
        let mods = Mods {
            autoplay: has(bits::AUTOPLAY),
            easy: has(bits::EASY),
            hard_rock: has(bits::HARD_ROCK),
            mirror: has(bits::MIRROR),
            random: has(bits::RANDOM),
            constant_speed: has(bits::CONSTANT_SPEED),
            hold_off: has(bits::HOLD_OFF),
            no_fail: has(bits::NO_FAIL),
            sudden_death: has(bits::SUDDEN_DEATH),
            playback_rate: self.rate,
            od_override: self.od_override,
            hp_override: self.hp_override,
        };
        mods.validate()?;
        Ok(mods)
    }
}

/// Permutation from chart column to played column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap(Vec<usize>);

impl ColumnMap {
    pub fn identity(key_count: usize) -> Self {
        Self((0..key_count).collect())
    }

    /// `col -> key_count - 1 - col`.
    pub fn mirror(key_count: usize) -> Self {
        Self((0..key_count).rev().collect())
    }

    /// Uniform shuffle. The seed only matters for the live session; replays
    /// store the resulting map instead of the seed.
    pub fn shuffled(key_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut columns: Vec<usize> = (0..key_count).collect();
        columns.shuffle(&mut rng);
        Self(columns)
    }

    /// Validates a stored map: must be a permutation of `0..key_count`.
    pub fn from_vec(columns: Vec<usize>, key_count: usize) -> EngineResult<Self> {
        if columns.len() != key_count {
            return Err(EngineError::ReplayCorrupt(format!(
                "column map has {} entries for {key_count}K",
                columns.len()
            )));
        }
        let mut seen = vec![false; key_count];
        for &column in &columns {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(EngineError::ReplayCorrupt(format!(
                        "column map {columns:?} is not a permutation"
                    )));
                }
            }
        }
        Ok(Self(columns))
    }

    pub fn apply(&self, column: usize) -> usize {
        self.0[column]
    }

    /// `other` applied after `self`.
    pub fn then(&self, other: &ColumnMap) -> ColumnMap {
        ColumnMap(self.0.iter().map(|&c| other.apply(c)).collect())
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &c)| i == c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}
