//! Gameplay configuration, persisted as TOML.
//!
//! Everything the engine used to read from ambient state (scroll speed,
//! multiplier table, health deltas) is threaded in through this struct.

use crate::models::mods::Mods;
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Score multipliers applied per active mod. Multipliers stack by product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModMultipliers {
    pub easy: f64,
    pub hard_rock: f64,
    pub no_fail: f64,
    pub sudden_death: f64,
    pub random: f64,
    pub mirror: f64,
    pub hold_off: f64,
    pub constant_speed: f64,
    /// Applied when the playback rate is below 1.0.
    pub slowed: f64,
    /// Applied when the playback rate is above 1.0.
    pub sped_up: f64,
}

impl Default for ModMultipliers {
    fn default() -> Self {
        Self {
            easy: 0.5,
            hard_rock: 1.06,
            no_fail: 0.5,
            sudden_death: 1.0,
            random: 1.0,
            mirror: 1.0,
            hold_off: 0.9,
            constant_speed: 0.9,
            slowed: 0.5,
            sped_up: 1.0,
        }
    }
}

impl ModMultipliers {
    pub fn multiplier_for(&self, mods: &Mods) -> f64 {
        let table = [
            (mods.easy, self.easy),
            (mods.hard_rock, self.hard_rock),
            (mods.no_fail, self.no_fail),
            (mods.sudden_death, self.sudden_death),
            (mods.random, self.random),
            (mods.mirror, self.mirror),
            (mods.hold_off, self.hold_off),
            (mods.constant_speed, self.constant_speed),
            (mods.playback_rate < 1.0, self.slowed),
            (mods.playback_rate > 1.0, self.sped_up),
        ];
        table
            .iter()
            .filter(|(active, _)| *active)
            .map(|(_, m)| m)
            .product()
    }
}

/// Health change per tier at HP 0. HP scales these (see `HealthSystem`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub marv: f64,
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
    pub bad: f64,
    pub miss: f64,
    /// Health at session start.
    pub initial: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            marv: 0.010,
            perfect: 0.008,
            great: 0.004,
            good: -0.020,
            bad: -0.050,
            miss: -0.100,
            initial: 1.0,
        }
    }
}

impl HealthConfig {
    pub fn base_delta(&self, judgement: Judgement) -> f64 {
        match judgement {
            Judgement::Marv => self.marv,
            Judgement::Perfect => self.perfect,
            Judgement::Great => self.great,
            Judgement::Good => self.good,
            Judgement::Bad => self.bad,
            Judgement::Miss => self.miss,
        }
    }
}

/// Top-level gameplay settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Base scroll velocity (playfield units per ms) at the reference tempo.
    pub scroll_speed: f64,
    /// Tick length used when verifying replays headlessly.
    pub replay_tick_ms: f64,
    pub multipliers: ModMultipliers,
    pub health: HealthConfig,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            scroll_speed: 1.0,
            replay_tick_ms: 5.0,
            multipliers: ModMultipliers::default(),
            health: HealthConfig::default(),
        }
    }
}

impl GameplaySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings, falling back to defaults when the file is missing or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("SETTINGS: {:?} not found, using defaults", path);
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("SETTINGS: Failed to load {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        toml::from_str(&content).map_err(|e| e.to_string())
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, content).map_err(|e| e.to_string())
    }
}
