//! Simulation configuration
//!
//! Tuning values for the arena pipeline and every agent type. All structs
//! load from RON or JSON; missing fields take their defaults.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::ConfigError;
use crate::nav::{ALL_AREAS, AreaMask};

/// Arena grid construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Fit the grid around start, goal and obstacles
    pub auto_fit: bool,
    /// Grid size when not auto-fitting (x, z)
    pub fixed_size: Vec2,
    /// Center of a fixed-size grid; its Y is the grid plane height
    pub origin: Vec3,
    /// Cell edge length
    pub cell_size: f32,
    /// Extra margin around auto-fit bounds
    pub padding: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            auto_fit: true,
            fixed_size: Vec2::new(50.0, 50.0),
            origin: Vec3::ZERO,
            cell_size: 1.0,
            padding: 2.0,
        }
    }
}

impl ArenaConfig {
    /// Enable or disable auto-fit
    #[must_use]
    pub fn with_auto_fit(mut self, auto_fit: bool) -> Self {
        self.auto_fit = auto_fit;
        self
    }

    /// Set the fixed grid size
    #[must_use]
    pub fn with_fixed_size(mut self, size: Vec2) -> Self {
        self.fixed_size = size;
        self
    }

    /// Set the grid origin
    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Set the cell size
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the auto-fit padding
    #[must_use]
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }
}

/// Approach point resolver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachTuning {
    /// Turn rate used when facing the approach point
    pub turn_speed: f32,
    /// Allowed mismatch between approach-point and target distances
    pub range_buffer: f32,
    /// Distance at which the agent counts as arrived
    pub stopping_distance: f32,
    /// How long a refined approach point stays valid
    pub recheck_period: f32,
    /// Lower bound on the nav mesh sampling radius
    pub min_sample_radius: f32,
    /// Target height is divided by this to get the sampling radius
    pub sample_radius_divisor: f32,
    /// Nav mesh areas the agent may use
    pub area_mask: AreaMask,
}

impl Default for ApproachTuning {
    fn default() -> Self {
        Self {
            turn_speed: 7.5,
            range_buffer: 7.5,
            stopping_distance: 1.5,
            recheck_period: 1.0,
            min_sample_radius: 2.0,
            sample_radius_divisor: 1.8,
            area_mask: ALL_AREAS,
        }
    }
}

impl ApproachTuning {
    /// Set the turn speed
    #[must_use]
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }

    /// Set the range buffer
    #[must_use]
    pub fn with_range_buffer(mut self, range_buffer: f32) -> Self {
        self.range_buffer = range_buffer;
        self
    }

    /// Set the stopping distance
    #[must_use]
    pub fn with_stopping_distance(mut self, stopping_distance: f32) -> Self {
        self.stopping_distance = stopping_distance;
        self
    }

    /// Set the line-of-sight recheck period
    #[must_use]
    pub fn with_recheck_period(mut self, period: f32) -> Self {
        self.recheck_period = period;
        self
    }
}

/// Melee enemy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub health: f32,
    pub damage: f32,
    /// Seconds between attacks
    pub time_between_attacks: f32,
    /// Movement speed
    pub speed: f32,
    pub approach: ApproachTuning,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 100.0,
            damage: 20.0,
            time_between_attacks: 2.0,
            speed: 3.5,
            approach: ApproachTuning::default(),
        }
    }
}

/// Ranged deployable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    /// Input smoothing when the stick is pushed further
    pub input_accel: f32,
    /// Input smoothing when the stick is released
    pub input_decel: f32,
    pub approach: ApproachTuning,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            health: 100.0,
            damage: 20.0,
            speed: 3.5,
            input_accel: 18.0,
            input_decel: 24.0,
            approach: ApproachTuning::default().with_turn_speed(10.0),
        }
    }
}

/// Turret settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    pub health: f32,
    /// Damage per shot
    pub damage: f32,
    /// Acquire enemies within this distance
    pub range: f32,
    /// Drop the target beyond this distance
    pub leave_range: f32,
    /// Shots per second
    pub fire_rate: f32,
    /// Aim point smoothing rate
    pub aim_speed: f32,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            health: 100.0,
            damage: 20.0,
            range: 10.0,
            leave_range: 15.0,
            fire_rate: 1.0,
            aim_speed: 100.0,
        }
    }
}

/// Top-level settings for an arena session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub enemy: EnemyConfig,
    pub ranged: RangedConfig,
    pub turret: TurretConfig,
}

impl SimulationConfig {
    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ron_roundtrip_keeps_overrides() {
        let config = SimulationConfig {
            arena: ArenaConfig::default().with_cell_size(0.5).with_auto_fit(false),
            ..Default::default()
        };

        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: SimulationConfig = ron::from_str(&ron_str).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded: SimulationConfig =
            serde_json::from_str(r#"{ "turret": { "range": 25.0 } }"#).unwrap();

        assert!((loaded.turret.range - 25.0).abs() < f32::EPSILON);
        assert!((loaded.turret.leave_range - 15.0).abs() < f32::EPSILON);
        assert_eq!(loaded.arena, ArenaConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = SimulationConfig::load_ron("/nonexistent/breachpath.ron");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let path = std::env::temp_dir().join("breachpath_config_test.json");
        let config = SimulationConfig::default();

        config.save_json(&path).unwrap();
        let loaded = SimulationConfig::load_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
