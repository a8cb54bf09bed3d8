//! Course configuration resource.
//!
//! Tunables loaded from an INI file. Every value has a safe default so the
//! course runs without a file; missing sections or keys keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! gravity = -9.81
//! timestep = 0.0166667
//!
//! [control]
//! force_limit = 8
//! drive_gain = 50
//!
//! [trampoline]
//! stiffness = 410
//! damping = 0.3
//!
//! [spinners]
//! velocity_a = 7
//! velocity_b = -3
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_GRAVITY: f32 = -9.81;
const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;
const DEFAULT_FORCE_LIMIT: f32 = 8.0;
const DEFAULT_DRIVE_GAIN: f32 = 50.0;
const DEFAULT_TRAMPOLINE_STIFFNESS: f32 = 410.0;
const DEFAULT_TRAMPOLINE_DAMPING: f32 = 0.3;
const DEFAULT_SPINNER_VELOCITY_A: f32 = 7.0;
const DEFAULT_SPINNER_VELOCITY_B: f32 = -3.0;
const DEFAULT_CONFIG_PATH: &str = "./course.ini";

/// Course configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Vertical gravity in m/s².
    pub gravity: f32,
    /// Fixed simulation step in seconds.
    pub timestep: f32,
    /// Magnitude bound of the applied club force.
    pub force_limit: f32,
    /// Velocity-motor gain of driven hinges.
    pub drive_gain: f32,
    pub trampoline_stiffness: f32,
    pub trampoline_damping: f32,
    /// Drive velocity of the first spinner (rad/s).
    pub spinner_velocity_a: f32,
    /// Drive velocity of the second spinner (rad/s).
    pub spinner_velocity_b: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            timestep: DEFAULT_TIMESTEP,
            force_limit: DEFAULT_FORCE_LIMIT,
            drive_gain: DEFAULT_DRIVE_GAIN,
            trampoline_stiffness: DEFAULT_TRAMPOLINE_STIFFNESS,
            trampoline_damping: DEFAULT_TRAMPOLINE_DAMPING,
            spinner_velocity_a: DEFAULT_SPINNER_VELOCITY_A,
            spinner_velocity_b: DEFAULT_SPINNER_VELOCITY_B,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values, and so do
    /// values that are not finite numbers.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        let read = |section: &str, key: &str, slot: &mut f32| {
            if let Some(value) = config.getfloat(section, key).ok().flatten() {
                let value = value as f32;
                if value.is_finite() {
                    *slot = value;
                } else {
                    warn!("Ignoring non-finite [{}] {} = {}", section, key, value);
                }
            }
        };

        read("physics", "gravity", &mut self.gravity);
        read("physics", "timestep", &mut self.timestep);
        read("control", "force_limit", &mut self.force_limit);
        read("control", "drive_gain", &mut self.drive_gain);
        read("trampoline", "stiffness", &mut self.trampoline_stiffness);
        read("trampoline", "damping", &mut self.trampoline_damping);
        read("spinners", "velocity_a", &mut self.spinner_velocity_a);
        read("spinners", "velocity_b", &mut self.spinner_velocity_b);

        if self.timestep <= 0.0 {
            self.timestep = DEFAULT_TIMESTEP;
        }
        self.force_limit = self.force_limit.abs();

        info!(
            "Loaded config: gravity={}, timestep={}, force_limit={}, trampoline k={} c={}, spinners {}/{}",
            self.gravity,
            self.timestep,
            self.force_limit,
            self.trampoline_stiffness,
            self.trampoline_damping,
            self.spinner_velocity_a,
            self.spinner_velocity_b
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("physics", "gravity", Some(self.gravity.to_string()));
        config.set("physics", "timestep", Some(self.timestep.to_string()));

        config.set("control", "force_limit", Some(self.force_limit.to_string()));
        config.set("control", "drive_gain", Some(self.drive_gain.to_string()));

        config.set("trampoline", "stiffness", Some(self.trampoline_stiffness.to_string()));
        config.set("trampoline", "damping", Some(self.trampoline_damping.to_string()));

        config.set("spinners", "velocity_a", Some(self.spinner_velocity_a.to_string()));
        config.set("spinners", "velocity_b", Some(self.spinner_velocity_b.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("minigolf-{}-{}.ini", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.force_limit, 8.0);
        assert_eq!(config.trampoline_stiffness, 410.0);
        assert_eq!(config.spinner_velocity_b, -3.0);
        assert_eq!(config.config_path, PathBuf::from("./course.ini"));
    }

    #[test]
    fn test_missing_file_is_an_error_and_keeps_defaults() {
        let mut config = GameConfig::with_path(temp_path("missing"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.gravity, DEFAULT_GRAVITY);
    }

    #[test]
    fn test_partial_file_overrides_only_present_keys() {
        let path = temp_path("partial");
        std::fs::write(&path, "[control]\nforce_limit = 5\n[spinners]\nvelocity_a = 2.5\n").unwrap();

        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.force_limit, 5.0);
        assert_eq!(config.spinner_velocity_a, 2.5);
        assert_eq!(config.spinner_velocity_b, DEFAULT_SPINNER_VELOCITY_B);
        assert_eq!(config.trampoline_damping, DEFAULT_TRAMPOLINE_DAMPING);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved");
        let mut saved = GameConfig::with_path(&path);
        saved.drive_gain = 12.0;
        saved.trampoline_stiffness = 99.0;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.drive_gain, 12.0);
        assert_eq!(loaded.trampoline_stiffness, 99.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_non_finite_values_keep_defaults() {
        let path = temp_path("nonfinite");
        std::fs::write(
            &path,
            "[control]\nforce_limit = NaN\ndrive_gain = inf\n[trampoline]\nstiffness = 12\n",
        )
        .unwrap();

        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.force_limit, DEFAULT_FORCE_LIMIT);
        assert_eq!(config.drive_gain, DEFAULT_DRIVE_GAIN);
        assert_eq!(config.trampoline_stiffness, 12.0);

        let _ = std::fs::remove_file(&path);
    }
}
