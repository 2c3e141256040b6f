//! Simulation configuration.
//!
//! Provides the playfield, formation, wave, player, and logging settings for
//! a headless run. Configuration can be loaded from and saved to a TOML file.

use arena_combat::{FormationConfig, WaveConfig, MAX_WAVE};
use arena_common::WorldBounds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "arena.toml";

/// Scripted player parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting health
    pub health: f32,
    /// Collision radius
    pub radius: f32,
    /// Movement speed in pixels per second
    pub speed: f32,
    /// Distance the player keeps from the enemy it is hunting
    pub engage_distance: f32,
    /// Damage per strike
    pub attack_damage: f32,
    /// Random spread added to each strike (+/-)
    pub attack_variance: f32,
    /// Strike reach in world pixels
    pub attack_reach: f32,
    /// Seconds between strikes
    pub attack_cooldown: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: 250.0,
            radius: 15.0,
            speed: 160.0,
            engage_distance: 30.0,
            attack_damage: 25.0,
            attack_variance: 3.0,
            attack_reach: 60.0,
            attack_cooldown: 0.5,
        }
    }
}

/// Headless simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Run Settings ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Simulated seconds to run
    pub duration_secs: f32,
    /// First wave to play
    pub start_wave: u32,
    /// Stop after clearing this many waves (0 = unlimited)
    pub max_waves: u32,
    /// RNG seed (None = random)
    pub seed: Option<u64>,

    // === Logging ===
    /// Extra `tracing` filter directives, e.g. `arena_combat=debug`
    pub log_filter: String,
    /// Print the final summary as JSON
    pub summary_json: bool,

    // === View ===
    /// Screen size used for render snapshots
    pub screen_width: f32,
    /// Screen height used for render snapshots
    pub screen_height: f32,
    /// Camera zoom
    pub camera_zoom: f32,
    /// Effect requests allowed per tick before the pool reports exhaustion
    pub effect_budget: u32,

    // === Subsystems ===
    /// Playfield size
    pub world: WorldBounds,
    /// Scripted player
    pub player: PlayerConfig,
    /// Formation tuning
    pub formation: FormationConfig,
    /// Wave pacing
    pub waves: WaveConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            duration_secs: 120.0,
            start_wave: 1,
            max_waves: 0,
            seed: None,

            log_filter: String::new(),
            summary_json: false,

            screen_width: 1280.0,
            screen_height: 720.0,
            camera_zoom: 1.0,
            effect_budget: 32,

            world: WorldBounds::default(),
            player: PlayerConfig::default(),
            formation: FormationConfig::default(),
            waves: WaveConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Run
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.duration_secs = self.duration_secs.clamp(0.0, 3600.0);
        self.start_wave = self.start_wave.clamp(1, MAX_WAVE);

        // View
        self.screen_width = self.screen_width.clamp(320.0, 7680.0);
        self.screen_height = self.screen_height.clamp(240.0, 4320.0);
        self.camera_zoom = self.camera_zoom.clamp(0.25, 4.0);

        // World
        if WorldBounds::try_new(self.world.width, self.world.height).is_err() {
            warn!(
                "Invalid world size {}x{}, using defaults",
                self.world.width, self.world.height
            );
            self.world = WorldBounds::default();
        }

        // Player
        self.player.health = self.player.health.clamp(1.0, 100_000.0);
        self.player.radius = self.player.radius.clamp(1.0, 200.0);
        self.player.speed = self.player.speed.clamp(0.0, 2000.0);
        self.player.engage_distance = self.player.engage_distance.clamp(0.0, 1000.0);
        self.player.attack_damage = self.player.attack_damage.clamp(0.0, 10_000.0);
        self.player.attack_variance = self.player.attack_variance.clamp(0.0, self.player.attack_damage);
        self.player.attack_reach = self.player.attack_reach.clamp(0.0, 1000.0);
        self.player.attack_cooldown = self.player.attack_cooldown.clamp(0.05, 60.0);

        self.formation.validate();
        self.waves.validate();
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of ticks the run lasts.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs * self.tick_rate as f32).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.start_wave, 1);
        assert_eq!(config.world, WorldBounds::default());
        assert_eq!(config.formation.min_members, 2);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();

        config.tick_rate = 1;
        config.start_wave = 0;
        config.camera_zoom = 50.0;
        config.world.width = -10.0;
        config.player.attack_cooldown = 0.0;
        config.formation.cooldown = -3.0;

        config.validate();

        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.start_wave, 1);
        assert_eq!(config.camera_zoom, 4.0);
        assert_eq!(config.world, WorldBounds::default());
        assert!((config.player.attack_cooldown - 0.05).abs() < 0.001);
        assert_eq!(config.formation.cooldown, 0.0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("arena.toml");

        let mut config = SimConfig::default();
        config.seed = Some(12345);
        config.duration_secs = 30.0;
        config.formation.surround_radius = 90.0;
        config.log_filter = "arena_combat=debug".to_owned();

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "duration_secs = 5.0\n[player]\nhealth = 40.0\n").expect("write");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded.duration_secs, 5.0);
        assert_eq!(loaded.player.health, 40.0);
        assert_eq!(loaded.player.radius, PlayerConfig::default().radius);
        assert_eq!(loaded.tick_rate, 60);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = SimConfig::load_from("/nonexistent/path/arena.toml");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_config_load_garbage_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "tick_rate = \"fast\"").expect("write");
        assert_eq!(SimConfig::load_from(&config_path), SimConfig::default());
    }

    #[test]
    fn test_start_wave_is_capped() {
        let mut config = SimConfig {
            start_wave: u32::MAX,
            ..SimConfig::default()
        };
        config.validate();
        assert_eq!(config.start_wave, MAX_WAVE);
    }

    #[test]
    fn test_tick_math() {
        let config = SimConfig {
            tick_rate: 50,
            duration_secs: 2.0,
            ..SimConfig::default()
        };
        assert!((config.fixed_dt() - 0.02).abs() < 1e-6);
        assert_eq!(config.total_ticks(), 100);
    }
}
