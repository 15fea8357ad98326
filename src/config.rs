use serde::{Deserialize, Serialize};

use crate::game::constants::{self, ai, arena, fighter, fuel, round};

/// Configuration errors reported by `RoundConfig::validate`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("arena of size {size} with {area} area per fighter holds {count} fighters, need at least {min}")]
    TooFewFighters {
        size: f32,
        area: f32,
        count: usize,
        min: usize,
    },
    #[error("distance_from_center_ratio must be within 0.1..=0.9, got {0}")]
    SpawnRatioOutOfRange(f32),
    #[error("safe_zone_ratio must be within 0.0..0.5, got {0}")]
    SafeZoneOutOfRange(f32),
    #[error("failed to read config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// Which horizontal axes the edge override of autonomous pilots inspects
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCheck {
    /// Only the depth (z) axis, as the shipped pilots always did
    #[default]
    DepthAxisOnly,
    /// Both x and z
    BothAxes,
}

/// Platform layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Side length of the square platform centered on the origin
    pub size: f32,
    /// Platform area budgeted per fighter
    pub area_per_fighter: f32,
    /// Spawn circle radius as a fraction of the half-size
    pub distance_from_center_ratio: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size: arena::SIZE,
            area_per_fighter: arena::AREA_PER_FIGHTER,
            distance_from_center_ratio: arena::DISTANCE_FROM_CENTER_RATIO,
        }
    }
}

impl ArenaConfig {
    pub fn half_size(&self) -> f32 {
        self.size / 2.0
    }

    pub fn fighter_count(&self) -> usize {
        constants::fighter_count(self.size, self.area_per_fighter)
    }

    /// Radius of the spawn circle
    pub fn spawn_distance(&self) -> f32 {
        self.distance_from_center_ratio * self.half_size()
    }
}

/// Fighter body, movement and growth parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub speed_multiplier: f32,
    pub drag: f32,
    pub rotation_rate: f32,
    pub collision_bounciness: f32,
    pub initial_fuel: u32,
    pub initial_mass: f32,
    pub initial_scale: f32,
    pub mass_per_unit_fuel: f32,
    pub scale_per_unit_fuel: f32,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: fighter::SPEED_MULTIPLIER,
            drag: fighter::DRAG,
            rotation_rate: fighter::ROTATION_RATE,
            collision_bounciness: fighter::COLLISION_BOUNCINESS,
            initial_fuel: fighter::INITIAL_FUEL,
            initial_mass: fighter::INITIAL_MASS,
            initial_scale: fighter::INITIAL_SCALE,
            mass_per_unit_fuel: fighter::MASS_PER_UNIT_FUEL,
            scale_per_unit_fuel: fighter::SCALE_PER_UNIT_FUEL,
        }
    }
}

/// Fuel tank spawner parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    pub capacity: u32,
    pub min_distance: f32,
    pub max_count: usize,
    pub spawn_interval: f32,
    pub removal_delay: f32,
    pub pickup_radius: f32,
    pub max_placement_attempts: u32,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacity: fuel::CAPACITY,
            min_distance: fuel::MIN_DISTANCE,
            max_count: fuel::MAX_COUNT,
            spawn_interval: fuel::SPAWN_INTERVAL,
            removal_delay: fuel::REMOVAL_DELAY,
            pickup_radius: fuel::PICKUP_RADIUS,
            max_placement_attempts: fuel::MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

/// Autonomous pilot tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub decision_interval: f32,
    pub target_tolerance: f32,
    pub min_safe_distance_from_edge: f32,
    pub safe_zone_ratio: f32,
    pub escape_constant: f32,
    pub attack_constant: f32,
    pub scavenge_constant: f32,
    pub flee_distance: f32,
    pub edge_check: EdgeCheck,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            decision_interval: ai::DECISION_INTERVAL,
            target_tolerance: ai::TARGET_TOLERANCE,
            min_safe_distance_from_edge: ai::MIN_SAFE_DISTANCE_FROM_EDGE,
            safe_zone_ratio: ai::SAFE_ZONE_RATIO,
            escape_constant: ai::ESCAPE_CONSTANT,
            attack_constant: ai::ATTACK_CONSTANT,
            scavenge_constant: ai::SCAVENGE_CONSTANT,
            flee_distance: ai::FLEE_DISTANCE,
            edge_check: EdgeCheck::default(),
        }
    }
}

/// Round lifecycle timing (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub game_start_time: f32,
    pub round_time: f32,
    pub result_screen_time: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            game_start_time: round::START_TIME,
            round_time: round::ROUND_TIME,
            result_screen_time: round::RESULT_SCREEN_TIME,
        }
    }
}

/// Complete configuration of a round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub arena: ArenaConfig,
    pub fighter: FighterConfig,
    pub fuel: FuelConfig,
    pub ai: AiConfig,
    pub timing: TimingConfig,
    /// Seed for the round RNG; random when absent
    pub seed: Option<u64>,
}

impl RoundConfig {
    /// Load config from an optional JSON file and the environment, or use defaults.
    ///
    /// `ROUND_CONFIG_FILE` points at a JSON document with any subset of the
    /// fields; environment variables are applied on top of it.
    pub fn load_or_default() -> Self {
        let mut config = match std::env::var("ROUND_CONFIG_FILE") {
            Ok(path) => match Self::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        override_from_env("ARENA_SIZE", &mut config.arena.size);
        override_from_env("ARENA_AREA_PER_FIGHTER", &mut config.arena.area_per_fighter);
        override_from_env("ROUND_START_TIME", &mut config.timing.game_start_time);
        override_from_env("ROUND_TIME", &mut config.timing.round_time);
        override_from_env("ROUND_RESULT_TIME", &mut config.timing.result_screen_time);
        override_from_env("FUEL_MAX_COUNT", &mut config.fuel.max_count);
        override_from_env("FUEL_SPAWN_INTERVAL", &mut config.fuel.spawn_interval);

        if let Ok(seed) = std::env::var("ROUND_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => config.seed = Some(parsed),
                Err(_) => tracing::warn!("Invalid ROUND_SEED '{}', using random seed", seed),
            }
        }

        if let Ok(check) = std::env::var("AI_EDGE_CHECK") {
            match check.as_str() {
                "depth" => config.ai.edge_check = EdgeCheck::DepthAxisOnly,
                "both" => config.ai.edge_check = EdgeCheck::BothAxes,
                _ => tracing::warn!("Invalid AI_EDGE_CHECK '{}' (expected depth|both), using default", check),
            }
        }

        config
    }

    /// Parse a JSON config file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("arena.size", self.arena.size),
            ("arena.area_per_fighter", self.arena.area_per_fighter),
            ("fighter.initial_mass", self.fighter.initial_mass),
            ("fighter.initial_scale", self.fighter.initial_scale),
            ("fighter.drag", self.fighter.drag),
            ("fuel.spawn_interval", self.fuel.spawn_interval),
            ("fuel.pickup_radius", self.fuel.pickup_radius),
            ("ai.decision_interval", self.ai.decision_interval),
            ("timing.round_time", self.timing.round_time),
        ];
        for (name, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive(name));
            }
        }

        let count = self.arena.fighter_count();
        if count < arena::MIN_FIGHTERS {
            return Err(ConfigError::TooFewFighters {
                size: self.arena.size,
                area: self.arena.area_per_fighter,
                count,
                min: arena::MIN_FIGHTERS,
            });
        }

        let ratio = self.arena.distance_from_center_ratio;
        if !(0.1..=0.9).contains(&ratio) {
            return Err(ConfigError::SpawnRatioOutOfRange(ratio));
        }

        if !(0.0..0.5).contains(&self.ai.safe_zone_ratio) {
            return Err(ConfigError::SafeZoneOutOfRange(self.ai.safe_zone_ratio));
        }

        Ok(())
    }
}

fn override_from_env<T>(key: &str, slot: &mut T)
where
    T: std::str::FromStr + Copy,
{
    if let Ok(raw) = std::env::var(key) {
        match raw.parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!("Invalid {} '{}', using default", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RoundConfig::default();
        assert_eq!(config.arena.fighter_count(), 9);
        assert_eq!(config.timing.game_start_time, 3.0);
        assert_eq!(config.timing.round_time, 60.0);
        assert_eq!(config.ai.edge_check, EdgeCheck::DepthAxisOnly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spawn_distance() {
        let config = ArenaConfig {
            size: 20.0,
            distance_from_center_ratio: 0.5,
            ..Default::default()
        };
        assert!((config.spawn_distance() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_single_fighter() {
        let mut config = RoundConfig::default();
        config.arena.area_per_fighter = 10_000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewFighters { count: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut config = RoundConfig::default();
        config.fighter.drag = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NotPositive("fighter.drag")));

        let mut config = RoundConfig::default();
        config.timing.round_time = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigError::NotPositive("timing.round_time")));
    }

    #[test]
    fn test_validate_spawn_ratio() {
        let mut config = RoundConfig::default();
        config.arena.distance_from_center_ratio = 0.95;
        assert_eq!(config.validate(), Err(ConfigError::SpawnRatioOutOfRange(0.95)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "arena": { "size": 40.0 }, "ai": { "edge_check": "both_axes" }, "seed": 7 }"#;
        let config: RoundConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.arena.size, 40.0);
        assert_eq!(config.arena.area_per_fighter, arena::AREA_PER_FIGHTER);
        assert_eq!(config.ai.edge_check, EdgeCheck::BothAxes);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fuel.capacity, fuel::CAPACITY);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = RoundConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn test_load_or_default() {
        let config = RoundConfig::load_or_default();
        assert!(config.arena.size > 0.0);
    }
}
