//! Configuration System
//!
//! Tuning parameters for wandering, motion, and the status simulator. Loaded
//! from a TOML file; every section and field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use temple_events::AgentTier;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "temple.toml";

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempleConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub speeds: TierSpeeds,
}

impl TempleConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!("No tuning file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("scene.width", self.scene.width)?;
        positive("scene.height", self.scene.height)?;

        let movement = &self.movement;
        if movement.min_interval_ms == 0 {
            return Err(invalid("movement.min_interval_ms", "must be at least 1 ms"));
        }
        if movement.min_interval_ms > movement.max_interval_ms {
            return Err(invalid(
                "movement.max_interval_ms",
                format!(
                    "{} is below min_interval_ms ({})",
                    movement.max_interval_ms, movement.min_interval_ms
                ),
            ));
        }
        probability("movement.local_zone_probability", movement.local_zone_probability)?;
        if !movement.zone_padding.is_finite() || movement.zone_padding < 0.0 {
            return Err(invalid("movement.zone_padding", "must be a non-negative number"));
        }

        probability(
            "motion.settle_activation_probability",
            self.motion.settle_activation_probability,
        )?;

        if self.status.tick_interval_ms == 0 {
            return Err(invalid("status.tick_interval_ms", "must be at least 1 ms"));
        }
        if self.status.weights.total() == 0 {
            return Err(invalid("status.weights", "at least one weight must be non-zero"));
        }

        for tier in AgentTier::ALL {
            positive(tier_field(tier), self.speeds.speed_for(tier))?;
        }
        Ok(())
    }
}

/// Scene dimensions in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Wander scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Shortest wait between wander attempts
    pub min_interval_ms: u64,
    /// Longest wait between wander attempts (inclusive)
    pub max_interval_ms: u64,
    /// Chance a wander stays inside the agent's current zone
    pub local_zone_probability: f64,
    /// Margin kept between wander targets and zone edges
    pub zone_padding: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 5_000,
            max_interval_ms: 12_000,
            local_zone_probability: 0.7,
            zone_padding: 30.0,
        }
    }
}

/// Post-move behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Pause after landing before the agent may light up
    pub settle_delay_ms: u64,
    /// Chance a settled agent switches to `active`
    pub settle_activation_probability: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1_000,
            settle_activation_probability: 0.3,
        }
    }
}

/// Status simulator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub tick_interval_ms: u64,
    pub weights: StatusWeights,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 3_000,
            weights: StatusWeights::default(),
        }
    }
}

/// Relative weights of the statuses the simulator draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusWeights {
    pub idle: u32,
    pub thinking: u32,
    pub replying: u32,
    pub active: u32,
}

impl StatusWeights {
    pub fn total(&self) -> u32 {
        self.idle + self.thinking + self.replying + self.active
    }
}

impl Default for StatusWeights {
    fn default() -> Self {
        Self {
            idle: 4,
            thinking: 1,
            replying: 1,
            active: 1,
        }
    }
}

/// Wander speed per tier, in world units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSpeeds {
    pub primary: f32,
    pub lieutenant: f32,
    pub worker: f32,
    pub special: f32,
}

impl TierSpeeds {
    pub fn speed_for(&self, tier: AgentTier) -> f32 {
        match tier {
            AgentTier::Primary => self.primary,
            AgentTier::Lieutenant => self.lieutenant,
            AgentTier::Worker => self.worker,
            AgentTier::Special => self.special,
        }
    }
}

impl Default for TierSpeeds {
    fn default() -> Self {
        Self {
            primary: 80.0,
            lieutenant: 100.0,
            worker: 120.0,
            special: 60.0,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not a positive number", value)))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is outside [0, 1]", value)))
    }
}

fn tier_field(tier: AgentTier) -> &'static str {
    match tier {
        AgentTier::Primary => "speeds.primary",
        AgentTier::Lieutenant => "speeds.lieutenant",
        AgentTier::Worker => "speeds.worker",
        AgentTier::Special => "speeds.special",
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Hive Temple tuning

[scene]
width = 1280.0
height = 720.0

[movement]
min_interval_ms = 5000
max_interval_ms = 12000
local_zone_probability = 0.7
zone_padding = 30.0

[motion]
settle_delay_ms = 1000
settle_activation_probability = 0.3

[status]
tick_interval_ms = 3000

[status.weights]
idle = 4
thinking = 1
replying = 1
active = 1

[speeds]
primary = 80.0
lieutenant = 100.0
worker = 120.0
special = 60.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TempleConfig::default();

        assert_eq!(config.movement.min_interval_ms, 5_000);
        assert_eq!(config.movement.max_interval_ms, 12_000);
        assert_eq!(config.movement.local_zone_probability, 0.7);
        assert_eq!(config.motion.settle_delay_ms, 1_000);
        assert_eq!(config.status.tick_interval_ms, 3_000);
        assert_eq!(config.status.weights.total(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_speed_for_tier() {
        let speeds = TierSpeeds::default();
        assert_eq!(speeds.speed_for(AgentTier::Primary), 80.0);
        assert_eq!(speeds.speed_for(AgentTier::Lieutenant), 100.0);
        assert_eq!(speeds.speed_for(AgentTier::Worker), 120.0);
        assert_eq!(speeds.speed_for(AgentTier::Special), 60.0);
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = TempleConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, TempleConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [movement]
            min_interval_ms = 1000

            [status.weights]
            idle = 0
        "#;

        let config = TempleConfig::from_str(toml).unwrap();

        assert_eq!(config.movement.min_interval_ms, 1_000);
        assert_eq!(config.movement.max_interval_ms, 12_000);
        assert_eq!(config.status.weights.idle, 0);
        assert_eq!(config.status.weights.thinking, 1);
        assert_eq!(config.speeds, TierSpeeds::default());
    }

    #[test]
    fn test_config_to_toml_round_trip() {
        let mut config = TempleConfig::default();
        config.speeds.worker = 150.0;
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[movement]"));
        assert!(toml.contains("[speeds]"));
        assert_eq!(TempleConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let toml = r#"
            [movement]
            min_interval_ms = 9000
            max_interval_ms = 2000
        "#;
        let err = TempleConfig::from_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "movement.max_interval_ms", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_probability_and_speed() {
        let mut config = TempleConfig::default();
        config.movement.local_zone_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = TempleConfig::default();
        config.speeds.special = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("speeds.special"));
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let toml = r#"
            [status.weights]
            idle = 0
            thinking = 0
            replying = 0
            active = 0
        "#;
        assert!(TempleConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_rejects_zero_tick() {
        let toml = r#"
            [status]
            tick_interval_ms = 0
        "#;
        assert!(TempleConfig::from_str(toml).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[speeds]\nprimary = 42.0").unwrap();

        let config = TempleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.speeds.primary, 42.0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = TempleConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TempleConfig::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = TempleConfig::from_str("[movement\nmin_interval_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
