//! Data-driven game balance
//!
//! Every field defaults to the matching constant in [`crate::consts`], so a
//! JSON document only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Runtime-tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Play field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Delta time is clamped to this before simulating
    pub max_delta_ms: f32,

    // === Player ===
    pub player_speed: f32,
    pub invulnerability_ms: f64,

    // === Spawning ===
    pub enemy_spawn_base_ms: f64,
    pub enemy_spawn_min_ms: f64,
    pub boss_interval_ms: f64,
    pub pickup_drop_chance: f32,

    // === Bosses ===
    pub boss_intro_ms: f64,
    pub boss_attack_delay_ms: f64,
    pub boss_defeat_ms: f64,

    // === Limits ===
    pub max_projectiles: usize,
    pub max_enemies: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            max_delta_ms: MAX_DELTA_MS,

            player_speed: PLAYER_SPEED,
            invulnerability_ms: INVULNERABILITY_MS,

            enemy_spawn_base_ms: ENEMY_SPAWN_BASE_MS,
            enemy_spawn_min_ms: ENEMY_SPAWN_MIN_MS,
            boss_interval_ms: BOSS_INTERVAL_MS,
            pickup_drop_chance: PICKUP_DROP_CHANCE,

            boss_intro_ms: BOSS_INTRO_MS,
            boss_attack_delay_ms: BOSS_ATTACK_DELAY_MS,
            boss_defeat_ms: BOSS_DEFEAT_MS,

            max_projectiles: MAX_PROJECTILES,
            max_enemies: MAX_ENEMIES,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("max_delta_ms", self.max_delta_ms)?;
        positive("player_speed", self.player_speed)?;
        positive("enemy_spawn_min_ms", self.enemy_spawn_min_ms as f32)?;
        if self.enemy_spawn_base_ms < self.enemy_spawn_min_ms {
            return Err(ConfigError::Invalid {
                field: "enemy_spawn_base_ms",
                reason: format!(
                    "{} is below enemy_spawn_min_ms {}",
                    self.enemy_spawn_base_ms, self.enemy_spawn_min_ms
                ),
            });
        }
        if self.boss_attack_delay_ms > self.boss_intro_ms {
            return Err(ConfigError::Invalid {
                field: "boss_attack_delay_ms",
                reason: "must not exceed boss_intro_ms".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.pickup_drop_chance) {
            return Err(ConfigError::Invalid {
                field: "pickup_drop_chance",
                reason: format!("{} is outside 0..=1", self.pickup_drop_chance),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be positive"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_speed": 420.0 }"#).unwrap();
        assert_eq!(tuning.player_speed, 420.0);
        assert_eq!(tuning.field_width, FIELD_WIDTH);
        assert_eq!(tuning.max_delta_ms, MAX_DELTA_MS);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Tuning::from_json(r#"{ "field_width": -5.0 }"#).is_err());
        assert!(Tuning::from_json(r#"{ "pickup_drop_chance": 1.5 }"#).is_err());
        assert!(Tuning::from_json(r#"{ "boss_attack_delay_ms": 9000.0 }"#).is_err());
        assert!(Tuning::from_json("{").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
