//! Mission environment effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A field-wide effect attached to a mission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnvironmentEffect {
    /// Thick gas: player movement scaled by `speed_factor`
    Nebula { speed_factor: f32 },
    /// Pulls the player and projectiles toward `center` (px/s² at the core)
    GravityWell {
        center: Vec2,
        strength: f32,
        radius: f32,
    },
    /// Energy regen stops for `duration_ms` out of every `period_ms`
    IonStorm { period_ms: f64, duration_ms: f64 },
}

impl EnvironmentEffect {
    pub fn player_speed_factor(&self) -> f32 {
        match self {
            EnvironmentEffect::Nebula { speed_factor } => speed_factor.clamp(0.0, 1.0),
            EnvironmentEffect::GravityWell { .. } | EnvironmentEffect::IonStorm { .. } => 1.0,
        }
    }

    /// Acceleration applied at `pos`; falls off linearly to zero at the radius
    pub fn pull(&self, pos: Vec2) -> Vec2 {
        match *self {
            EnvironmentEffect::GravityWell {
                center,
                strength,
                radius,
            } => {
                let to_center = center - pos;
                let dist = to_center.length();
                if dist >= radius || dist < 1.0 {
                    return Vec2::ZERO;
                }
                to_center / dist * strength * (1.0 - dist / radius)
            }
            EnvironmentEffect::Nebula { .. } | EnvironmentEffect::IonStorm { .. } => Vec2::ZERO,
        }
    }

    pub fn storm_active(&self, now_ms: f64) -> bool {
        match *self {
            EnvironmentEffect::IonStorm {
                period_ms,
                duration_ms,
            } => period_ms > 0.0 && now_ms.rem_euclid(period_ms) < duration_ms,
            EnvironmentEffect::Nebula { .. } | EnvironmentEffect::GravityWell { .. } => false,
        }
    }
}

/// Combined movement multiplier for the player
pub fn speed_factor(effects: &[EnvironmentEffect]) -> f32 {
    effects.iter().map(|e| e.player_speed_factor()).product()
}

/// Summed gravity at a point
pub fn gravity_at(effects: &[EnvironmentEffect], pos: Vec2) -> Vec2 {
    effects.iter().map(|e| e.pull(pos)).sum()
}

/// False while any ion storm is raging
pub fn regen_enabled(effects: &[EnvironmentEffect], now_ms: f64) -> bool {
    !effects.iter().any(|e| e.storm_active(now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nebula_slows_player() {
        let effects = [
            EnvironmentEffect::Nebula { speed_factor: 0.5 },
            EnvironmentEffect::IonStorm {
                period_ms: 1000.0,
                duration_ms: 100.0,
            },
        ];
        assert_eq!(speed_factor(&effects), 0.5);
        assert_eq!(speed_factor(&[]), 1.0);
    }

    #[test]
    fn test_gravity_well_falloff() {
        let well = EnvironmentEffect::GravityWell {
            center: Vec2::new(400.0, 300.0),
            strength: 200.0,
            radius: 100.0,
        };
        let near = well.pull(Vec2::new(350.0, 300.0));
        assert!((near.x - 100.0).abs() < 0.001);
        assert_eq!(near.y, 0.0);
        assert_eq!(well.pull(Vec2::new(200.0, 300.0)), Vec2::ZERO);
        assert_eq!(well.pull(Vec2::new(400.0, 300.0)), Vec2::ZERO);
    }

    #[test]
    fn test_ion_storm_duty_cycle() {
        let effects = [EnvironmentEffect::IonStorm {
            period_ms: 10_000.0,
            duration_ms: 3000.0,
        }];
        assert!(!regen_enabled(&effects, 0.0));
        assert!(!regen_enabled(&effects, 2999.0));
        assert!(regen_enabled(&effects, 3000.0));
        assert!(!regen_enabled(&effects, 10_500.0));
    }

    #[test]
    fn test_json_tagged() {
        let json = r#"{ "type": "Nebula", "speed_factor": 0.7 }"#;
        let effect: EnvironmentEffect = serde_json::from_str(json).unwrap();
        assert_eq!(effect, EnvironmentEffect::Nebula { speed_factor: 0.7 });
    }
}
