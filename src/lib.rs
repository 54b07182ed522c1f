//! Starlance - an arcade space-combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (weapons, bosses, collisions, missions)
//! - `audio`: Semantic sound hooks and the injected audio sink
//! - `progression`: Session-start snapshot and mission results
//! - `tuning`: Data-driven game balance
//! - `error`: Tick and configuration errors

pub mod audio;
pub mod error;
pub mod progression;
pub mod sim;
pub mod tuning;

pub use audio::{AudioSink, LogAudio, NullAudio, RecordingAudio, SoundEvent};
pub use error::{ConfigError, TickError};
pub use progression::{MissionRecords, MissionResult, ProgressionSnapshot, ShipUpgrades};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest delta a single tick will simulate
    pub const MAX_DELTA_MS: f32 = 32.0;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 14.0;
    pub const PLAYER_SPEED: f32 = 300.0; // px/s
    pub const PLAYER_MAX_LIVES: u8 = 3;
    pub const INVULNERABILITY_MS: f64 = 2000.0;

    /// Weapon system limits
    pub const MAX_HEAT: f32 = 100.0;
    pub const MAX_CHARGE: f32 = 100.0;
    pub const MAX_ENERGY: f32 = 100.0;
    pub const COOLING_RATE: f32 = 20.0; // heat/s
    pub const CHARGING_RATE: f32 = 50.0; // charge/s
    pub const CHARGE_DECAY_RATE: f32 = 25.0; // charge/s
    pub const CHARGE_DECAY_DELAY_MS: f64 = 1500.0;
    pub const ENERGY_REGEN_RATE: f32 = 10.0; // energy/s
    pub const OVERHEAT_COOLDOWN_MS: f64 = 3000.0;
    /// Cooldown floor for any weapon, with or without rapid fire
    pub const MIN_COOLDOWN_MS: f32 = 50.0;
    pub const MAX_WEAPON_LEVEL: u8 = 5;

    /// Basic enemy defaults
    pub const ENEMY_SIZE: f32 = 15.0;
    pub const ENEMY_BASE_HEALTH: f32 = 20.0;
    pub const ENEMY_BASE_SPEED: f32 = 80.0;
    pub const ENEMY_POINTS: u64 = 100;
    pub const ENEMY_SPAWN_BASE_MS: f64 = 1500.0;
    pub const ENEMY_SPAWN_MIN_MS: f64 = 300.0;
    /// Kills needed per arcade level
    pub const KILLS_PER_LEVEL: u32 = 15;
    pub const MAX_LEVEL: u32 = 10;

    /// Boss timings
    pub const BOSS_BASE_SIZE: f32 = 24.0;
    pub const BOSS_INTERVAL_MS: f64 = 60_000.0;
    pub const BOSS_INTRO_MS: f64 = 2000.0;
    pub const BOSS_ATTACK_DELAY_MS: f64 = 500.0;
    pub const BOSS_DEFEAT_MS: f64 = 2000.0;
    pub const BOSS_ANCHOR_Y: f32 = 110.0;

    /// Pickups
    pub const PICKUP_SIZE: f32 = 10.0;
    pub const PICKUP_FALL_SPEED: f32 = 100.0;
    pub const PICKUP_DROP_CHANCE: f32 = 0.12;
    pub const POWER_UP_DURATION_MS: f32 = 10_000.0;

    /// Entity caps (exceeding these aborts the tick)
    pub const MAX_PROJECTILES: usize = 2048;
    pub const MAX_ENEMIES: usize = 256;
}

/// Unit vector for an angle measured from straight up (-y), clockwise positive
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// True if every component is finite
#[inline]
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_points_up_at_zero() {
        let h = heading(0.0);
        assert!(h.x.abs() < 0.0001);
        assert!((h.y + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_is_finite_vec() {
        assert!(is_finite_vec(Vec2::new(1.0, 2.0)));
        assert!(!is_finite_vec(Vec2::new(f32::NAN, 2.0)));
        assert!(!is_finite_vec(Vec2::new(0.0, f32::INFINITY)));
    }
}
