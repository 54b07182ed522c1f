//! Entity types: player, enemies, projectiles, pickups
//!
//! `size` is the collision radius for every entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::weapon::{SpecialTag, WeaponSystem, WeaponType};
use crate::consts::*;
use crate::is_finite_vec;
use crate::progression::ProgressionSnapshot;

/// Remaining power-up time (ms, 0 = inactive)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUps {
    pub rapid_fire: f32,
    pub shield: f32,
    pub multi_shot: f32,
}

impl PowerUps {
    /// Count all timers down by dt
    pub fn tick(&mut self, dt_ms: f32) {
        self.rapid_fire = (self.rapid_fire - dt_ms).max(0.0);
        self.shield = (self.shield - dt_ms).max(0.0);
        self.multi_shot = (self.multi_shot - dt_ms).max(0.0);
    }

    pub fn shield_active(&self) -> bool {
        self.shield > 0.0
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub lives: u8,
    pub invulnerable: bool,
    pub invulnerable_until_ms: f64,
    pub power_ups: PowerUps,
    pub weapon: WeaponSystem,
}

impl Player {
    pub fn new(pos: Vec2, progression: &ProgressionSnapshot) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            lives: PLAYER_MAX_LIVES,
            invulnerable: false,
            invulnerable_until_ms: 0.0,
            power_ups: PowerUps::default(),
            weapon: WeaponSystem::from_progression(progression),
        }
    }

    /// True while hits against the player do nothing
    pub fn is_protected(&self) -> bool {
        self.invulnerable || self.power_ups.shield_active()
    }

    /// Take one hit. Returns true if a life was lost.
    pub fn take_hit(&mut self, now_ms: f64, invulnerability_ms: f64) -> bool {
        if self.is_protected() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invulnerable = true;
        self.invulnerable_until_ms = now_ms + invulnerability_ms;
        true
    }

    /// Clear invulnerability once its window has passed
    pub fn update_invulnerability(&mut self, now_ms: f64) {
        if self.invulnerable && now_ms >= self.invulnerable_until_ms {
            self.invulnerable = false;
        }
    }

    /// Reset corrupted numeric fields. Returns true if anything was fixed.
    pub fn sanitize(&mut self, safe_pos: Vec2) -> bool {
        let mut fixed = false;
        if !is_finite_vec(self.pos) {
            self.pos = safe_pos;
            fixed = true;
        }
        if !is_finite_vec(self.vel) {
            self.vel = Vec2::ZERO;
            fixed = true;
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            self.size = PLAYER_SIZE;
            fixed = true;
        }
        fixed
    }
}

/// Enemy variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Boss(Box<BossState>),
}

/// A hostile ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub points: u64,
    pub kind: EnemyKind,
    pub active: bool,
}

impl Enemy {
    /// A basic enemy scaled to the current level
    pub fn basic(id: u32, pos: Vec2, level: u32) -> Self {
        let level = level.max(1) as f32;
        let health = ENEMY_BASE_HEALTH + 5.0 * (level - 1.0);
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, ENEMY_BASE_SPEED + 10.0 * level),
            size: ENEMY_SIZE,
            health,
            max_health: health,
            points: ENEMY_POINTS,
            kind: EnemyKind::Basic,
            active: true,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn boss(&self) -> Option<&BossState> {
        match &self.kind {
            EnemyKind::Boss(boss) => Some(boss),
            EnemyKind::Basic => None,
        }
    }

    pub fn boss_mut(&mut self) -> Option<&mut BossState> {
        match &mut self.kind {
            EnemyKind::Boss(boss) => Some(boss),
            EnemyKind::Basic => None,
        }
    }

    /// Health as a 0-1 fraction for health bars
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether projectiles and the player can collide with this enemy
    pub fn is_collidable(&self) -> bool {
        self.active && self.boss().is_none_or(|b| b.is_collidable())
    }

    /// Reset corrupted numeric fields. Returns true if anything was fixed.
    pub fn sanitize(&mut self, safe_pos: Vec2) -> bool {
        let mut fixed = false;
        if !is_finite_vec(self.pos) {
            self.pos = safe_pos;
            fixed = true;
        }
        if !is_finite_vec(self.vel) {
            self.vel = Vec2::ZERO;
            fixed = true;
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            self.size = ENEMY_SIZE;
            fixed = true;
        }
        if !self.health.is_finite() {
            self.health = self.max_health.max(1.0);
            fixed = true;
        }
        fixed
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A shot in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: f32,
    /// Source weapon (None for enemy fire)
    pub weapon: Option<WeaponType>,
    pub special: Option<SpecialTag>,
    pub homing_target: Option<u32>,
    pub charge_level: f32,
    pub bounces: u8,
    pub max_bounces: u8,
    /// Quantum phase angle, advanced in flight (renderer use)
    pub quantum_phase: f32,
    /// Ms of flight accumulated toward the next fusion growth step
    pub fusion_timer: f32,
    /// Enemies already struck, so persisting shots hit each one once
    #[serde(default)]
    pub struck: Vec<u32>,
    pub active: bool,
}

impl Projectile {
    pub fn new(id: u32, owner: Owner, pos: Vec2, vel: Vec2, size: f32, damage: f32) -> Self {
        Self {
            id,
            owner,
            pos,
            vel,
            size,
            damage,
            weapon: None,
            special: None,
            homing_target: None,
            charge_level: 0.0,
            bounces: 0,
            max_bounces: 0,
            quantum_phase: 0.0,
            fusion_timer: 0.0,
            struck: Vec::new(),
            active: true,
        }
    }

    /// Charged or oversized shots get the forgiving hit threshold
    pub fn is_large(&self) -> bool {
        self.charge_level > 0.0 || self.size > 8.0
    }

    /// Corrupted projectiles are simply retired
    pub fn sanitize(&mut self) -> bool {
        let corrupt = !is_finite_vec(self.pos)
            || !is_finite_vec(self.vel)
            || !self.size.is_finite()
            || self.size <= 0.0
            || !self.damage.is_finite();
        if corrupt {
            self.active = false;
        }
        corrupt
    }
}

/// Pickup payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    RapidFire,
    Shield,
    MultiShot,
    WeaponUpgrade { weapon: WeaponType },
}

/// A collectible falling toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub duration_ms: f32,
    pub active: bool,
}

impl Pickup {
    pub fn new(id: u32, kind: PickupKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, PICKUP_FALL_SPEED),
            size: PICKUP_SIZE,
            duration_ms: POWER_UP_DURATION_MS,
            active: true,
        }
    }

    /// Apply this pickup to the player
    pub fn apply(&self, player: &mut Player) {
        let power_ups = &mut player.power_ups;
        match self.kind {
            PickupKind::RapidFire => power_ups.rapid_fire = power_ups.rapid_fire.max(self.duration_ms),
            PickupKind::Shield => power_ups.shield = power_ups.shield.max(self.duration_ms),
            PickupKind::MultiShot => power_ups.multi_shot = power_ups.multi_shot.max(self.duration_ms),
            PickupKind::WeaponUpgrade { weapon } => player.weapon.upgrade(weapon),
        }
    }

    pub fn sanitize(&mut self) -> bool {
        let corrupt = !is_finite_vec(self.pos) || !is_finite_vec(self.vel) || self.size <= 0.0;
        if corrupt {
            self.active = false;
        }
        corrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(400.0, 550.0), &ProgressionSnapshot::default())
    }

    #[test]
    fn test_shield_blocks_hit() {
        let mut p = player();
        p.power_ups.shield = 500.0;
        assert!(!p.take_hit(0.0, INVULNERABILITY_MS));
        assert_eq!(p.lives, PLAYER_MAX_LIVES);
    }

    #[test]
    fn test_hit_starts_invulnerability_window() {
        let mut p = player();
        assert!(p.take_hit(1000.0, INVULNERABILITY_MS));
        assert_eq!(p.lives, PLAYER_MAX_LIVES - 1);
        assert!(!p.take_hit(1500.0, INVULNERABILITY_MS));

        p.update_invulnerability(2999.0);
        assert!(p.invulnerable);
        p.update_invulnerability(3000.0);
        assert!(!p.invulnerable);
    }

    #[test]
    fn test_lives_never_underflow() {
        let mut p = player();
        p.lives = 0;
        p.take_hit(0.0, 0.0);
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn test_power_up_timers_count_down() {
        let mut ups = PowerUps {
            rapid_fire: 100.0,
            shield: 10.0,
            multi_shot: 0.0,
        };
        ups.tick(30.0);
        assert_eq!(ups.rapid_fire, 70.0);
        assert_eq!(ups.shield, 0.0);
        assert!(!ups.shield_active());
    }

    #[test]
    fn test_sanitize_resets_only_bad_fields() {
        let mut p = player();
        p.pos = Vec2::new(f32::NAN, 10.0);
        p.size = -1.0;
        let safe = Vec2::new(400.0, 550.0);
        assert!(p.sanitize(safe));
        assert_eq!(p.pos, safe);
        assert_eq!(p.size, PLAYER_SIZE);
        assert!(!p.sanitize(safe));

        let mut shot = Projectile::new(1, Owner::Player, Vec2::ZERO, Vec2::ZERO, 4.0, 10.0);
        shot.vel = Vec2::new(f32::INFINITY, 0.0);
        assert!(shot.sanitize());
        assert!(!shot.active);
    }

    #[test]
    fn test_weapon_upgrade_pickup() {
        let mut p = player();
        let pickup = Pickup::new(
            1,
            PickupKind::WeaponUpgrade {
                weapon: WeaponType::Pulse,
            },
            Vec2::ZERO,
        );
        pickup.apply(&mut p);
        assert_eq!(p.weapon.slots[0].level, 2);
    }
}
