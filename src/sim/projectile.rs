//! Per-weapon projectile behavior
//!
//! Two dispatch points keyed on [`SpecialTag`]: [`update_flight`] runs every
//! tick while a shot is in the air, [`resolve_hit`] runs when it touches an
//! enemy. Everything else treats projectiles uniformly.

use glam::Vec2;

use super::collision::reflect_velocity;
use super::entity::{Enemy, Owner, Projectile};
use super::state::RngState;
use super::weapon::{EXPLOSION_RADIUS, SpecialTag};

/// Fraction of the way a tracking shot turns toward its target per tick
pub const TRACKING_BLEND: f32 = 0.3;
/// Enemy homing shots turn much slower so they can be dodged
pub const ENEMY_TRACKING_BLEND: f32 = 0.05;
/// Damage kept after each pierce or ricochet
pub const HIT_FALLOFF: f32 = 0.8;
/// Splash damage relative to the primary hit
pub const SPLASH_FACTOR: f32 = 0.6;
pub const DISRUPTIVE_MULTIPLIER: f32 = 1.3;
pub const DISRUPTIVE_SPLASH_RADIUS: f32 = 30.0;
pub const QUANTUM_BYPASS_CHANCE: f32 = 0.3;
/// Phase advance in rad/s
pub const QUANTUM_PHASE_RATE: f32 = 6.0;
pub const FUSION_STEP_MS: f32 = 1000.0;
pub const FUSION_DAMAGE_GROWTH: f32 = 1.5;
pub const FUSION_SIZE_GROWTH: f32 = 1.2;
pub const FUSION_MAX_SIZE: f32 = 24.0;

/// Area damage to apply around the primary target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splash {
    pub radius: f32,
    pub damage: f32,
}

/// What one projectile-enemy contact does
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResolution {
    /// Damage to the struck enemy before its armor and shield
    pub damage: f32,
    pub splash: Option<Splash>,
    /// Projectile stays in flight after the hit
    pub persists: bool,
}

/// Pick the closest collidable enemy to `pos`
pub fn nearest_enemy(enemies: &[Enemy], pos: Vec2) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_collidable())
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .total_cmp(&b.pos.distance_squared(pos))
                .then(a.id.cmp(&b.id))
        })
}

/// Turn `vel` part of the way toward `target` keeping its speed
fn steer(vel: Vec2, from: Vec2, target: Vec2, blend: f32) -> Vec2 {
    let speed = vel.length();
    let Some(desired) = (target - from).try_normalize() else {
        return vel;
    };
    match vel.lerp(desired * speed, blend).try_normalize() {
        Some(dir) => dir * speed,
        None => vel,
    }
}

/// Move one projectile for a tick, applying its in-flight special
pub fn update_flight(
    shot: &mut Projectile,
    enemies: &[Enemy],
    player_pos: Vec2,
    field_width: f32,
    dt_ms: f32,
) {
    let dt = dt_ms / 1000.0;

    if shot.special == Some(SpecialTag::Tracking) {
        match shot.owner {
            Owner::Player => {
                // Re-aim every tick; no target means fly straight
                let nearest = nearest_enemy(enemies, shot.pos);
                shot.homing_target = nearest.map(|e| e.id);
                if let Some(target) = nearest {
                    shot.vel = steer(shot.vel, shot.pos, target.pos, TRACKING_BLEND);
                }
            }
            Owner::Enemy => {
                shot.vel = steer(shot.vel, shot.pos, player_pos, ENEMY_TRACKING_BLEND);
            }
        }
    }

    shot.pos += shot.vel * dt;

    if shot.special == Some(SpecialTag::Ricochet) && shot.bounces < shot.max_bounces {
        let normal = if shot.pos.x - shot.size < 0.0 && shot.vel.x < 0.0 {
            Some(Vec2::X)
        } else if shot.pos.x + shot.size > field_width && shot.vel.x > 0.0 {
            Some(Vec2::NEG_X)
        } else {
            None
        };
        if let Some(normal) = normal {
            shot.vel = reflect_velocity(shot.vel, normal);
            shot.pos.x = shot.pos.x.clamp(shot.size, (field_width - shot.size).max(shot.size));
            shot.bounces += 1;
        }
    }

    match shot.special {
        Some(SpecialTag::Fusion) => {
            shot.fusion_timer += dt_ms;
            while shot.fusion_timer >= FUSION_STEP_MS {
                shot.fusion_timer -= FUSION_STEP_MS;
                shot.damage *= FUSION_DAMAGE_GROWTH;
                shot.size = (shot.size * FUSION_SIZE_GROWTH).min(FUSION_MAX_SIZE);
            }
        }
        Some(SpecialTag::Quantum) => {
            shot.quantum_phase =
                (shot.quantum_phase + QUANTUM_PHASE_RATE * dt).rem_euclid(std::f32::consts::TAU);
        }
        _ => {}
    }
}

/// Apply a projectile's on-hit special against the enemy at `enemy_pos`
///
/// Updates the projectile (falloff, bounce, struck list, deactivation) and
/// returns the damage to deal.
pub fn resolve_hit(
    shot: &mut Projectile,
    enemy_id: u32,
    enemy_pos: Vec2,
    rng: &mut RngState,
) -> HitResolution {
    let base = shot.damage;
    let mut hit = HitResolution {
        damage: base,
        splash: None,
        persists: false,
    };

    match shot.special {
        Some(SpecialTag::Piercing) => {
            hit.persists = true;
            shot.damage *= HIT_FALLOFF;
        }
        Some(SpecialTag::Charging) => {
            hit.persists = true;
        }
        Some(SpecialTag::Explosive) => {
            hit.splash = Some(Splash {
                radius: EXPLOSION_RADIUS,
                damage: base * SPLASH_FACTOR,
            });
        }
        Some(SpecialTag::Disruptive) => {
            hit.damage = base * DISRUPTIVE_MULTIPLIER;
            hit.splash = Some(Splash {
                radius: DISRUPTIVE_SPLASH_RADIUS,
                damage: hit.damage * SPLASH_FACTOR,
            });
        }
        Some(SpecialTag::Quantum) => {
            if rng.chance(QUANTUM_BYPASS_CHANCE) {
                hit.damage = base * 2.0;
            }
        }
        Some(SpecialTag::Ricochet) if shot.bounces < shot.max_bounces => {
            let normal = (shot.pos - enemy_pos).try_normalize().unwrap_or(Vec2::Y);
            shot.vel = reflect_velocity(shot.vel, normal);
            shot.bounces += 1;
            shot.damage *= HIT_FALLOFF;
            hit.persists = true;
        }
        _ => {}
    }

    if hit.persists {
        shot.struck.push(enemy_id);
    } else {
        shot.active = false;
    }
    hit
}
