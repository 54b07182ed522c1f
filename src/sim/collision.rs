//! Collision detection and response
//!
//! Circle-circle overlap tests with a forgiving threshold, and the per-tick
//! pass that turns contacts into damage, kills, lost lives and pickups.

use glam::Vec2;

use super::entity::{Enemy, Owner, Pickup, PickupKind};
use super::projectile::resolve_hit;
use super::state::{EntityIds, GameState, RngState};
use super::weapon::WeaponType;
use crate::audio::SoundEvent;

/// Threshold scale for charged or oversized projectiles
pub const LARGE_HIT_SCALE: f32 = 0.8;
/// Threshold scale for everything else
pub const SMALL_HIT_SCALE: f32 = 0.5;

/// Center distance below which two circles count as touching
pub fn hit_threshold(r1: f32, r2: f32, large: bool) -> f32 {
    let scale = if large { LARGE_HIT_SCALE } else { SMALL_HIT_SCALE };
    (r1 + r2) * scale
}

pub fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32, large: bool) -> bool {
    let threshold = hit_threshold(ra, rb, large);
    a.distance_squared(b) < threshold * threshold
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// What the collision pass did this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub enemies_destroyed: u32,
    pub bosses_defeated: u32,
    pub power_ups_collected: u32,
    pub player_hits: u32,
    pub shake: f32,
    pub sounds: Vec<SoundEvent>,
}

/// Shared sinks for damage consequences
struct Casualties<'a> {
    now_ms: f64,
    drop_chance: f32,
    rng: &'a mut RngState,
    ids: &'a mut EntityIds,
    pickups: &'a mut Vec<Pickup>,
    score: &'a mut u64,
    kills: &'a mut u32,
    report: &'a mut CollisionReport,
}

impl Casualties<'_> {
    /// Deal damage: armor, then shield, then health
    fn damage(&mut self, enemy: &mut Enemy, amount: f32) {
        if !enemy.is_collidable() {
            return;
        }
        let mut amount = amount;
        if let Some(boss) = enemy.boss_mut() {
            let armored = boss.armored(amount);
            amount = boss.absorb(armored);
        }
        enemy.health = (enemy.health - amount).max(0.0);
        if enemy.health > 0.0 {
            self.report.sounds.push(SoundEvent::EnemyHit);
            return;
        }

        let pos = enemy.pos;
        match enemy.boss_mut() {
            Some(boss) => {
                // Later hits this tick see a defeated boss and skip it
                if boss.begin_defeat(self.now_ms) {
                    let archetype = boss.archetype;
                    log::info!("{:?} defeated", archetype);
                    self.report.bosses_defeated += 1;
                    self.report.shake += 0.8;
                    self.report.sounds.push(SoundEvent::BossDefeated { archetype });
                }
            }
            None => {
                enemy.active = false;
                *self.score += enemy.points;
                *self.kills += 1;
                self.report.enemies_destroyed += 1;
                self.report.shake += 0.15;
                self.report.sounds.push(SoundEvent::Explosion);
                self.maybe_drop(pos);
            }
        }
    }

    fn maybe_drop(&mut self, pos: Vec2) {
        if !self.rng.chance(self.drop_chance) {
            return;
        }
        let kind = match self.rng.index(4) {
            0 => PickupKind::RapidFire,
            1 => PickupKind::Shield,
            2 => PickupKind::MultiShot,
            _ => PickupKind::WeaponUpgrade {
                weapon: WeaponType::ALL[self.rng.index(WeaponType::ALL.len())],
            },
        };
        let id = self.ids.next_id();
        log::trace!("Pickup {:?} dropped (id {})", kind, id);
        self.pickups.push(Pickup::new(id, kind, pos));
    }
}

/// Resolve every contact for this tick
pub fn resolve_collisions(state: &mut GameState) -> CollisionReport {
    let mut report = CollisionReport::default();
    let now_ms = state.time_ms;
    let invulnerability_ms = state.tuning.invulnerability_ms;
    let GameState {
        tuning,
        rng,
        ids,
        player,
        enemies,
        projectiles,
        pickups,
        score,
        kills,
        ..
    } = state;

    // Player fire vs enemies
    {
        let mut casualties = Casualties {
            now_ms,
            drop_chance: tuning.pickup_drop_chance,
            rng,
            ids,
            pickups: &mut *pickups,
            score,
            kills,
            report: &mut report,
        };
        for shot in projectiles
            .iter_mut()
            .filter(|p| p.active && p.owner == Owner::Player)
        {
            for index in 0..enemies.len() {
                if !shot.active {
                    break;
                }
                let target = &enemies[index];
                if !target.is_collidable()
                    || shot.struck.contains(&target.id)
                    || !overlaps(shot.pos, shot.size, target.pos, target.size, shot.is_large())
                {
                    continue;
                }
                let (target_id, target_pos) = (target.id, target.pos);
                let hit = resolve_hit(shot, target_id, target_pos, casualties.rng);
                casualties.damage(&mut enemies[index], hit.damage);

                if let Some(splash) = hit.splash {
                    for (other, enemy) in enemies.iter_mut().enumerate() {
                        if other != index && enemy.pos.distance(target_pos) <= splash.radius {
                            casualties.damage(enemy, splash.damage);
                        }
                    }
                }
            }
        }
    }

    // Enemy fire vs player
    for shot in projectiles
        .iter_mut()
        .filter(|p| p.active && p.owner == Owner::Enemy)
    {
        if overlaps(shot.pos, shot.size, player.pos, player.size, shot.is_large()) {
            shot.active = false;
            if player.take_hit(now_ms, invulnerability_ms) {
                report.player_hits += 1;
                report.shake += 0.5;
                report.sounds.push(SoundEvent::PlayerHit);
            }
        }
    }

    // Ramming
    for enemy in enemies.iter_mut().filter(|e| e.is_collidable()) {
        if overlaps(enemy.pos, enemy.size, player.pos, player.size, true)
            && player.take_hit(now_ms, invulnerability_ms)
        {
            report.player_hits += 1;
            report.shake += 0.5;
            report.sounds.push(SoundEvent::PlayerHit);
            if !enemy.is_boss() {
                enemy.active = false;
                report.sounds.push(SoundEvent::Explosion);
            }
        }
    }

    // Pickups
    for pickup in pickups.iter_mut().filter(|p| p.active) {
        if overlaps(pickup.pos, pickup.size, player.pos, player.size, true) {
            pickup.apply(player);
            pickup.active = false;
            report.power_ups_collected += 1;
            report.sounds.push(SoundEvent::PowerUpCollected);
        }
    }

    report
}
