//! Boss AI
//!
//! A boss is an [`Enemy`] whose kind carries a [`BossState`]. Each archetype
//! pairs a movement pattern (a periodic function of elapsed phase), a shoot
//! pattern on its own cooldown, and an optional special ability on its own
//! timer. Every timer is a timestamp compared against the session clock.
//!
//! Lifecycle only moves forward: Intro -> Active -> Defeated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Enemy, EnemyKind, Owner, Projectile};
use super::state::{EntityIds, RngState};
use super::weapon::SpecialTag;
use crate::consts::*;
use crate::tuning::Tuning;

/// Predefined boss configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossArchetype {
    Dreadnought,
    Phantom,
    Hydra,
    Tempest,
    Juggernaut,
    Vortex,
    Reaper,
    Warden,
}

/// Stats and behavior ids for an archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeSpec {
    pub health: f32,
    pub points: u64,
    pub size_scale: f32,
    pub movement: MovementPattern,
    pub shoot: ShootPattern,
    pub ability: Option<SpecialAbility>,
}

impl BossArchetype {
    pub const ALL: [BossArchetype; 8] = [
        BossArchetype::Dreadnought,
        BossArchetype::Phantom,
        BossArchetype::Hydra,
        BossArchetype::Tempest,
        BossArchetype::Juggernaut,
        BossArchetype::Vortex,
        BossArchetype::Reaper,
        BossArchetype::Warden,
    ];

    pub fn spec(&self) -> ArchetypeSpec {
        use MovementPattern as M;
        use ShootPattern as S;
        use SpecialAbility as A;
        let (health, points, size_scale, movement, shoot, ability) = match self {
            BossArchetype::Dreadnought => (600.0, 5000, 2.2, M::Fortress, S::Shield, Some(A::ShieldRegen)),
            BossArchetype::Phantom => (350.0, 4000, 1.5, M::Teleport, S::Burst, Some(A::Teleport)),
            BossArchetype::Hydra => (450.0, 4500, 1.8, M::Weave, S::Spread, Some(A::Heal)),
            BossArchetype::Tempest => (320.0, 3500, 1.4, M::Zigzag, S::Triple, Some(A::RapidFire)),
            BossArchetype::Juggernaut => (550.0, 6000, 2.0, M::Sweep, S::Laser, Some(A::Armor)),
            BossArchetype::Vortex => (380.0, 4200, 1.6, M::Spiral, S::Homing, None),
            BossArchetype::Reaper => (300.0, 3800, 1.3, M::Dive, S::Triple, Some(A::RapidFire)),
            BossArchetype::Warden => (420.0, 4400, 1.7, M::Circle, S::Spread, Some(A::ShieldRegen)),
        };
        ArchetypeSpec {
            health,
            points,
            size_scale,
            movement,
            shoot,
            ability,
        }
    }

    /// Uniform pick from the archetype table
    pub fn random(rng: &mut RngState) -> Self {
        Self::ALL[rng.index(Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossLifecycle {
    Intro,
    Active,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    Zigzag,
    Circle,
    Sweep,
    Spiral,
    Dive,
    Fortress,
    Weave,
    /// Stays put; the teleport ability does the moving
    Teleport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootPattern {
    Triple,
    Spread,
    Burst,
    Homing,
    Laser,
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAbility {
    ShieldRegen,
    Teleport,
    RapidFire,
    Heal,
    Armor,
}

// Ability tuning
pub const SHIELD_POOL: f32 = 120.0;
pub const SHIELD_REGEN_INTERVAL_MS: f64 = 5000.0;
pub const TELEPORT_INTERVAL_MS: f64 = 3000.0;
pub const RAPID_FIRE_PERIOD_MS: f64 = 6000.0;
pub const RAPID_FIRE_WINDOW_MS: f64 = 2000.0;
pub const RAPID_FIRE_COOLDOWN_FACTOR: f64 = 0.3;
pub const HEAL_INTERVAL_MS: f64 = 8000.0;
pub const HEAL_AMOUNT: f32 = 60.0;
pub const ARMOR_FACTOR: f32 = 0.7;

/// Last-trigger timestamps for timed abilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityTimers {
    pub last_shield_regen_ms: f64,
    pub last_teleport_ms: f64,
    pub last_heal_ms: f64,
    /// Start of the rapid-fire duty cycle
    pub rapid_fire_epoch_ms: f64,
}

/// Boss-specific state carried by an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub archetype: BossArchetype,
    pub lifecycle: BossLifecycle,
    pub movement: MovementPattern,
    pub shoot: ShootPattern,
    pub ability: Option<SpecialAbility>,
    pub timers: AbilityTimers,
    pub shield: f32,
    /// Horizontal center the movement pattern orbits
    pub anchor_x: f32,
    pub spawned_ms: f64,
    pub active_since_ms: Option<f64>,
    pub defeated_at_ms: Option<f64>,
    pub last_shot_ms: Option<f64>,
    /// One-shot guard for the defeat transition
    pub defeat_started: bool,
}

impl BossState {
    pub fn new(archetype: BossArchetype, anchor_x: f32, now_ms: f64) -> Self {
        let spec = archetype.spec();
        let shield = if spec.ability == Some(SpecialAbility::ShieldRegen) {
            SHIELD_POOL
        } else {
            0.0
        };
        Self {
            archetype,
            lifecycle: BossLifecycle::Intro,
            movement: spec.movement,
            shoot: spec.shoot,
            ability: spec.ability,
            timers: AbilityTimers::default(),
            shield,
            anchor_x,
            spawned_ms: now_ms,
            active_since_ms: None,
            defeated_at_ms: None,
            last_shot_ms: None,
            defeat_started: false,
        }
    }

    /// Only active bosses can be hit; intro bosses are still arriving
    pub fn is_collidable(&self) -> bool {
        self.lifecycle == BossLifecycle::Active
    }

    /// Attacks start part-way into the intro
    pub fn can_attack(&self, now_ms: f64, tuning: &Tuning) -> bool {
        match self.lifecycle {
            BossLifecycle::Intro => now_ms - self.spawned_ms >= tuning.boss_attack_delay_ms,
            BossLifecycle::Active => true,
            BossLifecycle::Defeated => false,
        }
    }

    pub fn rapid_fire_open(&self, now_ms: f64) -> bool {
        self.ability == Some(SpecialAbility::RapidFire)
            && self.lifecycle == BossLifecycle::Active
            && (now_ms - self.timers.rapid_fire_epoch_ms).rem_euclid(RAPID_FIRE_PERIOD_MS)
                < RAPID_FIRE_WINDOW_MS
    }

    /// Incoming damage after passive armor
    pub fn armored(&self, damage: f32) -> f32 {
        if self.ability == Some(SpecialAbility::Armor) {
            damage * ARMOR_FACTOR
        } else {
            damage
        }
    }

    /// Soak damage with the shield; returns what gets through to health
    pub fn absorb(&mut self, damage: f32) -> f32 {
        let soaked = damage.min(self.shield);
        self.shield -= soaked;
        damage - soaked
    }

    /// Move to Defeated. Returns true only the first time.
    pub fn begin_defeat(&mut self, now_ms: f64) -> bool {
        if self.defeat_started {
            return false;
        }
        self.defeat_started = true;
        self.lifecycle = BossLifecycle::Defeated;
        self.defeated_at_ms = Some(now_ms);
        true
    }
}

/// Spawn a boss of the given archetype above the field
pub fn spawn_boss(id: u32, archetype: BossArchetype, anchor_x: f32, now_ms: f64) -> Enemy {
    let spec = archetype.spec();
    let size = BOSS_BASE_SIZE * spec.size_scale;
    Enemy {
        id,
        pos: Vec2::new(anchor_x, -size),
        vel: Vec2::ZERO,
        size,
        health: spec.health,
        max_health: spec.health,
        points: spec.points,
        kind: EnemyKind::Boss(Box::new(BossState::new(archetype, anchor_x, now_ms))),
        active: true,
    }
}

/// Triangle wave in [-1, 1] with period 1
fn triangle(x: f32) -> f32 {
    4.0 * (x - (x + 0.5).floor()).abs() - 1.0
}

/// Position a pattern wants at `phase` seconds into the fight
pub fn movement_target(pattern: MovementPattern, phase: f32, anchor_x: f32, current: Vec2) -> Vec2 {
    let base_y = BOSS_ANCHOR_Y;
    match pattern {
        MovementPattern::Zigzag => Vec2::new(
            anchor_x + 200.0 * triangle(phase * 0.5),
            base_y + 30.0 * (phase * 2.0).sin().abs(),
        ),
        MovementPattern::Circle => Vec2::new(
            anchor_x + 120.0 * phase.cos(),
            base_y + 60.0 * phase.sin(),
        ),
        MovementPattern::Sweep => Vec2::new(anchor_x + 300.0 * (phase * 0.4).sin(), base_y),
        MovementPattern::Spiral => {
            let r = 60.0 + 40.0 * (phase * 0.3).sin();
            Vec2::new(
                anchor_x + r * (phase * 1.2).cos(),
                base_y + 0.5 * r * (phase * 1.2).sin(),
            )
        }
        MovementPattern::Dive => {
            let dive = (phase * 0.5).sin().max(0.0).powi(4);
            Vec2::new(anchor_x + 100.0 * (phase * 0.25).sin(), base_y + 220.0 * dive)
        }
        MovementPattern::Fortress => Vec2::new(
            anchor_x + 20.0 * (phase * 0.5).sin(),
            base_y + 5.0 * phase.sin(),
        ),
        MovementPattern::Weave => Vec2::new(
            anchor_x + 150.0 * phase.sin() + 60.0 * (phase * 2.3).sin(),
            base_y + 40.0 * (phase * 0.7).sin(),
        ),
        MovementPattern::Teleport => current,
    }
}

/// Base time between volleys
pub fn shoot_cooldown_ms(pattern: ShootPattern) -> f64 {
    match pattern {
        ShootPattern::Triple => 1500.0,
        ShootPattern::Spread => 2000.0,
        ShootPattern::Burst => 2400.0,
        ShootPattern::Homing => 1800.0,
        ShootPattern::Laser => 2200.0,
        ShootPattern::Shield => 2800.0,
    }
}

/// Projectiles for one volley
pub fn volley(
    pattern: ShootPattern,
    origin: Vec2,
    size: f32,
    player_pos: Vec2,
    ids: &mut EntityIds,
) -> Vec<Projectile> {
    let mut shot = |offset: Vec2, vel: Vec2, radius: f32, damage: f32| {
        Projectile::new(ids.next_id(), Owner::Enemy, origin + offset, vel, radius, damage)
    };
    match pattern {
        ShootPattern::Triple => [-60.0, 0.0, 60.0]
            .into_iter()
            .map(|vx| shot(Vec2::ZERO, Vec2::new(vx, 250.0), 5.0, 1.0))
            .collect(),
        ShootPattern::Spread => (0..7)
            .map(|i| shot(Vec2::ZERO, Vec2::new((i as f32 - 3.0) * 50.0, 220.0), 4.0, 1.0))
            .collect(),
        ShootPattern::Burst => (0..5)
            .map(|i| {
                let i = i as f32;
                shot(Vec2::new((i - 2.0) * 8.0, 0.0), Vec2::new(0.0, 280.0 + i * 20.0), 4.0, 1.0)
            })
            .collect(),
        ShootPattern::Homing => {
            let dir = (player_pos - origin).try_normalize().unwrap_or(Vec2::Y);
            let mut missile = shot(Vec2::ZERO, dir * 150.0, 7.0, 1.0);
            missile.special = Some(SpecialTag::Tracking);
            vec![missile]
        }
        ShootPattern::Laser => [-30.0, -10.0, 10.0, 30.0]
            .into_iter()
            .map(|dx| shot(Vec2::new(dx, 0.0), Vec2::new(0.0, 500.0), 2.0, 1.0))
            .collect(),
        ShootPattern::Shield => [-1.0, 1.0]
            .into_iter()
            .map(|side| shot(Vec2::new(side * size * 0.6, 0.0), Vec2::new(0.0, 180.0), 12.0, 2.0))
            .collect(),
    }
}

/// Things a boss update wants the tick to act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossSignal {
    /// Intro finished, full combat begins
    Activated,
    /// Explosion sequence finished; the boss is gone and its bonus is due
    DefeatComplete { archetype: BossArchetype, points: u64 },
}

/// Per-tick inputs for boss updates
pub struct BossContext<'a> {
    pub now_ms: f64,
    pub dt_ms: f32,
    pub player_pos: Vec2,
    pub tuning: &'a Tuning,
    pub ids: &'a mut EntityIds,
    pub rng: &'a mut RngState,
    /// Volleys fired this tick are pushed here
    pub shots: &'a mut Vec<Projectile>,
}

/// Advance one boss. Non-boss enemies are ignored.
pub fn update_boss(enemy: &mut Enemy, ctx: &mut BossContext) -> Option<BossSignal> {
    let EnemyKind::Boss(boss) = &mut enemy.kind else {
        return None;
    };
    let now = ctx.now_ms;
    let mut signal = None;

    match boss.lifecycle {
        BossLifecycle::Intro => {
            let elapsed = now - boss.spawned_ms;
            let t = (elapsed / ctx.tuning.boss_intro_ms).clamp(0.0, 1.0) as f32;
            let eased = 1.0 - (1.0 - t) * (1.0 - t);
            let start_y = -enemy.size;
            enemy.pos = Vec2::new(boss.anchor_x, start_y + (BOSS_ANCHOR_Y - start_y) * eased);

            if elapsed >= ctx.tuning.boss_intro_ms {
                boss.lifecycle = BossLifecycle::Active;
                boss.active_since_ms = Some(now);
                boss.timers = AbilityTimers {
                    last_shield_regen_ms: now,
                    last_teleport_ms: now,
                    last_heal_ms: now,
                    rapid_fire_epoch_ms: now,
                };
                log::debug!("{:?} active", boss.archetype);
                signal = Some(BossSignal::Activated);
            }
        }
        BossLifecycle::Active => {
            let phase = ((now - boss.active_since_ms.unwrap_or(now)) / 1000.0) as f32;
            let target = movement_target(boss.movement, phase, boss.anchor_x, enemy.pos);
            let size = enemy.size;
            let clamped = Vec2::new(
                target.x.clamp(size, (ctx.tuning.field_width - size).max(size)),
                target.y.clamp(size, (ctx.tuning.field_height * 0.6).max(size)),
            );
            if ctx.dt_ms > 0.0 {
                enemy.vel = (clamped - enemy.pos) / (ctx.dt_ms / 1000.0);
            }
            enemy.pos = clamped;

            run_abilities(boss, &mut enemy.pos, &mut enemy.health, enemy.max_health, size, ctx);
        }
        BossLifecycle::Defeated => {
            enemy.vel = Vec2::ZERO;
            let defeated_at = boss.defeated_at_ms.unwrap_or(now);
            if enemy.active && now - defeated_at >= ctx.tuning.boss_defeat_ms {
                enemy.active = false;
                signal = Some(BossSignal::DefeatComplete {
                    archetype: boss.archetype,
                    points: enemy.points,
                });
            }
            return signal;
        }
    }

    if boss.can_attack(now, ctx.tuning) {
        let mut cooldown = shoot_cooldown_ms(boss.shoot);
        if boss.rapid_fire_open(now) {
            cooldown *= RAPID_FIRE_COOLDOWN_FACTOR;
        }
        let ready = boss.last_shot_ms.is_none_or(|last| now - last >= cooldown);
        if ready {
            let origin = enemy.pos + Vec2::new(0.0, enemy.size);
            ctx.shots
                .extend(volley(boss.shoot, origin, enemy.size, ctx.player_pos, ctx.ids));
            boss.last_shot_ms = Some(now);
        }
    }

    signal
}

fn run_abilities(
    boss: &mut BossState,
    pos: &mut Vec2,
    health: &mut f32,
    max_health: f32,
    size: f32,
    ctx: &mut BossContext,
) {
    let now = ctx.now_ms;
    let timers = &mut boss.timers;
    match boss.ability {
        Some(SpecialAbility::ShieldRegen) => {
            if now - timers.last_shield_regen_ms >= SHIELD_REGEN_INTERVAL_MS {
                timers.last_shield_regen_ms = now;
                if boss.shield <= 0.0 {
                    boss.shield = SHIELD_POOL;
                    log::debug!("{:?} shield restored", boss.archetype);
                }
            }
        }
        Some(SpecialAbility::Teleport) => {
            if now - timers.last_teleport_ms >= TELEPORT_INTERVAL_MS {
                timers.last_teleport_ms = now;
                let width = ctx.tuning.field_width;
                let height = ctx.tuning.field_height;
                *pos = Vec2::new(
                    ctx.rng.range(size, (width - size).max(size)),
                    ctx.rng.range(size, (height * 0.4).max(size)),
                );
                boss.anchor_x = pos.x;
            }
        }
        Some(SpecialAbility::Heal) => {
            if now - timers.last_heal_ms >= HEAL_INTERVAL_MS {
                timers.last_heal_ms = now;
                if *health < max_health * 0.5 {
                    *health = (*health + HEAL_AMOUNT).min(max_health);
                }
            }
        }
        // Duty cycle and armor are evaluated where they apply
        Some(SpecialAbility::RapidFire) | Some(SpecialAbility::Armor) | None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        tuning: Tuning,
        ids: EntityIds,
        rng: RngState,
        shots: Vec<Projectile>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                tuning: Tuning::default(),
                ids: EntityIds::default(),
                rng: RngState::new(11),
                shots: Vec::new(),
            }
        }

        fn step(&mut self, enemy: &mut Enemy, now_ms: f64) -> Option<BossSignal> {
            let mut ctx = BossContext {
                now_ms,
                dt_ms: 16.0,
                player_pos: Vec2::new(400.0, 550.0),
                tuning: &self.tuning,
                ids: &mut self.ids,
                rng: &mut self.rng,
                shots: &mut self.shots,
            };
            update_boss(enemy, &mut ctx)
        }
    }

    fn lifecycle(enemy: &Enemy) -> BossLifecycle {
        enemy.boss().unwrap().lifecycle
    }

    #[test]
    fn test_intro_attack_delay_then_active() {
        let mut h = Harness::new();
        let mut boss = spawn_boss(1, BossArchetype::Tempest, 400.0, 0.0);

        h.step(&mut boss, 400.0);
        assert!(h.shots.is_empty());
        assert_eq!(lifecycle(&boss), BossLifecycle::Intro);

        // Attacks begin at 500 ms while still in intro
        h.step(&mut boss, 500.0);
        assert_eq!(h.shots.len(), 3);
        assert_eq!(lifecycle(&boss), BossLifecycle::Intro);
        assert!(!boss.is_collidable());

        assert_eq!(h.step(&mut boss, 2000.0), Some(BossSignal::Activated));
        assert_eq!(lifecycle(&boss), BossLifecycle::Active);
        assert!(boss.is_collidable());
    }

    #[test]
    fn test_defeat_guard_fires_once() {
        let mut h = Harness::new();
        let mut boss = spawn_boss(1, BossArchetype::Vortex, 400.0, 0.0);
        h.step(&mut boss, 2000.0);

        let state = boss.boss_mut().unwrap();
        assert!(state.begin_defeat(2500.0));
        assert!(!state.begin_defeat(2500.0));
        assert_eq!(state.lifecycle, BossLifecycle::Defeated);

        assert_eq!(h.step(&mut boss, 3000.0), None);
        assert!(boss.active);
        let done = h.step(&mut boss, 4500.0);
        assert_eq!(
            done,
            Some(BossSignal::DefeatComplete {
                archetype: BossArchetype::Vortex,
                points: 4200
            })
        );
        assert!(!boss.active);
        assert_eq!(h.step(&mut boss, 5000.0), None);
    }

    #[test]
    fn test_rapid_fire_window_duty_cycle() {
        let mut state = BossState::new(BossArchetype::Tempest, 400.0, 0.0);
        state.lifecycle = BossLifecycle::Active;
        state.timers.rapid_fire_epoch_ms = 1000.0;
        assert!(state.rapid_fire_open(1000.0));
        assert!(state.rapid_fire_open(2999.0));
        assert!(!state.rapid_fire_open(3000.0));
        assert!(!state.rapid_fire_open(6999.0));
        assert!(state.rapid_fire_open(7000.0));
    }

    #[test]
    fn test_shield_regen_only_when_empty() {
        let mut h = Harness::new();
        let mut boss = spawn_boss(1, BossArchetype::Warden, 400.0, 0.0);
        assert_eq!(boss.boss().unwrap().shield, SHIELD_POOL);
        h.step(&mut boss, 2000.0);

        boss.boss_mut().unwrap().shield = 10.0;
        h.step(&mut boss, 7000.0);
        assert_eq!(boss.boss().unwrap().shield, 10.0);

        boss.boss_mut().unwrap().shield = 0.0;
        h.step(&mut boss, 11_999.0);
        assert_eq!(boss.boss().unwrap().shield, 0.0);
        h.step(&mut boss, 12_000.0);
        assert_eq!(boss.boss().unwrap().shield, SHIELD_POOL);
    }

    #[test]
    fn test_heal_below_half() {
        let mut h = Harness::new();
        let mut boss = spawn_boss(1, BossArchetype::Hydra, 400.0, 0.0);
        h.step(&mut boss, 2000.0);
        boss.health = 100.0;
        h.step(&mut boss, 10_000.0);
        assert_eq!(boss.health, 160.0);

        boss.health = 400.0;
        h.step(&mut boss, 18_000.0);
        assert_eq!(boss.health, 400.0);
    }

    #[test]
    fn test_teleport_lands_in_upper_field() {
        let mut h = Harness::new();
        let mut boss = spawn_boss(1, BossArchetype::Phantom, 400.0, 0.0);
        h.step(&mut boss, 2000.0);
        for k in 1..20 {
            h.step(&mut boss, 2000.0 + k as f64 * TELEPORT_INTERVAL_MS);
            assert!(boss.pos.y <= h.tuning.field_height * 0.4);
            assert!(boss.pos.x >= boss.size && boss.pos.x <= h.tuning.field_width - boss.size);
            assert_eq!(boss.boss().unwrap().anchor_x, boss.pos.x);
        }
    }

    #[test]
    fn test_armor_and_shield_soak() {
        let mut state = BossState::new(BossArchetype::Juggernaut, 400.0, 0.0);
        assert_eq!(state.armored(100.0), 70.0);
        state.shield = 30.0;
        assert_eq!(state.absorb(50.0), 20.0);
        assert_eq!(state.shield, 0.0);
    }

    #[test]
    fn test_movement_patterns_stay_in_field() {
        let tuning = Tuning::default();
        for archetype in BossArchetype::ALL {
            let mut h = Harness::new();
            let mut boss = spawn_boss(1, archetype, 400.0, 0.0);
            let mut now = 0.0;
            while now < 40_000.0 {
                h.step(&mut boss, now);
                now += 16.0;
                if lifecycle(&boss) == BossLifecycle::Active {
                    assert!(boss.pos.x >= boss.size - 0.01);
                    assert!(boss.pos.x <= tuning.field_width - boss.size + 0.01);
                    assert!(boss.pos.y <= tuning.field_height * 0.6 + 0.01);
                }
            }
        }
    }

    #[test]
    fn test_volley_shapes() {
        let mut ids = EntityIds::default();
        let origin = Vec2::new(400.0, 100.0);
        let player = Vec2::new(400.0, 550.0);
        let spread = volley(ShootPattern::Spread, origin, 30.0, player, &mut ids);
        assert_eq!(spread.len(), 7);
        assert!(spread[0].vel.x < 0.0 && spread[6].vel.x > 0.0);

        let homing = volley(ShootPattern::Homing, origin, 30.0, player, &mut ids);
        assert_eq!(homing.len(), 1);
        assert!((homing[0].vel.length() - 150.0).abs() < 0.01);

        let shield = volley(ShootPattern::Shield, origin, 30.0, player, &mut ids);
        assert!(shield.iter().all(|p| p.size == 12.0 && p.owner == Owner::Enemy));
    }

    #[test]
    fn test_random_archetype_covers_table() {
        let mut rng = RngState::new(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..400 {
            seen.insert(BossArchetype::random(&mut rng));
        }
        assert_eq!(seen.len(), BossArchetype::ALL.len());
    }

    #[test]
    fn test_triangle_wave() {
        assert!((triangle(0.0) + 1.0).abs() < 1e-6);
        assert!((triangle(0.5) - 1.0).abs() < 1e-6);
        assert!((triangle(1.0) + 1.0).abs() < 1e-6);
    }
}
