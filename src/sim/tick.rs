//! Per-tick simulation
//!
//! Core game loop that advances the world deterministically. Sound events are
//! collected while the tick runs and only reach the sink if it succeeds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::{BossArchetype, BossContext, BossSignal, spawn_boss, update_boss};
use super::collision::resolve_collisions;
use super::entity::Enemy;
use super::environment::{self, EnvironmentEffect};
use super::mission::{MissionEvent, SpawnKind, SpawnOrder};
use super::projectile::update_flight;
use super::state::{GameMode, GameState, GameStatus};
use super::weapon::{FireModifiers, WeaponSignal};
use crate::audio::{AudioSink, SoundEvent};
use crate::consts::*;
use crate::error::TickError;
use crate::is_finite_vec;
use crate::progression::MissionResult;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire the active weapon
    pub shoot: bool,
    /// Hold to build charge
    pub charge: bool,
    /// Pause toggle
    pub pause: bool,
    /// Switch to the next weapon slot
    pub cycle_weapon: bool,
    /// Elapsed wall time; clamped to `Tuning::max_delta_ms`
    pub dt_ms: f32,
}

impl TickInput {
    /// Empty input for one nominal frame
    pub fn frame() -> Self {
        Self {
            dt_ms: FRAME_MS,
            ..Default::default()
        }
    }
}

/// What a successful tick reports back
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub status: GameStatus,
    /// Sound events in the order they were flushed
    pub events: Vec<SoundEvent>,
    /// Present only on the tick the mission completed
    pub mission_result: Option<MissionResult>,
}

/// Advance the game state by one tick
///
/// On error the state may be partially updated and no sound is flushed; use
/// [`advance`] to keep the previous state intact.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    sink: &mut impl AudioSink,
) -> Result<TickOutcome, TickError> {
    if !input.dt_ms.is_finite() || input.dt_ms < 0.0 {
        log::warn!("Rejected tick with dt {} ms", input.dt_ms);
        return Err(TickError::InvalidDelta(input.dt_ms));
    }
    let dt_ms = input.dt_ms.min(state.tuning.max_delta_ms);
    let mut events = Vec::new();

    // Ambient layers run even while paused
    update_ambient(state, dt_ms);

    if input.pause {
        match state.status {
            GameStatus::Playing => {
                state.status = GameStatus::Paused;
                log::debug!("Paused at {:.0} ms", state.time_ms);
            }
            GameStatus::Paused => state.status = GameStatus::Playing,
            GameStatus::GameOver | GameStatus::MissionComplete => {}
        }
    }
    if state.status != GameStatus::Playing {
        return Ok(TickOutcome {
            status: state.status,
            events,
            mission_result: None,
        });
    }

    // Clock
    state.time_ms += dt_ms as f64;
    state.time_ticks += 1;
    if let GameMode::Mission { progress, .. } = &mut state.mode {
        progress.advance_time(dt_ms);
    }
    if let Some(result) = complete_mission_if_done(state, &mut events) {
        flush(&events, sink);
        return Ok(TickOutcome {
            status: state.status,
            events,
            mission_result: Some(result),
        });
    }

    let effects: Vec<EnvironmentEffect> = state.environment().to_vec();
    sanitize_entities(state);

    update_player(state, input, dt_ms, &effects, &mut events);
    if !is_finite_vec(state.player.pos) || !is_finite_vec(state.player.vel) {
        return Err(TickError::CorruptedPlayer("non-finite position or velocity"));
    }

    spawn(state, &mut events);
    update_enemies(state, dt_ms, &mut events);
    update_projectiles(state, dt_ms, &effects);
    for pickup in &mut state.pickups {
        pickup.pos += pickup.vel * (dt_ms / 1000.0);
    }

    let report = resolve_collisions(state);
    state.shake(report.shake);
    events.extend(report.sounds.iter().copied());
    if let GameMode::Mission { progress, .. } = &mut state.mode {
        for _ in 0..report.enemies_destroyed {
            progress.record(MissionEvent::EnemyDestroyed);
        }
        for _ in 0..report.power_ups_collected {
            progress.record(MissionEvent::PowerUpCollected);
        }
    }
    if matches!(state.mode, GameMode::Arcade) {
        state.level = (1 + state.kills / KILLS_PER_LEVEL).min(MAX_LEVEL);
    }

    cull(state);
    check_limits(state)?;

    let mut mission_result = None;
    if state.player.lives == 0 {
        state.status = GameStatus::GameOver;
        events.push(SoundEvent::GameOver);
        log::info!("Game over: score {} at {:.0} ms", state.score, state.time_ms);
    } else {
        mission_result = complete_mission_if_done(state, &mut events);
    }

    state.normalize_order();
    flush(&events, sink);
    Ok(TickOutcome {
        status: state.status,
        events,
        mission_result,
    })
}

/// Tick a copy of `state`, leaving the original untouched on error
pub fn advance(
    state: &GameState,
    input: &TickInput,
    sink: &mut impl AudioSink,
) -> Result<GameState, TickError> {
    let mut next = state.clone();
    tick(&mut next, input, sink)?;
    Ok(next)
}

fn flush(events: &[SoundEvent], sink: &mut impl AudioSink) {
    for event in events {
        sink.play(*event);
    }
}

fn update_ambient(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let height = state.tuning.field_height;
    for star in &mut state.stars {
        star.pos.y += star.speed * dt;
        if star.pos.y > height {
            star.pos.y -= height;
        }
    }

    state.screen_shake *= 0.9_f32.powf(dt_ms / FRAME_MS);
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
}

/// Finish the mission once every required objective is met
fn complete_mission_if_done(
    state: &mut GameState,
    events: &mut Vec<SoundEvent>,
) -> Option<MissionResult> {
    let result = match &state.mode {
        GameMode::Mission {
            definition,
            progress,
        } if state.status == GameStatus::Playing && progress.is_complete() => {
            definition.result(progress, state.score)
        }
        _ => return None,
    };
    log::info!(
        "Mission '{}' complete: score {} in {:.1} s",
        result.mission_id,
        result.score,
        result.elapsed_ms / 1000.0
    );
    state.status = GameStatus::MissionComplete;
    state.mission_result = Some(result.clone());
    events.push(SoundEvent::MissionComplete);
    Some(result)
}

/// Reset corrupted entities so one bad value can't spread
fn sanitize_entities(state: &mut GameState) {
    let spawn = GameState::player_spawn(&state.tuning);
    if state.player.sanitize(spawn) {
        log::warn!("Player state corrupted; reset to spawn");
    }
    let center = Vec2::new(state.tuning.field_width / 2.0, 0.0);
    for enemy in &mut state.enemies {
        if enemy.sanitize(center) {
            log::warn!("Enemy {} state corrupted; reset", enemy.id);
        }
    }
    for shot in &mut state.projectiles {
        if shot.active && shot.sanitize() {
            log::warn!("Projectile {} state corrupted; retired", shot.id);
        }
    }
    for pickup in &mut state.pickups {
        if pickup.active && pickup.sanitize() {
            log::warn!("Pickup {} state corrupted; retired", pickup.id);
        }
    }
}

fn update_player(
    state: &mut GameState,
    input: &TickInput,
    dt_ms: f32,
    effects: &[EnvironmentEffect],
    events: &mut Vec<SoundEvent>,
) {
    let now = state.time_ms;
    let dt = dt_ms / 1000.0;
    let width = state.tuning.field_width;
    let height = state.tuning.field_height;
    let player = &mut state.player;

    // Movement
    let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
    let dir = Vec2::new(axis(input.left, input.right), axis(input.up, input.down)).normalize_or_zero();
    let speed = state.tuning.player_speed * environment::speed_factor(effects);
    player.vel = dir * speed;
    let drift = environment::gravity_at(effects, player.pos);
    player.pos += (player.vel + drift) * dt;
    player.pos.x = player.pos.x.clamp(player.size, (width - player.size).max(player.size));
    player.pos.y = player.pos.y.clamp(player.size, (height - player.size).max(player.size));

    player.power_ups.tick(dt_ms);
    player.update_invulnerability(now);

    if input.cycle_weapon {
        player.weapon.cycle_slot();
    }

    // Meters
    let mut signals = Vec::new();
    player.weapon.update_charge(input.charge, now, dt_ms, &mut signals);
    player.weapon.update_passive(
        input.shoot || input.charge,
        environment::regen_enabled(effects, now),
        now,
        dt_ms,
        &mut signals,
    );
    for signal in signals {
        match signal {
            WeaponSignal::TierReached(tier) => events.push(SoundEvent::ChargeTierReached { tier }),
            WeaponSignal::ChargeDepleted => events.push(SoundEvent::ChargeDepleted),
            WeaponSignal::OverheatCleared => log::debug!("Overheat cleared at {:.0} ms", now),
        }
    }

    if !input.shoot {
        return;
    }
    let modifiers = FireModifiers {
        rapid_fire: player.power_ups.rapid_fire > 0.0,
        multi_shot: player.power_ups.multi_shot > 0.0,
    };
    let origin = player.pos - Vec2::new(0.0, player.size);
    match player
        .weapon
        .fire(origin, now, modifiers, &mut state.ids, &mut state.rng)
    {
        Ok(outcome) => {
            if let Some(weapon) = outcome.projectiles.first().and_then(|p| p.weapon) {
                events.push(SoundEvent::ShotFired { weapon });
            }
            if outcome.overheat_triggered {
                events.push(SoundEvent::Overheated);
                log::debug!("Weapon overheated at {:.0} ms", now);
            }
            state.projectiles.extend(outcome.projectiles);
        }
        Err(blocked) => log::trace!("Fire blocked: {:?}", blocked),
    }
}

fn spawn(state: &mut GameState, events: &mut Vec<SoundEvent>) {
    let now = state.time_ms;
    let mut orders: Vec<SpawnOrder> = Vec::new();

    // Standard enemies trickle in on the level-scaled timer in every mode
    let interval = (state.tuning.enemy_spawn_base_ms / state.level.max(1) as f64)
        .max(state.tuning.enemy_spawn_min_ms);
    if now - state.last_enemy_spawn_ms >= interval {
        state.last_enemy_spawn_ms = now;
        orders.push(SpawnOrder {
            wave: 0,
            enemy: SpawnKind::Basic,
            boss_archetype: None,
        });
    }

    match &mut state.mode {
        GameMode::Mission {
            definition,
            progress,
        } => {
            progress.trigger_waves(&definition.waves);
            orders.extend(progress.drain_due());
        }
        GameMode::Arcade => {
            if now - state.last_boss_spawn_ms >= state.tuning.boss_interval_ms
                && !state.enemies.iter().any(|e| e.active && e.is_boss())
            {
                state.last_boss_spawn_ms = now;
                orders.push(SpawnOrder {
                    wave: 0,
                    enemy: SpawnKind::Boss,
                    boss_archetype: None,
                });
            }
        }
    }

    for order in orders {
        match order.enemy {
            SpawnKind::Basic => {
                let id = state.next_entity_id();
                let x = state
                    .rng
                    .range(ENEMY_SIZE, state.tuning.field_width - ENEMY_SIZE);
                state
                    .enemies
                    .push(Enemy::basic(id, Vec2::new(x, -ENEMY_SIZE), state.level));
            }
            SpawnKind::Boss => {
                let archetype = order
                    .boss_archetype
                    .unwrap_or_else(|| BossArchetype::random(&mut state.rng));
                let width = state.tuning.field_width;
                let anchor_x = state.rng.range(width * 0.25, width * 0.75);
                let id = state.next_entity_id();
                state.enemies.push(spawn_boss(id, archetype, anchor_x, now));
                events.push(SoundEvent::BossIntro { archetype });
                log::info!("Boss {:?} incoming (id {})", archetype, id);
            }
        }
    }
}

fn update_enemies(state: &mut GameState, dt_ms: f32, events: &mut Vec<SoundEvent>) {
    let dt = dt_ms / 1000.0;
    let mut shots = Vec::new();
    let mut signals = Vec::new();
    {
        let mut ctx = BossContext {
            now_ms: state.time_ms,
            dt_ms,
            player_pos: state.player.pos,
            tuning: &state.tuning,
            ids: &mut state.ids,
            rng: &mut state.rng,
            shots: &mut shots,
        };
        for enemy in state.enemies.iter_mut().filter(|e| e.active) {
            if enemy.is_boss() {
                signals.extend(update_boss(enemy, &mut ctx));
            } else {
                enemy.pos += enemy.vel * dt;
            }
        }
    }
    state.projectiles.extend(shots);

    for signal in signals {
        match signal {
            BossSignal::Activated => {}
            BossSignal::DefeatComplete { archetype, points } => {
                state.score += points;
                state.shake(1.0);
                events.push(SoundEvent::Explosion);
                log::info!("{:?} destroyed: +{} points", archetype, points);
                if let GameMode::Mission { progress, .. } = &mut state.mode {
                    progress.record(MissionEvent::BossDefeated);
                }
            }
        }
    }
}

fn update_projectiles(state: &mut GameState, dt_ms: f32, effects: &[EnvironmentEffect]) {
    let dt = dt_ms / 1000.0;
    let player_pos = state.player.pos;
    let width = state.tuning.field_width;
    for shot in state.projectiles.iter_mut().filter(|p| p.active) {
        shot.vel += environment::gravity_at(effects, shot.pos) * dt;
        update_flight(shot, &state.enemies, player_pos, width, dt_ms);
    }
}

/// Drop inactive entities and anything that left the field
fn cull(state: &mut GameState) {
    let (width, height) = (state.tuning.field_width, state.tuning.field_height);
    let inside = |pos: Vec2, margin: f32| {
        pos.x >= -margin && pos.x <= width + margin && pos.y >= -margin && pos.y <= height + margin
    };
    state
        .enemies
        .retain(|e| e.active && (e.is_boss() || inside(e.pos, e.size * 2.0)));
    state
        .projectiles
        .retain(|p| p.active && inside(p.pos, p.size + 16.0));
    state
        .pickups
        .retain(|p| p.active && inside(p.pos, p.size));
}

fn check_limits(state: &GameState) -> Result<(), TickError> {
    let limits = [
        ("projectile", state.projectiles.len(), state.tuning.max_projectiles),
        ("enemy", state.enemies.len(), state.tuning.max_enemies),
    ];
    for (kind, count, limit) in limits {
        if count > limit {
            log::warn!("Tick aborted: {} {} over limit {}", count, kind, limit);
            return Err(TickError::EntityLimit { kind, count, limit });
        }
    }
    Ok(())
}
