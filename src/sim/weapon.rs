//! Weapon stat tables and the charge/heat/energy state machine
//!
//! `WeaponSystem` owns everything the ship's guns need between shots. Fire
//! decisions are split in two: [`evaluate_fire`] is a pure check of one
//! weapon against the current meters, and [`WeaponSystem::fire`] applies the
//! result and spawns projectiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Owner, Projectile};
use super::state::{EntityIds, RngState};
use crate::consts::*;
use crate::heading;
use crate::progression::{ProgressionSnapshot, ShipUpgrades};

/// Player weapon families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    Pulse,
    LaserCannon,
    PlasmaBeam,
    HomingMissile,
    Chaingun,
    Shotgun,
    Railgun,
    IonCannon,
    QuantumRifle,
    FusionTorpedo,
}

impl WeaponType {
    pub const ALL: [WeaponType; 10] = [
        WeaponType::Pulse,
        WeaponType::LaserCannon,
        WeaponType::PlasmaBeam,
        WeaponType::HomingMissile,
        WeaponType::Chaingun,
        WeaponType::Shotgun,
        WeaponType::Railgun,
        WeaponType::IonCannon,
        WeaponType::QuantumRifle,
        WeaponType::FusionTorpedo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponType::Pulse => "Pulse Blaster",
            WeaponType::LaserCannon => "Laser Cannon",
            WeaponType::PlasmaBeam => "Plasma Beam",
            WeaponType::HomingMissile => "Homing Missile",
            WeaponType::Chaingun => "Chaingun",
            WeaponType::Shotgun => "Scatter Gun",
            WeaponType::Railgun => "Railgun",
            WeaponType::IonCannon => "Ion Cannon",
            WeaponType::QuantumRifle => "Quantum Rifle",
            WeaponType::FusionTorpedo => "Fusion Torpedo",
        }
    }

    /// Base stats at level 1
    pub fn base_stats(&self) -> BaseStats {
        use SpecialTag::*;
        let (damage, speed, cooldown_ms, energy_cost, heat_per_shot, size, special) = match self {
            WeaponType::Pulse => (10.0, 520.0, 220.0, 2.0, 5.0, 4.0, None),
            WeaponType::LaserCannon => (15.0, 720.0, 300.0, 5.0, 8.0, 3.0, Some(Piercing)),
            WeaponType::PlasmaBeam => (25.0, 400.0, 500.0, 8.0, 12.0, 8.0, Some(Explosive)),
            WeaponType::HomingMissile => (20.0, 320.0, 600.0, 10.0, 10.0, 6.0, Some(Tracking)),
            WeaponType::Chaingun => (6.0, 650.0, 90.0, 1.0, 3.0, 3.0, Some(Ricochet)),
            WeaponType::Shotgun => (8.0, 460.0, 700.0, 8.0, 15.0, 4.0, Some(Spreading)),
            WeaponType::Railgun => (40.0, 900.0, 1200.0, 15.0, 20.0, 5.0, Some(Charging)),
            WeaponType::IonCannon => (18.0, 500.0, 400.0, 7.0, 9.0, 6.0, Some(Disruptive)),
            WeaponType::QuantumRifle => (22.0, 560.0, 450.0, 9.0, 11.0, 5.0, Some(Quantum)),
            WeaponType::FusionTorpedo => (30.0, 260.0, 900.0, 12.0, 16.0, 7.0, Some(Fusion)),
        };
        BaseStats {
            damage,
            speed,
            cooldown_ms,
            energy_cost,
            heat_per_shot,
            size,
            special,
        }
    }
}

/// Special behavior carried by a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialTag {
    Piercing,
    Explosive,
    Tracking,
    Ricochet,
    Spreading,
    Charging,
    Disruptive,
    Quantum,
    Fusion,
}

/// Level-1 stat line for a weapon type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    pub damage: f32,
    pub speed: f32,
    pub cooldown_ms: f32,
    pub energy_cost: f32,
    pub heat_per_shot: f32,
    pub size: f32,
    pub special: Option<SpecialTag>,
}

/// Plasma splash radius
pub const EXPLOSION_RADIUS: f32 = 60.0;
/// Chaingun wall bounces
pub const RICOCHET_MAX_BOUNCES: u8 = 2;
/// Shotgun pellets and total fan angle (radians)
pub const SPREAD_PELLETS: usize = 5;
pub const SPREAD_ANGLE: f32 = 40.0 * std::f32::consts::PI / 180.0;
/// Side-shot angle for the multi-shot power-up
pub const MULTI_SHOT_ANGLE: f32 = 12.0 * std::f32::consts::PI / 180.0;

/// An instantiated weapon in a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponType,
    pub level: u8,
    pub damage: f32,
    pub speed: f32,
    pub cooldown_ms: f32,
    pub energy_cost: f32,
    pub heat_per_shot: f32,
    pub size: f32,
    pub special: Option<SpecialTag>,
}

/// Build a weapon at the given level (clamped to 1..=5)
pub fn instantiate_weapon(kind: WeaponType, level: u8) -> Weapon {
    let level = level.clamp(1, MAX_WEAPON_LEVEL);
    let steps = (level - 1) as f32;
    let base = kind.base_stats();
    Weapon {
        kind,
        level,
        damage: base.damage * (1.0 + 0.3 * steps),
        speed: base.speed * (1.0 + 0.05 * steps),
        cooldown_ms: (base.cooldown_ms * (1.0 - 0.08 * steps)).max(MIN_COOLDOWN_MS),
        energy_cost: base.energy_cost * (1.0 - 0.05 * steps),
        heat_per_shot: base.heat_per_shot,
        size: base.size,
        special: base.special,
    }
}

// === Charge tiers ===

/// Charge thresholds for tiers 1-4
pub const CHARGE_TIER_THRESHOLDS: [f32; 4] = [25.0, 50.0, 75.0, 100.0];
const TIER_DAMAGE_MULTIPLIERS: [f32; 5] = [1.0, 1.3, 1.7, 2.2, 3.0];
const TIER_HEAT_MULTIPLIERS: [f32; 5] = [1.0, 1.2, 1.4, 1.6, 2.0];

/// Tier (0-4) for a charge level
pub fn charge_tier(charge: f32) -> u8 {
    CHARGE_TIER_THRESHOLDS
        .iter()
        .take_while(|&&t| charge >= t)
        .count() as u8
}

pub fn tier_damage_multiplier(charge: f32) -> f32 {
    TIER_DAMAGE_MULTIPLIERS[charge_tier(charge) as usize]
}

pub fn tier_heat_multiplier(charge: f32) -> f32 {
    TIER_HEAT_MULTIPLIERS[charge_tier(charge) as usize]
}

/// Charge state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChargeState {
    #[default]
    Idle,
    Charging,
    /// Released: holding for the grace delay, then draining
    Decaying,
}

/// Something that happened to the meters this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponSignal {
    TierReached(u8),
    ChargeDepleted,
    OverheatCleared,
}

// === Fire contract ===

/// Why a fire request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireBlocked {
    NoWeapon,
    Overheated,
    InsufficientEnergy,
    CoolingDown,
}

/// Meter readings a fire decision is made against
#[derive(Debug, Clone, Copy)]
pub struct FireContext {
    pub energy: f32,
    pub heat: f32,
    pub max_heat: f32,
    pub charge_level: f32,
    /// Ms since this weapon system last fired (None = never)
    pub cooldown_elapsed_ms: Option<f64>,
    pub overheated: bool,
    pub rapid_fire: bool,
}

/// Result of a successful [`evaluate_fire`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePlan {
    pub energy_consumed: f32,
    pub heat_added: f32,
    pub overheat_triggered: bool,
    pub damage: f32,
    pub size: f32,
}

/// What a successful fire produced
#[derive(Debug, Clone)]
pub struct FireOutcome {
    pub projectiles: Vec<Projectile>,
    pub energy_consumed: f32,
    pub heat_added: f32,
    pub overheat_triggered: bool,
}

/// Power-ups that change how a shot goes out
#[derive(Debug, Clone, Copy, Default)]
pub struct FireModifiers {
    pub rapid_fire: bool,
    pub multi_shot: bool,
}

/// Effective cooldown with the rapid-fire power-up applied
pub fn effective_cooldown(weapon: &Weapon, rapid_fire: bool) -> f32 {
    if rapid_fire {
        (weapon.cooldown_ms * 0.5).max(MIN_COOLDOWN_MS)
    } else {
        weapon.cooldown_ms
    }
}

/// Decide whether `weapon` can fire right now, without touching any state
pub fn evaluate_fire(weapon: &Weapon, ctx: &FireContext) -> Result<FirePlan, FireBlocked> {
    if ctx.overheated {
        return Err(FireBlocked::Overheated);
    }
    if ctx.energy < weapon.energy_cost {
        return Err(FireBlocked::InsufficientEnergy);
    }
    if let Some(elapsed) = ctx.cooldown_elapsed_ms {
        if elapsed < effective_cooldown(weapon, ctx.rapid_fire) as f64 {
            return Err(FireBlocked::CoolingDown);
        }
    }

    let charge = ctx.charge_level;
    let heat_added = weapon.heat_per_shot * tier_heat_multiplier(charge);
    let damage = if weapon.special == Some(SpecialTag::Charging) {
        weapon.damage * (1.0 + 2.0 * charge / MAX_CHARGE)
    } else {
        weapon.damage * tier_damage_multiplier(charge)
    };

    Ok(FirePlan {
        energy_consumed: weapon.energy_cost,
        heat_added,
        overheat_triggered: ctx.heat + heat_added >= ctx.max_heat,
        damage,
        size: weapon.size * (1.0 + charge / 200.0),
    })
}

/// The ship's guns: slots plus the heat, charge and energy meters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSystem {
    pub heat: f32,
    pub max_heat: f32,
    /// Heat shed per second while idle
    pub cooling_rate: f32,
    pub charge_level: f32,
    pub max_charge: f32,
    /// Charge gained per second while held
    pub charging_rate: f32,
    pub charge_state: ChargeState,
    pub charge_started_ms: Option<f64>,
    pub charge_released_ms: Option<f64>,
    /// Charge lost per second once the grace delay has passed
    pub charge_decay_rate: f32,
    pub charge_decay_delay_ms: f64,
    pub overheated: bool,
    pub overheat_cooldown_ms: f64,
    pub overheat_until_ms: f64,
    pub energy: f32,
    pub max_energy: f32,
    pub energy_regen_rate: f32,
    pub slots: Vec<Weapon>,
    active_slot: usize,
    pub last_fire_ms: Option<f64>,
    /// Highest tier already signalled for the current charge
    last_tier: u8,
}

impl Default for WeaponSystem {
    fn default() -> Self {
        Self {
            heat: 0.0,
            max_heat: MAX_HEAT,
            cooling_rate: COOLING_RATE,
            charge_level: 0.0,
            max_charge: MAX_CHARGE,
            charging_rate: CHARGING_RATE,
            charge_state: ChargeState::Idle,
            charge_started_ms: None,
            charge_released_ms: None,
            charge_decay_rate: CHARGE_DECAY_RATE,
            charge_decay_delay_ms: CHARGE_DECAY_DELAY_MS,
            overheated: false,
            overheat_cooldown_ms: OVERHEAT_COOLDOWN_MS,
            overheat_until_ms: 0.0,
            energy: MAX_ENERGY,
            max_energy: MAX_ENERGY,
            energy_regen_rate: ENERGY_REGEN_RATE,
            slots: vec![instantiate_weapon(WeaponType::Pulse, 1)],
            active_slot: 0,
            last_fire_ms: None,
            last_tier: 0,
        }
    }
}

impl WeaponSystem {
    /// Parametrize from the progression snapshot taken at session start
    pub fn from_progression(snapshot: &ProgressionSnapshot) -> Self {
        let mut system = Self::default();

        let slots: Vec<Weapon> = WeaponType::ALL
            .iter()
            .filter(|kind| snapshot.unlocked_weapons.contains(kind))
            .map(|&kind| instantiate_weapon(kind, snapshot.weapon_level(kind)))
            .collect();
        if !slots.is_empty() {
            system.slots = slots;
        }

        system.apply_upgrades(&snapshot.ship_upgrades);
        system
    }

    fn apply_upgrades(&mut self, upgrades: &ShipUpgrades) {
        self.cooling_rate = COOLING_RATE * (1.0 + 0.1 * upgrades.cooling as f32);
        self.energy_regen_rate = ENERGY_REGEN_RATE * (1.0 + 0.1 * upgrades.energy_regen as f32);
        self.charging_rate = CHARGING_RATE * (1.0 + 0.1 * upgrades.charge_speed as f32);
        self.charge_decay_rate =
            CHARGE_DECAY_RATE * 0.85_f32.powi(upgrades.charge_preservation as i32);
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn active_weapon(&self) -> Option<&Weapon> {
        self.slots.get(self.active_slot)
    }

    /// Select a slot; out-of-range indices are ignored
    pub fn select_slot(&mut self, index: usize) {
        if index < self.slots.len() {
            self.active_slot = index;
        }
    }

    pub fn cycle_slot(&mut self) {
        if !self.slots.is_empty() {
            self.active_slot = (self.active_slot + 1) % self.slots.len();
        }
    }

    /// Level up an owned weapon, or add it as a new slot
    pub fn upgrade(&mut self, kind: WeaponType) {
        if let Some(slot) = self.slots.iter_mut().find(|w| w.kind == kind) {
            *slot = instantiate_weapon(kind, slot.level.saturating_add(1));
        } else {
            self.slots.push(instantiate_weapon(kind, 1));
        }
    }

    pub fn heat_percent(&self) -> f32 {
        self.heat / self.max_heat * 100.0
    }

    pub fn charge_percent(&self) -> f32 {
        self.charge_level / self.max_charge * 100.0
    }

    pub fn energy_percent(&self) -> f32 {
        self.energy / self.max_energy * 100.0
    }

    /// Advance the charge state machine for one tick
    pub fn update_charge(
        &mut self,
        charge_held: bool,
        now_ms: f64,
        dt_ms: f32,
        signals: &mut Vec<WeaponSignal>,
    ) {
        let dt = dt_ms / 1000.0;

        if charge_held && !self.overheated {
            if self.charge_state != ChargeState::Charging {
                self.charge_state = ChargeState::Charging;
                self.charge_started_ms = Some(now_ms);
                self.charge_released_ms = None;
            }
            self.charge_level = (self.charge_level + self.charging_rate * dt).min(self.max_charge);

            let tier = charge_tier(self.charge_level);
            while self.last_tier < tier {
                self.last_tier += 1;
                signals.push(WeaponSignal::TierReached(self.last_tier));
            }
            return;
        }

        match self.charge_state {
            ChargeState::Charging => {
                self.charge_state = ChargeState::Decaying;
                self.charge_released_ms = Some(now_ms);
            }
            ChargeState::Decaying => {
                let released = self.charge_released_ms.unwrap_or(now_ms);
                let decay_start = released + self.charge_decay_delay_ms;
                if now_ms > decay_start {
                    // Only the part of this tick past the grace delay drains
                    let draining_ms = (now_ms - decay_start).min(dt_ms as f64) as f32;
                    self.charge_level =
                        (self.charge_level - self.charge_decay_rate * draining_ms / 1000.0).max(0.0);
                    self.last_tier = self.last_tier.min(charge_tier(self.charge_level));
                    if self.charge_level <= 0.0 {
                        self.reset_charge();
                        signals.push(WeaponSignal::ChargeDepleted);
                    }
                }
            }
            ChargeState::Idle => {}
        }
    }

    /// Passive cooling, energy regen and overheat recovery
    pub fn update_passive(
        &mut self,
        firing: bool,
        regen_enabled: bool,
        now_ms: f64,
        dt_ms: f32,
        signals: &mut Vec<WeaponSignal>,
    ) {
        let dt = dt_ms / 1000.0;

        if self.overheated && now_ms >= self.overheat_until_ms {
            self.overheated = false;
            self.heat = 0.0;
            signals.push(WeaponSignal::OverheatCleared);
        }

        if !firing && self.charge_state != ChargeState::Charging && !self.overheated {
            self.heat = (self.heat - self.cooling_rate * dt).max(0.0);
        }

        if regen_enabled {
            self.energy = (self.energy + self.energy_regen_rate * dt).min(self.max_energy);
        }
    }

    /// Drop all stored charge and return to idle
    pub fn reset_charge(&mut self) {
        self.charge_level = 0.0;
        self.charge_started_ms = None;
        self.charge_released_ms = None;
        self.charge_state = ChargeState::Idle;
        self.last_tier = 0;
    }

    fn fire_context(&self, now_ms: f64, rapid_fire: bool) -> FireContext {
        FireContext {
            energy: self.energy,
            heat: self.heat,
            max_heat: self.max_heat,
            charge_level: self.charge_level,
            cooldown_elapsed_ms: self.last_fire_ms.map(|t| now_ms - t),
            overheated: self.overheated,
            rapid_fire,
        }
    }

    /// Fire the active weapon from `origin`
    ///
    /// A blocked shot changes nothing. A successful one spends energy, adds
    /// heat (locking the weapon at max heat) and consumes stored charge.
    pub fn fire(
        &mut self,
        origin: Vec2,
        now_ms: f64,
        modifiers: FireModifiers,
        ids: &mut EntityIds,
        rng: &mut RngState,
    ) -> Result<FireOutcome, FireBlocked> {
        let weapon = self.active_weapon().ok_or(FireBlocked::NoWeapon)?.clone();
        let plan = evaluate_fire(&weapon, &self.fire_context(now_ms, modifiers.rapid_fire))?;

        let charge = self.charge_level;
        let projectiles = spawn_player_shots(&weapon, &plan, charge, origin, modifiers, ids, rng);

        self.energy = (self.energy - plan.energy_consumed).max(0.0);
        self.heat += plan.heat_added;
        if plan.overheat_triggered {
            self.overheated = true;
            self.overheat_until_ms = now_ms + self.overheat_cooldown_ms;
            self.heat = self.max_heat;
        }
        self.last_fire_ms = Some(now_ms);
        self.reset_charge();

        Ok(FireOutcome {
            projectiles,
            energy_consumed: plan.energy_consumed,
            heat_added: plan.heat_added,
            overheat_triggered: plan.overheat_triggered,
        })
    }
}

/// Build the projectiles for one trigger pull
fn spawn_player_shots(
    weapon: &Weapon,
    plan: &FirePlan,
    charge: f32,
    origin: Vec2,
    modifiers: FireModifiers,
    ids: &mut EntityIds,
    rng: &mut RngState,
) -> Vec<Projectile> {
    let angles: Vec<f32> = if weapon.special == Some(SpecialTag::Spreading) {
        let step = SPREAD_ANGLE / (SPREAD_PELLETS - 1) as f32;
        (0..SPREAD_PELLETS)
            .map(|i| -SPREAD_ANGLE / 2.0 + step * i as f32)
            .collect()
    } else if modifiers.multi_shot {
        vec![-MULTI_SHOT_ANGLE, 0.0, MULTI_SHOT_ANGLE]
    } else {
        vec![0.0]
    };

    angles
        .into_iter()
        .map(|angle| {
            let mut shot = Projectile::new(
                ids.next_id(),
                Owner::Player,
                origin,
                heading(angle) * weapon.speed,
                plan.size,
                plan.damage,
            );
            shot.weapon = Some(weapon.kind);
            shot.special = weapon.special;
            shot.charge_level = charge;
            if weapon.special == Some(SpecialTag::Ricochet) {
                shot.max_bounces = RICOCHET_MAX_BOUNCES;
            }
            if weapon.special == Some(SpecialTag::Quantum) {
                shot.quantum_phase = rng.next_f32() * std::f32::consts::TAU;
            }
            shot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fire_once(system: &mut WeaponSystem, now: f64) -> Result<FireOutcome, FireBlocked> {
        let mut ids = EntityIds::default();
        let mut rng = RngState::new(7);
        system.fire(
            Vec2::new(400.0, 550.0),
            now,
            FireModifiers::default(),
            &mut ids,
            &mut rng,
        )
    }

    #[test]
    fn test_instantiate_scales_with_level() {
        let l1 = instantiate_weapon(WeaponType::LaserCannon, 1);
        let l3 = instantiate_weapon(WeaponType::LaserCannon, 3);
        assert!((l3.damage - 15.0 * 1.6).abs() < 0.001);
        assert!(l3.cooldown_ms < l1.cooldown_ms);

        // Level capped at 5, floored at 1
        let l9 = instantiate_weapon(WeaponType::LaserCannon, 9);
        assert_eq!(l9.level, 5);
        assert!((l9.damage - 15.0 * 2.2).abs() < 0.001);
        assert_eq!(instantiate_weapon(WeaponType::Pulse, 0).level, 1);

        // Cooldown never drops below the floor
        let chain = instantiate_weapon(WeaponType::Chaingun, 5);
        assert!(chain.cooldown_ms >= MIN_COOLDOWN_MS);
    }

    #[test]
    fn test_charge_tiers() {
        assert_eq!(charge_tier(0.0), 0);
        assert_eq!(charge_tier(24.9), 0);
        assert_eq!(charge_tier(25.0), 1);
        assert_eq!(charge_tier(74.0), 2);
        assert_eq!(charge_tier(100.0), 4);
        assert_eq!(tier_damage_multiplier(60.0), 1.7);
        assert_eq!(tier_heat_multiplier(100.0), 2.0);
    }

    #[test]
    fn test_fire_blocked_without_state_change() {
        let mut system = WeaponSystem::default();
        system.energy = 1.0; // Pulse costs 2
        let before = system.clone();
        assert_eq!(fire_once(&mut system, 0.0).unwrap_err(), FireBlocked::InsufficientEnergy);
        assert_eq!(system.energy, before.energy);
        assert_eq!(system.heat, before.heat);
        assert_eq!(system.last_fire_ms, None);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut system = WeaponSystem::default();
        assert!(fire_once(&mut system, 1000.0).is_ok());
        assert_eq!(fire_once(&mut system, 1100.0).unwrap_err(), FireBlocked::CoolingDown);
        assert!(fire_once(&mut system, 1220.0).is_ok());
    }

    #[test]
    fn test_rapid_fire_halves_cooldown_with_floor() {
        let pulse = instantiate_weapon(WeaponType::Pulse, 1);
        assert_eq!(effective_cooldown(&pulse, true), 110.0);
        let chain = instantiate_weapon(WeaponType::Chaingun, 5);
        assert_eq!(effective_cooldown(&chain, true), MIN_COOLDOWN_MS);
    }

    #[test]
    fn test_fire_consumes_charge_and_scales_damage() {
        let mut system = WeaponSystem::default();
        let mut signals = Vec::new();
        // Hold charge for ~1.03 s at 50/s -> just past the tier-2 threshold
        for i in 0..62 {
            system.update_charge(true, i as f64 * 16.0, 1000.0 / 60.0, &mut signals);
        }
        assert!(system.charge_level > 50.0 && system.charge_level < 52.0);
        assert_eq!(signals, vec![WeaponSignal::TierReached(1), WeaponSignal::TierReached(2)]);

        let outcome = fire_once(&mut system, 2000.0).unwrap();
        assert!((outcome.projectiles[0].damage - 10.0 * 1.7).abs() < 0.01);
        assert!((outcome.heat_added - 5.0 * 1.4).abs() < 0.01);
        assert_eq!(system.charge_level, 0.0);
        assert_eq!(system.charge_state, ChargeState::Idle);
        assert_eq!(system.charge_started_ms, None);
        assert_eq!(system.charge_released_ms, None);
    }

    #[test]
    fn test_overheat_lock_and_recovery() {
        let mut system = WeaponSystem::default();
        system.energy_regen_rate = 1000.0;
        let mut now = 0.0;
        let mut signals = Vec::new();
        // Pulse adds 5 heat per shot: 20 shots to lock
        while !system.overheated {
            system.update_passive(true, true, now, 16.0, &mut signals);
            let _ = fire_once(&mut system, now);
            now += 250.0;
        }
        assert_eq!(system.heat, system.max_heat);
        let locked_at = system.last_fire_ms.unwrap();

        // Every fire is blocked until the cooldown has elapsed
        let mut t = locked_at + 250.0;
        while t < locked_at + OVERHEAT_COOLDOWN_MS {
            system.update_passive(false, true, t, 16.0, &mut signals);
            assert_eq!(fire_once(&mut system, t).unwrap_err(), FireBlocked::Overheated);
            t += 250.0;
        }

        system.update_passive(false, true, locked_at + OVERHEAT_COOLDOWN_MS, 16.0, &mut signals);
        assert!(!system.overheated);
        assert_eq!(system.heat, 0.0);
        assert!(signals.contains(&WeaponSignal::OverheatCleared));
        assert!(fire_once(&mut system, locked_at + OVERHEAT_COOLDOWN_MS).is_ok());
    }

    #[test]
    fn test_charge_decay_waits_for_delay() {
        let mut system = WeaponSystem::default();
        let mut signals = Vec::new();
        let dt = 10.0_f32;
        let mut now = 0.0_f64;
        while system.charge_level < 60.0 {
            now += dt as f64;
            system.update_charge(true, now, dt, &mut signals);
        }
        let held = system.charge_level;

        // Release
        now += dt as f64;
        system.update_charge(false, now, dt, &mut signals);
        let released = now;
        assert_eq!(system.charge_state, ChargeState::Decaying);

        while now + (dt as f64) <= released + CHARGE_DECAY_DELAY_MS {
            now += dt as f64;
            system.update_charge(false, now, dt, &mut signals);
            assert_eq!(system.charge_level, held);
        }

        // Decreases monotonically at the decay rate until empty
        let mut last = system.charge_level;
        let mut steps = 0;
        while system.charge_state != ChargeState::Idle {
            now += dt as f64;
            system.update_charge(false, now, dt, &mut signals);
            assert!(system.charge_level <= last);
            if system.charge_level > 0.0 && last < held {
                assert!((last - system.charge_level - CHARGE_DECAY_RATE * dt / 1000.0).abs() < 0.001);
            }
            last = system.charge_level;
            steps += 1;
            assert!(steps < 10_000);
        }
        assert_eq!(system.charge_level, 0.0);
        assert_eq!(signals.last(), Some(&WeaponSignal::ChargeDepleted));
    }

    #[test]
    fn test_preservation_slows_decay() {
        let mut snapshot = ProgressionSnapshot::default();
        snapshot.ship_upgrades.charge_preservation = 2;
        let system = WeaponSystem::from_progression(&snapshot);
        assert!((system.charge_decay_rate - CHARGE_DECAY_RATE * 0.85 * 0.85).abs() < 0.0001);
    }

    #[test]
    fn test_slot_selection_stays_in_bounds() {
        let mut system = WeaponSystem::default();
        system.upgrade(WeaponType::Railgun);
        assert_eq!(system.slots.len(), 2);
        system.select_slot(5);
        assert_eq!(system.active_slot(), 0);
        system.cycle_slot();
        assert_eq!(system.active_weapon().unwrap().kind, WeaponType::Railgun);
        system.cycle_slot();
        assert_eq!(system.active_slot(), 0);

        system.upgrade(WeaponType::Railgun);
        assert_eq!(system.slots[1].level, 2);
    }

    #[test]
    fn test_shotgun_fans_out() {
        let mut system = WeaponSystem::default();
        system.slots = vec![instantiate_weapon(WeaponType::Shotgun, 1)];
        let outcome = fire_once(&mut system, 0.0).unwrap();
        assert_eq!(outcome.projectiles.len(), SPREAD_PELLETS);
        let first = outcome.projectiles.first().unwrap().vel;
        let last = outcome.projectiles.last().unwrap().vel;
        assert!(first.x < 0.0 && last.x > 0.0);
        assert!((first.angle_to(last).abs() - SPREAD_ANGLE).abs() < 0.001);
    }

    proptest! {
        #[test]
        fn prop_charge_non_decreasing_while_held(dts in proptest::collection::vec(1.0f32..40.0, 1..200)) {
            let mut system = WeaponSystem::default();
            let mut signals = Vec::new();
            let mut now = 0.0;
            let mut last = system.charge_level;
            for dt in dts {
                now += dt as f64;
                system.update_charge(true, now, dt, &mut signals);
                prop_assert!(system.charge_level >= last);
                prop_assert!(system.charge_level <= system.max_charge);
                last = system.charge_level;
            }
        }

        #[test]
        fn prop_meters_stay_clamped(
            steps in proptest::collection::vec((any::<bool>(), any::<bool>(), 1.0f32..40.0), 1..300)
        ) {
            let mut system = WeaponSystem::default();
            let mut signals = Vec::new();
            let mut now = 0.0;
            for (shoot, charge, dt) in steps {
                now += dt as f64;
                system.update_charge(charge, now, dt, &mut signals);
                system.update_passive(shoot, true, now, dt, &mut signals);
                if shoot {
                    let _ = fire_once(&mut system, now);
                }
                prop_assert!((0.0..=system.max_heat).contains(&system.heat));
                prop_assert!((0.0..=system.max_charge).contains(&system.charge_level));
                prop_assert!((0.0..=system.max_energy).contains(&system.energy));
            }
        }
    }
}
