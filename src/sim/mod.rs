//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable delta, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod entity;
pub mod environment;
pub mod mission;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use boss::{BossArchetype, BossLifecycle, BossState, MovementPattern, ShootPattern, SpecialAbility};
pub use collision::{CollisionReport, hit_threshold, overlaps, resolve_collisions};
pub use entity::{Enemy, EnemyKind, Owner, Pickup, PickupKind, Player, PowerUps, Projectile};
pub use environment::EnvironmentEffect;
pub use mission::{
    Difficulty, MissionDefinition, MissionEvent, MissionProgress, Objective, ObjectiveKind,
    catalog, find_mission, mission_score,
};
pub use projectile::{HitResolution, resolve_hit, update_flight};
pub use state::{GameMode, GameState, GameStatus, RngState};
pub use tick::{TickInput, TickOutcome, advance, tick};
pub use weapon::{
    ChargeState, FireBlocked, FireOutcome, SpecialTag, Weapon, WeaponSystem, WeaponType,
    instantiate_weapon,
};
