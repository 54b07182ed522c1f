//! Game state and core simulation types
//!
//! Everything a frontend reads after a tick, and everything needed to
//! reproduce a session from its seed, lives in [`GameState`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Enemy, Pickup, Player, Projectile};
use super::environment::EnvironmentEffect;
use super::mission::{MissionDefinition, MissionProgress};
use crate::progression::{MissionResult, ProgressionSnapshot};
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Active gameplay
    Playing,
    /// Gameplay frozen; ambient layers keep moving
    Paused,
    /// Player ran out of lives
    GameOver,
    /// All required objectives met
    MissionComplete,
}

/// RNG state wrapper for serialization
///
/// Stores the seed and how many values have been drawn, so the stream can be
/// rebuilt exactly after a save/load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        rng.advance(self.draws);
        rng
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        let value = self.to_rng().random::<f32>();
        self.draws += 1;
        value
    }

    /// Uniform in [lo, hi)
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    /// Uniform index in 0..len (len must be > 0)
    pub fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// True with the given probability
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

/// Monotonic entity id source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Background star (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// Scroll speed in px/s; doubles as parallax depth
    pub speed: f32,
    pub brightness: f32,
}

/// Number of background stars
pub const STAR_COUNT: usize = 96;

/// Session flavour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameMode {
    /// Endless: timed boss spawns, level from kills
    Arcade,
    /// Scripted waves and objectives
    Mission {
        definition: MissionDefinition,
        progress: MissionProgress,
    },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG
    pub rng: RngState,
    pub tuning: Tuning,
    pub status: GameStatus,
    pub mode: GameMode,
    /// Session clock in ms; the "now" every gameplay timer compares against
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Session score
    pub score: u64,
    /// Difficulty level driving basic spawn rate and stats
    pub level: u32,
    pub kills: u32,
    pub player: Player,
    /// Enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    /// Pickups (sorted by id for determinism)
    pub pickups: Vec<Pickup>,
    pub last_enemy_spawn_ms: f64,
    pub last_boss_spawn_ms: f64,
    /// Set once when a mission completes
    pub mission_result: Option<MissionResult>,
    /// Visual layers (not gameplay-affecting)
    pub stars: Vec<Star>,
    pub screen_shake: f32,
    pub ids: EntityIds,
}

impl GameState {
    /// Endless arcade session
    pub fn new_arcade(seed: u64, progression: &ProgressionSnapshot, tuning: Tuning) -> Self {
        Self::with_mode(seed, progression, tuning, GameMode::Arcade)
    }

    /// Mission session; the definition is cloned and never mutated
    pub fn new_mission(
        seed: u64,
        progression: &ProgressionSnapshot,
        tuning: Tuning,
        definition: &MissionDefinition,
    ) -> Self {
        let progress = MissionProgress::new(definition);
        let mut state = Self::with_mode(
            seed,
            progression,
            tuning,
            GameMode::Mission {
                definition: definition.clone(),
                progress,
            },
        );
        state.level = definition.difficulty.level();
        log::info!("Mission '{}' started (seed {})", definition.id, seed);
        state
    }

    fn with_mode(seed: u64, progression: &ProgressionSnapshot, tuning: Tuning, mode: GameMode) -> Self {
        let spawn = Self::player_spawn(&tuning);
        let stars = generate_stars(seed, &tuning);
        Self {
            seed,
            rng: RngState::new(seed),
            status: GameStatus::Playing,
            mode,
            time_ms: 0.0,
            time_ticks: 0,
            score: 0,
            level: 1,
            kills: 0,
            player: Player::new(spawn, progression),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            last_enemy_spawn_ms: 0.0,
            last_boss_spawn_ms: 0.0,
            mission_result: None,
            stars,
            screen_shake: 0.0,
            ids: EntityIds::default(),
            tuning,
        }
    }

    /// Where the player starts and is reset to if its state is corrupted
    pub fn player_spawn(tuning: &Tuning) -> Vec2 {
        Vec2::new(tuning.field_width / 2.0, tuning.field_height - 50.0)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    pub fn boss_alive(&self) -> bool {
        self.enemies.iter().any(|e| e.active && e.is_boss())
    }

    pub fn mission(&self) -> Option<(&MissionDefinition, &MissionProgress)> {
        match &self.mode {
            GameMode::Mission {
                definition,
                progress,
            } => Some((definition, progress)),
            GameMode::Arcade => None,
        }
    }

    /// Active environment effects (none in arcade)
    pub fn environment(&self) -> &[EnvironmentEffect] {
        match &self.mode {
            GameMode::Mission { definition, .. } => &definition.environment,
            GameMode::Arcade => &[],
        }
    }

    /// Add screen shake, saturating at 1
    pub fn shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
    }

    /// True if a point is within the play field expanded by `margin`
    pub fn in_field(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= -margin
            && pos.x <= self.tuning.field_width + margin
            && pos.y >= -margin
            && pos.y <= self.tuning.field_height + margin
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

/// Starfield from a hash of the seed, so it never touches the gameplay RNG
fn generate_stars(seed: u64, tuning: &Tuning) -> Vec<Star> {
    (0..STAR_COUNT as u32)
        .map(|i| {
            let hash = (seed as u32)
                .wrapping_add(i.wrapping_mul(2654435761))
                .wrapping_mul(7919);
            let rx = (hash % 1000) as f32 / 1000.0;
            let ry = ((hash >> 10) % 1000) as f32 / 1000.0;
            let rz = ((hash >> 20) % 1000) as f32 / 1000.0;
            Star {
                pos: Vec2::new(rx * tuning.field_width, ry * tuning.field_height),
                speed: 20.0 + rz * 80.0,
                brightness: 0.3 + rz * 0.7,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_reproducible() {
        let mut a = RngState::new(42);
        let mut b = RngState::new(42);
        let xs: Vec<f32> = (0..10).map(|_| a.next_f32()).collect();
        let ys: Vec<f32> = (0..10).map(|_| b.next_f32()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));

        // Resuming from a serialized state continues the same stream
        let mut c = RngState::new(42);
        c.next_f32();
        let json = serde_json::to_string(&c).unwrap();
        let mut d: RngState = serde_json::from_str(&json).unwrap();
        assert_eq!(d.next_f32(), xs[1]);
    }

    #[test]
    fn test_rng_index_in_bounds() {
        let mut rng = RngState::new(3);
        for _ in 0..500 {
            assert!(rng.index(8) < 8);
        }
    }

    #[test]
    fn test_new_arcade_state() {
        let state = GameState::new_arcade(1, &ProgressionSnapshot::default(), Tuning::default());
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.stars.len(), STAR_COUNT);
        assert!(state.mission().is_none());
        assert!(state.in_field(state.player.pos, 0.0));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new_arcade(1, &ProgressionSnapshot::default(), Tuning::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }
}
