//! Missions: definitions, objective tracking, wave schedule, scoring
//!
//! A [`MissionDefinition`] is read-only data. Everything that changes during a
//! session lives in [`MissionProgress`], and objective counters only move
//! through [`MissionProgress::record`].

use serde::{Deserialize, Serialize};

use super::boss::BossArchetype;
use super::environment::EnvironmentEffect;
use super::weapon::WeaponType;
use crate::error::ConfigError;
use crate::progression::MissionResult;

/// Points per completed objective
pub const OBJECTIVE_POINTS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    DestroyEnemies,
    /// Target is in ms
    SurviveTime,
    CollectPowerUps,
    DefeatBoss,
    /// Reserved; nothing updates it yet
    ProtectTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub target: u64,
    #[serde(default)]
    pub current: u64,
    /// Optional objectives only add score
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_required() -> bool {
    true
}

impl Objective {
    pub fn new(kind: ObjectiveKind, target: u64, required: bool, description: &str) -> Self {
        Self {
            kind,
            target,
            current: 0,
            required,
            description: description.to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.target
    }

    /// 0-1 progress for HUD bars
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            1.0
        } else {
            (self.current as f32 / self.target as f32).min(1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.25,
            Difficulty::Hard => 1.5,
            Difficulty::Extreme => 2.0,
        }
    }

    /// Starting enemy level for the session
    pub fn level(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 3,
            Difficulty::Hard => 5,
            Difficulty::Extreme => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Basic,
    Boss,
}

/// One entry in a mission's wave schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Mission time at which the wave triggers
    pub delay_ms: f64,
    pub enemy: SpawnKind,
    pub count: u32,
    /// Fixed archetype for boss waves (None = random)
    #[serde(default)]
    pub boss_archetype: Option<BossArchetype>,
    /// Gap between consecutive members
    #[serde(default)]
    pub stagger_ms: f64,
}

/// A single queued spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnOrder {
    pub wave: usize,
    pub enemy: SpawnKind,
    pub boss_archetype: Option<BossArchetype>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub experience: u64,
    pub credits: u64,
    #[serde(default)]
    pub unlock_weapon: Option<WeaponType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDefinition {
    pub id: String,
    pub name: String,
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub waves: Vec<WaveSpec>,
    #[serde(default)]
    pub rewards: Rewards,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub environment: Vec<EnvironmentEffect>,
}

impl MissionDefinition {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definition: MissionDefinition = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::Invalid {
                field: "id",
                reason: "mission id is empty".to_string(),
            });
        }
        if !self.objectives.iter().any(|o| o.required) {
            return Err(ConfigError::Invalid {
                field: "objectives",
                reason: format!("mission '{}' has no required objective", self.id),
            });
        }
        if let Some(wave) = self
            .waves
            .iter()
            .find(|w| !w.delay_ms.is_finite() || w.delay_ms < 0.0 || w.stagger_ms < 0.0)
        {
            return Err(ConfigError::Invalid {
                field: "waves",
                reason: format!("bad timing: delay {} stagger {}", wave.delay_ms, wave.stagger_ms),
            });
        }
        Ok(())
    }

    /// Build the outgoing result once the mission is complete
    pub fn result(&self, progress: &MissionProgress, session_score: u64) -> MissionResult {
        let completed = progress.completed_count();
        MissionResult {
            mission_id: self.id.clone(),
            score: mission_score(session_score, completed, progress.elapsed_ms, self.difficulty),
            completed_objectives: completed,
            elapsed_ms: progress.elapsed_ms,
            experience: self.rewards.experience,
            credits: self.rewards.credits,
            unlocked_weapon: self.rewards.unlock_weapon,
        }
    }
}

/// Combat happenings the tracker cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionEvent {
    EnemyDestroyed,
    PowerUpCollected,
    BossDefeated,
    /// Total mission elapsed time in ms
    TimeUpdate(f64),
}

/// Per-session mission state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub objectives: Vec<Objective>,
    /// One flag per wave; a wave triggers at most once
    pub wave_spawned: Vec<bool>,
    /// Pending members of triggered waves, ordered by due time
    pub spawn_queue: Vec<(f64, SpawnOrder)>,
    pub elapsed_ms: f64,
}

impl MissionProgress {
    pub fn new(definition: &MissionDefinition) -> Self {
        let objectives = definition
            .objectives
            .iter()
            .cloned()
            .map(|mut o| {
                o.current = 0;
                o
            })
            .collect();
        Self {
            objectives,
            wave_spawned: vec![false; definition.waves.len()],
            spawn_queue: Vec::new(),
            elapsed_ms: 0.0,
        }
    }

    /// Apply an event to every matching objective
    pub fn record(&mut self, event: MissionEvent) {
        for objective in &mut self.objectives {
            match (event, objective.kind) {
                (MissionEvent::EnemyDestroyed, ObjectiveKind::DestroyEnemies)
                | (MissionEvent::PowerUpCollected, ObjectiveKind::CollectPowerUps)
                | (MissionEvent::BossDefeated, ObjectiveKind::DefeatBoss) => {
                    objective.current = (objective.current + 1).min(objective.target);
                }
                (MissionEvent::TimeUpdate(ms), ObjectiveKind::SurviveTime) => {
                    objective.current = (ms.max(0.0) as u64).min(objective.target);
                }
                _ => {}
            }
        }
    }

    /// Move mission time forward and report it to the objectives
    pub fn advance_time(&mut self, dt_ms: f32) {
        self.elapsed_ms += dt_ms as f64;
        self.record(MissionEvent::TimeUpdate(self.elapsed_ms));
    }

    /// Every required objective met; optional ones don't matter
    pub fn is_complete(&self) -> bool {
        self.objectives
            .iter()
            .filter(|o| o.required)
            .all(Objective::is_done)
    }

    pub fn completed_count(&self) -> usize {
        self.objectives.iter().filter(|o| o.is_done()).count()
    }

    /// Trigger waves whose delay has passed and queue their members.
    /// Returns the indices of newly triggered waves.
    pub fn trigger_waves(&mut self, waves: &[WaveSpec]) -> Vec<usize> {
        let mut triggered = Vec::new();
        for (index, wave) in waves.iter().enumerate() {
            let Some(spawned) = self.wave_spawned.get_mut(index) else {
                break;
            };
            if *spawned || self.elapsed_ms < wave.delay_ms {
                continue;
            }
            *spawned = true;
            for member in 0..wave.count {
                let due = wave.delay_ms + wave.stagger_ms * member as f64;
                self.spawn_queue.push((
                    due,
                    SpawnOrder {
                        wave: index,
                        enemy: wave.enemy,
                        boss_archetype: wave.boss_archetype,
                    },
                ));
            }
            log::info!("Wave {} triggered ({} x {:?})", index + 1, wave.count, wave.enemy);
            triggered.push(index);
        }
        if !triggered.is_empty() {
            self.spawn_queue.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        triggered
    }

    /// Remove and return every queued spawn that is due
    pub fn drain_due(&mut self) -> Vec<SpawnOrder> {
        let split = self
            .spawn_queue
            .iter()
            .position(|(due, _)| *due > self.elapsed_ms)
            .unwrap_or(self.spawn_queue.len());
        self.spawn_queue
            .drain(..split)
            .map(|(_, order)| order)
            .collect()
    }
}

/// Time bonus for finishing quickly
pub fn time_bonus(elapsed_ms: f64) -> u64 {
    if elapsed_ms < 60_000.0 {
        500
    } else if elapsed_ms < 120_000.0 {
        250
    } else {
        0
    }
}

/// Final mission score
pub fn mission_score(
    session_score: u64,
    completed_objectives: usize,
    elapsed_ms: f64,
    difficulty: Difficulty,
) -> u64 {
    let raw = session_score + OBJECTIVE_POINTS * completed_objectives as u64 + time_bonus(elapsed_ms);
    (raw as f64 * difficulty.multiplier()).floor() as u64
}

/// Built-in missions
pub fn catalog() -> Vec<MissionDefinition> {
    use ObjectiveKind::*;
    let basic = |delay_ms: f64, count: u32, stagger_ms: f64| WaveSpec {
        delay_ms,
        enemy: SpawnKind::Basic,
        count,
        boss_archetype: None,
        stagger_ms,
    };
    let boss = |delay_ms: f64, archetype: Option<BossArchetype>| WaveSpec {
        delay_ms,
        enemy: SpawnKind::Boss,
        count: 1,
        boss_archetype: archetype,
        stagger_ms: 0.0,
    };

    vec![
        MissionDefinition {
            id: "first-contact".to_string(),
            name: "First Contact".to_string(),
            objectives: vec![
                Objective::new(DestroyEnemies, 20, true, "Destroy 20 raiders"),
                Objective::new(CollectPowerUps, 2, false, "Collect 2 power-ups"),
            ],
            waves: vec![
                basic(0.0, 5, 400.0),
                basic(8000.0, 6, 350.0),
                basic(16_000.0, 12, 300.0),
            ],
            rewards: Rewards {
                experience: 100,
                credits: 50,
                unlock_weapon: Some(WeaponType::LaserCannon),
            },
            difficulty: Difficulty::Easy,
            environment: Vec::new(),
        },
        MissionDefinition {
            id: "nebula-run".to_string(),
            name: "Nebula Run".to_string(),
            objectives: vec![
                Objective::new(SurviveTime, 90_000, true, "Survive 90 seconds"),
                Objective::new(CollectPowerUps, 3, false, "Collect 3 power-ups"),
            ],
            waves: vec![
                basic(2000.0, 6, 500.0),
                basic(20_000.0, 8, 400.0),
                basic(45_000.0, 10, 300.0),
                basic(70_000.0, 12, 250.0),
            ],
            rewards: Rewards {
                experience: 200,
                credits: 120,
                unlock_weapon: Some(WeaponType::HomingMissile),
            },
            difficulty: Difficulty::Medium,
            environment: vec![EnvironmentEffect::Nebula { speed_factor: 0.7 }],
        },
        MissionDefinition {
            id: "gravity-trap".to_string(),
            name: "Gravity Trap".to_string(),
            objectives: vec![
                Objective::new(DestroyEnemies, 30, true, "Destroy 30 raiders"),
                Objective::new(DefeatBoss, 1, true, "Bring down the Juggernaut"),
            ],
            waves: vec![
                basic(0.0, 8, 300.0),
                basic(12_000.0, 10, 300.0),
                basic(24_000.0, 16, 250.0),
                boss(30_000.0, Some(BossArchetype::Juggernaut)),
            ],
            rewards: Rewards {
                experience: 350,
                credits: 200,
                unlock_weapon: Some(WeaponType::Railgun),
            },
            difficulty: Difficulty::Hard,
            environment: vec![EnvironmentEffect::GravityWell {
                center: glam::Vec2::new(400.0, 300.0),
                strength: 120.0,
                radius: 220.0,
            }],
        },
        MissionDefinition {
            id: "ion-tempest".to_string(),
            name: "Ion Tempest".to_string(),
            objectives: vec![
                Objective::new(DefeatBoss, 2, true, "Defeat two bosses"),
                Objective::new(SurviveTime, 120_000, true, "Hold out for two minutes"),
                Objective::new(DestroyEnemies, 50, false, "Destroy 50 raiders"),
            ],
            waves: vec![
                basic(0.0, 10, 250.0),
                boss(20_000.0, None),
                basic(40_000.0, 14, 200.0),
                boss(70_000.0, None),
            ],
            rewards: Rewards {
                experience: 600,
                credits: 400,
                unlock_weapon: Some(WeaponType::FusionTorpedo),
            },
            difficulty: Difficulty::Extreme,
            environment: vec![EnvironmentEffect::IonStorm {
                period_ms: 10_000.0,
                duration_ms: 3000.0,
            }],
        },
    ]
}

/// Look up a built-in mission by id
pub fn find_mission(id: &str) -> Option<MissionDefinition> {
    catalog().into_iter().find(|m| m.id == id)
}
