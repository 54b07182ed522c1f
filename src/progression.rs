//! Progression boundary
//!
//! A [`ProgressionSnapshot`] comes in at session start and parametrizes the
//! ship; a [`MissionResult`] goes out when a mission completes. Best scores
//! per mission are tracked in [`MissionRecords`]. Storage is the caller's job;
//! everything here round-trips through JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::WeaponType;

/// Ship upgrade levels bought between sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipUpgrades {
    /// Slows charge decay (x0.85 per level)
    pub charge_preservation: u8,
    /// +10% cooling rate per level
    pub cooling: u8,
    /// +10% energy regen per level
    pub energy_regen: u8,
    /// +10% charging rate per level
    pub charge_speed: u8,
}

/// Immutable view of the player's unlocks, taken at session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionSnapshot {
    pub unlocked_weapons: Vec<WeaponType>,
    pub weapon_levels: BTreeMap<WeaponType, u8>,
    pub ship_upgrades: ShipUpgrades,
    pub experience: u64,
    pub credits: u64,
}

impl Default for ProgressionSnapshot {
    fn default() -> Self {
        Self {
            unlocked_weapons: vec![WeaponType::Pulse],
            weapon_levels: BTreeMap::new(),
            ship_upgrades: ShipUpgrades::default(),
            experience: 0,
            credits: 0,
        }
    }
}

impl ProgressionSnapshot {
    /// Level for a weapon (1 if never upgraded)
    pub fn weapon_level(&self, kind: WeaponType) -> u8 {
        self.weapon_levels.get(&kind).copied().unwrap_or(1).max(1)
    }

    /// Fold a mission result into a new snapshot for the next session
    pub fn apply_result(&self, result: &MissionResult) -> Self {
        let mut next = self.clone();
        next.experience += result.experience;
        next.credits += result.credits;
        if let Some(weapon) = result.unlocked_weapon {
            if !next.unlocked_weapons.contains(&weapon) {
                next.unlocked_weapons.push(weapon);
            }
        }
        next
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Handed to the progression layer when a mission completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionResult {
    pub mission_id: String,
    pub score: u64,
    pub completed_objectives: usize,
    pub elapsed_ms: f64,
    pub experience: u64,
    pub credits: u64,
    pub unlocked_weapon: Option<WeaponType>,
}

/// Best result for one mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub best_score: u64,
    pub best_time_ms: f64,
    pub completions: u32,
}

/// Best scores keyed by mission id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionRecords {
    pub records: BTreeMap<String, MissionRecord>,
}

impl MissionRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would beat the stored best for a mission
    pub fn qualifies(&self, mission_id: &str, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        self.records
            .get(mission_id)
            .map(|r| score > r.best_score)
            .unwrap_or(true)
    }

    /// Record a completion. Returns true if it set a new best score.
    pub fn record(&mut self, result: &MissionResult) -> bool {
        let new_best = self.qualifies(&result.mission_id, result.score);
        let entry = self
            .records
            .entry(result.mission_id.clone())
            .or_insert(MissionRecord {
                best_score: 0,
                best_time_ms: f64::INFINITY,
                completions: 0,
            });
        entry.completions += 1;
        entry.best_time_ms = entry.best_time_ms.min(result.elapsed_ms);
        if new_best {
            entry.best_score = result.score;
            log::info!("New best for {}: {}", result.mission_id, result.score);
        }
        new_best
    }

    pub fn best_score(&self, mission_id: &str) -> Option<u64> {
        self.records.get(mission_id).map(|r| r.best_score)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, score: u64, elapsed_ms: f64) -> MissionResult {
        MissionResult {
            mission_id: id.to_string(),
            score,
            completed_objectives: 2,
            elapsed_ms,
            experience: 150,
            credits: 80,
            unlocked_weapon: Some(WeaponType::LaserCannon),
        }
    }

    #[test]
    fn test_weapon_level_defaults_to_one() {
        let mut snapshot = ProgressionSnapshot::default();
        assert_eq!(snapshot.weapon_level(WeaponType::Railgun), 1);
        snapshot.weapon_levels.insert(WeaponType::Railgun, 4);
        assert_eq!(snapshot.weapon_level(WeaponType::Railgun), 4);
    }

    #[test]
    fn test_apply_result_adds_rewards_once() {
        let snapshot = ProgressionSnapshot::default();
        let r = result("m1", 2000, 50_000.0);
        let next = snapshot.apply_result(&r).apply_result(&r);
        assert_eq!(next.experience, 300);
        assert_eq!(next.credits, 160);
        assert_eq!(
            next.unlocked_weapons,
            vec![WeaponType::Pulse, WeaponType::LaserCannon]
        );
        // Input snapshot untouched
        assert_eq!(snapshot.experience, 0);
    }

    #[test]
    fn test_records_keep_best() {
        let mut records = MissionRecords::new();
        assert!(records.is_empty());
        assert!(records.record(&result("m1", 1000, 90_000.0)));
        assert!(!records.record(&result("m1", 800, 40_000.0)));
        assert!(records.record(&result("m1", 1500, 70_000.0)));

        let rec = &records.records["m1"];
        assert_eq!(rec.best_score, 1500);
        assert_eq!(rec.best_time_ms, 40_000.0);
        assert_eq!(rec.completions, 3);
        assert!(!records.qualifies("m1", 0));
        assert!(records.qualifies("m2", 1));
    }

    #[test]
    fn test_json_round_trip() {
        let mut snapshot = ProgressionSnapshot::default();
        snapshot.weapon_levels.insert(WeaponType::PlasmaBeam, 3);
        snapshot.ship_upgrades.charge_preservation = 2;
        let json = snapshot.to_json().unwrap();
        assert_eq!(ProgressionSnapshot::from_json(&json).unwrap(), snapshot);

        let mut records = MissionRecords::new();
        records.record(&result("m1", 1000, 90_000.0));
        let json = records.to_json().unwrap();
        assert_eq!(MissionRecords::from_json(&json).unwrap(), records);
    }
}
