//! Semantic sound hooks
//!
//! The simulation never synthesizes audio. It reports what happened as
//! [`SoundEvent`]s to an injected [`AudioSink`]; a frontend maps them onto
//! whatever sound backend it has.

use serde::{Deserialize, Serialize};

use crate::sim::{BossArchetype, WeaponType};

/// Sound-worthy transitions in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEvent {
    /// Player weapon fired
    ShotFired { weapon: WeaponType },
    /// An enemy was destroyed
    Explosion,
    /// An enemy took damage and survived
    EnemyHit,
    /// The player lost a life
    PlayerHit,
    /// Player picked up a power-up
    PowerUpCollected,
    /// Charge crossed a tier threshold (1-4)
    ChargeTierReached { tier: u8 },
    /// Stored charge decayed back to zero
    ChargeDepleted,
    /// Heat hit the ceiling and locked the weapon
    Overheated,
    /// A boss entered the field
    BossIntro { archetype: BossArchetype },
    /// A boss went down (start of its explosion sequence)
    BossDefeated { archetype: BossArchetype },
    MissionComplete,
    GameOver,
}

/// Receiver for sound events, injected into the tick
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

/// Forwards events to the `log` facade (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, event: SoundEvent) {
        log::debug!("sound: {:?}", event);
    }
}

/// Keeps every event in order, for tests and replays of a single session
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub events: Vec<SoundEvent>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events equal to `event`
    pub fn count(&self, event: SoundEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    /// Number of recorded events matching a predicate
    pub fn count_where(&self, pred: impl Fn(&SoundEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, event: SoundEvent) {
        self.events.push(event);
    }
}

impl<T: AudioSink + ?Sized> AudioSink for &mut T {
    fn play(&mut self, event: SoundEvent) {
        (**self).play(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_counts() {
        let mut audio = RecordingAudio::new();
        audio.play(SoundEvent::Explosion);
        audio.play(SoundEvent::ChargeTierReached { tier: 1 });
        audio.play(SoundEvent::Explosion);

        assert_eq!(audio.count(SoundEvent::Explosion), 2);
        assert_eq!(
            audio.count_where(|e| matches!(e, SoundEvent::ChargeTierReached { .. })),
            1
        );

        audio.clear();
        assert!(audio.events.is_empty());
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn emit(mut sink: impl AudioSink) {
            sink.play(SoundEvent::GameOver);
        }
        let mut audio = RecordingAudio::new();
        emit(&mut audio);
        assert_eq!(audio.events, vec![SoundEvent::GameOver]);
    }
}
