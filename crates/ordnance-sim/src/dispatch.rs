//! Outbound collaborator seam for detonations.
//!
//! The detonation path never applies damage, plays sounds or spawns
//! projectiles itself. It hands fire-and-forget requests to a [`Dispatcher`].

use ordnance_core::events::{BlastAttack, EffectRequest, SoundRequest, SubmunitionRequest};

/// Receiver for everything a detonation produces.
pub trait Dispatcher {
    fn fire_blast(&mut self, attack: BlastAttack);
    fn spawn_effect(&mut self, effect: EffectRequest);
    fn play_sound(&mut self, sound: SoundRequest);
    fn spawn_submunitions(&mut self, request: SubmunitionRequest);
}

/// Dispatcher that buffers requests until the engine drains them.
#[derive(Debug, Default)]
pub struct DispatchBuffer {
    pub blasts: Vec<BlastAttack>,
    pub effects: Vec<EffectRequest>,
    pub sounds: Vec<SoundRequest>,
    pub submunitions: Vec<SubmunitionRequest>,
}

impl DispatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blasts.is_empty()
            && self.effects.is_empty()
            && self.sounds.is_empty()
            && self.submunitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.blasts.clear();
        self.effects.clear();
        self.sounds.clear();
        self.submunitions.clear();
    }
}

impl Dispatcher for DispatchBuffer {
    fn fire_blast(&mut self, attack: BlastAttack) {
        self.blasts.push(attack);
    }

    fn spawn_effect(&mut self, effect: EffectRequest) {
        self.effects.push(effect);
    }

    fn play_sound(&mut self, sound: SoundRequest) {
        self.sounds.push(sound);
    }

    fn spawn_submunitions(&mut self, request: SubmunitionRequest) {
        self.submunitions.push(request);
    }
}
