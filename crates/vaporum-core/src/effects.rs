//! Fire-and-forget presentation requests.
//!
//! The core never waits on the render or audio layer. It pushes [`Effect`]s
//! into an outbox that the embedding application drains once per frame.

use crate::types::UnitId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Particle burst flavors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    MuzzleFlash,
    Hit,
    Explosion,
}

/// A cosmetic or audio request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    PlaySound {
        sound: String,
    },
    SpawnParticles {
        kind: ParticleKind,
        position: Vec3,
        direction: Vec3,
    },
    FloatingDamage {
        unit: UnitId,
        amount: i32,
    },
}

impl Effect {
    /// Sound request, skipped when the unit has no sound configured.
    pub fn sound(sound: &str) -> Option<Effect> {
        (!sound.is_empty()).then(|| Effect::PlaySound {
            sound: sound.to_string(),
        })
    }
}
