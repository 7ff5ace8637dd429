//! Combat resolution.
//!
//! Damage is deterministic: `floor(2 * attack_damage / defense)`. An attack
//! always lands; a surviving target that has the attacker inside its own
//! range fires back immediately with the same formula.

use crate::effects::{Effect, ParticleKind};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

/// Outcome of one attack exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    /// Damage dealt to the target.
    pub damage: i32,
    pub target_destroyed: bool,
    /// Damage returned by the target, if it could fire back.
    pub counter_damage: Option<i32>,
    pub attacker_destroyed: bool,
}

/// Damage one shot deals against a given defense.
///
/// `defense` is positive and `attack_damage` is at most
/// [`MAX_ATTACK_DAMAGE`](crate::definitions::MAX_ATTACK_DAMAGE); definitions
/// enforce both when loaded.
pub fn calculate_damage(attack_damage: i32, defense: i32) -> i32 {
    (2 * attack_damage).div_euclid(defense)
}

/// Whether `target` sits inside `attacker`'s attack window.
pub fn in_attack_range(attacker: &Unit, target: &Unit) -> bool {
    attacker
        .definition
        .attack_range
        .contains(attacker.coord.distance(&target.coord))
}

/// Full targeting check: living enemy, in range, and not a moved Artillery.
pub fn can_attack(attacker: &Unit, target: &Unit) -> bool {
    attacker.is_alive()
        && target.is_alive()
        && attacker.owner != target.owner
        && in_attack_range(attacker, target)
        && !(target.is_artillery() && target.did_move)
}

/// Resolve an attack, including any counter-attack.
///
/// Legality is the caller's responsibility (see [`can_attack`]). The
/// attacker's orders are issued before any damage is applied.
pub fn resolve_attack(
    attacker: &mut Unit,
    target: &mut Unit,
    floating_seconds: f32,
    effects: &mut Vec<Effect>,
) -> CombatResult {
    let hit_direction = (target.position - attacker.position).normalize_or_zero();
    let damage = calculate_damage(attacker.definition.attack_damage, target.definition.defense);

    fire(attacker, hit_direction, effects);
    attacker.issue_orders();
    let target_destroyed = target.take_damage(damage, hit_direction, floating_seconds, effects);

    let mut result = CombatResult {
        damage,
        target_destroyed,
        counter_damage: None,
        attacker_destroyed: false,
    };

    if target.is_alive() && in_attack_range(target, attacker) {
        let counter = calculate_damage(target.definition.attack_damage, attacker.definition.defense);
        fire(target, -hit_direction, effects);
        result.counter_damage = Some(counter);
        result.attacker_destroyed =
            attacker.take_damage(counter, -hit_direction, floating_seconds, effects);
    }

    tracing::debug!(
        attacker = %attacker.id,
        target = %target.id,
        damage,
        counter = ?result.counter_damage,
        "Resolved attack"
    );
    result
}

fn fire(shooter: &Unit, direction: glam::Vec3, effects: &mut Vec<Effect>) {
    effects.extend(Effect::sound(&shooter.definition.assets.fire_sound));
    effects.push(Effect::SpawnParticles {
        kind: ParticleKind::MuzzleFlash,
        position: shooter.muzzle_position(),
        direction,
    });
}
