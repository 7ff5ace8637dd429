//! Per-unit runtime state.
//!
//! A [`Unit`] carries its definition, position and order flags, a cached
//! distance field rooted at its current tile, and any in-flight move
//! animation. The field is recomputed every time the unit's tile changes
//! (a committed move or a cancel), so move-range and path queries always
//! read from the unit's actual position.

use crate::animation::{turn_toward_degrees, yaw_of, MoveAnimation, Timer};
use crate::definitions::{UnitDefinition, UnitType};
use crate::distance_field::{DistanceField, PathError};
use crate::effects::{Effect, ParticleKind};
use crate::hex::HexCoord;
use crate::map::TileGrid;
use crate::types::{PlayerId, UnitId};
use glam::Vec3;
use std::sync::Arc;

/// Derived lifecycle state of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitState {
    Idle,
    Selected,
    Moving,
    Attacking,
    Dead,
}

/// Damage text shown above a unit for a short time.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingDamage {
    pub text: String,
    pub timer: Timer,
}

/// A unit on the battle map.
#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub definition: Arc<UnitDefinition>,
    pub coord: HexCoord,
    /// Tile the unit returns to on cancel.
    pub previous_coord: HexCoord,
    pub health: i32,
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub default_yaw_degrees: f32,
    pub is_selected: bool,
    pub did_move: bool,
    pub orders_issued: bool,
    /// Selected and choosing an attack target.
    pub is_targeting: bool,
    is_dead: bool,
    is_garbage: bool,
    distance_field: DistanceField,
    animation: Option<MoveAnimation>,
    floating_damage: Option<FloatingDamage>,
}

impl Unit {
    /// Create a new unit standing on `coord`.
    pub fn new(
        id: UnitId,
        owner: PlayerId,
        definition: Arc<UnitDefinition>,
        coord: HexCoord,
        yaw_degrees: f32,
        tiles: &TileGrid,
    ) -> Self {
        Self {
            id,
            owner,
            health: definition.max_health,
            definition,
            coord,
            previous_coord: coord,
            position: coord.world_position(),
            yaw_degrees,
            default_yaw_degrees: yaw_degrees,
            is_selected: false,
            did_move: false,
            orders_issued: false,
            is_targeting: false,
            is_dead: false,
            is_garbage: false,
            distance_field: tiles.distance_field(coord),
            animation: None,
            floating_damage: None,
        }
    }

    pub fn state(&self) -> UnitState {
        if self.is_dead {
            UnitState::Dead
        } else if self.animation.is_some() {
            UnitState::Moving
        } else if self.is_selected && self.is_targeting {
            UnitState::Attacking
        } else if self.is_selected {
            UnitState::Selected
        } else {
            UnitState::Idle
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Dead and awaiting removal by the cleanup sweep.
    pub fn is_garbage(&self) -> bool {
        self.is_garbage
    }

    pub fn is_artillery(&self) -> bool {
        self.definition.unit_type == UnitType::Artillery
    }

    /// Distances from this unit's tile.
    pub fn distance_field(&self) -> &DistanceField {
        &self.distance_field
    }

    pub fn animation(&self) -> Option<&MoveAnimation> {
        self.animation.as_ref()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn floating_damage(&self) -> Option<&FloatingDamage> {
        self.floating_damage.as_ref()
    }

    /// Tiles in travel order from the current tile to `target`.
    pub fn path_to(&self, target: HexCoord) -> Result<Vec<HexCoord>, PathError> {
        let mut path = self.distance_field.extract_path(target, self.coord)?;
        path.reverse();
        Ok(path)
    }

    /// Commit a move to `target` and start the travel animation.
    ///
    /// Fails without changing anything when no path exists.
    pub fn begin_move(
        &mut self,
        target: HexCoord,
        tiles: &TileGrid,
        seconds_per_tile: f32,
    ) -> Result<(), PathError> {
        let path = self.path_to(target)?;

        self.did_move = true;
        self.coord = target;
        self.animation = Some(MoveAnimation::new(path, seconds_per_tile));
        self.distance_field = tiles.distance_field(target);
        Ok(())
    }

    /// Roll back to `previous_coord`, aborting any animation.
    pub fn cancel_move(&mut self, tiles: &TileGrid) {
        self.did_move = false;
        self.animation = None;
        self.coord = self.previous_coord;
        self.position = self.coord.world_position();
        self.distance_field = tiles.distance_field(self.coord);
    }

    /// Advance animation and timers. Returns true when a move finished this frame.
    pub fn update(&mut self, delta_seconds: f32) -> bool {
        let mut finished = false;

        if let Some(animation) = self.animation.as_mut() {
            let new_position = animation.advance(delta_seconds);
            if let Some(yaw) = yaw_of(new_position - self.position) {
                self.yaw_degrees = yaw;
            }
            self.position = new_position;

            if animation.is_finished() {
                self.animation = None;
                self.position = self.coord.world_position();
                finished = true;
            }
        }

        if let Some(floating) = self.floating_damage.as_mut() {
            floating.timer.tick(delta_seconds);
            if floating.timer.is_finished() {
                self.floating_damage = None;
            }
        }

        finished
    }

    /// Turn toward a world point at `max_delta` degrees this frame.
    ///
    /// Facing the unit's own position turns back to its default yaw.
    pub fn turn_toward(&mut self, point: Vec3, max_delta: f32) {
        let goal = yaw_of(point - self.position).unwrap_or(self.default_yaw_degrees);
        self.yaw_degrees = turn_toward_degrees(self.yaw_degrees, goal, max_delta);
    }

    /// Unit forward direction on the ground plane.
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw_degrees.to_radians().sin_cos();
        Vec3::new(cos, sin, 0.0)
    }

    /// World position of the muzzle, from the definition's local offset.
    pub fn muzzle_position(&self) -> Vec3 {
        let forward = self.forward();
        let left = Vec3::new(-forward.y, forward.x, 0.0);
        let offset = self.definition.muzzle_offset;
        self.position + forward * offset.x + left * offset.y + Vec3::Z * offset.z
    }

    /// Select this unit for its owner's current action.
    pub fn select(&mut self) {
        self.is_selected = true;
        self.is_targeting = false;
    }

    pub fn deselect(&mut self) {
        self.is_selected = false;
        self.is_targeting = false;
    }

    /// Finish this turn's orders at the current tile.
    pub fn issue_orders(&mut self) {
        self.previous_coord = self.coord;
        self.deselect();
        self.orders_issued = true;
    }

    /// Apply damage. Returns true if this hit killed the unit.
    ///
    /// Damage to a unit that is already dead is ignored, so death effects
    /// fire exactly once.
    pub fn take_damage(
        &mut self,
        amount: i32,
        hit_direction: Vec3,
        floating_seconds: f32,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if self.is_dead {
            return false;
        }

        self.floating_damage = Some(FloatingDamage {
            text: format!("-{amount}"),
            timer: Timer::new(floating_seconds),
        });
        effects.push(Effect::FloatingDamage {
            unit: self.id,
            amount,
        });

        self.health -= amount;
        if self.health <= 0 {
            self.die(effects);
            return true;
        }

        effects.extend(Effect::sound(&self.definition.assets.hit_sound));
        effects.push(Effect::SpawnParticles {
            kind: ParticleKind::Hit,
            position: self.position,
            direction: hit_direction,
        });
        false
    }

    fn die(&mut self, effects: &mut Vec<Effect>) {
        self.is_dead = true;
        self.is_garbage = true;
        self.deselect();
        self.animation = None;

        effects.extend(Effect::sound(&self.definition.assets.death_sound));
        effects.push(Effect::SpawnParticles {
            kind: ParticleKind::Explosion,
            position: self.position,
            direction: Vec3::Z,
        });
        tracing::debug!(unit = %self.id, owner = %self.owner, "Unit destroyed");
    }

    /// Clear per-turn flags when the owner's turn ends.
    pub fn reset_for_turn(&mut self) {
        self.did_move = false;
        self.is_selected = false;
        self.is_targeting = false;
        self.orders_issued = false;
        self.previous_coord = self.coord;
    }
}
