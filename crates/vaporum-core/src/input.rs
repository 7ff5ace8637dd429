//! Polled input snapshot.
//!
//! The embedding application samples its devices once per frame and hands
//! the result to [`Game::tick`](crate::game::Game::tick). The core never
//! subscribes to device events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical keys the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Select a unit, move, or attack (primary click).
    Select,
    /// Step back out of the current selection (secondary click).
    Cancel,
    EndTurn,
    Escape,
    /// Confirm a menu choice or stay in place.
    Confirm,
}

/// One frame of input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Keys pressed since the previous frame.
    pub just_pressed: Vec<Key>,
    /// Where the cursor ray meets the ground plane, if it does.
    pub cursor_world: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for a single key press.
    pub fn with_key(mut self, key: Key) -> Self {
        self.just_pressed.push(key);
        self
    }

    pub fn with_cursor(mut self, cursor: Vec2) -> Self {
        self.cursor_world = Some(cursor);
        self
    }

    pub fn was_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }
}
