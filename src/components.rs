use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/* ===========================================================
   moving bodies
   =========================================================== */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Idle,
    Walking,
    /// also covers falling
    Jumping,
}

/// axis‑aligned body in pixel space, `pos` = top‑left, y grows downward
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub state: MotionState,
    pub underwater: bool,
    pub gravity: f32,
    pub jump_height: f32,
    pub move_speed: f32,
    pub default_gravity: f32,
    pub default_jump_height: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            velocity: Vec2::ZERO,
            grounded: false,
            state: MotionState::Jumping,
            underwater: false,
            gravity: GRAVITY,
            jump_height: JUMP_HEIGHT,
            move_speed: MOVE_SPEED,
            default_gravity: GRAVITY,
            default_jump_height: JUMP_HEIGHT,
        }
    }

    pub fn player(pos: Vec2) -> Self {
        Self::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.pos, self.pos + self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

/// what the body wants to do this frame
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    /// −1 left, 0 none, 1 right
    pub direction: f32,
    /// edge‑triggered
    pub jump: bool,
}

/* ===========================================================
   player
   =========================================================== */
#[derive(Component)]
pub struct Player;
