//! Ball physics
//!
//! Position is kept at sub-pixel precision; the renderer and collision grid
//! truncate it to whole cells. Every directional change re-normalizes the
//! velocity to the current speed and enforces a minimum horizontal component
//! so a rally can never settle into a purely vertical bounce.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner of the 2x2 block
    pub pos: Vec2,
    pub vel: Vec2,
    speed: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    /// Center of the matrix, at rest
    pub fn new() -> Self {
        Self {
            pos: Vec2::splat(MATRIX_SIZE as f32 / 2.0),
            vel: Vec2::ZERO,
            speed: INITIAL_BALL_SPEED,
        }
    }

    /// Back to the center, at rest, at base speed
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Launch in a random direction within 30° of horizontal, left or right
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let angle = rng
            .random_range(-LAUNCH_ANGLE_DEG..=LAUNCH_ANGLE_DEG)
            .to_radians();
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

        self.vel = Vec2::new(direction * angle.cos(), angle.sin()) * self.speed;
        self.normalize_velocity();
    }

    /// Advance one tick. `speed_multiplier` scales displacement only.
    pub fn update(&mut self, speed_multiplier: f32) {
        if !self.is_moving() {
            return;
        }

        self.speed = (self.speed * BALL_ACCELERATION).min(MAX_BALL_SPEED);
        self.vel = self.vel.normalize_or_zero() * self.speed;

        self.pos += self.vel * speed_multiplier;
        self.vel.y = self.vel.y.clamp(-MAX_VELOCITY_Y, MAX_VELOCITY_Y);
    }

    pub fn reverse_x(&mut self) {
        self.vel.x = -self.vel.x;
        self.normalize_velocity();
    }

    pub fn reverse_y(&mut self) {
        self.vel.y = -self.vel.y;
        self.normalize_velocity();
    }

    /// Paddle deflection: set the vertical component to `fraction` of the
    /// current speed and rebuild the horizontal one, keeping its sign.
    pub fn deflect(&mut self, fraction: f32) {
        let fraction = fraction.clamp(-MAX_VELOCITY_Y, MAX_VELOCITY_Y);
        let sign = if self.vel.x >= 0.0 { 1.0 } else { -1.0 };
        self.vel.y = fraction * self.speed;
        self.vel.x = sign * (self.speed * self.speed - self.vel.y * self.vel.y).max(0.0).sqrt();
        self.normalize_velocity();
    }

    fn normalize_velocity(&mut self) {
        let magnitude = self.vel.length();
        if magnitude <= f32::EPSILON {
            return;
        }
        self.vel = self.vel / magnitude * self.speed;

        let min_x = MIN_X_FRACTION * self.speed;
        if self.vel.x.abs() < min_x {
            let sign_x = if self.vel.x >= 0.0 { 1.0 } else { -1.0 };
            let sign_y = if self.vel.y >= 0.0 { 1.0 } else { -1.0 };
            self.vel.x = sign_x * min_x;
            self.vel.y = sign_y * (self.speed * self.speed - min_x * min_x).sqrt();
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Cell holding the top-left pixel
    pub fn cell(&self) -> (i32, i32) {
        (self.pos.x as i32, self.pos.y as i32)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + BALL_SIZE as f32
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + BALL_SIZE as f32
    }
}
