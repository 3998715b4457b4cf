//! Paddle controllers
//!
//! Both paddles keep a continuous position along the track for smoothing and
//! expose a discrete pointer index used for rendering and collision.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::track::TRACK_LEN;
use crate::consts::*;

const LAST_INDEX: f32 = (TRACK_LEN - 1) as f32;
/// Bot pointer range that keeps the 5-cell window fully on the track
const BOT_MIN_INDEX: i32 = PADDLE_HALF_LENGTH;
const BOT_MAX_INDEX: i32 = TRACK_LEN as i32 - 1 - PADDLE_HALF_LENGTH;

/// Tilt-driven player paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanPaddle {
    position: f32,
    pointer: usize,
}

impl Default for HumanPaddle {
    fn default() -> Self {
        Self {
            position: PADDLE_START_INDEX as f32,
            pointer: PADDLE_START_INDEX,
        }
    }
}

impl HumanPaddle {
    /// Blend a tilt sample (degrees) into the paddle position.
    ///
    /// Forward tilt moves the paddle toward the low end of the track.
    /// Smoothing is heavier near the ends of the track to damp overshoot.
    pub fn apply_tilt(&mut self, tilt_deg: f32) {
        if !tilt_deg.is_finite() {
            return;
        }
        let normalized = (tilt_deg.clamp(-MAX_TILT_DEG, MAX_TILT_DEG) + MAX_TILT_DEG)
            / (2.0 * MAX_TILT_DEG);
        let target = ((1.0 - normalized) * LAST_INDEX).clamp(0.0, LAST_INDEX);

        let smoothing = if self.position < 2.0 || self.position > LAST_INDEX - 2.0 {
            EDGE_SMOOTHING
        } else {
            CENTER_SMOOTHING
        };

        self.position =
            (self.position * smoothing + target * (1.0 - smoothing)).clamp(0.0, LAST_INDEX);
        self.pointer = self.position.round() as usize;
    }

    #[inline]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }
}

/// Bot paddle with reaction latency and per-rally mistakes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotPaddle {
    position: f32,
    pointer: usize,
    target: i32,
    last_reaction_ms: Option<u64>,
    should_miss: bool,
    error: i32,
    last_direction: f32,
}

impl Default for BotPaddle {
    fn default() -> Self {
        Self {
            position: PADDLE_START_INDEX as f32,
            pointer: PADDLE_START_INDEX,
            target: PADDLE_START_INDEX as i32,
            last_reaction_ms: None,
            should_miss: false,
            error: 0,
            last_direction: 0.0,
        }
    }
}

impl BotPaddle {
    /// Forget the previous rally's mistake so the next one gets a fresh roll
    pub fn start_rally(&mut self) {
        self.should_miss = false;
        self.error = 0;
        self.last_direction = 0.0;
    }

    /// Roll for a mistake the moment the ball turns toward the bot.
    ///
    /// Returns `true` on the tick the roll happened.
    pub fn observe_ball<R: Rng + ?Sized>(
        &mut self,
        ball_vx: f32,
        error_chance: f32,
        rng: &mut R,
    ) -> bool {
        let turned = ball_vx > 0.0 && self.last_direction <= 0.0;
        if turned {
            self.should_miss = rng.random::<f32>() < error_chance;
            self.error = if self.should_miss {
                rng.random_range(-BOT_MAX_ERROR..=BOT_MAX_ERROR)
            } else {
                0
            };
            log::debug!(
                "Bot rally decision: miss={} error={}",
                self.should_miss,
                self.error
            );
        }
        self.last_direction = ball_vx;
        turned
    }

    /// Re-aim at most once per reaction interval, then glide toward the target
    pub fn update(&mut self, ball: &Ball, now_ms: u64) {
        let reacting = self
            .last_reaction_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= BOT_REACTION_MS);
        if reacting {
            self.last_reaction_ms = Some(now_ms);
            let mirrored_y = (MATRIX_SIZE as f32 - 1.0 - ball.pos.y) as i32;
            self.target = (mirrored_y + self.error).clamp(BOT_MIN_INDEX, BOT_MAX_INDEX);
        }

        let diff = self.target as f32 - self.position;
        if diff != 0.0 {
            self.position += diff * BOT_SMOOTHING;
            self.pointer =
                (self.position.round() as i32).clamp(BOT_MIN_INDEX, BOT_MAX_INDEX) as usize;
        }
    }

    #[inline]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[inline]
    pub fn target(&self) -> i32 {
        self.target
    }

    #[inline]
    pub fn should_miss(&self) -> bool {
        self.should_miss
    }

    #[inline]
    pub fn error(&self) -> i32 {
        self.error
    }
}
