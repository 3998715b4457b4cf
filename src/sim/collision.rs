//! Collision and scoring resolution on the LED grid
//!
//! Checks run in a fixed order and the first match wins, so every tick
//! produces exactly one `Resolution`:
//! 1. static wall cells
//! 2. left edge (player missed)
//! 3. right edge (bot missed)
//! 4. top/bottom edge: bounce inside the wall columns, score outside them
//! 5. player paddle (ball heading left)
//! 6. bot paddle (ball heading right)

use super::ball::Ball;
use super::track::{self, BOTTOM_WALL_ROW, GridPoint, WALL_COLUMNS};
use crate::consts::*;

/// Which paddle touched the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paddle {
    Player,
    Bot,
}

/// Outcome of one resolver pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing touched the ball
    InFlight,
    /// Bounced off a wall segment
    WallBounce,
    /// Bounced off the top/bottom edge between the wall segments
    EdgeBounce,
    /// The rally ended; `player_scored` tells who won it
    Point { player_scored: bool },
    /// Returned by a paddle
    PaddleHit(Paddle),
}

/// Resolve collisions for the current ball position, mutating the ball on bounces
pub fn resolve(ball: &mut Ball, player_pointer: usize, bot_pointer: usize) -> Resolution {
    let size = MATRIX_SIZE as f32;

    if touches_wall(ball) {
        ball.reverse_y();
        ball.pos.y = if ball.top() <= 2.0 {
            2.0
        } else {
            (BOTTOM_WALL_ROW - 1 - BALL_SIZE) as f32
        };
        return Resolution::WallBounce;
    }

    if ball.left() <= 0.0 {
        return Resolution::Point {
            player_scored: false,
        };
    }

    if ball.right() >= size {
        return Resolution::Point {
            player_scored: true,
        };
    }

    if ball.top() <= 0.0 || ball.bottom() >= size {
        let inside_walls = ball.left() >= *WALL_COLUMNS.start() as f32
            && ball.right() <= *WALL_COLUMNS.end() as f32;
        if inside_walls {
            let hit_top = ball.top() <= 0.0;
            ball.reverse_y();
            ball.pos.y = if hit_top { 0.0 } else { (MATRIX_SIZE - BALL_SIZE) as f32 };
            return Resolution::EdgeBounce;
        }
        // Left edge against the midpoint decides the point
        return Resolution::Point {
            player_scored: ball.left() >= (MATRIX_SIZE / 2) as f32,
        };
    }

    if ball.vel.x < 0.0 && paddle_overlaps(ball, player_pointer, |p| p) {
        bounce_off_paddle(ball, player_pointer);
        ball.pos.x = track::track_at(player_pointer as i32).x as f32 + 1.0;
        return Resolution::PaddleHit(Paddle::Player);
    }

    if ball.vel.x > 0.0 && paddle_overlaps(ball, bot_pointer, GridPoint::mirrored) {
        bounce_off_paddle(ball, bot_pointer);
        ball.pos.x =
            track::track_at(bot_pointer as i32).mirrored().x as f32 - BALL_SIZE as f32 - 1.0;
        return Resolution::PaddleHit(Paddle::Bot);
    }

    Resolution::InFlight
}

/// Any of the ball's 2x2 cells on a wall cell
fn touches_wall(ball: &Ball) -> bool {
    (0..BALL_SIZE).any(|dx| {
        (0..BALL_SIZE).any(|dy| {
            let x = (ball.left() + dx as f32) as i32;
            let y = (ball.top() + dy as f32) as i32;
            track::is_wall_cell(x, y)
        })
    })
}

fn paddle_overlaps(ball: &Ball, pointer: usize, place: impl Fn(GridPoint) -> GridPoint) -> bool {
    track::paddle_window(pointer).any(|i| {
        let cell = place(track::PADDLE_TRACK[i]);
        let (px, py) = (cell.x as f32, cell.y as f32);
        ball.left() <= px + 1.0
            && ball.right() >= px
            && ball.top() <= py + 1.0
            && ball.bottom() >= py
    })
}

/// Send the ball back with a vertical kick proportional to the hit offset
fn bounce_off_paddle(ball: &mut Ball, pointer: usize) {
    let center_y = track::track_at(pointer as i32).y as f32;
    let offset = (ball.top() + BALL_SIZE as f32 / 2.0) - center_y;
    ball.reverse_x();
    ball.deflect((offset * PADDLE_DEFLECTION).clamp(-MAX_VELOCITY_Y, MAX_VELOCITY_Y));
}
