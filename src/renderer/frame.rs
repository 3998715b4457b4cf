//! Frame compositor
//!
//! A fresh `FrameBuffer` is composed from the game state every tick and
//! flattened row-major for the display sink.

use super::font::{self, CHAR_WIDTH};
use crate::consts::*;
use crate::sim::track::{self, GridPoint, WALL_CELLS};
use crate::sim::{Game, GamePhase};

const SIZE: usize = MATRIX_SIZE as usize;

/// Marquee copies are laid out at this pitch per character
const MARQUEE_CHAR_PITCH: i32 = CHAR_WIDTH + 3;
const MARQUEE_ROW: i32 = 16;

/// 25x25 intensity grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [[u16; SIZE]; SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: [[BRIGHTNESS_OFF; SIZE]; SIZE],
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a pixel; coordinates off the grid are ignored
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, brightness: u16) {
        if (0..MATRIX_SIZE).contains(&x) && (0..MATRIX_SIZE).contains(&y) {
            self.pixels[y as usize][x as usize] = brightness;
        }
    }

    /// Pixel value, `BRIGHTNESS_OFF` off the grid
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u16 {
        if (0..MATRIX_SIZE).contains(&x) && (0..MATRIX_SIZE).contains(&y) {
            self.pixels[y as usize][x as usize]
        } else {
            BRIGHTNESS_OFF
        }
    }

    /// Row-major copy in the display sink format
    pub fn flatten(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(FRAME_LEN);
        for row in &self.pixels {
            out.extend_from_slice(row);
        }
        out
    }

    /// Draw the 5-cell paddle window around `pointer`.
    /// The bot paddle is mirrored onto the right side and dimmed.
    pub fn draw_paddle(&mut self, pointer: usize, bot: bool) {
        for i in track::paddle_window(pointer) {
            let cell = track::PADDLE_TRACK[i];
            let (cell, brightness) = if bot {
                (cell.mirrored(), BRIGHTNESS_DIM)
            } else {
                (cell, BRIGHTNESS_FULL)
            };
            self.set(cell.x, cell.y, brightness);
        }
    }

    /// 2x2 ball at the truncated cell position
    pub fn draw_ball(&mut self, cell: (i32, i32)) {
        let (x, y) = cell;
        for dy in 0..BALL_SIZE {
            for dx in 0..BALL_SIZE {
                self.set(x + dx, y + dy, BRIGHTNESS_FULL);
            }
        }
    }

    pub fn draw_walls(&mut self) {
        for GridPoint { x, y } in WALL_CELLS {
            self.set(x, y, BRIGHTNESS_FULL);
        }
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        font::draw_text(self, text, x, y, BRIGHTNESS_FULL);
    }
}

/// Compose the frame for the current phase
pub fn compose(game: &Game) -> FrameBuffer {
    let mut frame = FrameBuffer::new();
    match game.phase() {
        GamePhase::StartScreen => {
            draw_start_screen(
                &mut frame,
                game.levels.current_level(),
                game.levels.highest_level(),
                game.marquee().offset(),
            );
        }
        GamePhase::Playing => {
            frame.draw_walls();
            frame.draw_paddle(game.player.pointer(), false);
            frame.draw_paddle(game.bot.pointer(), true);
            frame.draw_ball(game.ball.cell());
        }
        GamePhase::LevelUp => {
            frame.draw_text("LEVEL", 3, 7);
            frame.draw_text("UP", 9, 13);
        }
        GamePhase::GameOver => {
            frame.draw_text("YOU", 7, 7);
            frame.draw_text("LOSE", 5, 13);
        }
    }
    frame
}

/// Idle screen: resting paddles, title, centered ball and the level marquee
pub fn draw_start_screen(frame: &mut FrameBuffer, current: u32, highest: u32, scroll: f32) {
    frame.draw_paddle(PADDLE_START_INDEX, false);
    frame.draw_paddle(PADDLE_START_INDEX, true);
    frame.draw_text("PONG", 5, 4);
    let center = MATRIX_SIZE / 2 - 1;
    frame.draw_ball((center, center));

    let text = marquee_text(current, highest);
    let x1 = (MARQUEE_START_X as f32 - scroll) as i32;
    frame.draw_text(&text, x1, MARQUEE_ROW);

    // Second copy so the loop reads seamlessly
    let x2 = x1 + text.chars().count() as i32 * MARQUEE_CHAR_PITCH;
    if x2 < MATRIX_SIZE {
        frame.draw_text(&text, x2, MARQUEE_ROW);
    }
}

pub fn marquee_text(current: u32, highest: u32) -> String {
    format!("LV {} - HI {}    ", current, highest)
}
