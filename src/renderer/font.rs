//! 3x5 bitmap font
//!
//! Each glyph row is a 3-bit mask, most significant bit on the left.
//! Supported: the letters used by the game screens, digits, space and hyphen.

use super::frame::FrameBuffer;

pub const CHAR_WIDTH: i32 = 3;
pub const CHAR_HEIGHT: i32 = 5;
pub const CHAR_SPACING: i32 = 1;
/// Horizontal distance between consecutive character origins
pub const CHAR_ADVANCE: i32 = CHAR_WIDTH + CHAR_SPACING;

pub type Glyph = [u8; CHAR_HEIGHT as usize];

/// Bit pattern for `c`, or `None` if the font has no such character
pub fn glyph(c: char) -> Option<Glyph> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        _ => return None,
    };
    Some(rows)
}

/// Draw one character with its top-left corner at (x, y).
/// Unknown characters draw nothing; off-grid pixels are clipped.
pub fn draw_char(frame: &mut FrameBuffer, c: char, x: i32, y: i32, brightness: u16) {
    let Some(rows) = glyph(c) else {
        return;
    };
    for (dy, row) in rows.iter().enumerate() {
        for dx in 0..CHAR_WIDTH {
            if row & (0b100 >> dx) != 0 {
                frame.set(x + dx, y + dy as i32, brightness);
            }
        }
    }
}

/// Lay out `text` left to right starting at (x, y)
pub fn draw_text(frame: &mut FrameBuffer, text: &str, x: i32, y: i32, brightness: u16) {
    let mut cursor = x;
    for c in text.chars() {
        if cursor < crate::consts::MATRIX_SIZE {
            draw_char(frame, c, cursor, y, brightness);
        }
        cursor += CHAR_ADVANCE;
    }
}
