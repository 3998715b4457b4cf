//! LED matrix rendering
//!
//! Everything is drawn into a 25x25 intensity buffer: paddles, ball, walls,
//! and text through the 3x5 bitmap font.

pub mod font;
pub mod frame;

pub use frame::{FrameBuffer, compose};
