//! Glyph Pong - tilt-controlled Pong on a 25x25 LED glyph matrix
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, paddles, collisions, game phases)
//! - `renderer`: Frame compositor and 3x5 bitmap font
//! - `level`: Difficulty progression and level persistence
//! - `platform`: Display/haptic/audio sink traits and tilt input
//! - `persistence`: Key/value storage backends
//! - `service`: Host lifecycle and the fixed-rate tick loop

pub mod audio;
pub mod leaderboard;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod service;
pub mod settings;
pub mod sim;

pub use level::LevelManager;
pub use service::PongService;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Width and height of the glyph matrix
    pub const MATRIX_SIZE: i32 = 25;
    /// Number of pixels in one flattened frame
    pub const FRAME_LEN: usize = (MATRIX_SIZE * MATRIX_SIZE) as usize;

    /// Tick loop rate
    pub const FRAME_RATE: u64 = 60;
    /// Milliseconds advanced per tick
    pub const FRAME_TIME_MS: u64 = 1000 / FRAME_RATE;

    /// Pixel intensities understood by the display
    pub const BRIGHTNESS_OFF: u16 = 0;
    pub const BRIGHTNESS_FULL: u16 = 2047;
    /// Opponent paddle is drawn at roughly half brightness
    pub const BRIGHTNESS_DIM: u16 = 1024;

    /// Ball is a 2x2 block
    pub const BALL_SIZE: i32 = 2;
    pub const INITIAL_BALL_SPEED: f32 = 0.2;
    pub const MAX_BALL_SPEED: f32 = 0.5;
    /// Per-tick speed growth while a rally is running
    pub const BALL_ACCELERATION: f32 = 1.001;
    /// Hard cap on vertical velocity
    pub const MAX_VELOCITY_Y: f32 = 0.8;
    /// |vx| never drops below this fraction of the current speed
    pub const MIN_X_FRACTION: f32 = 0.5;
    /// Launch angle is drawn from [-LAUNCH_ANGLE_DEG, LAUNCH_ANGLE_DEG]
    pub const LAUNCH_ANGLE_DEG: f32 = 30.0;

    /// Paddle window spans pointer-2..=pointer+2
    pub const PADDLE_HALF_LENGTH: i32 = 2;
    /// Rest position on the track
    pub const PADDLE_START_INDEX: usize = 13;
    /// Vertical deflection per pixel of offset from the paddle center
    pub const PADDLE_DEFLECTION: f32 = 0.15;

    /// Tilt range mapped onto the whole track
    pub const MAX_TILT_DEG: f32 = 30.0;
    pub const EDGE_SMOOTHING: f32 = 0.8;
    pub const CENTER_SMOOTHING: f32 = 0.6;

    pub const BOT_REACTION_MS: u64 = 200;
    pub const BOT_SMOOTHING: f32 = 0.15;
    pub const BOT_MAX_ERROR: i32 = 4;

    /// LEVEL_UP / GAME_OVER screens return to the start screen after this delay
    pub const RETURN_DELAY_MS: u64 = 2000;

    pub const MARQUEE_SPEED: f32 = 0.2;
    pub const MARQUEE_RESET: f32 = 80.0;
    pub const MARQUEE_START_X: i32 = MATRIX_SIZE;

    /// Audio cues arriving inside this window after a cue are dropped
    pub const AUDIO_COOLDOWN_MS: u64 = 100;

    /// Haptic pulse lengths
    pub const HAPTIC_START_MS: u64 = 50;
    pub const HAPTIC_HIT_MS: u64 = 50;
    pub const HAPTIC_WIN_MS: u64 = 100;
    pub const HAPTIC_LOSE_MS: u64 = 300;
}
