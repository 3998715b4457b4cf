//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (session clock advances 16 ms per tick)
//! - Seeded RNG only
//! - No rendering or platform dependencies; side effects leave as `GameEvent`s

pub mod ball;
pub mod collision;
pub mod paddle;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod track;

pub use ball::Ball;
pub use collision::{Paddle, Resolution, resolve};
pub use paddle::{BotPaddle, HumanPaddle};
pub use schedule::{Deferred, Marquee};
pub use state::{Game, GameEvent, GamePhase, PhaseEvent};
pub use tick::{TickInput, tick};
pub use track::{GridPoint, PADDLE_TRACK, TRACK_LEN, WALL_CELLS, is_wall_cell, track_at};
