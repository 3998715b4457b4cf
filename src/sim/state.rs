//! Game phases and the session state
//!
//! `GamePhase::next` is the whole state machine as a pure function; `Game`
//! applies its result and runs the entry actions of the new phase.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::paddle::{BotPaddle, HumanPaddle};
use super::schedule::{Deferred, Marquee};
use crate::audio::AudioCue;
use crate::consts::*;
use crate::level::LevelManager;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle screen with the scrolling level marquee
    StartScreen,
    /// Active rally
    Playing,
    /// Player won the rally
    LevelUp,
    /// Player lost the rally
    GameOver,
}

/// Inputs to the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// Long press on the glyph button
    LongPress,
    /// Ball got past the bot
    RallyWon,
    /// Ball got past the player
    RallyLost,
    /// Result screen timeout
    ReturnElapsed,
}

impl GamePhase {
    pub const ALL: [GamePhase; 4] = [
        GamePhase::StartScreen,
        GamePhase::Playing,
        GamePhase::LevelUp,
        GamePhase::GameOver,
    ];

    /// Transition function. Events that mean nothing in a phase leave it unchanged.
    pub fn next(self, event: PhaseEvent) -> GamePhase {
        use GamePhase::*;
        use PhaseEvent::*;
        match (self, event) {
            (StartScreen, LongPress) => Playing,
            (Playing, RallyWon) => LevelUp,
            (Playing, RallyLost) => GameOver,
            (LevelUp | GameOver, LongPress | ReturnElapsed) => StartScreen,
            (phase, _) => phase,
        }
    }
}

/// Side effects for the host to deliver after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Haptic { millis: u64 },
    Sound(AudioCue),
}

/// One running session. The tick loop is its only writer.
#[derive(Debug)]
pub struct Game {
    phase: GamePhase,
    pub ball: Ball,
    pub player: HumanPaddle,
    pub bot: BotPaddle,
    pub levels: LevelManager,
    pub(crate) rng: Pcg32,
    /// Session clock, advanced once per tick
    pub(crate) time_ms: u64,
    return_timer: Deferred,
    marquee: Marquee,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(seed: u64, levels: LevelManager) -> Self {
        let mut marquee = Marquee::default();
        marquee.start();
        Self {
            phase: GamePhase::StartScreen,
            ball: Ball::new(),
            player: HumanPaddle::default(),
            bot: BotPaddle::default(),
            levels,
            rng: Pcg32::seed_from_u64(seed),
            time_ms: 0,
            return_timer: Deferred::default(),
            marquee,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    pub fn return_timer(&self) -> &Deferred {
        &self.return_timer
    }

    /// Number of scheduled tasks currently alive (never more than one)
    pub fn active_tasks(&self) -> usize {
        usize::from(self.return_timer.is_armed()) + usize::from(self.marquee.is_active())
    }

    /// Take the side effects produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn advance_clock(&mut self) {
        self.time_ms += FRAME_TIME_MS;
    }

    /// Drive the scheduled tasks for the current tick
    pub(crate) fn run_scheduled(&mut self) {
        if self.return_timer.poll(self.time_ms) {
            self.apply(PhaseEvent::ReturnElapsed);
        }
        self.marquee.advance();
    }

    /// Feed an event to the phase machine. Returns the phase after the event.
    pub fn apply(&mut self, event: PhaseEvent) -> GamePhase {
        let next = self.phase.next(event);
        if next == self.phase {
            return next;
        }
        log::info!("{:?} -> {:?} ({:?})", self.phase, next, event);
        self.phase = next;

        // Old tasks never outlive the phase that scheduled them
        self.return_timer.cancel();
        self.marquee.stop();

        match next {
            GamePhase::StartScreen => {
                self.marquee.start();
            }
            GamePhase::Playing => {
                self.ball.reset();
                self.bot.start_rally();
                self.ball.start(&mut self.rng);
                self.emit(GameEvent::Haptic {
                    millis: HAPTIC_START_MS,
                });
            }
            GamePhase::LevelUp => {
                self.ball.reset();
                self.levels.level_up();
                self.emit(GameEvent::Haptic {
                    millis: HAPTIC_WIN_MS,
                });
                self.emit(GameEvent::Sound(AudioCue::Win));
                self.return_timer.arm(self.time_ms, RETURN_DELAY_MS);
            }
            GamePhase::GameOver => {
                self.ball.reset();
                self.levels.reset_to_start();
                self.emit(GameEvent::Haptic {
                    millis: HAPTIC_LOSE_MS,
                });
                self.emit(GameEvent::Sound(AudioCue::Lose));
                self.return_timer.arm(self.time_ms, RETURN_DELAY_MS);
            }
        }
        next
    }
}
