//! Fixed timestep simulation tick
//!
//! One call per 60 Hz frame. Input is sampled once at the tick boundary:
//! the latest tilt reading and any long press since the previous tick.

use serde::{Deserialize, Serialize};

use super::collision::{self, Paddle, Resolution};
use super::state::{Game, GameEvent, GamePhase, PhaseEvent};
use crate::audio::AudioCue;
use crate::consts::HAPTIC_HIT_MS;

/// Input for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Latest device tilt in degrees, if a reading is available
    pub tilt_deg: Option<f32>,
    /// Long press on the glyph button
    pub long_press: bool,
}

/// Advance the session by one tick.
///
/// Returns the collision resolution when a rally step ran this tick.
pub fn tick(game: &mut Game, input: &TickInput) -> Option<Resolution> {
    game.advance_clock();

    if input.long_press {
        game.apply(PhaseEvent::LongPress);
    }
    game.run_scheduled();

    if game.phase() != GamePhase::Playing {
        return None;
    }

    if let Some(tilt) = input.tilt_deg {
        game.player.apply_tilt(tilt);
    }

    Some(step_rally(game))
}

fn step_rally(game: &mut Game) -> Resolution {
    let speed_multiplier = game.levels.ball_speed_multiplier();
    game.ball.update(speed_multiplier);

    let error_chance = game.levels.bot_error_chance();
    game.bot
        .observe_ball(game.ball.vel.x, error_chance, &mut game.rng);
    game.bot.update(&game.ball, game.time_ms);

    let resolution = collision::resolve(&mut game.ball, game.player.pointer(), game.bot.pointer());
    match resolution {
        Resolution::Point { player_scored } => {
            game.apply(if player_scored {
                PhaseEvent::RallyWon
            } else {
                PhaseEvent::RallyLost
            });
        }
        Resolution::PaddleHit(paddle) => {
            game.emit(GameEvent::Haptic {
                millis: HAPTIC_HIT_MS,
            });
            game.emit(GameEvent::Sound(match paddle {
                Paddle::Player => AudioCue::PlayerHit,
                Paddle::Bot => AudioCue::BotHit,
            }));
        }
        Resolution::InFlight | Resolution::WallBounce | Resolution::EdgeBounce => {}
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::level::LevelManager;
    use crate::persistence::MemoryStore;
    use glam::Vec2;

    fn new_game(seed: u64) -> Game {
        Game::new(seed, LevelManager::new(Box::new(MemoryStore::new()), None))
    }

    fn press() -> TickInput {
        TickInput {
            long_press: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_start_to_playing() {
        let mut game = new_game(1);
        assert_eq!(tick(&mut game, &TickInput::default()), None);
        assert_eq!(game.phase(), GamePhase::StartScreen);

        assert!(tick(&mut game, &press()).is_some());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.ball.is_moving());
    }

    #[test]
    fn test_tilt_ignored_outside_play() {
        let mut game = new_game(1);
        let input = TickInput {
            tilt_deg: Some(30.0),
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut game, &input);
        }
        assert_eq!(game.player.pointer(), PADDLE_START_INDEX);
    }

    #[test]
    fn test_tilt_moves_player_paddle_during_play() {
        let mut game = new_game(1);
        tick(&mut game, &press());
        tick(
            &mut game,
            &TickInput {
                tilt_deg: Some(-30.0),
                ..Default::default()
            },
        );
        assert!(game.player.pointer() > PADDLE_START_INDEX);
    }

    #[test]
    fn test_player_miss_ends_in_game_over_then_start_screen() {
        let mut game = new_game(1);
        tick(&mut game, &press());
        game.drain_events();

        // Park the ball just past the player paddle, heading out
        game.ball.pos = Vec2::new(0.1, 4.0);
        game.ball.vel = Vec2::new(-game.ball.speed(), 0.0);
        let resolution = tick(&mut game, &TickInput::default());
        assert_eq!(
            resolution,
            Some(Resolution::Point {
                player_scored: false
            })
        );
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(
            game.drain_events()
                .contains(&GameEvent::Sound(AudioCue::Lose))
        );

        let ticks_to_return = RETURN_DELAY_MS / FRAME_TIME_MS + 1;
        for _ in 0..ticks_to_return {
            assert_eq!(tick(&mut game, &TickInput::default()), None);
        }
        assert_eq!(game.phase(), GamePhase::StartScreen);
        assert!(game.marquee().is_active());
    }

    #[test]
    fn test_paddle_hit_emits_feedback() {
        let mut game = new_game(1);
        tick(&mut game, &press());
        game.drain_events();

        game.ball.pos = Vec2::new(0.9, 11.5);
        game.ball.vel = Vec2::new(-game.ball.speed(), 0.0);
        let resolution = tick(&mut game, &TickInput::default());
        assert_eq!(resolution, Some(Resolution::PaddleHit(Paddle::Player)));
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::Haptic {
                    millis: HAPTIC_HIT_MS
                },
                GameEvent::Sound(AudioCue::PlayerHit)
            ]
        );
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_determinism() {
        let mut a = new_game(99999);
        let mut b = new_game(99999);
        let inputs = [
            press(),
            TickInput {
                tilt_deg: Some(10.0),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                tilt_deg: Some(-12.5),
                ..Default::default()
            },
        ];
        for _ in 0..50 {
            for input in &inputs {
                assert_eq!(tick(&mut a, input), tick(&mut b, input));
            }
        }
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.ball.pos, b.ball.pos);
        assert_eq!(a.bot.pointer(), b.bot.pointer());
    }
}
