//! Level progression and difficulty
//!
//! Winning a rally raises the level, losing one drops it back to zero. The
//! highest level ever reached only grows; each new high is persisted and
//! reported to the leaderboard without blocking the tick loop.

use std::sync::Arc;

use crate::leaderboard::ScoreReporter;
use crate::persistence::{self, KeyValueStore};

pub const CURRENT_LEVEL_KEY: &str = "current_level";
pub const HIGHEST_LEVEL_KEY: &str = "highest_level";

/// Bot mistake probability floor
pub const MIN_BOT_ERROR_CHANCE: f32 = 0.01;

/// Probability that the bot commits to a mistake for a rally.
///
/// 40% at level 1, dropping 3 points per level through level 5, then one
/// point per level down to a 1% floor.
pub fn bot_error_chance(level: u32) -> f32 {
    let level = level as f32;
    if level <= 5.0 {
        0.40 - (level - 1.0) * 0.03
    } else {
        (0.25 - (level - 5.0) * 0.01).max(MIN_BOT_ERROR_CHANCE)
    }
}

/// Ball displacement multiplier: +5% per level
pub fn ball_speed_multiplier(level: u32) -> f32 {
    1.0 + level as f32 * 0.05
}

pub struct LevelManager {
    current: u32,
    highest: u32,
    store: Box<dyn KeyValueStore>,
    reporter: Option<Arc<dyn ScoreReporter>>,
}

impl LevelManager {
    /// Load levels from `store`
    pub fn new(store: Box<dyn KeyValueStore>, reporter: Option<Arc<dyn ScoreReporter>>) -> Self {
        let current = persistence::read_or(store.as_ref(), CURRENT_LEVEL_KEY, 0u32);
        let highest = persistence::read_or(store.as_ref(), HIGHEST_LEVEL_KEY, 0u32);
        log::info!("Levels loaded: current={} highest={}", current, highest);
        Self {
            current,
            // A hand-edited store must not report a current level above the record
            highest: highest.max(current),
            store,
            reporter,
        }
    }

    #[inline]
    pub fn current_level(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn highest_level(&self) -> u32 {
        self.highest
    }

    pub fn bot_error_chance(&self) -> f32 {
        bot_error_chance(self.current)
    }

    pub fn ball_speed_multiplier(&self) -> f32 {
        ball_speed_multiplier(self.current)
    }

    /// Advance one level. Returns the new highest level if a record was set.
    pub fn level_up(&mut self) -> Option<u32> {
        self.current += 1;
        persistence::write(self.store.as_mut(), CURRENT_LEVEL_KEY, &self.current);
        log::info!("Level up: {}", self.current);

        if self.current <= self.highest {
            return None;
        }
        self.highest = self.current;
        persistence::write(self.store.as_mut(), HIGHEST_LEVEL_KEY, &self.highest);
        log::info!("New highest level: {}", self.highest);
        if let Some(reporter) = &self.reporter {
            reporter.report(self.highest);
        }
        Some(self.highest)
    }

    /// Drop back to level 0; the record is kept
    pub fn reset_to_start(&mut self) {
        self.current = 0;
        persistence::write(self.store.as_mut(), CURRENT_LEVEL_KEY, &self.current);
        log::info!("Level reset (highest stays {})", self.highest);
    }
}

impl std::fmt::Debug for LevelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelManager")
            .field("current", &self.current)
            .field("highest", &self.highest)
            .field("reporting", &self.reporter.is_some())
            .finish()
    }
}
