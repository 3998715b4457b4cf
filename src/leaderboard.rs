//! Remote leaderboard boundary
//!
//! The game never waits on the network: a new highest level is handed to a
//! `ScoreReporter`, and the default reporter submits it from a background
//! thread. Failures are logged and dropped; retry policy belongs to the client.

use std::sync::Arc;
use std::thread;

use thiserror::Error;

/// Username used when the collaborator cannot resolve one
pub const UNKNOWN_USERNAME: &str = "Unknown";

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Remote leaderboard collaborator
pub trait LeaderboardClient: Send + Sync {
    /// Resolve (registering if needed) the player's username
    fn ensure_username(&self) -> Result<String, LeaderboardError>;

    fn submit_score(&self, username: &str, score: u32) -> Result<(), LeaderboardError>;
}

/// Receives new highest levels from the level manager
pub trait ScoreReporter: Send + Sync {
    fn report(&self, level: u32);
}

/// Fire-and-forget submitter backed by a `LeaderboardClient`
#[derive(Clone)]
pub struct LeaderboardSubmitter {
    client: Arc<dyn LeaderboardClient>,
}

impl LeaderboardSubmitter {
    pub fn new(client: Arc<dyn LeaderboardClient>) -> Self {
        Self { client }
    }

    /// Resolve the username and submit, swallowing every failure
    pub fn submit_blocking(client: &dyn LeaderboardClient, level: u32) {
        let username = client.ensure_username().unwrap_or_else(|e| {
            log::warn!("Could not resolve username: {}", e);
            UNKNOWN_USERNAME.to_string()
        });
        match client.submit_score(&username, level) {
            Ok(()) => log::info!("Submitted level {} for {}", level, username),
            Err(e) => log::warn!("Score submission failed: {}", e),
        }
    }
}

impl ScoreReporter for LeaderboardSubmitter {
    fn report(&self, level: u32) {
        let client = Arc::clone(&self.client);
        let spawned = thread::Builder::new()
            .name("leaderboard-submit".into())
            .spawn(move || Self::submit_blocking(client.as_ref(), level));
        if let Err(e) = spawned {
            log::warn!("Could not start score submission: {}", e);
        }
    }
}

/// Client that only logs; used by the offline demo host
#[derive(Debug, Default)]
pub struct LogLeaderboard {
    pub username: String,
}

impl LeaderboardClient for LogLeaderboard {
    fn ensure_username(&self) -> Result<String, LeaderboardError> {
        if self.username.is_empty() {
            Err(LeaderboardError::Unavailable("no username configured".into()))
        } else {
            Ok(self.username.clone())
        }
    }

    fn submit_score(&self, username: &str, score: u32) -> Result<(), LeaderboardError> {
        log::info!("[leaderboard] {} reached level {}", username, score);
        Ok(())
    }
}
