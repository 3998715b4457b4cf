//! Audio cues
//!
//! The game plays four short cues through a host-provided `AudioSink`. Cues
//! are rate limited: one arriving within the cooldown of the previous cue is
//! dropped, not queued.

use serde::{Deserialize, Serialize};

use crate::consts::AUDIO_COOLDOWN_MS;
use crate::platform::AudioSink;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Ball returned by the player paddle
    PlayerHit,
    /// Ball returned by the bot paddle
    BotHit,
    /// Rally won
    Win,
    /// Rally lost
    Lose,
}

impl AudioCue {
    /// Asset name the host maps to a sound clip
    pub fn asset_name(&self) -> &'static str {
        match self {
            AudioCue::PlayerHit => "player_hit",
            AudioCue::BotHit => "bot_hit",
            AudioCue::Win => "win",
            AudioCue::Lose => "lose",
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Option<Box<dyn AudioSink>>,
    /// Cues are dropped until this session time
    busy_until_ms: Option<u64>,
}

impl AudioManager {
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        if sink.is_none() {
            log::warn!("No audio sink - audio disabled");
        }
        Self {
            sink,
            busy_until_ms: None,
        }
    }

    /// Play a cue at session time `now_ms`. Returns whether it reached the sink.
    pub fn play(&mut self, cue: AudioCue, now_ms: u64, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        if self.busy_until_ms.is_some_and(|until| now_ms < until) {
            log::debug!("Dropping {:?}: audio cooldown", cue);
            return false;
        }
        sink.play(cue);
        self.busy_until_ms = Some(now_ms + AUDIO_COOLDOWN_MS);
        true
    }

    /// Release the sink; later cues are dropped
    pub fn release(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.release();
            log::info!("Audio released");
        }
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("has_sink", &self.sink.is_some())
            .field("busy_until_ms", &self.busy_until_ms)
            .finish()
    }
}
