//! Player preferences
//!
//! Persisted next to the level data in the key/value store, one key per
//! preference. The host may push new settings while the game is running.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Play audio cues
    pub sound_enabled: bool,
    /// Deliver haptic pulses
    pub haptic_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptic_enabled: true,
        }
    }
}

impl Settings {
    pub const SOUND_KEY: &'static str = "sound_enabled";
    pub const HAPTIC_KEY: &'static str = "haptic_enabled";

    /// Load settings, falling back to defaults for missing or malformed keys
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        let settings = Self {
            sound_enabled: persistence::read_or(store, Self::SOUND_KEY, defaults.sound_enabled),
            haptic_enabled: persistence::read_or(
                store,
                Self::HAPTIC_KEY,
                defaults.haptic_enabled,
            ),
        };
        log::info!("Loaded settings: {:?}", settings);
        settings
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        persistence::write(store, Self::SOUND_KEY, &self.sound_enabled);
        persistence::write(store, Self::HAPTIC_KEY, &self.haptic_enabled);
        log::info!("Settings saved");
    }
}
