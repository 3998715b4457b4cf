//! Platform abstraction layer
//!
//! The host device provides:
//! - a display sink for 625-pixel frames
//! - haptic and audio outputs
//! - a tilt sensor, sampled through `TiltInput`

use std::sync::{Arc, Mutex};

use crate::audio::AudioCue;

/// Receives one flattened row-major frame per tick
pub trait DisplaySink: Send {
    fn show(&mut self, frame: &[u16]);
}

pub trait HapticSink: Send {
    fn pulse(&mut self, millis: u64);
}

pub trait AudioSink: Send {
    fn play(&mut self, cue: AudioCue);

    /// Free any playback resources; called on deactivation
    fn release(&mut self) {}
}

/// Latest tilt reading, overwritten by the sensor and sampled by the tick loop.
///
/// Only the most recent sample matters; older ones are discarded.
#[derive(Debug, Clone, Default)]
pub struct TiltInput {
    latest: Arc<Mutex<Option<f32>>>,
}

impl TiltInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new reading in degrees
    pub fn set(&self, tilt_deg: f32) {
        *self.latest.lock().expect("tilt mutex poisoned") = Some(tilt_deg);
    }

    /// Take the reading, leaving the slot empty until the sensor reports again
    pub fn take(&self) -> Option<f32> {
        self.latest.lock().expect("tilt mutex poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_keeps_latest_only() {
        let tilt = TiltInput::new();
        assert_eq!(tilt.take(), None);

        let sensor = tilt.clone();
        sensor.set(5.0);
        sensor.set(-12.0);
        assert_eq!(tilt.take(), Some(-12.0));
        assert_eq!(tilt.take(), None);

        sensor.set(3.0);
        assert_eq!(tilt.take(), Some(3.0));
    }
}
