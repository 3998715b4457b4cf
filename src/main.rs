//! Glyph Pong headless demo host
//!
//! Drives the game with a synthetic tilt sensor and periodic long presses,
//! printing the LED matrix to the terminal.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glyph_pong::audio::AudioCue;
use glyph_pong::consts::*;
use glyph_pong::leaderboard::{LeaderboardClient, LogLeaderboard};
use glyph_pong::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use glyph_pong::platform::{AudioSink, DisplaySink, HapticSink};
use glyph_pong::service::{PongService, ServiceError};

const STATE_PATH_VAR: &str = "GLYPH_PONG_STATE";
const DEFAULT_STATE_PATH: &str = "glyph_pong_state.json";

const DEMO_DURATION: Duration = Duration::from_secs(20);
const LONG_PRESS_INTERVAL: Duration = Duration::from_secs(4);
const SENSOR_INTERVAL: Duration = Duration::from_millis(20);
/// Print every Nth frame
const PRINT_EVERY: u64 = 30;

/// Prints the matrix as text: '#' full, '+' dimmed
struct ConsoleDisplay {
    frames: u64,
}

impl DisplaySink for ConsoleDisplay {
    fn show(&mut self, frame: &[u16]) {
        self.frames += 1;
        if self.frames % PRINT_EVERY != 0 {
            return;
        }
        let mut out = String::with_capacity(FRAME_LEN * 2 + MATRIX_SIZE as usize + 32);
        out.push_str(&format!("frame {}\n", self.frames));
        for row in frame.chunks(MATRIX_SIZE as usize) {
            for &pixel in row {
                out.push(match pixel {
                    BRIGHTNESS_OFF => '.',
                    BRIGHTNESS_FULL => '#',
                    _ => '+',
                });
                out.push(' ');
            }
            out.push('\n');
        }
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    }
}

struct LogHaptics;

impl HapticSink for LogHaptics {
    fn pulse(&mut self, millis: u64) {
        log::debug!("[haptic] {} ms", millis);
    }
}

struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        log::info!("[audio] {}", cue.asset_name());
    }

    fn release(&mut self) {
        log::info!("[audio] released");
    }
}

fn open_store() -> Box<dyn KeyValueStore> {
    let path = std::env::var(STATE_PATH_VAR).unwrap_or_else(|_| DEFAULT_STATE_PATH.to_string());
    match JsonFileStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Could not open {}: {} - progress will not be saved", path, e);
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<(), ServiceError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Glyph Pong (headless) starting...");

    let leaderboard: Arc<dyn LeaderboardClient> = Arc::new(LogLeaderboard {
        username: "Player0001".into(),
    });
    let mut service = PongService::new(
        open_store(),
        Some(leaderboard),
        Some(Box::new(LogHaptics)),
        Some(Box::new(LogAudio)),
    );
    service.on_activate(Box::new(ConsoleDisplay { frames: 0 }))?;

    let tilt = service.tilt_input();
    let started = Instant::now();
    let mut last_press = started;
    service.long_press();

    while started.elapsed() < DEMO_DURATION {
        // Rock the device back and forth
        let t = started.elapsed().as_secs_f32();
        tilt.set((t * 1.3).sin() * MAX_TILT_DEG);

        if last_press.elapsed() >= LONG_PRESS_INTERVAL {
            service.long_press();
            last_press = Instant::now();
        }
        thread::sleep(SENSOR_INTERVAL);
    }

    service.on_deactivate();
    log::info!("Glyph Pong finished");
    Ok(())
}
