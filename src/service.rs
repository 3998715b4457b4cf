//! Host lifecycle and the fixed-rate game loop
//!
//! `PongService::on_activate` starts a dedicated loop thread that owns the
//! whole session and is its only writer. Everything else reaches the session
//! through the command channel or the single-slot tilt input:
//!
//! ```text
//! sensor ──► TiltInput ──┐
//! host ──► Command ──────┼──► loop thread: tick ► feedback ► compose ► DisplaySink
//! ```

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::audio::AudioManager;
use crate::consts::FRAME_RATE;
use crate::leaderboard::{LeaderboardClient, LeaderboardSubmitter, ScoreReporter};
use crate::level::LevelManager;
use crate::persistence::{BackgroundStore, KeyValueStore, SharedStore};
use crate::platform::{AudioSink, DisplaySink, HapticSink, TiltInput};
use crate::renderer::{self, FrameBuffer};
use crate::settings::Settings;
use crate::sim::{self, Game, GameEvent, TickInput};

const FRAME_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / FRAME_RATE);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("game loop is already running")]
    AlreadyActive,

    #[error("could not start game loop: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Messages from the host to the loop thread
#[derive(Debug, Clone)]
enum Command {
    LongPress,
    UpdateSettings(Settings),
    Stop,
}

/// A game plus its feedback outputs.
///
/// Stepping never waits on storage as long as the level and settings stores
/// are `BackgroundStore`s, which is how `PongService` builds it.
pub struct Session {
    game: Game,
    settings: Settings,
    store: Box<dyn KeyValueStore>,
    haptics: Option<Box<dyn HapticSink>>,
    audio: AudioManager,
}

impl Session {
    pub fn new(
        game: Game,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        haptics: Option<Box<dyn HapticSink>>,
        audio: Option<Box<dyn AudioSink>>,
    ) -> Self {
        Self {
            game,
            settings,
            store,
            haptics,
            audio: AudioManager::new(audio),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Apply and persist new settings; they govern feedback from the next tick on
    pub fn update_settings(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }
        log::info!("Settings updated: {:?}", settings);
        self.settings = settings;
        settings.save(self.store.as_mut());
    }

    /// Run one tick, deliver its feedback and compose the frame
    pub fn step(&mut self, input: &TickInput) -> FrameBuffer {
        sim::tick(&mut self.game, input);
        let now_ms = self.game.time_ms();
        for event in self.game.drain_events() {
            match event {
                GameEvent::Haptic { millis } => {
                    if !self.settings.haptic_enabled {
                        continue;
                    }
                    if let Some(haptics) = self.haptics.as_mut() {
                        haptics.pulse(millis);
                    }
                }
                GameEvent::Sound(cue) => {
                    self.audio.play(cue, now_ms, self.settings.sound_enabled);
                }
            }
        }
        renderer::compose(&self.game)
    }

    /// Release feedback resources
    pub fn shutdown(&mut self) {
        self.audio.release();
    }
}

struct LoopHandle {
    commands: Sender<Command>,
    thread: JoinHandle<()>,
    writer: BackgroundStore,
}

/// Glyph toy service: owns the configuration until activation, then the loop thread
pub struct PongService {
    store: SharedStore,
    settings: Settings,
    leaderboard: Option<Arc<dyn LeaderboardClient>>,
    haptics: Option<Box<dyn HapticSink>>,
    audio: Option<Box<dyn AudioSink>>,
    tilt: TiltInput,
    seed: u64,
    running: Option<LoopHandle>,
}

impl PongService {
    /// Settings are loaded from `store`, which also backs level persistence
    pub fn new(
        store: Box<dyn KeyValueStore>,
        leaderboard: Option<Arc<dyn LeaderboardClient>>,
        haptics: Option<Box<dyn HapticSink>>,
        audio: Option<Box<dyn AudioSink>>,
    ) -> Self {
        let store = SharedStore::new(store);
        let settings = Settings::load(&store);
        Self {
            store,
            settings,
            leaderboard,
            haptics,
            audio,
            tilt: TiltInput::new(),
            seed: rand::random(),
            running: None,
        }
    }

    /// Fix the RNG seed of the next session
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Handle for the tilt sensor to publish readings into
    pub fn tilt_input(&self) -> TiltInput {
        self.tilt.clone()
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Build the session and start the 60 Hz loop rendering into `display`.
    ///
    /// Haptic and audio sinks are handed to the session; they are released when
    /// it is deactivated.
    pub fn on_activate(&mut self, display: Box<dyn DisplaySink>) -> Result<(), ServiceError> {
        if self.running.is_some() {
            return Err(ServiceError::AlreadyActive);
        }

        let reporter = self.leaderboard.clone().map(|client| {
            Arc::new(LeaderboardSubmitter::new(client)) as Arc<dyn ScoreReporter>
        });
        let writer = BackgroundStore::spawn(self.store.clone())?;
        let levels = LevelManager::new(Box::new(writer.clone()), reporter);
        let session = Session::new(
            Game::new(self.seed, levels),
            self.settings,
            Box::new(writer.clone()),
            self.haptics.take(),
            self.audio.take(),
        );

        let (tx, rx) = mpsc::channel();
        let tilt = self.tilt.clone();
        let thread = thread::Builder::new()
            .name("glyph-pong-loop".into())
            .spawn(move || run_loop(session, display, rx, tilt))?;

        log::info!("Game loop started (seed {})", self.seed);
        self.running = Some(LoopHandle {
            commands: tx,
            thread,
            writer,
        });
        Ok(())
    }

    /// Stop the loop and release its resources. A no-op when not running.
    pub fn on_deactivate(&mut self) {
        let Some(handle) = self.running.take() else {
            return;
        };
        // The loop also stops if the channel is already gone
        let _ = handle.commands.send(Command::Stop);
        if handle.thread.join().is_err() {
            log::warn!("Game loop panicked");
        }
        handle.writer.sync();
        log::info!("Game loop stopped");
    }

    /// Long press on the glyph button
    pub fn long_press(&self) {
        self.send(Command::LongPress);
    }

    /// Store new settings and forward them to the running session
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if self.running.is_some() {
            self.send(Command::UpdateSettings(settings));
        } else {
            settings.save(&mut self.store);
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    fn send(&self, command: Command) {
        match &self.running {
            Some(handle) => {
                if handle.commands.send(command).is_err() {
                    log::warn!("Game loop is gone; dropping command");
                }
            }
            None => log::debug!("Ignoring {:?}: service not active", command),
        }
    }
}

impl Drop for PongService {
    fn drop(&mut self) {
        self.on_deactivate();
    }
}

fn run_loop(
    mut session: Session,
    mut display: Box<dyn DisplaySink>,
    commands: Receiver<Command>,
    tilt: TiltInput,
) {
    let mut next_frame = Instant::now();
    'frames: loop {
        let mut input = TickInput {
            tilt_deg: tilt.take(),
            long_press: false,
        };
        loop {
            match commands.try_recv() {
                Ok(Command::LongPress) => input.long_press = true,
                Ok(Command::UpdateSettings(settings)) => session.update_settings(settings),
                Ok(Command::Stop) | Err(TryRecvError::Disconnected) => break 'frames,
                Err(TryRecvError::Empty) => break,
            }
        }

        let frame = session.step(&input);
        display.show(&frame.flatten());

        next_frame += FRAME_PERIOD;
        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        } else {
            // Fell behind; don't try to catch up with a burst of ticks
            next_frame = now;
        }
    }
    session.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCue;
    use crate::level::{CURRENT_LEVEL_KEY, HIGHEST_LEVEL_KEY};
    use crate::persistence::{self, MemoryStore, StorageError};
    use crate::sim::{GamePhase, PhaseEvent};
    use glam::Vec2;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Pulses(Arc<Mutex<Vec<u64>>>);

    impl HapticSink for Pulses {
        fn pulse(&mut self, millis: u64) {
            self.0.lock().unwrap().push(millis);
        }
    }

    #[derive(Clone, Default)]
    struct Cues(Arc<Mutex<Vec<AudioCue>>>);

    impl AudioSink for Cues {
        fn play(&mut self, cue: AudioCue) {
            self.0.lock().unwrap().push(cue);
        }
    }

    fn session(settings: Settings, store: &MemoryStore) -> (Session, Pulses, Cues) {
        let pulses = Pulses::default();
        let cues = Cues::default();
        let levels = LevelManager::new(Box::new(store.clone()), None);
        let session = Session::new(
            Game::new(3, levels),
            settings,
            Box::new(store.clone()),
            Some(Box::new(pulses.clone())),
            Some(Box::new(cues.clone())),
        );
        (session, pulses, cues)
    }

    fn press() -> TickInput {
        TickInput {
            long_press: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_step_delivers_feedback() {
        let store = MemoryStore::new();
        let (mut session, pulses, cues) = session(Settings::default(), &store);
        session.step(&press());
        assert_eq!(session.game().phase(), GamePhase::Playing);
        assert_eq!(*pulses.0.lock().unwrap(), vec![50]);

        session.game_mut().apply(PhaseEvent::RallyLost);
        session.step(&TickInput::default());
        assert_eq!(*pulses.0.lock().unwrap(), vec![50, 300]);
        assert_eq!(*cues.0.lock().unwrap(), vec![AudioCue::Lose]);
    }

    #[test]
    fn test_settings_suppress_feedback() {
        let store = MemoryStore::new();
        let muted = Settings {
            sound_enabled: false,
            haptic_enabled: false,
        };
        let (mut session, pulses, cues) = session(muted, &store);
        session.step(&press());
        session.game_mut().apply(PhaseEvent::RallyWon);
        session.step(&TickInput::default());
        assert!(pulses.0.lock().unwrap().is_empty());
        assert!(cues.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_update_settings_persists() {
        let store = MemoryStore::new();
        let (mut session, pulses, _) = session(Settings::default(), &store);
        session.update_settings(Settings {
            sound_enabled: true,
            haptic_enabled: false,
        });
        assert!(!Settings::load(&store).haptic_enabled);
        session.step(&press());
        assert!(pulses.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_step_returns_phase_frame() {
        let store = MemoryStore::new();
        let (mut session, _, _) = session(Settings::default(), &store);
        let frame = session.step(&TickInput::default());
        assert_eq!(frame, renderer::compose(session.game()));
    }

    /// Backend that takes far longer than a frame to write
    struct SlowStore(MemoryStore);

    impl KeyValueStore for SlowStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
            thread::sleep(Duration::from_millis(300));
            self.0.set(key, value)
        }
    }

    #[test]
    fn test_winning_tick_does_not_wait_for_storage() {
        let backend = MemoryStore::new();
        let shared = SharedStore::new(Box::new(SlowStore(backend.clone())));
        let writer = BackgroundStore::spawn(shared).unwrap();
        let levels = LevelManager::new(Box::new(writer.clone()), None);
        let mut session = Session::new(
            Game::new(5, levels),
            Settings::default(),
            Box::new(writer.clone()),
            None,
            None,
        );

        session.step(&press());
        let speed = session.game().ball.speed();
        session.game_mut().ball.pos = Vec2::new(22.95, 4.0);
        session.game_mut().ball.vel = Vec2::new(speed, 0.0);

        let started = Instant::now();
        session.step(&TickInput::default());
        let elapsed = started.elapsed();
        assert_eq!(session.game().phase(), GamePhase::LevelUp);
        assert!(elapsed < FRAME_PERIOD, "winning tick took {:?}", elapsed);

        let started = Instant::now();
        session.update_settings(Settings {
            sound_enabled: false,
            haptic_enabled: true,
        });
        assert!(started.elapsed() < FRAME_PERIOD);

        // In-memory levels are current before the writes land
        assert_eq!(session.game().levels.current_level(), 1);
        writer.sync();
        assert_eq!(persistence::read_or(&backend, CURRENT_LEVEL_KEY, 0u32), 1);
        assert_eq!(persistence::read_or(&backend, HIGHEST_LEVEL_KEY, 0u32), 1);
        assert!(!Settings::load(&backend).sound_enabled);
    }

    #[test]
    fn test_deactivate_flushes_pending_writes() {
        let backend = MemoryStore::new();
        let mut service =
            PongService::new(Box::new(SlowStore(backend.clone())), None, None, None).with_seed(2);
        service.on_activate(Box::new(Frames::default())).unwrap();
        let muted = Settings {
            sound_enabled: false,
            haptic_enabled: false,
        };
        service.update_settings(muted);
        thread::sleep(Duration::from_millis(50));
        service.on_deactivate();
        assert_eq!(Settings::load(&backend), muted);
    }

    #[derive(Clone, Default)]
    struct Frames(Arc<Mutex<usize>>);

    impl DisplaySink for Frames {
        fn show(&mut self, frame: &[u16]) {
            assert_eq!(frame.len(), crate::consts::FRAME_LEN);
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_activate_and_deactivate() {
        let frames = Frames::default();
        let mut service =
            PongService::new(Box::new(MemoryStore::new()), None, None, None).with_seed(1);
        service.on_activate(Box::new(frames.clone())).unwrap();
        assert!(service.is_active());
        assert!(matches!(
            service.on_activate(Box::new(frames.clone())),
            Err(ServiceError::AlreadyActive)
        ));

        service.long_press();
        service.tilt_input().set(10.0);
        thread::sleep(Duration::from_millis(100));
        service.on_deactivate();
        assert!(!service.is_active());
        assert!(*frames.0.lock().unwrap() > 0);

        // Second deactivation is a no-op
        service.on_deactivate();
        let shown = *frames.0.lock().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(*frames.0.lock().unwrap(), shown);
    }

    #[test]
    fn test_settings_saved_while_inactive() {
        let store = MemoryStore::new();
        let mut service = PongService::new(Box::new(store.clone()), None, None, None);
        let muted = Settings {
            sound_enabled: false,
            haptic_enabled: true,
        };
        service.update_settings(muted);
        assert_eq!(service.settings(), muted);
        assert_eq!(Settings::load(&store), muted);
    }
}
