//! Key/value persistence
//!
//! The game only persists a handful of scalars (levels and feedback toggles).
//! Backends:
//! - `MemoryStore`: shared in-process map (tests, headless hosts)
//! - `JsonFileStore`: one JSON object on disk, rewritten tmp → rename on every set
//! - `SharedStore`: any backend behind a mutex, for handing to several owners
//! - `BackgroundStore`: hands every write to a writer thread so callers on the
//!   game loop never wait on the backend
//!
//! Reads never fail: a missing or malformed value falls back to the caller's
//! default. Write failures are logged and swallowed by `write`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed store contents: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background writer has stopped")]
    WriterStopped,
}

/// Minimal key/value store
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Read `key`, falling back to `default` when absent or of the wrong shape
pub fn read_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed value for '{}': {}", key, e);
            default
        }),
        None => default,
    }
}

/// Write `value` under `key`; failures are logged, never propagated
pub fn write<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_value(value)
        .map_err(StorageError::from)
        .and_then(|v| store.set(key, v));
    if let Err(e) = result {
        log::warn!("Failed to persist '{}': {}", key, e);
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object persisted to a single file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; a corrupt one is
    /// logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(entries) => {
                    log::info!("Loaded {} stored values from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    log::warn!("Discarding corrupt store {}: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// A boxed store shared between owners. Clones refer to the same backend.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Box<dyn KeyValueStore>>>,
}

impl SharedStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().expect("store mutex poisoned").get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.inner.lock().expect("store mutex poisoned").set(key, value)
    }
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore").finish_non_exhaustive()
    }
}

enum WriteRequest {
    Set(String, Value),
    Sync(Sender<()>),
}

/// Store whose writes reach the backend from a dedicated thread.
///
/// `set` records the value and returns at once. Reads see every value handed
/// over, whether or not the backend has it yet. The thread exits once the
/// last clone is dropped, after draining what was queued.
#[derive(Clone)]
pub struct BackgroundStore {
    backend: SharedStore,
    written: Arc<Mutex<HashMap<String, Value>>>,
    requests: Sender<WriteRequest>,
}

impl BackgroundStore {
    pub fn spawn(backend: SharedStore) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut writer = backend.clone();
        thread::Builder::new()
            .name("glyph-pong-store".into())
            .spawn(move || {
                for request in rx {
                    match request {
                        WriteRequest::Set(key, value) => {
                            if let Err(e) = writer.set(&key, value) {
                                log::warn!("Failed to persist '{}': {}", key, e);
                            }
                        }
                        WriteRequest::Sync(done) => {
                            let _ = done.send(());
                        }
                    }
                }
                log::debug!("Store writer finished");
            })?;
        Ok(Self {
            backend,
            written: Arc::new(Mutex::new(HashMap::new())),
            requests: tx,
        })
    }

    /// Block until every write queued so far has reached the backend
    pub fn sync(&self) {
        let (tx, rx) = mpsc::channel();
        if self.requests.send(WriteRequest::Sync(tx)).is_ok() {
            let _ = rx.recv();
        }
    }
}

impl KeyValueStore for BackgroundStore {
    fn get(&self, key: &str) -> Option<Value> {
        let written = self
            .written
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned();
        written.or_else(|| self.backend.get(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.written
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.clone());
        self.requests
            .send(WriteRequest::Set(key.to_string(), value))
            .map_err(|_| StorageError::WriterStopped)
    }
}

impl std::fmt::Debug for BackgroundStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glyph_pong_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        write(&mut writer, "current_level", &3u32);
        assert_eq!(read_or(&store, "current_level", 0u32), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_read_or_falls_back() {
        let mut store = MemoryStore::new();
        assert!(read_or(&store, "sound_enabled", true));
        store.set("sound_enabled", Value::String("nope".into())).unwrap();
        assert!(read_or(&store, "sound_enabled", true));
    }

    #[test]
    fn test_shared_store_writes_through() {
        let backend = MemoryStore::new();
        let shared = SharedStore::new(Box::new(backend.clone()));
        let mut a = shared.clone();
        write(&mut a, "highest_level", &4u32);
        assert_eq!(read_or(&shared, "highest_level", 0u32), 4);
        assert_eq!(read_or(&backend, "highest_level", 0u32), 4);
    }

    /// Backend whose writes take a while
    struct SlowStore {
        inner: MemoryStore,
        delay: std::time::Duration,
    }

    impl KeyValueStore for SlowStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
            thread::sleep(self.delay);
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_background_store_returns_before_backend_write() {
        let backend = MemoryStore::new();
        let slow = SlowStore {
            inner: backend.clone(),
            delay: std::time::Duration::from_millis(200),
        };
        let mut store = BackgroundStore::spawn(SharedStore::new(Box::new(slow))).unwrap();

        let started = std::time::Instant::now();
        write(&mut store, "current_level", &5u32);
        assert!(started.elapsed() < std::time::Duration::from_millis(100));
        assert_eq!(read_or(&store, "current_level", 0u32), 5);

        store.sync();
        assert_eq!(read_or(&backend, "current_level", 0u32), 5);
    }

    #[test]
    fn test_background_store_reads_existing_backend_values() {
        let mut backend = MemoryStore::new();
        write(&mut backend, "highest_level", &9u32);
        let mut store =
            BackgroundStore::spawn(SharedStore::new(Box::new(backend.clone()))).unwrap();
        assert_eq!(read_or(&store, "highest_level", 0u32), 9);

        write(&mut store, "highest_level", &10u32);
        write(&mut store, "highest_level", &11u32);
        store.sync();
        assert_eq!(read_or(&backend, "highest_level", 0u32), 11);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let path = temp_path("round_trip");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        write(&mut store, "highest_level", &7u32);
        write(&mut store, "haptic_enabled", &false);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(read_or(&reopened, "highest_level", 0u32), 7);
        assert!(!read_or(&reopened, "haptic_enabled", true));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_recovers_from_corruption() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(read_or(&store, "current_level", 0u32), 0);
        write(&mut store, "current_level", &1u32);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(read_or(&reopened, "current_level", 0u32), 1);

        let _ = fs::remove_file(&path);
    }
}
