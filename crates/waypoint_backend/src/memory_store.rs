use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use waypoint_domain::{ConfigValue, KeyValueStore};

/// In-process key-value store for embedders without durable storage and for
/// tests.
///
/// Keeps every successful write in order so callers can inspect what was
/// persisted. Either side can be switched into a failing mode to simulate an
/// unavailable storage service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, ConfigValue>>,
    writes: Mutex<Vec<(String, ConfigValue)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: impl Into<String>, value: ConfigValue) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn value(&self, key: &str) -> Option<ConfigValue> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn writes(&self) -> Vec<(String, ConfigValue)> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Result<ConfigValue, String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(format!("storage unavailable while reading {key}"));
        }
        Ok(self.value(key).unwrap_or_else(ConfigValue::null))
    }

    fn set_value(&self, key: &str, value: ConfigValue) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(format!("storage unavailable while writing {key}"));
        }
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_owned(), value.clone());
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((key.to_owned(), value));
        Ok(())
    }
}
