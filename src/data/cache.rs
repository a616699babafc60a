//! Key-value storage for prepared stand data.
//!
//! Extracting the outcome array from its sources is slow; a store lets a
//! provider be skipped on later runs. The scheduler itself never touches
//! a store.

use std::collections::HashMap;

use tracing::debug;

use super::types::StandData;
use crate::error::Result;

/// A keyed store of prepared [`StandData`] artifacts.
pub trait ArtifactStore {
    /// Returns the artifact stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<StandData>>;

    /// Stores `data` under `key`, replacing any previous artifact.
    fn put(&mut self, key: &str, data: &StandData) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, StandData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<StandData>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, data: &StandData) -> Result<()> {
        self.entries.insert(key.to_string(), data.clone());
        Ok(())
    }
}

/// Directory-backed store writing one JSON document per key.
#[cfg(feature = "serde")]
#[derive(Debug, Clone)]
pub struct DirStore {
    root: std::path::PathBuf,
}

#[cfg(feature = "serde")]
impl DirStore {
    /// Uses `root` as the cache directory. It is created on first `put`.
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File for `key`. Bytes outside `[A-Za-z0-9_-]` are percent-escaped,
    /// so distinct keys never share a file.
    fn path(&self, key: &str) -> std::path::PathBuf {
        let mut name = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                name.push(b as char);
            } else {
                name.push_str(&format!("%{b:02X}"));
            }
        }
        self.root.join(format!("{name}.json"))
    }
}

#[cfg(feature = "serde")]
impl ArtifactStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<StandData>> {
        use crate::error::ScheduleError;

        let path = self.path(key);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ScheduleError::Cache(format!("{}: {e}", path.display()))),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ScheduleError::Cache(format!("{}: {e}", path.display())))
    }

    fn put(&mut self, key: &str, data: &StandData) -> Result<()> {
        use crate::error::ScheduleError;

        std::fs::create_dir_all(&self.root)
            .map_err(|e| ScheduleError::Cache(format!("{}: {e}", self.root.display())))?;
        let path = self.path(key);
        let text =
            serde_json::to_string(data).map_err(|e| ScheduleError::Cache(e.to_string()))?;
        std::fs::write(&path, text)
            .map_err(|e| ScheduleError::Cache(format!("{}: {e}", path.display())))
    }
}

/// Returns the artifact under `key`, calling `provider` and storing its
/// result on a miss.
pub fn cached<S, F>(store: &mut S, key: &str, provider: F) -> Result<StandData>
where
    S: ArtifactStore + ?Sized,
    F: FnOnce() -> Result<StandData>,
{
    if let Some(data) = store.get(key)? {
        debug!(event = "cache_hit", key);
        return Ok(data);
    }
    debug!(event = "cache_miss", key);
    let data = provider()?;
    store.put(key, &data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::error::ScheduleError;

    #[test]
    fn test_cached_calls_provider_once() {
        let mut store = MemoryStore::new();
        let mut calls = 0;

        let first = cached(&mut store, "demo", || {
            calls += 1;
            synthetic::demo()
        })
        .unwrap();
        let second = cached(&mut store, "demo", || {
            calls += 1;
            synthetic::demo()
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_provider_error_is_not_stored() {
        let mut store = MemoryStore::new();
        let result = cached(&mut store, "bad", || {
            Err(ScheduleError::Cache("source offline".into()))
        });
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_dir_store_round_trip() {
        let root = std::env::temp_dir().join(format!("u-harvest-cache-{}", std::process::id()));
        let mut store = DirStore::new(&root);
        let data = synthetic::random(3, 2, 4, 2, 0, 10, 42).unwrap();

        assert!(store.get("stands/v1").unwrap().is_none());
        store.put("stands/v1", &data).unwrap();
        assert_eq!(store.get("stands/v1").unwrap(), Some(data));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_dir_store_keys_do_not_collide() {
        let root = std::env::temp_dir().join(format!("u-harvest-keys-{}", std::process::id()));
        let mut store = DirStore::new(&root);
        let slash = synthetic::random(3, 2, 4, 2, 0, 10, 1).unwrap();
        let underscore = synthetic::random(3, 2, 4, 2, 0, 10, 2).unwrap();

        assert_ne!(store.path("stands/v1"), store.path("stands_v1"));
        assert_ne!(store.path("a%2F"), store.path("a/"));
        store.put("stands/v1", &slash).unwrap();
        store.put("stands_v1", &underscore).unwrap();
        assert_eq!(store.get("stands/v1").unwrap(), Some(slash));
        assert_eq!(store.get("stands_v1").unwrap(), Some(underscore));

        let _ = std::fs::remove_dir_all(&root);
    }
}
