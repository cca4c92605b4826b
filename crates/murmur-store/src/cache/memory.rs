use super::{push_to_head, Cache, CacheEntry};
use crate::error::{Result, StoreError};
use crate::lockfile;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const SNAPSHOT_KIND: &str = "cache";

/// Process-local cache, persisted between runs as a checksummed snapshot.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_list_size: usize,
}

impl MemoryCache {
    pub fn new(max_list_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_list_size,
        }
    }

    /// Load a snapshot written by [`MemoryCache::save`]. A missing file
    /// yields an empty (cold) cache.
    pub fn load(path: &Path, max_list_size: usize) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(max_list_size));
        }
        let data = std::fs::read(path)?;
        let entries: BTreeMap<String, CacheEntry> =
            murmur_core::snapshot::decode(SNAPSHOT_KIND, &data)?;
        debug!(entries = entries.len(), "loaded cache snapshot");
        Ok(Self {
            entries: RwLock::new(entries.into_iter().collect()),
            max_list_size,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let entries: BTreeMap<String, CacheEntry> = self
            .read()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let data = murmur_core::snapshot::encode(SNAPSHOT_KIND, &entries)?;
        lockfile::write_snapshot(path, &data)
    }

    pub fn len(&self) -> usize {
        self.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .read()
            .map_err(|_| StoreError::LockConflict("cache lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockConflict("cache lock poisoned".into()))
    }
}

fn wrong_kind(key: &str, expected: &str) -> StoreError {
    StoreError::CorruptCacheEntry {
        key: key.to_string(),
        reason: format!("expected {expected}"),
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.read()?.get(key) {
            Some(CacheEntry::Object(json)) => Ok(Some(json.clone())),
            Some(CacheEntry::List(_)) => Err(wrong_kind(key, "an object")),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.write()?
            .insert(key.to_string(), CacheEntry::Object(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.write()?.remove(key).is_some() {
            debug!(key, "evicted cache key");
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn get_list(&self, key: &str) -> Result<Option<Vec<i64>>> {
        match self.read()?.get(key) {
            Some(CacheEntry::List(ids)) => Ok(Some(ids.clone())),
            Some(CacheEntry::Object(_)) => Err(wrong_kind(key, "a list")),
            None => Ok(None),
        }
    }

    fn set_list(&self, key: &str, ids: &[i64]) -> Result<()> {
        let mut ids = ids.to_vec();
        ids.truncate(self.max_list_size);
        self.write()?.insert(key.to_string(), CacheEntry::List(ids));
        Ok(())
    }

    fn add_to_top_of_list(&self, key: &str, ids: &[i64]) -> Result<bool> {
        let mut entries = self.write()?;
        match entries.get_mut(key) {
            Some(CacheEntry::List(list)) => {
                push_to_head(list, ids, self.max_list_size);
                Ok(true)
            }
            Some(CacheEntry::Object(_)) => Err(wrong_kind(key, "a list")),
            None => Ok(false),
        }
    }

    fn remove_from_list(&self, key: &str, id: i64) -> Result<bool> {
        let mut entries = self.write()?;
        match entries.get_mut(key) {
            Some(CacheEntry::List(list)) => {
                list.retain(|x| *x != id);
                Ok(true)
            }
            Some(CacheEntry::Object(_)) => Err(wrong_kind(key, "a list")),
            None => Ok(false),
        }
    }

    fn max_list_size(&self) -> usize {
        self.max_list_size
    }
}
