//! Key/value cache holding serialized objects and ordered id lists.
//!
//! List operations never create a key: pushing to or removing from a cold
//! list is a no-op, so a later read rebuilds the list from the record store.

mod memory;

pub use memory::MemoryCache;

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single cache value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CacheEntry {
    /// A JSON-serialized object.
    Object(String),
    /// Ordered ids, head first.
    List(Vec<i64>),
}

pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key of either kind. Missing keys are ignored.
    fn delete(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool>;

    fn get_list(&self, key: &str) -> Result<Option<Vec<i64>>>;

    /// Store a list, trimmed to [`Cache::max_list_size`].
    fn set_list(&self, key: &str, ids: &[i64]) -> Result<()>;

    /// Move `ids` to the head of a warm list, in the given order.
    ///
    /// Ids already present are moved rather than duplicated. Returns `false`
    /// and does nothing when the key is absent.
    fn add_to_top_of_list(&self, key: &str, ids: &[i64]) -> Result<bool>;

    /// Remove every occurrence of `id` from a warm list.
    ///
    /// Returns `false` when the key is absent.
    fn remove_from_list(&self, key: &str, id: i64) -> Result<bool>;

    fn max_list_size(&self) -> usize;
}

/// Typed helpers over [`Cache::get`] and [`Cache::set`].
pub trait CacheExt: Cache {
    fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::CorruptCacheEntry {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set_object<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_string(value)?)
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

/// Prepend `ids` to `list` without duplicates, then trim to `max`.
pub(crate) fn push_to_head(list: &mut Vec<i64>, ids: &[i64], max: usize) {
    let mut head: Vec<i64> = Vec::with_capacity(ids.len() + list.len());
    for id in ids {
        if !head.contains(id) {
            head.push(*id);
        }
    }
    list.retain(|id| !head.contains(id));
    head.append(list);
    head.truncate(max);
    *list = head;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_to_head_moves_existing_ids() {
        let mut list = vec![5, 4, 3];
        push_to_head(&mut list, &[3], 10);
        assert_eq!(list, vec![3, 5, 4]);
    }

    #[test]
    fn push_to_head_keeps_batch_order_and_trims_tail() {
        let mut list = vec![5, 4, 3];
        push_to_head(&mut list, &[9, 8, 9], 4);
        assert_eq!(list, vec![9, 8, 5, 4]);
    }

    #[test]
    fn cache_entry_serializes_tagged() {
        let json = serde_json::to_string(&CacheEntry::List(vec![2, 1])).unwrap();
        assert_eq!(json, r#"{"kind":"list","value":[2,1]}"#);
    }
}
