use crate::cache::Cache;
use crate::config::Config;
use crate::error::Result;
use crate::records::RecordStore;
use tracing::debug;

/// The cache, the record store and configuration a cache operation runs
/// against.
#[derive(Clone, Copy)]
pub struct CacheContext<'a> {
    pub cache: &'a dyn Cache,
    pub records: &'a dyn RecordStore,
    pub config: &'a Config,
}

impl<'a> CacheContext<'a> {
    pub fn new(cache: &'a dyn Cache, records: &'a dyn RecordStore, config: &'a Config) -> Self {
        Self {
            cache,
            records,
            config,
        }
    }

    /// Row limit for list queries issued on a cache miss.
    pub fn max_results(&self) -> usize {
        self.config.cache.max_results
    }

    /// Return the list cached under `key`, or run `load` and cache its
    /// result. The returned list is the one stored, trimmed to the cache's
    /// maximum list size.
    pub fn read_through_list(
        &self,
        key: &str,
        load: impl FnOnce() -> Result<Vec<i64>>,
    ) -> Result<Vec<i64>> {
        if let Some(ids) = self.cache.get_list(key)? {
            return Ok(ids);
        }
        let mut ids = load()?;
        ids.truncate(self.cache.max_list_size());
        debug!(key, count = ids.len(), "cache miss, list loaded from records");
        self.cache.set_list(key, &ids)?;
        Ok(ids)
    }
}
