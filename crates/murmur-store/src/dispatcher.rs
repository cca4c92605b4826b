use crate::cache::CacheExt;
use crate::config::CacheConfig;
use crate::context::CacheContext;
use crate::error::{Result, StoreError};
use crate::loader::StreamLoader;
use murmur_core::keys;
use murmur_core::model::{ActivityId, PersonId, StreamView, StreamViewId, StreamViewType};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Resolves a composite stream id to its activity ids for a viewing user.
///
/// The stream's type selects the loader. Types outside the registry fail
/// with [`StoreError::NoLoaderRegistered`].
#[derive(Debug, Clone)]
pub struct StreamActivityIds {
    registered: BTreeSet<StreamViewType>,
}

impl StreamActivityIds {
    pub fn new(types: impl IntoIterator<Item = StreamViewType>) -> Self {
        Self {
            registered: types.into_iter().collect(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.loaders.iter().copied())
    }

    pub fn is_registered(&self, view_type: StreamViewType) -> bool {
        self.registered.contains(&view_type)
    }

    pub fn execute(
        &self,
        ctx: CacheContext<'_>,
        stream_id: StreamViewId,
        user: PersonId,
    ) -> Result<Vec<ActivityId>> {
        let view = composite_streams_by_ids(ctx, &[stream_id])?
            .into_iter()
            .next()
            .ok_or(StoreError::StreamNotFound(stream_id))?;
        if !self.is_registered(view.view_type) {
            return Err(StoreError::NoLoaderRegistered {
                stream_id,
                view_type: view.view_type,
            });
        }
        debug!(stream_id, view_type = %view.view_type, user, "loading composite stream");
        StreamLoader::for_view_type(view.view_type).load(ctx, &view, user)
    }
}

impl Default for StreamActivityIds {
    fn default() -> Self {
        Self::new(StreamViewType::ALL)
    }
}

/// Stream views in the order of `ids`, read through the cache.
pub fn composite_streams_by_ids(
    ctx: CacheContext<'_>,
    ids: &[StreamViewId],
) -> Result<Vec<StreamView>> {
    let mut found: HashMap<StreamViewId, StreamView> = HashMap::new();
    let mut misses = Vec::new();
    for id in ids {
        match ctx.cache.get_object::<StreamView>(&keys::composite_stream_by_id(*id))? {
            Some(view) => {
                found.insert(*id, view);
            }
            None => misses.push(*id),
        }
    }
    if !misses.is_empty() {
        for view in ctx.records.stream_views_by_ids(&misses)? {
            ctx.cache
                .set_object(&keys::composite_stream_by_id(view.id), &view)?;
            found.insert(view.id, view);
        }
    }
    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}
