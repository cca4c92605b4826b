//! Custom stream management with incremental cache maintenance.

use crate::cache::CacheExt;
use crate::context::CacheContext;
use crate::dispatcher;
use crate::error::{Result, StoreError};
use crate::loader;
use murmur_core::keys;
use murmur_core::model::{
    ActivityId, PersonId, ScopeId, StreamScope, StreamView, StreamViewId, StreamViewType,
};
use std::collections::HashSet;
use tracing::debug;

pub struct StreamViewUpdater<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> StreamViewUpdater<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn create(
        &self,
        owner: PersonId,
        name: &str,
        scopes: Vec<StreamScope>,
    ) -> Result<StreamView> {
        let view = self.ctx.records.create_stream_view(
            name,
            Some(owner),
            StreamViewType::Custom,
            dedup_scopes(scopes),
        )?;
        self.ctx
            .cache
            .set_object(&keys::composite_stream_by_id(view.id), &view)?;
        Ok(view)
    }

    /// Add a scope. A warm activity list gets the scope's activities merged
    /// in rather than being rebuilt.
    pub fn add_scope(&self, view_id: StreamViewId, scope: StreamScope) -> Result<StreamView> {
        let mut view = self.custom_view(view_id)?;
        if view.includes_scope(scope.id) {
            return Ok(view);
        }
        view.included_scopes.push(scope.clone());
        self.save(&view)?;

        let key = keys::activities_by_composite_stream(view_id);
        if let Some(current) = self.ctx.cache.get_list(&key)? {
            let added = loader::scope_activity_ids(self.ctx, std::slice::from_ref(&scope))?;
            let merged = merge_newest_first(&current, &added, self.ctx.max_results());
            debug!(view_id, added = added.len(), "merged scope into stream list");
            self.ctx.cache.set_list(&key, &merged)?;
        }
        Ok(view)
    }

    /// Remove a scope. Ids that another remaining scope also contributes stay
    /// in a warm list.
    pub fn remove_scope(&self, view_id: StreamViewId, scope_id: ScopeId) -> Result<StreamView> {
        let mut view = self.custom_view(view_id)?;
        let Some(pos) = view.included_scopes.iter().position(|s| s.id == scope_id) else {
            return Ok(view);
        };
        let removed = view.included_scopes.remove(pos);
        self.save(&view)?;

        let key = keys::activities_by_composite_stream(view_id);
        if let Some(mut current) = self.ctx.cache.get_list(&key)? {
            let dropped: HashSet<ActivityId> =
                loader::scope_activity_ids(self.ctx, std::slice::from_ref(&removed))?
                    .into_iter()
                    .collect();
            let kept: HashSet<ActivityId> =
                loader::scope_activity_ids(self.ctx, &view.included_scopes)?
                    .into_iter()
                    .collect();
            current.retain(|id| !dropped.contains(id) || kept.contains(id));
            self.ctx.cache.set_list(&key, &current)?;
        }
        Ok(view)
    }

    pub fn delete(&self, view_id: StreamViewId) -> Result<bool> {
        self.custom_view(view_id)?;
        let deleted = self.ctx.records.delete_stream_view(view_id)?;
        self.ctx.cache.delete(&keys::composite_stream_by_id(view_id))?;
        self.ctx
            .cache
            .delete(&keys::activities_by_composite_stream(view_id))?;
        Ok(deleted)
    }

    fn custom_view(&self, view_id: StreamViewId) -> Result<StreamView> {
        let view = dispatcher::composite_streams_by_ids(self.ctx, &[view_id])?
            .into_iter()
            .next()
            .ok_or(StoreError::StreamNotFound(view_id))?;
        if view.view_type != StreamViewType::Custom {
            return Err(StoreError::NotCustomStream(view_id));
        }
        Ok(view)
    }

    fn save(&self, view: &StreamView) -> Result<()> {
        self.ctx.records.update_stream_view(view)?;
        self.ctx
            .cache
            .set_object(&keys::composite_stream_by_id(view.id), view)
    }
}

fn dedup_scopes(scopes: Vec<StreamScope>) -> Vec<StreamScope> {
    let mut seen = HashSet::new();
    scopes.into_iter().filter(|s| seen.insert(s.id)).collect()
}

fn merge_newest_first(a: &[ActivityId], b: &[ActivityId], limit: usize) -> Vec<ActivityId> {
    let mut merged: Vec<ActivityId> = a.iter().chain(b).copied().collect();
    merged.sort_unstable_by(|x, y| y.cmp(x));
    merged.dedup();
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::records::RecordStore;
    use crate::testing::Fixture;

    #[test]
    fn add_scope_merges_into_warm_list() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let burns = fx.person("mrburns");
        let a = fx.post(&smithers, smithers.stream_scope_id);
        let b = fx.post(&burns, burns.stream_scope_id);
        let c = fx.post(&smithers, smithers.stream_scope_id);

        let updater = StreamViewUpdater::new(fx.ctx());
        let view = updater
            .create(smithers.id, "watch", vec![fx.scope(smithers.stream_scope_id)])
            .unwrap();
        assert_eq!(
            loader::custom_activity_ids(fx.ctx(), &view).unwrap(),
            vec![c.id, a.id]
        );

        let queries = fx.records.activity_query_count();
        updater
            .add_scope(view.id, fx.scope(burns.stream_scope_id))
            .unwrap();
        // one query for the added scope only
        assert_eq!(fx.records.activity_query_count(), queries + 1);
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_composite_stream(view.id))
                .unwrap(),
            Some(vec![c.id, b.id, a.id])
        );
    }

    #[test]
    fn remove_scope_keeps_ids_other_scopes_contribute() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let burns = fx.person("mrburns");
        let a = fx.post(&smithers, smithers.stream_scope_id);
        let b = fx.post(&burns, burns.stream_scope_id);

        let updater = StreamViewUpdater::new(fx.ctx());
        let view = updater
            .create(
                smithers.id,
                "watch",
                vec![
                    fx.scope(smithers.stream_scope_id),
                    fx.scope(burns.stream_scope_id),
                    fx.scope(fx.org.stream_scope_id),
                ],
            )
            .unwrap();
        loader::custom_activity_ids(fx.ctx(), &view).unwrap();

        let view = updater.remove_scope(view.id, burns.stream_scope_id).unwrap();
        assert_eq!(view.included_scopes.len(), 2);
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_composite_stream(view.id))
                .unwrap(),
            Some(vec![b.id, a.id])
        );

        updater.remove_scope(view.id, fx.org.stream_scope_id).unwrap();
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_composite_stream(view.id))
                .unwrap(),
            Some(vec![a.id])
        );
    }

    #[test]
    fn core_views_cannot_be_edited() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let everyone = fx
            .records
            .create_stream_view("Everyone", None, StreamViewType::Everyone, vec![])
            .unwrap();
        let err = StreamViewUpdater::new(fx.ctx())
            .add_scope(everyone.id, fx.scope(smithers.stream_scope_id))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotCustomStream(_)));
    }

    #[test]
    fn delete_drops_view_and_list() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let updater = StreamViewUpdater::new(fx.ctx());
        let view = updater
            .create(smithers.id, "watch", vec![fx.scope(smithers.stream_scope_id)])
            .unwrap();
        loader::custom_activity_ids(fx.ctx(), &view).unwrap();

        assert!(updater.delete(view.id).unwrap());
        assert!(!fx
            .cache
            .contains(&keys::activities_by_composite_stream(view.id))
            .unwrap());
        assert!(matches!(
            updater.delete(view.id),
            Err(StoreError::StreamNotFound(_))
        ));
    }

    #[test]
    fn merge_dedups_and_caps() {
        assert_eq!(merge_newest_first(&[9, 5], &[7, 5, 1], 3), vec![9, 7, 5]);
    }
}
