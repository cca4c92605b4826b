use crate::cache::CacheExt;
use crate::context::CacheContext;
use crate::error::Result;
use crate::{loader, org_hierarchy};
use murmur_core::keys;
use murmur_core::model::StreamViewType;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// What a full warm-up wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub organizations: usize,
    pub people: usize,
    pub stream_views: usize,
    pub everyone: usize,
}

/// Rebuilds every list the loaders would otherwise compute lazily.
///
/// Existing entries are dropped first, so the result reflects the record
/// store exactly.
pub struct CacheWarmer<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> CacheWarmer<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> Result<WarmReport> {
        let ctx = self.ctx;
        let mut report = WarmReport::default();

        let started = Instant::now();
        report.organizations = org_hierarchy::warm(ctx)?;
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "org hierarchy warmed");

        let started = Instant::now();
        ctx.cache.delete(keys::EVERYONE_ACTIVITY_IDS)?;
        report.everyone = loader::everyone_activity_ids(ctx)?.len();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "everyone list warmed");

        let started = Instant::now();
        let views = ctx.records.stream_views()?;
        for view in &views {
            ctx.cache
                .set_object(&keys::composite_stream_by_id(view.id), view)?;
            if view.view_type == StreamViewType::Custom {
                ctx.cache
                    .delete(&keys::activities_by_composite_stream(view.id))?;
                loader::custom_activity_ids(ctx, view)?;
            }
        }
        report.stream_views = views.len();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            count = views.len(),
            "composite streams warmed"
        );

        let started = Instant::now();
        let people = ctx.records.people()?;
        for person in &people {
            ctx.cache.delete(&keys::followers_by_person(person.id))?;
            ctx.cache.delete(&keys::activities_by_following(person.id))?;
            ctx.cache.delete(&keys::starred_by_person(person.id))?;
            loader::followed_activity_ids(ctx, person.id)?;
            loader::starred_activity_ids(ctx, person.id)?;
        }
        for group in ctx.records.groups()? {
            ctx.cache.delete(&keys::followers_by_group(group.id))?;
        }
        report.people = people.len();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            count = people.len(),
            "person streams warmed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::records::RecordStore;
    use crate::testing::Fixture;

    #[test]
    fn warm_replaces_stale_lists() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let burns = fx.person("mrburns");
        fx.records.follow_person(burns.id, smithers.id).unwrap();
        let a = fx.post(&smithers, smithers.stream_scope_id);
        fx.cache.set_list(keys::EVERYONE_ACTIVITY_IDS, &[999]).unwrap();

        let report = CacheWarmer::new(fx.ctx()).execute().unwrap();
        assert_eq!(report.people, 2);
        assert_eq!(report.organizations, 1);
        assert_eq!(report.everyone, 1);

        assert_eq!(
            fx.cache.get_list(keys::EVERYONE_ACTIVITY_IDS).unwrap(),
            Some(vec![a.id])
        );
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_following(burns.id))
                .unwrap(),
            Some(vec![a.id])
        );
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_composite_stream(smithers.entity_stream_view_id))
                .unwrap(),
            Some(vec![a.id])
        );
        assert!(fx
            .cache
            .contains(&keys::org_recursive_children(fx.org.id))
            .unwrap());
    }
}
