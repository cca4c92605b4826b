use crate::activity_cache;
use crate::context::CacheContext;
use crate::destination::Destination;
use crate::error::Result;
use crate::tasks::ActionContext;
use murmur_core::keys;
use murmur_core::model::{ActivityDto, ActivityId};
use murmur_core::task::{DeleteActivityCacheUpdateRequest, TaskRequest};
use tracing::{debug, info};

/// Deletes an activity row and schedules the cache cleanup.
pub struct DeleteActivity<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> DeleteActivity<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    /// Returns the deleted activity, or `None` if it did not exist.
    pub fn execute(
        &self,
        activity_id: ActivityId,
        actions: &mut ActionContext,
    ) -> Result<Option<ActivityDto>> {
        let Some(activity) = activity_cache::activity_by_id(self.ctx, activity_id)? else {
            debug!(activity_id, "activity already gone");
            return Ok(None);
        };
        let Some(deleted) = self.ctx.records.delete_activity(activity_id)? else {
            return Ok(None);
        };
        actions.push(TaskRequest::DeleteActivityCacheUpdate(
            DeleteActivityCacheUpdateRequest {
                activity: activity.clone(),
                comment_ids: deleted.comment_ids,
                person_ids_with_starred: deleted.person_ids_with_starred,
            },
        ));
        Ok(Some(activity))
    }
}

/// Removes every trace of a deleted activity from the cache.
///
/// Each step is independent; a failure part way leaves the earlier removals
/// in place.
pub struct DeleteActivityCacheUpdater<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> DeleteActivityCacheUpdater<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, request: &DeleteActivityCacheUpdateRequest) -> Result<bool> {
        let ctx = self.ctx;
        let activity = &request.activity;
        let id = activity.id;
        info!(activity_id = id, "cleaning up cache for deleted activity");

        ctx.cache.remove_from_list(keys::EVERYONE_ACTIVITY_IDS, id)?;

        let destination = Destination::resolve(ctx, &activity.destination)?;
        for view_id in destination.composite_stream_ids(
            ctx,
            &activity.destination,
            activity.shared_link_scope.as_ref(),
        )? {
            debug!(activity_id = id, view_id, "removing from composite stream");
            ctx.cache
                .remove_from_list(&keys::activities_by_composite_stream(view_id), id)?;
        }

        for follower in destination.follower_ids(ctx, &activity.actor)? {
            ctx.cache
                .remove_from_list(&keys::activities_by_following(follower), id)?;
        }

        if let Destination::Resource(scope) = &destination {
            ctx.cache
                .remove_from_list(&keys::entity_stream_by_scope(scope.id), id)?;
        }
        if let Some(link) = &activity.shared_link_scope {
            ctx.cache
                .remove_from_list(&keys::entity_stream_by_scope(link.id), id)?;
        }

        for person in &request.person_ids_with_starred {
            ctx.cache.remove_from_list(&keys::starred_by_person(*person), id)?;
        }

        for comment in &request.comment_ids {
            ctx.cache.delete(&keys::comment_by_id(*comment))?;
        }
        ctx.cache.delete(&keys::comment_ids_by_activity(id))?;
        ctx.cache.delete(&keys::activity_by_id(id))?;
        ctx.cache.set(&keys::tombstone(id), "true".to_string())?;

        Ok(true)
    }
}
