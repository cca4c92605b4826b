use crate::context::CacheContext;
use crate::destination::Destination;
use crate::error::{Result, StoreError};
use crate::followers;
use murmur_core::keys;
use murmur_core::model::{ActivityDto, ScopeType};
use tracing::{debug, info};

/// Brings cached lists up to date after an activity is posted.
///
/// Runs after the activity row is committed. Follower lists of a person
/// destination and the everyone list get the id at their head; lists that
/// are cheaper to rebuild than to patch are dropped.
pub struct PostActivityCacheUpdater<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> PostActivityCacheUpdater<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, activity: &ActivityDto) -> Result<()> {
        let ctx = self.ctx;
        if ctx.cache.contains(&keys::tombstone(activity.id))? {
            debug!(activity_id = activity.id, "activity was deleted, skipping cache push");
            return Ok(());
        }

        let destination = Destination::resolve(ctx, &activity.destination)?;
        match &destination {
            Destination::Person(person) => {
                for follower in followers::person_follower_ids(ctx, person.id)? {
                    ctx.cache
                        .add_to_top_of_list(&keys::activities_by_following(follower), &[activity.id])?;
                }
                self.push_to_everyone(activity)?;
            }
            Destination::Group(group) => {
                self.push_to_everyone(activity)?;
                for follower in followers::group_follower_ids(ctx, group.id)? {
                    ctx.cache.delete(&keys::activities_by_following(follower))?;
                }
            }
            Destination::Resource(_) => {
                return Err(StoreError::UnsupportedDestination(ScopeType::Resource));
            }
        }

        for view_id in destination.composite_stream_ids(
            ctx,
            &activity.destination,
            activity.shared_link_scope.as_ref(),
        )? {
            ctx.cache
                .delete(&keys::activities_by_composite_stream(view_id))?;
        }

        if let Some(link) = &activity.shared_link_scope {
            ctx.cache
                .add_to_top_of_list(&keys::entity_stream_by_scope(link.id), &[activity.id])?;
        }

        info!(
            activity_id = activity.id,
            destination = %activity.destination.unique_key,
            "cache updated for posted activity"
        );
        Ok(())
    }

    fn push_to_everyone(&self, activity: &ActivityDto) -> Result<()> {
        if !activity.show_in_stream {
            return Ok(());
        }
        self.ctx
            .cache
            .add_to_top_of_list(keys::EVERYONE_ACTIVITY_IDS, &[activity.id])?;
        Ok(())
    }
}
