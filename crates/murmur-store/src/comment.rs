use crate::activity_cache;
use crate::cache::CacheExt;
use crate::context::CacheContext;
use crate::error::{Result, StoreError};
use murmur_core::keys;
use murmur_core::model::{ActivityDto, ActivityId, CommentDto, CommentId, PersonId};
use murmur_core::ValidationErrors;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct InsertCommentRequest {
    pub activity_id: ActivityId,
    pub author_id: PersonId,
    pub body: String,
}

/// Adds a comment and folds it into the cached activity.
pub struct InsertComment<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> InsertComment<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, request: &InsertCommentRequest) -> Result<CommentDto> {
        let ctx = self.ctx;
        self.validate(request)?;

        let author = ctx
            .records
            .people_by_ids(&[request.author_id])?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::PersonNotFound(request.author_id.to_string()))?;
        let comment =
            ctx.records
                .insert_comment(request.activity_id, author.id, request.body.trim())?;
        let dto = CommentDto::from_comment(&comment, &author.account_id);

        ctx.cache.set_object(&keys::comment_by_id(dto.id), &dto)?;

        let ids_key = keys::comment_ids_by_activity(request.activity_id);
        if let Some(mut ids) = ctx.cache.get_list(&ids_key)? {
            ids.push(dto.id);
            ids.sort_unstable();
            ids.dedup();
            ctx.cache.set_list(&ids_key, &ids)?;
        }

        let activity_key = keys::activity_by_id(request.activity_id);
        if let Some(mut activity) = ctx.cache.get_object::<ActivityDto>(&activity_key)? {
            activity.record_comment_added(&dto);
            ctx.cache.set_object(&activity_key, &activity)?;
        }

        debug!(comment_id = dto.id, activity_id = dto.activity_id, "comment added");
        Ok(dto)
    }

    fn validate(&self, request: &InsertCommentRequest) -> Result<()> {
        let mut errors = ValidationErrors::new();
        let body = request.body.trim();
        let max = self.ctx.config.comments.max_length;
        if body.is_empty() {
            errors.add("body", "comment must not be empty");
        } else if body.chars().count() > max {
            errors.add("body", format!("comment must be at most {max} characters"));
        }
        if self
            .ctx
            .records
            .activities_by_ids(&[request.activity_id])?
            .is_empty()
        {
            errors.add("activity_id", format!("activity {} does not exist", request.activity_id));
        }
        Ok(errors.into_result()?)
    }
}

/// Removes a comment and recomputes the cached activity's comment fields.
pub struct DeleteComment<'a> {
    ctx: CacheContext<'a>,
}

impl<'a> DeleteComment<'a> {
    pub fn new(ctx: CacheContext<'a>) -> Self {
        Self { ctx }
    }

    /// Returns `false` if the comment does not exist.
    pub fn execute(&self, comment_id: CommentId) -> Result<bool> {
        let ctx = self.ctx;
        let Some(comment) = ctx.records.comments_by_ids(&[comment_id])?.into_iter().next() else {
            return Ok(false);
        };
        let activity_id = comment.activity_id;

        let mut remaining = activity_cache::comment_ids(ctx, activity_id)?;
        ctx.records.delete_comment(comment_id)?;
        remaining.retain(|id| *id != comment_id);
        ctx.cache
            .set_list(&keys::comment_ids_by_activity(activity_id), &remaining)?;
        ctx.cache.delete(&keys::comment_by_id(comment_id))?;

        let activity_key = keys::activity_by_id(activity_id);
        if let Some(mut activity) = ctx.cache.get_object::<ActivityDto>(&activity_key)? {
            self.update_boundaries(&mut activity, comment_id, &remaining)?;
            ctx.cache.set_object(&activity_key, &activity)?;
        }

        debug!(comment_id, activity_id, remaining = remaining.len(), "comment deleted");
        Ok(true)
    }

    fn update_boundaries(
        &self,
        activity: &mut ActivityDto,
        removed: CommentId,
        remaining: &[CommentId],
    ) -> Result<()> {
        let (Some(first), Some(last)) = (remaining.first(), remaining.last()) else {
            activity.clear_comments();
            return Ok(());
        };
        activity.comment_count = activity.comment_count.saturating_sub(1);
        if activity.first_comment.as_ref().map(|c| c.id) == Some(removed) {
            activity.first_comment = activity_cache::comments_by_ids(self.ctx, &[*first])?
                .into_iter()
                .next();
        }
        if activity.last_comment.as_ref().map(|c| c.id) == Some(removed) {
            activity.last_comment = activity_cache::comments_by_ids(self.ctx, &[*last])?
                .into_iter()
                .next();
        }
        Ok(())
    }
}
