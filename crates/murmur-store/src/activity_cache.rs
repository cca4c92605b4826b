//! Read-through access to cached activities and comments.
//!
//! Misses are loaded in bulk from the record store, converted to their
//! cached form and written back before returning.

use crate::cache::CacheExt;
use crate::context::CacheContext;
use crate::error::Result;
use murmur_core::keys;
use murmur_core::model::{Activity, ActivityDto, ActivityId, CommentDto, CommentId, StreamScope};
use std::collections::HashMap;

/// Ascending comment ids for an activity.
pub fn comment_ids(ctx: CacheContext<'_>, activity: ActivityId) -> Result<Vec<CommentId>> {
    ctx.read_through_list(&keys::comment_ids_by_activity(activity), || {
        ctx.records.comment_ids_for_activity(activity)
    })
}

/// Comments in the order of `ids`. Unknown ids are skipped.
pub fn comments_by_ids(ctx: CacheContext<'_>, ids: &[CommentId]) -> Result<Vec<CommentDto>> {
    let mut found: HashMap<CommentId, CommentDto> = HashMap::new();
    let mut misses = Vec::new();
    for id in ids {
        match ctx.cache.get_object::<CommentDto>(&keys::comment_by_id(*id))? {
            Some(comment) => {
                found.insert(*id, comment);
            }
            None => misses.push(*id),
        }
    }

    if !misses.is_empty() {
        let comments = ctx.records.comments_by_ids(&misses)?;
        let author_ids: Vec<_> = comments.iter().map(|c| c.author_id).collect();
        let authors = ctx.records.people_by_ids(&author_ids)?;
        for comment in comments {
            let account = authors
                .iter()
                .find(|p| p.id == comment.author_id)
                .map(|p| p.account_id.as_str())
                .unwrap_or_default();
            let dto = CommentDto::from_comment(&comment, account);
            ctx.cache.set_object(&keys::comment_by_id(dto.id), &dto)?;
            found.insert(dto.id, dto);
        }
    }

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

/// Activities in the order of `ids`. Unknown ids are skipped.
pub fn activities_by_ids(ctx: CacheContext<'_>, ids: &[ActivityId]) -> Result<Vec<ActivityDto>> {
    let mut found: HashMap<ActivityId, ActivityDto> = HashMap::new();
    let mut misses = Vec::new();
    for id in ids {
        match ctx.cache.get_object::<ActivityDto>(&keys::activity_by_id(*id))? {
            Some(activity) => {
                found.insert(*id, activity);
            }
            None => misses.push(*id),
        }
    }

    if !misses.is_empty() {
        for activity in ctx.records.activities_by_ids(&misses)? {
            let dto = build_activity(ctx, &activity)?;
            ctx.cache.set_object(&keys::activity_by_id(dto.id), &dto)?;
            found.insert(dto.id, dto);
        }
    }

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

pub fn activity_by_id(ctx: CacheContext<'_>, id: ActivityId) -> Result<Option<ActivityDto>> {
    Ok(activities_by_ids(ctx, &[id])?.into_iter().next())
}

fn build_activity(ctx: CacheContext<'_>, activity: &Activity) -> Result<ActivityDto> {
    let mut dto = ActivityDto::from_activity(activity, shared_link_scope(ctx, activity)?);
    let ids = comment_ids(ctx, activity.id)?;
    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        let boundaries = comments_by_ids(ctx, &[*first, *last])?;
        dto.first_comment = boundaries.first().cloned();
        dto.last_comment = boundaries.last().cloned();
        dto.comment_count = u32::try_from(ids.len()).unwrap_or(u32::MAX);
    }
    Ok(dto)
}

fn shared_link_scope(ctx: CacheContext<'_>, activity: &Activity) -> Result<Option<StreamScope>> {
    let Some(resource_id) = activity.shared_link else {
        return Ok(None);
    };
    let Some(resource) = ctx.records.resources_by_ids(&[resource_id])?.into_iter().next() else {
        return Ok(None);
    };
    Ok(ctx
        .records
        .scopes_by_ids(&[resource.stream_scope_id])?
        .into_iter()
        .next())
}
