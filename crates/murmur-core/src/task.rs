use crate::model::{ActivityDto, ActivityId, CommentId, PersonId};
use serde::{Deserialize, Serialize};

/// Payload for cleaning a deleted activity out of the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteActivityCacheUpdateRequest {
    pub activity: ActivityDto,
    pub comment_ids: Vec<CommentId>,
    pub person_ids_with_starred: Vec<PersonId>,
}

/// A follow-up intent produced by a write path and executed after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskRequest {
    PostActivityCacheUpdate { activity_id: ActivityId },
    DeleteActivityCacheUpdate(DeleteActivityCacheUpdateRequest),
    /// Drop and rebuild a person's followed list.
    RefreshFollowed { person_id: PersonId },
    RefreshStarred { person_id: PersonId },
    WarmCache,
}

impl TaskRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostActivityCacheUpdate { .. } => "post_activity_cache_update",
            Self::DeleteActivityCacheUpdate(_) => "delete_activity_cache_update",
            Self::RefreshFollowed { .. } => "refresh_followed",
            Self::RefreshStarred { .. } => "refresh_starred",
            Self::WarmCache => "warm_cache",
        }
    }
}
