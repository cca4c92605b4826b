use crate::model::{ActivityId, CommentId, PersonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub activity_id: ActivityId,
    pub author_id: PersonId,
    pub body: String,
    pub time_sent: DateTime<Utc>,
}

/// Cached form of a comment, carrying the author's account id for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: CommentId,
    pub activity_id: ActivityId,
    pub author_id: PersonId,
    pub author_account_id: String,
    pub body: String,
    pub time_sent: DateTime<Utc>,
}

impl CommentDto {
    pub fn from_comment(comment: &Comment, author_account_id: impl Into<String>) -> Self {
        Self {
            id: comment.id,
            activity_id: comment.activity_id,
            author_id: comment.author_id,
            author_account_id: author_account_id.into(),
            body: comment.body.clone(),
            time_sent: comment.time_sent,
        }
    }
}
