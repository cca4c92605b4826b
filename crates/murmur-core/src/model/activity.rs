use crate::model::{ActivityId, CommentDto, ResourceId, StreamScope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activity as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub actor: StreamScope,
    pub destination: StreamScope,
    pub body: String,
    pub posted_time: DateTime<Utc>,
    /// `false` keeps the activity out of the everyone stream.
    #[serde(default = "default_true")]
    pub show_in_stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_link: Option<ResourceId>,
    #[serde(default)]
    pub flagged: bool,
}

fn default_true() -> bool {
    true
}

/// Cached representation of an activity with denormalized comment fields.
///
/// `first_comment`/`last_comment` are the lowest/highest comment ids on the
/// activity and `comment_count` the total. They are `None`/`0` together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDto {
    pub id: ActivityId,
    pub actor: StreamScope,
    pub destination: StreamScope,
    pub body: String,
    pub posted_time: DateTime<Utc>,
    pub show_in_stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_link_scope: Option<StreamScope>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_comment: Option<CommentDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_comment: Option<CommentDto>,
    #[serde(default)]
    pub comment_count: u32,
}

impl ActivityDto {
    pub fn from_activity(activity: &Activity, shared_link_scope: Option<StreamScope>) -> Self {
        Self {
            id: activity.id,
            actor: activity.actor.clone(),
            destination: activity.destination.clone(),
            body: activity.body.clone(),
            posted_time: activity.posted_time,
            show_in_stream: activity.show_in_stream,
            shared_link_scope,
            flagged: activity.flagged,
            first_comment: None,
            last_comment: None,
            comment_count: 0,
        }
    }

    /// Fold a newly inserted comment into the denormalized fields.
    pub fn record_comment_added(&mut self, comment: &CommentDto) {
        let replaces_first = self
            .first_comment
            .as_ref()
            .map_or(true, |first| comment.id < first.id);
        if replaces_first {
            self.first_comment = Some(comment.clone());
        }
        let replaces_last = self
            .last_comment
            .as_ref()
            .map_or(true, |last| comment.id > last.id);
        if replaces_last {
            self.last_comment = Some(comment.clone());
        }
        self.comment_count += 1;
    }

    pub fn clear_comments(&mut self) {
        self.first_comment = None;
        self.last_comment = None;
        self.comment_count = 0;
    }
}
