//! Cache key namespace.
//!
//! Every key the cache layer reads or writes is built here, so that the
//! post and delete paths touch exactly the keys the loaders populate.

use crate::model::{ActivityId, CommentId, GroupId, OrgId, PersonId, ScopeId, StreamViewId};

pub const EVERYONE_ACTIVITY_IDS: &str = "EveryoneActivityIds";

const ACTIVITIES_BY_COMPOSITE_STREAM: &str = "ActByCompositeStream:";
const ACTIVITIES_BY_FOLLOWING: &str = "ActByFollowing:";
const STARRED_BY_PERSON_ID: &str = "Starred:";
const ENTITY_STREAM_BY_SCOPE_ID: &str = "EntityStream:";
const ACTIVITY_BY_ID: &str = "Activity:";
const COMMENT_BY_ID: &str = "Comment:";
const COMMENT_IDS_BY_ACTIVITY_ID: &str = "CommentIds:";
const COMPOSITE_STREAM_BY_ID: &str = "CompositeStream:";
const FOLLOWERS_BY_PERSON: &str = "FollowersByPerson:";
const FOLLOWERS_BY_GROUP: &str = "FollowersByGroup:";
const ORG_RECURSIVE_CHILDREN: &str = "OrgRecursiveChildren:";
const ORG_RECURSIVE_PARENTS: &str = "OrgRecursiveParents:";
const TOMBSTONE: &str = "Tombstone:";

pub fn activities_by_composite_stream(view_id: StreamViewId) -> String {
    format!("{ACTIVITIES_BY_COMPOSITE_STREAM}{view_id}")
}

pub fn activities_by_following(person_id: PersonId) -> String {
    format!("{ACTIVITIES_BY_FOLLOWING}{person_id}")
}

pub fn starred_by_person(person_id: PersonId) -> String {
    format!("{STARRED_BY_PERSON_ID}{person_id}")
}

pub fn entity_stream_by_scope(scope_id: ScopeId) -> String {
    format!("{ENTITY_STREAM_BY_SCOPE_ID}{scope_id}")
}

pub fn activity_by_id(activity_id: ActivityId) -> String {
    format!("{ACTIVITY_BY_ID}{activity_id}")
}

pub fn comment_by_id(comment_id: CommentId) -> String {
    format!("{COMMENT_BY_ID}{comment_id}")
}

pub fn comment_ids_by_activity(activity_id: ActivityId) -> String {
    format!("{COMMENT_IDS_BY_ACTIVITY_ID}{activity_id}")
}

pub fn composite_stream_by_id(view_id: StreamViewId) -> String {
    format!("{COMPOSITE_STREAM_BY_ID}{view_id}")
}

pub fn followers_by_person(person_id: PersonId) -> String {
    format!("{FOLLOWERS_BY_PERSON}{person_id}")
}

pub fn followers_by_group(group_id: GroupId) -> String {
    format!("{FOLLOWERS_BY_GROUP}{group_id}")
}

pub fn org_recursive_children(org_id: OrgId) -> String {
    format!("{ORG_RECURSIVE_CHILDREN}{org_id}")
}

pub fn org_recursive_parents(org_id: OrgId) -> String {
    format!("{ORG_RECURSIVE_PARENTS}{org_id}")
}

/// Marker written when an activity is deleted; pushes for it are refused.
pub fn tombstone(activity_id: ActivityId) -> String {
    format!("{TOMBSTONE}{activity_id}")
}
