//! Durable record store: entities, activities, comments and stream views.
//!
//! Everything the cache holds can be rebuilt from here. Bulk lookups take a
//! slice of ids and silently skip the ones that do not exist.

mod memory;

pub use memory::MemoryRecordStore;

use crate::error::Result;
use murmur_core::model::{
    Activity, ActivityId, Comment, CommentId, Group, GroupId, OrgId, Organization, Person,
    PersonId, ResourceId, ScopeId, SharedResource, StreamScope, StreamView, StreamViewId,
    StreamViewType,
};

/// Fields supplied by the caller when posting an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor: StreamScope,
    pub destination: StreamScope,
    pub body: String,
    pub show_in_stream: bool,
    pub shared_link: Option<ResourceId>,
}

/// An activity removed from the store along with what cascaded with it.
#[derive(Debug, Clone)]
pub struct DeletedActivity {
    pub activity: Activity,
    pub comment_ids: Vec<CommentId>,
    pub person_ids_with_starred: Vec<PersonId>,
}

pub trait RecordStore: Send + Sync {
    // -- entities --

    /// `parent` of `None` creates the root organization.
    fn create_organization(
        &self,
        short_name: &str,
        name: &str,
        parent: Option<OrgId>,
    ) -> Result<Organization>;
    fn create_person(&self, account_id: &str, display_name: &str, parent_org: OrgId)
        -> Result<Person>;
    fn create_group(&self, short_name: &str, name: &str, parent_org: OrgId) -> Result<Group>;
    fn find_or_create_resource(&self, unique_key: &str) -> Result<SharedResource>;

    fn people_by_ids(&self, ids: &[PersonId]) -> Result<Vec<Person>>;
    fn person_by_account_id(&self, account_id: &str) -> Result<Option<Person>>;
    fn people(&self) -> Result<Vec<Person>>;
    fn groups_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>>;
    fn group_by_short_name(&self, short_name: &str) -> Result<Option<Group>>;
    fn groups(&self) -> Result<Vec<Group>>;
    fn organizations_by_ids(&self, ids: &[OrgId]) -> Result<Vec<Organization>>;
    fn organization_by_short_name(&self, short_name: &str) -> Result<Option<Organization>>;
    fn organizations(&self) -> Result<Vec<Organization>>;
    fn resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<SharedResource>>;
    fn resource_by_key(&self, unique_key: &str) -> Result<Option<SharedResource>>;
    fn scopes_by_ids(&self, ids: &[ScopeId]) -> Result<Vec<StreamScope>>;

    /// Scopes of the given organizations and of every person and group
    /// whose parent is one of them.
    fn scope_ids_in_organizations(&self, org_ids: &[OrgId]) -> Result<Vec<ScopeId>>;

    // -- following --

    /// Returns `false` if the follow already existed.
    fn follow_person(&self, follower: PersonId, target: PersonId) -> Result<bool>;
    fn follow_group(&self, follower: PersonId, group: GroupId) -> Result<bool>;
    fn person_follower_ids(&self, person: PersonId) -> Result<Vec<PersonId>>;
    fn group_follower_ids(&self, group: GroupId) -> Result<Vec<PersonId>>;
    /// Scopes of every person and group `person` follows.
    fn followed_scope_ids(&self, person: PersonId) -> Result<Vec<ScopeId>>;

    // -- stream views --

    fn create_stream_view(
        &self,
        name: &str,
        owner: Option<PersonId>,
        view_type: StreamViewType,
        scopes: Vec<StreamScope>,
    ) -> Result<StreamView>;
    fn stream_views_by_ids(&self, ids: &[StreamViewId]) -> Result<Vec<StreamView>>;
    fn stream_views(&self) -> Result<Vec<StreamView>>;
    /// Custom views whose included scopes contain `scope_id`.
    fn stream_views_containing_scope(&self, scope_id: ScopeId) -> Result<Vec<StreamView>>;
    fn update_stream_view(&self, view: &StreamView) -> Result<()>;
    fn delete_stream_view(&self, id: StreamViewId) -> Result<bool>;

    // -- activities --

    fn insert_activity(&self, activity: NewActivity) -> Result<Activity>;
    fn activities_by_ids(&self, ids: &[ActivityId]) -> Result<Vec<Activity>>;
    /// Removes the activity with its comments and stars.
    fn delete_activity(&self, id: ActivityId) -> Result<Option<DeletedActivity>>;
    /// Visible activities, newest first.
    fn everyone_activity_ids(&self, limit: usize) -> Result<Vec<ActivityId>>;
    /// Activities destined to, or sharing a link scoped by, any of
    /// `scope_ids`. Newest first.
    fn activity_ids_for_scopes(&self, scope_ids: &[ScopeId], limit: usize)
        -> Result<Vec<ActivityId>>;
    fn star_activity(&self, person: PersonId, activity: ActivityId) -> Result<bool>;
    fn starred_activity_ids(&self, person: PersonId, limit: usize) -> Result<Vec<ActivityId>>;

    // -- comments --

    fn insert_comment(&self, activity: ActivityId, author: PersonId, body: &str)
        -> Result<Comment>;
    fn comments_by_ids(&self, ids: &[CommentId]) -> Result<Vec<Comment>>;
    /// Comment ids on an activity in ascending order.
    fn comment_ids_for_activity(&self, activity: ActivityId) -> Result<Vec<CommentId>>;
    fn delete_comment(&self, id: CommentId) -> Result<Option<Comment>>;
}
