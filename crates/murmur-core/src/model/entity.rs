use crate::model::{GroupId, OrgId, PersonId, ResourceId, ScopeId, StreamViewId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub account_id: String,
    pub display_name: String,
    pub stream_scope_id: ScopeId,
    /// The custom view holding this person's own stream.
    pub entity_stream_view_id: StreamViewId,
    pub parent_org_id: OrgId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub short_name: String,
    pub name: String,
    pub stream_scope_id: ScopeId,
    pub entity_stream_view_id: StreamViewId,
    pub parent_org_id: OrgId,
}

/// An organization in the hierarchy. The root organization is its own parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub short_name: String,
    pub name: String,
    pub parent_org_id: OrgId,
    pub stream_scope_id: ScopeId,
    /// Custom view over the organization scope (its whole subtree).
    pub composite_stream_id: StreamViewId,
}

impl Organization {
    pub fn is_root(&self) -> bool {
        self.id == self.parent_org_id
    }
}

/// A shared link (URL) with its own entity stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedResource {
    pub id: ResourceId,
    pub unique_key: String,
    pub stream_scope_id: ScopeId,
}
