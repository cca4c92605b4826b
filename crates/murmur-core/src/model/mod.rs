pub mod activity;
pub mod comment;
pub mod entity;
pub mod stream;

pub use activity::{Activity, ActivityDto};
pub use comment::{Comment, CommentDto};
pub use entity::{Group, Organization, Person, SharedResource};
pub use stream::{ScopeType, StreamScope, StreamView, StreamViewType};

pub type ActivityId = i64;
pub type CommentId = i64;
pub type PersonId = i64;
pub type GroupId = i64;
pub type OrgId = i64;
pub type ResourceId = i64;
pub type ScopeId = i64;
pub type StreamViewId = i64;
