use crate::error::CoreError;
use crate::model::{PersonId, ScopeId, StreamViewId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of entity a stream scope points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Person,
    Group,
    Organization,
    Resource,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Group => "group",
            Self::Organization => "organization",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "group" => Ok(Self::Group),
            "organization" | "org" => Ok(Self::Organization),
            "resource" => Ok(Self::Resource),
            other => Err(CoreError::UnknownScopeType(other.to_string())),
        }
    }
}

/// A person, group, organization or resource as a stream endpoint.
///
/// Immutable once it has an id; activities and composite streams refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamScope {
    pub id: ScopeId,
    pub scope_type: ScopeType,
    pub unique_key: String,
}

impl StreamScope {
    pub fn new(scope_type: ScopeType, unique_key: impl Into<String>, id: ScopeId) -> Self {
        Self {
            id,
            scope_type,
            unique_key: unique_key.into(),
        }
    }
}

/// Selects which loader computes a composite stream's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamViewType {
    Everyone,
    Followed,
    Starred,
    ParentOrg,
    Custom,
}

impl StreamViewType {
    pub const ALL: [StreamViewType; 5] = [
        Self::Everyone,
        Self::Followed,
        Self::Starred,
        Self::ParentOrg,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Everyone => "everyone",
            Self::Followed => "followed",
            Self::Starred => "starred",
            Self::ParentOrg => "parent_org",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for StreamViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamViewType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStreamViewType(s.to_string()))
    }
}

/// A named aggregation of stream scopes (a composite stream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamView {
    pub id: StreamViewId,
    pub name: String,
    /// `None` for the core views shared by everybody.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<PersonId>,
    pub view_type: StreamViewType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_scopes: Vec<StreamScope>,
}

impl StreamView {
    pub fn includes_scope(&self, scope_id: ScopeId) -> bool {
        self.included_scopes.iter().any(|s| s.id == scope_id)
    }
}
