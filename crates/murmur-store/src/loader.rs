//! Composite-stream loaders.
//!
//! Each loader returns the activity ids of one stream, newest first. A warm
//! list is returned as is; a cold one is queried from the record store,
//! capped at the configured result limit, and cached.

use crate::context::CacheContext;
use crate::dispatcher;
use crate::error::{Result, StoreError};
use crate::org_hierarchy;
use murmur_core::keys;
use murmur_core::model::{
    ActivityId, Person, PersonId, ScopeId, ScopeType, StreamScope, StreamView, StreamViewType,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLoader {
    Everyone,
    Followed,
    Starred,
    ParentOrg,
    Custom,
}

impl StreamLoader {
    pub fn for_view_type(view_type: StreamViewType) -> Self {
        match view_type {
            StreamViewType::Everyone => Self::Everyone,
            StreamViewType::Followed => Self::Followed,
            StreamViewType::Starred => Self::Starred,
            StreamViewType::ParentOrg => Self::ParentOrg,
            StreamViewType::Custom => Self::Custom,
        }
    }

    pub fn load(
        self,
        ctx: CacheContext<'_>,
        view: &StreamView,
        user: PersonId,
    ) -> Result<Vec<ActivityId>> {
        match self {
            Self::Everyone => everyone_activity_ids(ctx),
            Self::Followed => followed_activity_ids(ctx, user),
            Self::Starred => starred_activity_ids(ctx, user),
            Self::ParentOrg => parent_org_activity_ids(ctx, user),
            Self::Custom => custom_activity_ids(ctx, view),
        }
    }
}

pub fn everyone_activity_ids(ctx: CacheContext<'_>) -> Result<Vec<ActivityId>> {
    ctx.read_through_list(keys::EVERYONE_ACTIVITY_IDS, || {
        ctx.records.everyone_activity_ids(ctx.max_results())
    })
}

pub fn followed_activity_ids(ctx: CacheContext<'_>, user: PersonId) -> Result<Vec<ActivityId>> {
    ctx.read_through_list(&keys::activities_by_following(user), || {
        require_person(ctx, user)?;
        let scopes = ctx.records.followed_scope_ids(user)?;
        ctx.records.activity_ids_for_scopes(&scopes, ctx.max_results())
    })
}

pub fn starred_activity_ids(ctx: CacheContext<'_>, user: PersonId) -> Result<Vec<ActivityId>> {
    ctx.read_through_list(&keys::starred_by_person(user), || {
        require_person(ctx, user)?;
        ctx.records.starred_activity_ids(user, ctx.max_results())
    })
}

/// The composite stream of the viewing user's parent organization.
pub fn parent_org_activity_ids(ctx: CacheContext<'_>, user: PersonId) -> Result<Vec<ActivityId>> {
    let person = require_person(ctx, user)?;
    let org = ctx
        .records
        .organizations_by_ids(&[person.parent_org_id])?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::OrganizationNotFound(person.parent_org_id.to_string()))?;
    let view = dispatcher::composite_streams_by_ids(ctx, &[org.composite_stream_id])?
        .into_iter()
        .next()
        .ok_or(StoreError::StreamNotFound(org.composite_stream_id))?;
    custom_activity_ids(ctx, &view)
}

/// Union of the activities of every scope the view includes.
pub fn custom_activity_ids(ctx: CacheContext<'_>, view: &StreamView) -> Result<Vec<ActivityId>> {
    ctx.read_through_list(&keys::activities_by_composite_stream(view.id), || {
        scope_activity_ids(ctx, &view.included_scopes)
    })
}

/// Activities posted to, or linking, a single scope. Backs the entity stream
/// of shared resources.
pub fn entity_stream_activity_ids(
    ctx: CacheContext<'_>,
    scope: &StreamScope,
) -> Result<Vec<ActivityId>> {
    ctx.read_through_list(&keys::entity_stream_by_scope(scope.id), || {
        scope_activity_ids(ctx, std::slice::from_ref(scope))
    })
}

/// Query the record store for the activities of `scopes`. An organization
/// scope stands for its whole subtree.
pub(crate) fn scope_activity_ids(
    ctx: CacheContext<'_>,
    scopes: &[StreamScope],
) -> Result<Vec<ActivityId>> {
    let mut scope_ids: BTreeSet<ScopeId> = BTreeSet::new();
    for scope in scopes {
        if scope.scope_type != ScopeType::Organization {
            scope_ids.insert(scope.id);
            continue;
        }
        let org = ctx
            .records
            .organization_by_short_name(&scope.unique_key)?
            .ok_or_else(|| StoreError::OrganizationNotFound(scope.unique_key.clone()))?;
        let mut org_ids = vec![org.id];
        org_ids.extend(org_hierarchy::recursive_child_org_ids(ctx, org.id)?);
        scope_ids.extend(ctx.records.scope_ids_in_organizations(&org_ids)?);
    }
    let scope_ids: Vec<ScopeId> = scope_ids.into_iter().collect();
    ctx.records
        .activity_ids_for_scopes(&scope_ids, ctx.max_results())
}

fn require_person(ctx: CacheContext<'_>, id: PersonId) -> Result<Person> {
    ctx.records
        .people_by_ids(&[id])?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::PersonNotFound(id.to_string()))
}
