//! Resolution of an activity's destination scope to the entity behind it,
//! and of the composite streams whose contents depend on that destination.

use crate::context::CacheContext;
use crate::error::{Result, StoreError};
use crate::{followers, org_hierarchy};
use murmur_core::model::{Group, OrgId, Person, PersonId, ScopeType, StreamScope, StreamViewId};
use std::collections::HashSet;

pub enum Destination {
    Person(Person),
    Group(Group),
    Resource(StreamScope),
}

impl Destination {
    /// Organizations are never a valid destination.
    pub fn resolve(ctx: CacheContext<'_>, scope: &StreamScope) -> Result<Self> {
        match scope.scope_type {
            ScopeType::Person => ctx
                .records
                .person_by_account_id(&scope.unique_key)?
                .map(Self::Person)
                .ok_or_else(|| StoreError::PersonNotFound(scope.unique_key.clone())),
            ScopeType::Group => ctx
                .records
                .group_by_short_name(&scope.unique_key)?
                .map(Self::Group)
                .ok_or_else(|| StoreError::GroupNotFound(scope.unique_key.clone())),
            ScopeType::Resource => Ok(Self::Resource(scope.clone())),
            ScopeType::Organization => Err(StoreError::UnsupportedDestination(scope.scope_type)),
        }
    }

    pub fn scope_type(&self) -> ScopeType {
        match self {
            Self::Person(_) => ScopeType::Person,
            Self::Group(_) => ScopeType::Group,
            Self::Resource(_) => ScopeType::Resource,
        }
    }

    fn parent_org_id(&self) -> Option<OrgId> {
        match self {
            Self::Person(p) => Some(p.parent_org_id),
            Self::Group(g) => Some(g.parent_org_id),
            Self::Resource(_) => None,
        }
    }

    /// Ids of the composite streams that show activities posted here: the
    /// destination's own entity stream, every custom view including the
    /// destination scope or the shared link's resource scope, and for each
    /// organization from the destination's parent up to the root, its
    /// composite stream plus every custom view including that organization.
    pub fn composite_stream_ids(
        &self,
        ctx: CacheContext<'_>,
        scope: &StreamScope,
        shared_link: Option<&StreamScope>,
    ) -> Result<Vec<StreamViewId>> {
        let mut ids = Vec::new();
        match self {
            Self::Person(p) => ids.push(p.entity_stream_view_id),
            Self::Group(g) => ids.push(g.entity_stream_view_id),
            Self::Resource(_) => {}
        }
        for view in ctx.records.stream_views_containing_scope(scope.id)? {
            ids.push(view.id);
        }
        if let Some(link) = shared_link {
            for view in ctx.records.stream_views_containing_scope(link.id)? {
                ids.push(view.id);
            }
        }
        if let Some(parent) = self.parent_org_id() {
            let org_ids = org_hierarchy::org_and_parents(ctx, parent)?;
            for org in ctx.records.organizations_by_ids(&org_ids)? {
                ids.push(org.composite_stream_id);
                for view in ctx.records.stream_views_containing_scope(org.stream_scope_id)? {
                    ids.push(view.id);
                }
            }
        }
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        Ok(ids)
    }

    /// People whose followed list can contain an activity posted here.
    ///
    /// For a shared resource these are the followers of `actor`.
    pub fn follower_ids(&self, ctx: CacheContext<'_>, actor: &StreamScope) -> Result<Vec<PersonId>> {
        match self {
            Self::Person(p) => followers::person_follower_ids(ctx, p.id),
            Self::Group(g) => followers::group_follower_ids(ctx, g.id),
            Self::Resource(_) => {
                if actor.scope_type != ScopeType::Person {
                    return Err(StoreError::UnsupportedActor(actor.scope_type));
                }
                let person = ctx
                    .records
                    .person_by_account_id(&actor.unique_key)?
                    .ok_or_else(|| StoreError::PersonNotFound(actor.unique_key.clone()))?;
                followers::person_follower_ids(ctx, person.id)
            }
        }
    }
}
