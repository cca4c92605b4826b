//! Organization tree lookups, cached per organization.

use crate::context::CacheContext;
use crate::error::Result;
use murmur_core::keys;
use murmur_core::model::{OrgId, Organization};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Parent/child index over a set of organizations.
pub struct OrgHierarchy {
    parents: HashMap<OrgId, OrgId>,
    children: HashMap<OrgId, Vec<OrgId>>,
}

impl OrgHierarchy {
    pub fn build(orgs: &[Organization]) -> Self {
        let mut parents = HashMap::new();
        let mut children: HashMap<OrgId, Vec<OrgId>> = HashMap::new();
        for org in orgs {
            if org.is_root() {
                continue;
            }
            parents.insert(org.id, org.parent_org_id);
            children.entry(org.parent_org_id).or_default().push(org.id);
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }
        Self { parents, children }
    }

    /// Every descendant of `org`, breadth first. Excludes `org` itself.
    pub fn recursive_children(&self, org: OrgId) -> Vec<OrgId> {
        let mut seen = HashSet::from([org]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([org]);
        while let Some(current) = queue.pop_front() {
            for child in self.children.get(&current).into_iter().flatten() {
                if seen.insert(*child) {
                    out.push(*child);
                    queue.push_back(*child);
                }
            }
        }
        out
    }

    /// Ancestors of `org`, nearest first, ending with the root.
    pub fn recursive_parents(&self, org: OrgId) -> Vec<OrgId> {
        let mut seen = HashSet::from([org]);
        let mut out = Vec::new();
        let mut current = org;
        while let Some(parent) = self.parents.get(&current) {
            if !seen.insert(*parent) {
                break;
            }
            out.push(*parent);
            current = *parent;
        }
        out
    }
}

pub fn recursive_child_org_ids(ctx: CacheContext<'_>, org: OrgId) -> Result<Vec<OrgId>> {
    ctx.read_through_list(&keys::org_recursive_children(org), || {
        Ok(OrgHierarchy::build(&ctx.records.organizations()?).recursive_children(org))
    })
}

pub fn recursive_parent_org_ids(ctx: CacheContext<'_>, org: OrgId) -> Result<Vec<OrgId>> {
    ctx.read_through_list(&keys::org_recursive_parents(org), || {
        Ok(OrgHierarchy::build(&ctx.records.organizations()?).recursive_parents(org))
    })
}

/// `org` followed by its ancestors.
pub fn org_and_parents(ctx: CacheContext<'_>, org: OrgId) -> Result<Vec<OrgId>> {
    let mut ids = vec![org];
    ids.extend(recursive_parent_org_ids(ctx, org)?);
    Ok(ids)
}

/// Write both lists for every organization.
pub fn warm(ctx: CacheContext<'_>) -> Result<usize> {
    let orgs = ctx.records.organizations()?;
    let hierarchy = OrgHierarchy::build(&orgs);
    for org in &orgs {
        ctx.cache.set_list(
            &keys::org_recursive_children(org.id),
            &hierarchy.recursive_children(org.id),
        )?;
        ctx.cache.set_list(
            &keys::org_recursive_parents(org.id),
            &hierarchy.recursive_parents(org.id),
        )?;
    }
    debug!(count = orgs.len(), "warmed organization hierarchy");
    Ok(orgs.len())
}

/// Drop both lists for every organization. Needed whenever the tree changes.
pub fn invalidate(ctx: CacheContext<'_>) -> Result<()> {
    for org in ctx.records.organizations()? {
        ctx.cache.delete(&keys::org_recursive_children(org.id))?;
        ctx.cache.delete(&keys::org_recursive_parents(org.id))?;
    }
    Ok(())
}
