use super::{DeletedActivity, NewActivity, RecordStore};
use crate::error::{Result, StoreError};
use crate::lockfile;
use chrono::Utc;
use murmur_core::model::{
    Activity, ActivityId, Comment, CommentId, Group, GroupId, OrgId, Organization, Person,
    PersonId, ResourceId, ScopeId, ScopeType, SharedResource, StreamScope, StreamView,
    StreamViewId, StreamViewType,
};
use murmur_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const SNAPSHOT_KIND: &str = "records";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Sequences {
    scope: i64,
    organization: i64,
    person: i64,
    group: i64,
    resource: i64,
    view: i64,
    activity: i64,
    comment: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Follow {
    follower: PersonId,
    target: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Star {
    person: PersonId,
    activity: ActivityId,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    seq: Sequences,
    #[serde(default)]
    scopes: Vec<StreamScope>,
    #[serde(default)]
    organizations: Vec<Organization>,
    #[serde(default)]
    people: Vec<Person>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    resources: Vec<SharedResource>,
    #[serde(default)]
    views: Vec<StreamView>,
    #[serde(default)]
    activities: Vec<Activity>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    person_follows: Vec<Follow>,
    #[serde(default)]
    group_follows: Vec<Follow>,
    #[serde(default)]
    stars: Vec<Star>,
}

impl Tables {
    fn new_scope(&mut self, scope_type: ScopeType, unique_key: &str) -> StreamScope {
        let scope = StreamScope::new(scope_type, unique_key, next(&mut self.seq.scope));
        self.scopes.push(scope.clone());
        scope
    }

    fn new_view(
        &mut self,
        name: &str,
        owner: Option<PersonId>,
        view_type: StreamViewType,
        scopes: Vec<StreamScope>,
    ) -> StreamView {
        let view = StreamView {
            id: next(&mut self.seq.view),
            name: name.to_string(),
            owner_id: owner,
            view_type,
            included_scopes: scopes,
        };
        self.views.push(view.clone());
        view
    }

    fn has_org(&self, id: OrgId) -> bool {
        self.organizations.iter().any(|o| o.id == id)
    }
}

/// Record store kept in memory and persisted as a checksummed snapshot.
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
    activity_queries: AtomicUsize,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            activity_queries: AtomicUsize::new(0),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let tables: Tables = murmur_core::snapshot::decode(SNAPSHOT_KIND, &data)?;
        debug!(
            activities = tables.activities.len(),
            people = tables.people.len(),
            "loaded record snapshot"
        );
        Ok(Self {
            tables: RwLock::new(tables),
            activity_queries: AtomicUsize::new(0),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = murmur_core::snapshot::encode(SNAPSHOT_KIND, &*self.read()?)?;
        lockfile::write_snapshot(path, &data)
    }

    /// Number of activity-id list queries served so far.
    pub fn activity_query_count(&self) -> usize {
        self.activity_queries.load(Ordering::Relaxed)
    }

    fn count_activity_query(&self) {
        self.activity_queries.fetch_add(1, Ordering::Relaxed);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::LockConflict("record store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::LockConflict("record store lock poisoned".into()))
    }
}

fn newest_first(mut ids: Vec<ActivityId>, limit: usize) -> Vec<ActivityId> {
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.dedup();
    ids.truncate(limit);
    ids
}

fn by_ids<T: Clone, K: PartialEq>(rows: &[T], ids: &[K], key: impl Fn(&T) -> K) -> Vec<T> {
    ids.iter()
        .filter_map(|id| rows.iter().find(|row| &key(row) == id).cloned())
        .collect()
}

impl RecordStore for MemoryRecordStore {
    fn create_organization(
        &self,
        short_name: &str,
        name: &str,
        parent: Option<OrgId>,
    ) -> Result<Organization> {
        let mut t = self.write()?;
        let mut errors = ValidationErrors::new();
        if short_name.trim().is_empty() {
            errors.add("short_name", "must not be empty");
        } else if t.organizations.iter().any(|o| o.short_name == short_name) {
            errors.add("short_name", format!("'{short_name}' is already taken"));
        }
        if parent.is_none() && t.organizations.iter().any(Organization::is_root) {
            errors.add("parent", "a root organization already exists");
        }
        errors.into_result()?;
        if let Some(parent) = parent {
            if !t.has_org(parent) {
                return Err(StoreError::OrganizationNotFound(parent.to_string()));
            }
        }

        let id = next(&mut t.seq.organization);
        let scope = t.new_scope(ScopeType::Organization, short_name);
        let view = t.new_view(name, None, StreamViewType::Custom, vec![scope.clone()]);
        let org = Organization {
            id,
            short_name: short_name.to_string(),
            name: name.to_string(),
            parent_org_id: parent.unwrap_or(id),
            stream_scope_id: scope.id,
            composite_stream_id: view.id,
        };
        t.organizations.push(org.clone());
        Ok(org)
    }

    fn create_person(
        &self,
        account_id: &str,
        display_name: &str,
        parent_org: OrgId,
    ) -> Result<Person> {
        let mut t = self.write()?;
        let mut errors = ValidationErrors::new();
        if account_id.trim().is_empty() {
            errors.add("account_id", "must not be empty");
        } else if t.people.iter().any(|p| p.account_id == account_id) {
            errors.add("account_id", format!("'{account_id}' is already taken"));
        }
        errors.into_result()?;
        if !t.has_org(parent_org) {
            return Err(StoreError::OrganizationNotFound(parent_org.to_string()));
        }

        let id = next(&mut t.seq.person);
        let scope = t.new_scope(ScopeType::Person, account_id);
        let view = t.new_view(
            display_name,
            Some(id),
            StreamViewType::Custom,
            vec![scope.clone()],
        );
        let person = Person {
            id,
            account_id: account_id.to_string(),
            display_name: display_name.to_string(),
            stream_scope_id: scope.id,
            entity_stream_view_id: view.id,
            parent_org_id: parent_org,
        };
        t.people.push(person.clone());
        Ok(person)
    }

    fn create_group(&self, short_name: &str, name: &str, parent_org: OrgId) -> Result<Group> {
        let mut t = self.write()?;
        let mut errors = ValidationErrors::new();
        if short_name.trim().is_empty() {
            errors.add("short_name", "must not be empty");
        } else if t.groups.iter().any(|g| g.short_name == short_name) {
            errors.add("short_name", format!("'{short_name}' is already taken"));
        }
        errors.into_result()?;
        if !t.has_org(parent_org) {
            return Err(StoreError::OrganizationNotFound(parent_org.to_string()));
        }

        let id = next(&mut t.seq.group);
        let scope = t.new_scope(ScopeType::Group, short_name);
        let view = t.new_view(name, None, StreamViewType::Custom, vec![scope.clone()]);
        let group = Group {
            id,
            short_name: short_name.to_string(),
            name: name.to_string(),
            stream_scope_id: scope.id,
            entity_stream_view_id: view.id,
            parent_org_id: parent_org,
        };
        t.groups.push(group.clone());
        Ok(group)
    }

    fn find_or_create_resource(&self, unique_key: &str) -> Result<SharedResource> {
        let mut t = self.write()?;
        if let Some(existing) = t.resources.iter().find(|r| r.unique_key == unique_key) {
            return Ok(existing.clone());
        }
        let id = next(&mut t.seq.resource);
        let scope = t.new_scope(ScopeType::Resource, unique_key);
        let resource = SharedResource {
            id,
            unique_key: unique_key.to_string(),
            stream_scope_id: scope.id,
        };
        t.resources.push(resource.clone());
        Ok(resource)
    }

    fn people_by_ids(&self, ids: &[PersonId]) -> Result<Vec<Person>> {
        Ok(by_ids(&self.read()?.people, ids, |p| p.id))
    }

    fn person_by_account_id(&self, account_id: &str) -> Result<Option<Person>> {
        Ok(self
            .read()?
            .people
            .iter()
            .find(|p| p.account_id == account_id)
            .cloned())
    }

    fn people(&self) -> Result<Vec<Person>> {
        Ok(self.read()?.people.clone())
    }

    fn groups_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        Ok(by_ids(&self.read()?.groups, ids, |g| g.id))
    }

    fn group_by_short_name(&self, short_name: &str) -> Result<Option<Group>> {
        Ok(self
            .read()?
            .groups
            .iter()
            .find(|g| g.short_name == short_name)
            .cloned())
    }

    fn groups(&self) -> Result<Vec<Group>> {
        Ok(self.read()?.groups.clone())
    }

    fn organizations_by_ids(&self, ids: &[OrgId]) -> Result<Vec<Organization>> {
        Ok(by_ids(&self.read()?.organizations, ids, |o| o.id))
    }

    fn organization_by_short_name(&self, short_name: &str) -> Result<Option<Organization>> {
        Ok(self
            .read()?
            .organizations
            .iter()
            .find(|o| o.short_name == short_name)
            .cloned())
    }

    fn organizations(&self) -> Result<Vec<Organization>> {
        Ok(self.read()?.organizations.clone())
    }

    fn resources_by_ids(&self, ids: &[ResourceId]) -> Result<Vec<SharedResource>> {
        Ok(by_ids(&self.read()?.resources, ids, |r| r.id))
    }

    fn resource_by_key(&self, unique_key: &str) -> Result<Option<SharedResource>> {
        Ok(self
            .read()?
            .resources
            .iter()
            .find(|r| r.unique_key == unique_key)
            .cloned())
    }

    fn scopes_by_ids(&self, ids: &[ScopeId]) -> Result<Vec<StreamScope>> {
        Ok(by_ids(&self.read()?.scopes, ids, |s| s.id))
    }

    fn scope_ids_in_organizations(&self, org_ids: &[OrgId]) -> Result<Vec<ScopeId>> {
        let t = self.read()?;
        let mut scopes: BTreeSet<ScopeId> = BTreeSet::new();
        scopes.extend(
            t.organizations
                .iter()
                .filter(|o| org_ids.contains(&o.id))
                .map(|o| o.stream_scope_id),
        );
        scopes.extend(
            t.people
                .iter()
                .filter(|p| org_ids.contains(&p.parent_org_id))
                .map(|p| p.stream_scope_id),
        );
        scopes.extend(
            t.groups
                .iter()
                .filter(|g| org_ids.contains(&g.parent_org_id))
                .map(|g| g.stream_scope_id),
        );
        Ok(scopes.into_iter().collect())
    }

    fn follow_person(&self, follower: PersonId, target: PersonId) -> Result<bool> {
        let mut t = self.write()?;
        let follow = Follow { follower, target };
        if follower == target || t.person_follows.contains(&follow) {
            return Ok(false);
        }
        t.person_follows.push(follow);
        Ok(true)
    }

    fn follow_group(&self, follower: PersonId, group: GroupId) -> Result<bool> {
        let mut t = self.write()?;
        let follow = Follow {
            follower,
            target: group,
        };
        if t.group_follows.contains(&follow) {
            return Ok(false);
        }
        t.group_follows.push(follow);
        Ok(true)
    }

    fn person_follower_ids(&self, person: PersonId) -> Result<Vec<PersonId>> {
        Ok(self
            .read()?
            .person_follows
            .iter()
            .filter(|f| f.target == person)
            .map(|f| f.follower)
            .collect())
    }

    fn group_follower_ids(&self, group: GroupId) -> Result<Vec<PersonId>> {
        Ok(self
            .read()?
            .group_follows
            .iter()
            .filter(|f| f.target == group)
            .map(|f| f.follower)
            .collect())
    }

    fn followed_scope_ids(&self, person: PersonId) -> Result<Vec<ScopeId>> {
        let t = self.read()?;
        let people = t
            .person_follows
            .iter()
            .filter(|f| f.follower == person)
            .filter_map(|f| t.people.iter().find(|p| p.id == f.target))
            .map(|p| p.stream_scope_id);
        let groups = t
            .group_follows
            .iter()
            .filter(|f| f.follower == person)
            .filter_map(|f| t.groups.iter().find(|g| g.id == f.target))
            .map(|g| g.stream_scope_id);
        Ok(people.chain(groups).collect())
    }

    fn create_stream_view(
        &self,
        name: &str,
        owner: Option<PersonId>,
        view_type: StreamViewType,
        scopes: Vec<StreamScope>,
    ) -> Result<StreamView> {
        if name.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("name", "must not be empty");
            return Err(errors.into());
        }
        Ok(self.write()?.new_view(name, owner, view_type, scopes))
    }

    fn stream_views_by_ids(&self, ids: &[StreamViewId]) -> Result<Vec<StreamView>> {
        Ok(by_ids(&self.read()?.views, ids, |v| v.id))
    }

    fn stream_views(&self) -> Result<Vec<StreamView>> {
        Ok(self.read()?.views.clone())
    }

    fn stream_views_containing_scope(&self, scope_id: ScopeId) -> Result<Vec<StreamView>> {
        Ok(self
            .read()?
            .views
            .iter()
            .filter(|v| v.view_type == StreamViewType::Custom && v.includes_scope(scope_id))
            .cloned()
            .collect())
    }

    fn update_stream_view(&self, view: &StreamView) -> Result<()> {
        let mut t = self.write()?;
        let existing = t
            .views
            .iter_mut()
            .find(|v| v.id == view.id)
            .ok_or(StoreError::StreamNotFound(view.id))?;
        *existing = view.clone();
        Ok(())
    }

    fn delete_stream_view(&self, id: StreamViewId) -> Result<bool> {
        let mut t = self.write()?;
        let before = t.views.len();
        t.views.retain(|v| v.id != id);
        Ok(t.views.len() != before)
    }

    fn insert_activity(&self, new: NewActivity) -> Result<Activity> {
        let mut t = self.write()?;
        let activity = Activity {
            id: next(&mut t.seq.activity),
            actor: new.actor,
            destination: new.destination,
            body: new.body,
            posted_time: Utc::now(),
            show_in_stream: new.show_in_stream,
            shared_link: new.shared_link,
            flagged: false,
        };
        t.activities.push(activity.clone());
        Ok(activity)
    }

    fn activities_by_ids(&self, ids: &[ActivityId]) -> Result<Vec<Activity>> {
        Ok(by_ids(&self.read()?.activities, ids, |a| a.id))
    }

    fn delete_activity(&self, id: ActivityId) -> Result<Option<DeletedActivity>> {
        let mut t = self.write()?;
        let Some(pos) = t.activities.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        let activity = t.activities.remove(pos);

        let mut comment_ids: Vec<CommentId> = t
            .comments
            .iter()
            .filter(|c| c.activity_id == id)
            .map(|c| c.id)
            .collect();
        comment_ids.sort_unstable();
        t.comments.retain(|c| c.activity_id != id);

        let person_ids_with_starred: Vec<PersonId> = t
            .stars
            .iter()
            .filter(|s| s.activity == id)
            .map(|s| s.person)
            .collect();
        t.stars.retain(|s| s.activity != id);

        Ok(Some(DeletedActivity {
            activity,
            comment_ids,
            person_ids_with_starred,
        }))
    }

    fn everyone_activity_ids(&self, limit: usize) -> Result<Vec<ActivityId>> {
        self.count_activity_query();
        let ids = self
            .read()?
            .activities
            .iter()
            .filter(|a| a.show_in_stream)
            .map(|a| a.id)
            .collect();
        Ok(newest_first(ids, limit))
    }

    fn activity_ids_for_scopes(
        &self,
        scope_ids: &[ScopeId],
        limit: usize,
    ) -> Result<Vec<ActivityId>> {
        self.count_activity_query();
        let t = self.read()?;
        let link_scope = |a: &Activity| {
            a.shared_link
                .and_then(|rid| t.resources.iter().find(|r| r.id == rid))
                .map(|r| r.stream_scope_id)
        };
        let ids = t
            .activities
            .iter()
            .filter(|a| {
                scope_ids.contains(&a.destination.id)
                    || link_scope(a).is_some_and(|s| scope_ids.contains(&s))
            })
            .map(|a| a.id)
            .collect();
        Ok(newest_first(ids, limit))
    }

    fn star_activity(&self, person: PersonId, activity: ActivityId) -> Result<bool> {
        let mut t = self.write()?;
        if !t.activities.iter().any(|a| a.id == activity) {
            return Err(StoreError::ActivityNotFound(activity));
        }
        let star = Star { person, activity };
        if t.stars.contains(&star) {
            return Ok(false);
        }
        t.stars.push(star);
        Ok(true)
    }

    fn starred_activity_ids(&self, person: PersonId, limit: usize) -> Result<Vec<ActivityId>> {
        self.count_activity_query();
        let ids = self
            .read()?
            .stars
            .iter()
            .filter(|s| s.person == person)
            .map(|s| s.activity)
            .collect();
        Ok(newest_first(ids, limit))
    }

    fn insert_comment(
        &self,
        activity: ActivityId,
        author: PersonId,
        body: &str,
    ) -> Result<Comment> {
        let mut t = self.write()?;
        if !t.activities.iter().any(|a| a.id == activity) {
            return Err(StoreError::ActivityNotFound(activity));
        }
        let comment = Comment {
            id: next(&mut t.seq.comment),
            activity_id: activity,
            author_id: author,
            body: body.to_string(),
            time_sent: Utc::now(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    fn comments_by_ids(&self, ids: &[CommentId]) -> Result<Vec<Comment>> {
        Ok(by_ids(&self.read()?.comments, ids, |c| c.id))
    }

    fn comment_ids_for_activity(&self, activity: ActivityId) -> Result<Vec<CommentId>> {
        let mut ids: Vec<CommentId> = self
            .read()?
            .comments
            .iter()
            .filter(|c| c.activity_id == activity)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn delete_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        let mut t = self.write()?;
        let Some(pos) = t.comments.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        Ok(Some(t.comments.remove(pos)))
    }
}
