use crate::activity_cache;
use crate::cache::{Cache, MemoryCache};
use crate::comment::{DeleteComment, InsertComment, InsertCommentRequest};
use crate::config::Config;
use crate::context::CacheContext;
use crate::delete::DeleteActivity;
use crate::dispatcher::StreamActivityIds;
use crate::error::{Result, StoreError};
use crate::loader;
use crate::org_hierarchy;
use crate::records::{MemoryRecordStore, NewActivity, RecordStore};
use crate::stream_view::StreamViewUpdater;
use crate::tasks::{self, ActionContext, TaskQueue, TaskWorker};
use crate::warmer::{CacheWarmer, WarmReport};
use murmur_core::keys;
use murmur_core::model::{
    ActivityDto, ActivityId, CommentDto, CommentId, Group, Organization, Person, ScopeType,
    StreamScope, StreamView, StreamViewId, StreamViewType,
};
use murmur_core::task::TaskRequest;
use murmur_core::ValidationErrors;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MURMUR_DIR: &str = ".murmur";
const CONFIG_FILE: &str = "config.toml";
const RECORDS_FILE: &str = "records.json";
const CACHE_FILE: &str = "cache.json";

/// Names of the views every repository starts with.
const CORE_VIEWS: [(&str, StreamViewType); 4] = [
    ("Everyone", StreamViewType::Everyone),
    ("Following", StreamViewType::Followed),
    ("Starred", StreamViewType::Starred),
    ("My Organization", StreamViewType::ParentOrg),
];

/// Fields of a new activity, by account id and scope key.
#[derive(Debug, Clone)]
pub struct PostActivityRequest {
    pub actor: String,
    pub destination_type: ScopeType,
    pub destination: String,
    pub body: String,
    pub link: Option<String>,
    pub show_in_stream: bool,
}

/// An on-disk repository: configuration, record snapshot and cache snapshot
/// under `.murmur/`.
///
/// Every write goes through the record store first; cache follow-ups are
/// queued and drained before the call returns.
pub struct Repository {
    root: PathBuf,
    pub config: Config,
    pub records: MemoryRecordStore,
    pub cache: MemoryCache,
    dispatcher: StreamActivityIds,
    queue: TaskQueue,
    worker: TaskWorker,
}

impl Repository {
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let dir = root.join(MURMUR_DIR);
        if dir.exists() {
            return Err(StoreError::RepositoryExists(dir.display().to_string()));
        }
        fs::create_dir_all(&dir)?;

        let config = Config::default();
        fs::write(dir.join(CONFIG_FILE), config.to_toml()?)?;

        let records = MemoryRecordStore::new();
        for (name, view_type) in CORE_VIEWS {
            records.create_stream_view(name, None, view_type, vec![])?;
        }

        let repo = Self::assemble(root, config, records)?;
        repo.save()?;
        info!(path = %dir.display(), "initialized repository");
        Ok(repo)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let dir = root.join(MURMUR_DIR);
        if !dir.exists() {
            return Err(StoreError::RepositoryNotFound(root.display().to_string()));
        }

        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            Config::default()
        };
        let records_path = dir.join(RECORDS_FILE);
        let records = if records_path.exists() {
            MemoryRecordStore::load(&records_path)?
        } else {
            MemoryRecordStore::new()
        };
        let cold = !dir.join(CACHE_FILE).exists();
        let repo = Self::assemble(root, config, records)?;
        if cold {
            info!("no cache snapshot, warming from records");
            let mut actions = ActionContext::new();
            actions.push(TaskRequest::WarmCache);
            repo.commit(actions)?;
        }
        Ok(repo)
    }

    /// Search upward from `start` for a `.murmur/` directory and open it.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let mut current = start.as_ref().to_path_buf();
        loop {
            if current.join(MURMUR_DIR).exists() {
                return Self::open(&current);
            }
            if !current.pop() {
                return Err(StoreError::RepositoryNotFound(
                    start.as_ref().display().to_string(),
                ));
            }
        }
    }

    fn assemble(root: PathBuf, config: Config, records: MemoryRecordStore) -> Result<Self> {
        let cache = MemoryCache::load(
            &root.join(MURMUR_DIR).join(CACHE_FILE),
            config.cache.max_list_size,
        )?;
        let (queue, worker) = tasks::task_channel();
        Ok(Self {
            dispatcher: StreamActivityIds::from_config(&config.cache),
            root,
            config,
            records,
            cache,
            queue,
            worker,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ctx(&self) -> CacheContext<'_> {
        CacheContext::new(&self.cache, &self.records, &self.config)
    }

    /// Write both snapshots.
    pub fn save(&self) -> Result<()> {
        let dir = self.root.join(MURMUR_DIR);
        self.records.save(&dir.join(RECORDS_FILE))?;
        self.cache.save(&dir.join(CACHE_FILE))
    }

    /// Hand a committed action's tasks to the queue and run them.
    fn commit(&self, actions: ActionContext) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }
        self.queue.submit(actions)?;
        self.worker.drain(self.ctx())?;
        Ok(())
    }

    // -- entities --

    pub fn create_organization(
        &self,
        short_name: &str,
        name: &str,
        parent: Option<&str>,
    ) -> Result<Organization> {
        let parent_id = match parent {
            Some(short) => Some(self.organization(short)?.id),
            None => None,
        };
        let org = self.records.create_organization(short_name, name, parent_id)?;
        org_hierarchy::invalidate(self.ctx())?;
        Ok(org)
    }

    pub fn create_person(&self, account_id: &str, display_name: &str, org: &str) -> Result<Person> {
        let org = self.organization(org)?;
        self.records.create_person(account_id, display_name, org.id)
    }

    pub fn create_group(&self, short_name: &str, name: &str, org: &str) -> Result<Group> {
        let org = self.organization(org)?;
        self.records.create_group(short_name, name, org.id)
    }

    pub fn person(&self, account_id: &str) -> Result<Person> {
        self.records
            .person_by_account_id(account_id)?
            .ok_or_else(|| StoreError::PersonNotFound(account_id.to_string()))
    }

    pub fn group(&self, short_name: &str) -> Result<Group> {
        self.records
            .group_by_short_name(short_name)?
            .ok_or_else(|| StoreError::GroupNotFound(short_name.to_string()))
    }

    pub fn organization(&self, short_name: &str) -> Result<Organization> {
        self.records
            .organization_by_short_name(short_name)?
            .ok_or_else(|| StoreError::OrganizationNotFound(short_name.to_string()))
    }

    /// Resolve a scope by type and key. Resources must already exist.
    pub fn scope(&self, scope_type: ScopeType, key: &str) -> Result<StreamScope> {
        let scope_id = match scope_type {
            ScopeType::Person => self.person(key)?.stream_scope_id,
            ScopeType::Group => self.group(key)?.stream_scope_id,
            ScopeType::Organization => self.organization(key)?.stream_scope_id,
            ScopeType::Resource => match self.records.resource_by_key(key)? {
                Some(resource) => resource.stream_scope_id,
                None => {
                    let mut errors = ValidationErrors::new();
                    errors.add("scope", format!("no activity has shared '{key}'"));
                    return Err(errors.into());
                }
            },
        };
        self.records
            .scopes_by_ids(&[scope_id])?
            .into_iter()
            .next()
            .ok_or(StoreError::ScopeNotFound(scope_id))
    }

    // -- following and starring --

    pub fn follow_person(&self, follower: &str, target: &str) -> Result<bool> {
        let follower = self.person(follower)?;
        let target = self.person(target)?;
        if !self.records.follow_person(follower.id, target.id)? {
            return Ok(false);
        }
        self.cache.delete(&keys::followers_by_person(target.id))?;
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::RefreshFollowed {
            person_id: follower.id,
        });
        self.commit(actions)?;
        Ok(true)
    }

    pub fn follow_group(&self, follower: &str, group: &str) -> Result<bool> {
        let follower = self.person(follower)?;
        let group = self.group(group)?;
        if !self.records.follow_group(follower.id, group.id)? {
            return Ok(false);
        }
        self.cache.delete(&keys::followers_by_group(group.id))?;
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::RefreshFollowed {
            person_id: follower.id,
        });
        self.commit(actions)?;
        Ok(true)
    }

    pub fn star_activity(&self, account_id: &str, activity_id: ActivityId) -> Result<bool> {
        let person = self.person(account_id)?;
        if !self.records.star_activity(person.id, activity_id)? {
            return Ok(false);
        }
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::RefreshStarred {
            person_id: person.id,
        });
        self.commit(actions)?;
        Ok(true)
    }

    // -- activities --

    pub fn post_activity(&self, request: &PostActivityRequest) -> Result<ActivityDto> {
        let body = request.body.trim();
        if body.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("body", "activity must not be empty");
            return Err(errors.into());
        }
        if !matches!(request.destination_type, ScopeType::Person | ScopeType::Group) {
            return Err(StoreError::UnsupportedDestination(request.destination_type));
        }
        let actor = self.person(&request.actor)?;
        let actor_scope = self.scope(ScopeType::Person, &actor.account_id)?;
        let destination = self.scope(request.destination_type, &request.destination)?;
        let shared_link = match &request.link {
            Some(url) => Some(self.records.find_or_create_resource(url)?.id),
            None => None,
        };

        let activity = self.records.insert_activity(NewActivity {
            actor: actor_scope,
            destination,
            body: body.to_string(),
            show_in_stream: request.show_in_stream,
            shared_link,
        })?;

        let mut actions = ActionContext::new();
        actions.push(TaskRequest::PostActivityCacheUpdate {
            activity_id: activity.id,
        });
        self.commit(actions)?;

        self.activity(activity.id)?
            .ok_or(StoreError::ActivityNotFound(activity.id))
    }

    pub fn delete_activity(&self, activity_id: ActivityId) -> Result<Option<ActivityDto>> {
        let mut actions = ActionContext::new();
        let deleted = DeleteActivity::new(self.ctx()).execute(activity_id, &mut actions)?;
        self.commit(actions)?;
        Ok(deleted)
    }

    pub fn activity(&self, activity_id: ActivityId) -> Result<Option<ActivityDto>> {
        activity_cache::activity_by_id(self.ctx(), activity_id)
    }

    pub fn add_comment(
        &self,
        activity_id: ActivityId,
        author: &str,
        body: &str,
    ) -> Result<CommentDto> {
        let author = self.person(author)?;
        InsertComment::new(self.ctx()).execute(&InsertCommentRequest {
            activity_id,
            author_id: author.id,
            body: body.to_string(),
        })
    }

    pub fn delete_comment(&self, comment_id: CommentId) -> Result<bool> {
        DeleteComment::new(self.ctx()).execute(comment_id)
    }

    // -- streams --

    pub fn stream_views(&self) -> Result<Vec<StreamView>> {
        self.records.stream_views()
    }

    pub fn stream_activity_ids(
        &self,
        stream_id: StreamViewId,
        viewer: &str,
    ) -> Result<Vec<ActivityId>> {
        let viewer = self.person(viewer)?;
        self.dispatcher.execute(self.ctx(), stream_id, viewer.id)
    }

    pub fn stream_activities(
        &self,
        stream_id: StreamViewId,
        viewer: &str,
    ) -> Result<Vec<ActivityDto>> {
        let ids = self.stream_activity_ids(stream_id, viewer)?;
        activity_cache::activities_by_ids(self.ctx(), &ids)
    }

    /// Activities that shared `url`, newest first.
    pub fn resource_activity_ids(&self, url: &str) -> Result<Vec<ActivityId>> {
        let scope = self.scope(ScopeType::Resource, url)?;
        loader::entity_stream_activity_ids(self.ctx(), &scope)
    }

    pub fn create_stream_view(
        &self,
        owner: &str,
        name: &str,
        scopes: &[(ScopeType, String)],
    ) -> Result<StreamView> {
        let owner = self.person(owner)?;
        let scopes = scopes
            .iter()
            .map(|(scope_type, key)| self.scope(*scope_type, key))
            .collect::<Result<Vec<_>>>()?;
        StreamViewUpdater::new(self.ctx()).create(owner.id, name, scopes)
    }

    pub fn add_stream_scope(
        &self,
        view_id: StreamViewId,
        scope_type: ScopeType,
        key: &str,
    ) -> Result<StreamView> {
        let scope = self.scope(scope_type, key)?;
        StreamViewUpdater::new(self.ctx()).add_scope(view_id, scope)
    }

    pub fn remove_stream_scope(
        &self,
        view_id: StreamViewId,
        scope_type: ScopeType,
        key: &str,
    ) -> Result<StreamView> {
        let scope = self.scope(scope_type, key)?;
        StreamViewUpdater::new(self.ctx()).remove_scope(view_id, scope.id)
    }

    pub fn delete_stream_view(&self, view_id: StreamViewId) -> Result<bool> {
        StreamViewUpdater::new(self.ctx()).delete(view_id)
    }

    pub fn warm(&self) -> Result<WarmReport> {
        CacheWarmer::new(self.ctx()).execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(repo: &Repository, actor: &str, to: (ScopeType, &str), body: &str) -> ActivityDto {
        repo.post_activity(&PostActivityRequest {
            actor: actor.into(),
            destination_type: to.0,
            destination: to.1.into(),
            body: body.into(),
            link: None,
            show_in_stream: true,
        })
        .unwrap()
    }

    fn seeded() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.create_organization("springfield", "Springfield", None)
            .unwrap();
        repo.create_person("smithers", "Waylon Smithers", "springfield")
            .unwrap();
        repo.create_person("mrburns", "Montgomery Burns", "springfield")
            .unwrap();
        (dir, repo)
    }

    fn core_view(repo: &Repository, view_type: StreamViewType) -> StreamViewId {
        repo.stream_views()
            .unwrap()
            .into_iter()
            .find(|v| v.view_type == view_type && v.owner_id.is_none())
            .unwrap()
            .id
    }

    #[test]
    fn init_creates_core_views() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        let types: Vec<_> = repo
            .stream_views()
            .unwrap()
            .into_iter()
            .map(|v| v.view_type)
            .collect();
        assert_eq!(
            types,
            vec![
                StreamViewType::Everyone,
                StreamViewType::Followed,
                StreamViewType::Starred,
                StreamViewType::ParentOrg,
            ]
        );
    }

    #[test]
    fn init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        assert!(matches!(
            Repository::init(dir.path()),
            Err(StoreError::RepositoryExists(_))
        ));
    }

    #[test]
    fn discover_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let sub = dir.path().join("a").join("b");
        fs::create_dir_all(&sub).unwrap();
        let repo = Repository::discover(&sub).unwrap();
        assert_eq!(repo.root(), dir.path());
    }

    #[test]
    fn open_without_cache_snapshot_warms_from_records() {
        let (dir, repo) = seeded();
        let a = post(&repo, "smithers", (ScopeType::Person, "smithers"), "hello");
        repo.save().unwrap();
        fs::remove_file(dir.path().join(MURMUR_DIR).join(CACHE_FILE)).unwrap();

        let reopened = Repository::open(dir.path()).unwrap();
        assert_eq!(
            reopened.cache.get_list(keys::EVERYONE_ACTIVITY_IDS).unwrap(),
            Some(vec![a.id])
        );
    }

    #[test]
    fn posts_reach_warm_followed_and_everyone_lists() {
        let (_dir, repo) = seeded();
        repo.follow_person("mrburns", "smithers").unwrap();
        let everyone = core_view(&repo, StreamViewType::Everyone);
        let followed = core_view(&repo, StreamViewType::Followed);
        assert!(repo.stream_activity_ids(everyone, "mrburns").unwrap().is_empty());
        assert!(repo.stream_activity_ids(followed, "mrburns").unwrap().is_empty());

        let a = post(&repo, "smithers", (ScopeType::Person, "smithers"), "excellent");
        assert_eq!(repo.stream_activity_ids(everyone, "mrburns").unwrap(), vec![a.id]);
        assert_eq!(repo.stream_activity_ids(followed, "mrburns").unwrap(), vec![a.id]);
        assert!(repo.stream_activity_ids(followed, "smithers").unwrap().is_empty());
    }

    #[test]
    fn delete_removes_from_streams_and_survives_reload() {
        let (dir, repo) = seeded();
        let everyone = core_view(&repo, StreamViewType::Everyone);
        let keep = post(&repo, "smithers", (ScopeType::Person, "smithers"), "one");
        let gone = post(&repo, "mrburns", (ScopeType::Person, "smithers"), "two");
        assert_eq!(
            repo.stream_activity_ids(everyone, "smithers").unwrap(),
            vec![gone.id, keep.id]
        );

        assert!(repo.delete_activity(gone.id).unwrap().is_some());
        assert!(repo.delete_activity(gone.id).unwrap().is_none());
        assert_eq!(
            repo.stream_activity_ids(everyone, "smithers").unwrap(),
            vec![keep.id]
        );
        repo.save().unwrap();

        let reopened = Repository::open(dir.path()).unwrap();
        assert!(reopened
            .cache
            .contains(&keys::tombstone(gone.id))
            .unwrap());
        assert_eq!(
            reopened.stream_activity_ids(everyone, "smithers").unwrap(),
            vec![keep.id]
        );
    }

    #[test]
    fn group_posts_show_up_for_group_followers() {
        let (_dir, repo) = seeded();
        repo.create_group("plant", "Power Plant", "springfield")
            .unwrap();
        repo.follow_group("mrburns", "plant").unwrap();
        let followed = core_view(&repo, StreamViewType::Followed);
        assert!(repo.stream_activity_ids(followed, "mrburns").unwrap().is_empty());

        let a = post(&repo, "smithers", (ScopeType::Group, "plant"), "safety first");
        assert_eq!(repo.stream_activity_ids(followed, "mrburns").unwrap(), vec![a.id]);
    }

    #[test]
    fn organization_destination_is_rejected() {
        let (_dir, repo) = seeded();
        let err = repo
            .post_activity(&PostActivityRequest {
                actor: "smithers".into(),
                destination_type: ScopeType::Organization,
                destination: "springfield".into(),
                body: "hi".into(),
                link: None,
                show_in_stream: true,
            })
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn starring_refreshes_starred_stream() {
        let (_dir, repo) = seeded();
        let starred = core_view(&repo, StreamViewType::Starred);
        let a = post(&repo, "smithers", (ScopeType::Person, "smithers"), "star me");
        assert!(repo.stream_activity_ids(starred, "mrburns").unwrap().is_empty());

        assert!(repo.star_activity("mrburns", a.id).unwrap());
        assert!(!repo.star_activity("mrburns", a.id).unwrap());
        assert_eq!(repo.stream_activity_ids(starred, "mrburns").unwrap(), vec![a.id]);
    }

    #[test]
    fn shared_links_have_their_own_stream() {
        let (_dir, repo) = seeded();
        let a = repo
            .post_activity(&PostActivityRequest {
                actor: "smithers".into(),
                destination_type: ScopeType::Person,
                destination: "smithers".into(),
                body: "look".into(),
                link: Some("http://example.com".into()),
                show_in_stream: true,
            })
            .unwrap();
        assert_eq!(a.shared_link_scope.unwrap().unique_key, "http://example.com");
        assert_eq!(
            repo.resource_activity_ids("http://example.com").unwrap(),
            vec![a.id]
        );
    }

    #[test]
    fn custom_stream_edits_are_reflected() {
        let (_dir, repo) = seeded();
        let a = post(&repo, "smithers", (ScopeType::Person, "smithers"), "one");
        let b = post(&repo, "mrburns", (ScopeType::Person, "mrburns"), "two");
        let view = repo
            .create_stream_view("mrburns", "watch", &[(ScopeType::Person, "smithers".into())])
            .unwrap();
        assert_eq!(repo.stream_activity_ids(view.id, "mrburns").unwrap(), vec![a.id]);

        repo.add_stream_scope(view.id, ScopeType::Person, "mrburns")
            .unwrap();
        assert_eq!(
            repo.stream_activity_ids(view.id, "mrburns").unwrap(),
            vec![b.id, a.id]
        );

        repo.remove_stream_scope(view.id, ScopeType::Person, "smithers")
            .unwrap();
        assert_eq!(repo.stream_activity_ids(view.id, "mrburns").unwrap(), vec![b.id]);

        assert!(repo.delete_stream_view(view.id).unwrap());
        assert!(matches!(
            repo.stream_activity_ids(view.id, "mrburns"),
            Err(StoreError::StreamNotFound(_))
        ));
    }

    #[test]
    fn comments_flow_through_the_repository() {
        let (_dir, repo) = seeded();
        let a = post(&repo, "smithers", (ScopeType::Person, "smithers"), "post");
        let c = repo.add_comment(a.id, "mrburns", "excellent").unwrap();
        let cached = repo.activity(a.id).unwrap().unwrap();
        assert_eq!(cached.comment_count, 1);
        assert_eq!(cached.first_comment.unwrap().id, c.id);

        assert!(repo.delete_comment(c.id).unwrap());
        let cached = repo.activity(a.id).unwrap().unwrap();
        assert_eq!(cached.comment_count, 0);
        assert!(cached.last_comment.is_none());
    }
}
