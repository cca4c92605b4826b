//! Follow-up work produced by write paths.
//!
//! A write collects [`TaskRequest`]s on an [`ActionContext`]. Only once the
//! record write has succeeded are they handed to the [`TaskQueue`]; a
//! [`TaskWorker`] executes them later against the cache.

use crate::activity_cache;
use crate::context::CacheContext;
use crate::delete::DeleteActivityCacheUpdater;
use crate::error::{Result, StoreError};
use crate::loader;
use crate::post::PostActivityCacheUpdater;
use crate::warmer::CacheWarmer;
use murmur_core::keys;
use murmur_core::task::TaskRequest;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

/// Tasks requested by one action, submitted together after it commits.
#[derive(Debug, Default)]
pub struct ActionContext {
    tasks: Vec<TaskRequest>,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: TaskRequest) {
        self.tasks.push(task);
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn into_tasks(self) -> Vec<TaskRequest> {
        self.tasks
    }
}

pub fn task_channel() -> (TaskQueue, TaskWorker) {
    let (sender, receiver) = mpsc::channel();
    (TaskQueue { sender }, TaskWorker { receiver })
}

#[derive(Clone)]
pub struct TaskQueue {
    sender: Sender<TaskRequest>,
}

impl TaskQueue {
    /// Enqueue every task of a committed action. Never waits for execution.
    pub fn submit(&self, actions: ActionContext) -> Result<usize> {
        let tasks = actions.into_tasks();
        let count = tasks.len();
        for task in tasks {
            debug!(task = task.name(), "queued task");
            self.sender
                .send(task)
                .map_err(|_| StoreError::TaskQueueClosed)?;
        }
        Ok(count)
    }
}

pub struct TaskWorker {
    receiver: Receiver<TaskRequest>,
}

impl TaskWorker {
    /// Execute queued tasks until the queue is empty. Stops at the first
    /// failure, leaving later tasks queued.
    pub fn drain(&self, ctx: CacheContext<'_>) -> Result<usize> {
        let mut executed = 0;
        while let Ok(task) = self.receiver.try_recv() {
            execute(ctx, &task)?;
            executed += 1;
        }
        Ok(executed)
    }
}

pub fn execute(ctx: CacheContext<'_>, task: &TaskRequest) -> Result<()> {
    debug!(task = task.name(), "executing task");
    match task {
        TaskRequest::PostActivityCacheUpdate { activity_id } => {
            match activity_cache::activity_by_id(ctx, *activity_id)? {
                Some(activity) => PostActivityCacheUpdater::new(ctx).execute(&activity),
                None => {
                    warn!(activity_id, "posted activity no longer exists");
                    Ok(())
                }
            }
        }
        TaskRequest::DeleteActivityCacheUpdate(request) => {
            DeleteActivityCacheUpdater::new(ctx).execute(request)?;
            Ok(())
        }
        TaskRequest::RefreshFollowed { person_id } => {
            ctx.cache.delete(&keys::activities_by_following(*person_id))?;
            loader::followed_activity_ids(ctx, *person_id)?;
            Ok(())
        }
        TaskRequest::RefreshStarred { person_id } => {
            ctx.cache.delete(&keys::starred_by_person(*person_id))?;
            loader::starred_activity_ids(ctx, *person_id)?;
            Ok(())
        }
        TaskRequest::WarmCache => {
            CacheWarmer::new(ctx).execute()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::records::RecordStore;
    use crate::testing::Fixture;

    #[test]
    fn submitted_tasks_run_on_drain() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        fx.cache.set_list(keys::EVERYONE_ACTIVITY_IDS, &[]).unwrap();
        let a = fx.post(&smithers, smithers.stream_scope_id);

        let (queue, worker) = task_channel();
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::PostActivityCacheUpdate { activity_id: a.id });
        assert_eq!(queue.submit(actions).unwrap(), 1);

        assert_eq!(
            fx.cache.get_list(keys::EVERYONE_ACTIVITY_IDS).unwrap(),
            Some(vec![])
        );
        assert_eq!(worker.drain(fx.ctx()).unwrap(), 1);
        assert_eq!(
            fx.cache.get_list(keys::EVERYONE_ACTIVITY_IDS).unwrap(),
            Some(vec![a.id])
        );
        assert_eq!(worker.drain(fx.ctx()).unwrap(), 0);
    }

    #[test]
    fn refresh_followed_rebuilds_list() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let burns = fx.person("mrburns");
        let a = fx.post(&smithers, smithers.stream_scope_id);
        fx.cache
            .set_list(&keys::activities_by_following(burns.id), &[])
            .unwrap();
        fx.records.follow_person(burns.id, smithers.id).unwrap();

        execute(fx.ctx(), &TaskRequest::RefreshFollowed { person_id: burns.id }).unwrap();
        assert_eq!(
            fx.cache
                .get_list(&keys::activities_by_following(burns.id))
                .unwrap(),
            Some(vec![a.id])
        );
    }

    #[test]
    fn failing_task_stops_the_drain() {
        let fx = Fixture::new();
        let (queue, worker) = task_channel();
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::RefreshStarred { person_id: 404 });
        actions.push(TaskRequest::WarmCache);
        queue.submit(actions).unwrap();

        assert!(worker.drain(fx.ctx()).is_err());
        assert_eq!(worker.drain(fx.ctx()).unwrap(), 1);
    }

    #[test]
    fn closed_queue_is_reported() {
        let (queue, worker) = task_channel();
        drop(worker);
        let mut actions = ActionContext::new();
        actions.push(TaskRequest::WarmCache);
        assert!(matches!(
            queue.submit(actions),
            Err(StoreError::TaskQueueClosed)
        ));
    }
}
