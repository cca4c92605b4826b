pub mod comment;
pub mod delete;
pub mod follow;
pub mod group;
pub mod init;
pub mod org;
pub mod person;
pub mod post;
pub mod show;
pub mod star;
pub mod stream;
pub mod warm;

use anyhow::{anyhow, Context, Result};
use murmur_core::model::{ActivityDto, ScopeType};
use murmur_store::Repository;
use std::env;

pub fn open_repo() -> Result<Repository> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    Repository::discover(&cwd).context("not a murmur repository")
}

/// Parse a `type:key` scope reference such as `person:smithers`.
pub fn parse_scope(reference: &str) -> Result<(ScopeType, String)> {
    let (kind, key) = reference
        .split_once(':')
        .ok_or_else(|| anyhow!("scope '{}' must look like type:key", reference))?;
    if key.is_empty() {
        return Err(anyhow!("scope '{}' has an empty key", reference));
    }
    Ok((kind.parse::<ScopeType>()?, key.to_string()))
}

pub fn print_activity_line(activity: &ActivityDto) {
    let comments = match activity.comment_count {
        0 => String::new(),
        1 => " (1 comment)".to_string(),
        n => format!(" ({} comments)", n),
    };
    println!(
        "#{} {} -> {}:{} {}{}",
        activity.id,
        activity.actor.unique_key,
        activity.destination.scope_type,
        activity.destination.unique_key,
        activity.body,
        comments
    );
}
