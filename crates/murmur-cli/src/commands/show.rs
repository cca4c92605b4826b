use super::open_repo;
use anyhow::{Context, Result};
use chrono::Local;
use murmur_store::activity_cache;

pub fn run(activity_id: i64, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let activity = repo
        .activity(activity_id)?
        .context(format!("activity #{} not found", activity_id))?;
    let comment_ids = activity_cache::comment_ids(repo.ctx(), activity_id)?;
    let comments = activity_cache::comments_by_ids(repo.ctx(), &comment_ids)?;
    repo.save()?;

    if json {
        let output = serde_json::json!({
            "activity": activity,
            "comments": comments,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("activity #{}", activity.id);
    println!("Actor:       {}", activity.actor.unique_key);
    println!(
        "Destination: {}:{}",
        activity.destination.scope_type, activity.destination.unique_key
    );
    println!(
        "Date:        {}",
        activity
            .posted_time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %Z")
    );
    if let Some(link) = &activity.shared_link_scope {
        println!("Link:        {}", link.unique_key);
    }
    if !activity.show_in_stream {
        println!("Hidden from everyone stream");
    }
    println!();
    println!("    {}", activity.body);

    if !comments.is_empty() {
        println!();
        println!("Comments ({}):", activity.comment_count);
        for comment in &comments {
            println!(
                "  #{} {} [{}]: {}",
                comment.id,
                comment.author_account_id,
                comment.time_sent.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                comment.body
            );
        }
    }
    Ok(())
}
