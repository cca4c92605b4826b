use super::open_repo;
use anyhow::{bail, Result};

pub fn add(activity_id: i64, author: String, body: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let comment = repo.add_comment(activity_id, &author, &body)?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comment)?);
    } else {
        println!("Added comment #{} to activity #{}", comment.id, activity_id);
    }
    Ok(())
}

pub fn delete(comment_id: i64) -> Result<()> {
    let repo = open_repo()?;
    if !repo.delete_comment(comment_id)? {
        bail!("comment #{} not found", comment_id);
    }
    repo.save()?;
    println!("Deleted comment #{}", comment_id);
    Ok(())
}
