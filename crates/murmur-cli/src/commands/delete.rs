use super::open_repo;
use anyhow::{bail, Result};

pub fn run(activity_id: i64) -> Result<()> {
    let repo = open_repo()?;
    let deleted = repo.delete_activity(activity_id)?;
    repo.save()?;

    match deleted {
        Some(activity) => println!("Deleted activity #{}", activity.id),
        None => bail!("activity #{} not found", activity_id),
    }
    Ok(())
}
