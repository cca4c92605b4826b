use super::open_repo;
use anyhow::Result;

pub fn run(activity_id: i64, person: String) -> Result<()> {
    let repo = open_repo()?;
    let starred = repo.star_activity(&person, activity_id)?;
    repo.save()?;

    if starred {
        println!("{} starred activity #{}", person, activity_id);
    } else {
        println!("{} had already starred activity #{}", person, activity_id);
    }
    Ok(())
}
