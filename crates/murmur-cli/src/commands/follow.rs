use super::{open_repo, parse_scope};
use anyhow::{bail, Result};
use murmur_core::model::ScopeType;

pub fn run(follower: String, target: String) -> Result<()> {
    let repo = open_repo()?;
    let (scope_type, key) = parse_scope(&target)?;
    let created = match scope_type {
        ScopeType::Person => repo.follow_person(&follower, &key)?,
        ScopeType::Group => repo.follow_group(&follower, &key)?,
        other => bail!("cannot follow a {}", other),
    };
    repo.save()?;

    if created {
        println!("{} now follows {}", follower, target);
    } else {
        println!("{} already follows {}", follower, target);
    }
    Ok(())
}
