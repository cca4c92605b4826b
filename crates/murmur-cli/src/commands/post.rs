use super::{open_repo, parse_scope};
use anyhow::Result;
use murmur_core::model::ScopeType;
use murmur_store::repository::PostActivityRequest;

pub fn run(
    actor: String,
    to: Option<String>,
    body: String,
    link: Option<String>,
    hidden: bool,
    json: bool,
) -> Result<()> {
    let repo = open_repo()?;
    let (destination_type, destination) = match to {
        Some(target) => parse_scope(&target)?,
        None => (ScopeType::Person, actor.clone()),
    };
    let activity = repo.post_activity(&PostActivityRequest {
        actor,
        destination_type,
        destination,
        body,
        link,
        show_in_stream: !hidden,
    })?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&activity)?);
    } else {
        println!("Posted activity #{}", activity.id);
    }
    Ok(())
}
