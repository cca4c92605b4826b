use super::{open_repo, parse_scope, print_activity_line};
use anyhow::{bail, Context, Result};

pub fn list(json: bool) -> Result<()> {
    let repo = open_repo()?;
    let views = repo.stream_views()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    for view in views {
        let owner = view
            .owner_id
            .map(|id| format!(" (owner #{})", id))
            .unwrap_or_default();
        println!(
            "{:>4}  {:<10} {}{}",
            view.id,
            view.view_type.as_str(),
            view.name,
            owner
        );
    }
    Ok(())
}

pub fn ids(stream_id: i64, viewer: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let ids = repo
        .stream_activity_ids(stream_id, &viewer)
        .context(format!("failed to load stream {}", stream_id))?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        for id in ids {
            println!("{}", id);
        }
    }
    Ok(())
}

pub fn show(stream_id: i64, viewer: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let activities = repo
        .stream_activities(stream_id, &viewer)
        .context(format!("failed to load stream {}", stream_id))?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&activities)?);
        return Ok(());
    }
    if activities.is_empty() {
        println!("(no activities)");
    }
    for activity in &activities {
        print_activity_line(activity);
    }
    Ok(())
}

pub fn create(name: String, owner: String, scopes: Vec<String>, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let scopes = scopes
        .iter()
        .map(|s| parse_scope(s))
        .collect::<Result<Vec<_>>>()?;
    let view = repo
        .create_stream_view(&owner, &name, &scopes)
        .context("failed to create stream")?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Created stream #{} '{}'", view.id, view.name);
    }
    Ok(())
}

pub fn add_scope(stream_id: i64, scope: String) -> Result<()> {
    let repo = open_repo()?;
    let (scope_type, key) = parse_scope(&scope)?;
    let view = repo.add_stream_scope(stream_id, scope_type, &key)?;
    repo.save()?;
    println!(
        "Stream #{} now includes {} scope(s)",
        view.id,
        view.included_scopes.len()
    );
    Ok(())
}

pub fn remove_scope(stream_id: i64, scope: String) -> Result<()> {
    let repo = open_repo()?;
    let (scope_type, key) = parse_scope(&scope)?;
    let view = repo.remove_stream_scope(stream_id, scope_type, &key)?;
    repo.save()?;
    println!(
        "Stream #{} now includes {} scope(s)",
        view.id,
        view.included_scopes.len()
    );
    Ok(())
}

pub fn delete(stream_id: i64) -> Result<()> {
    let repo = open_repo()?;
    if !repo.delete_stream_view(stream_id)? {
        bail!("stream {} not found", stream_id);
    }
    repo.save()?;
    println!("Deleted stream #{}", stream_id);
    Ok(())
}

pub fn resource(url: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let ids = repo.resource_activity_ids(&url)?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        for id in ids {
            println!("{}", id);
        }
    }
    Ok(())
}
