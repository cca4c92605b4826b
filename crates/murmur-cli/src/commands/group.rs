use super::open_repo;
use anyhow::{Context, Result};

pub fn add(short_name: String, name: Option<String>, org: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let name = name.unwrap_or_else(|| short_name.clone());
    let group = repo
        .create_group(&short_name, &name, &org)
        .context("failed to create group")?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&group)?);
    } else {
        println!("Created group '{}' in '{}'", group.short_name, org);
    }
    Ok(())
}
