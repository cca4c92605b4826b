use super::open_repo;
use anyhow::{Context, Result};

pub fn add(short_name: String, name: Option<String>, parent: Option<String>, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let name = name.unwrap_or_else(|| short_name.clone());
    let org = repo
        .create_organization(&short_name, &name, parent.as_deref())
        .context("failed to create organization")?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&org)?);
    } else if org.is_root() {
        println!("Created root organization '{}'", org.short_name);
    } else {
        println!("Created organization '{}'", org.short_name);
    }
    Ok(())
}
