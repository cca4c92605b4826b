use super::open_repo;
use anyhow::{Context, Result};

pub fn add(account_id: String, name: Option<String>, org: String, json: bool) -> Result<()> {
    let repo = open_repo()?;
    let name = name.unwrap_or_else(|| account_id.clone());
    let person = repo
        .create_person(&account_id, &name, &org)
        .context("failed to create person")?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&person)?);
    } else {
        println!("Created person '{}' in '{}'", person.account_id, org);
    }
    Ok(())
}
