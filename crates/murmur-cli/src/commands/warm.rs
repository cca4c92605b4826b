use super::open_repo;
use anyhow::{Context, Result};

pub fn run(json: bool) -> Result<()> {
    let repo = open_repo()?;
    let report = repo.warm().context("failed to warm cache")?;
    repo.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Warmed cache: {} organizations, {} people, {} streams, {} activities in everyone",
            report.organizations, report.people, report.stream_views, report.everyone
        );
    }
    Ok(())
}
