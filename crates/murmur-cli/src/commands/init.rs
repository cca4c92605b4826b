use anyhow::{Context, Result};
use murmur_store::Repository;
use std::env;

pub fn run() -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    Repository::init(&cwd).context("failed to initialize repository")?;
    println!(
        "Initialized empty murmur repository in {}",
        cwd.join(".murmur").display()
    );
    Ok(())
}
