use crate::error::Result;
use murmur_core::model::StreamViewType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Repository configuration, stored as `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub comments: CommentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lists longer than this are trimmed from the tail on write.
    pub max_list_size: usize,
    /// Row limit for the record-store query behind a cache miss.
    pub max_results: usize,
    /// Stream types the dispatcher has a loader registered for.
    pub loaders: Vec<StreamViewType>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_list_size: 10_000,
            max_results: 1_000,
            loaders: StreamViewType::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub max_length: usize,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self { max_length: 1_000 }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
