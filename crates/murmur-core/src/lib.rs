//! Domain model for the murmur activity cache.
//!
//! Records of truth (people, groups, organizations, activities, comments,
//! stream views), their cached representations, the cache key namespace and
//! the follow-up task intents produced by write paths.

pub mod error;
pub mod keys;
pub mod model;
pub mod snapshot;
pub mod task;
pub mod validation;

pub use error::CoreError;
pub use validation::ValidationErrors;
