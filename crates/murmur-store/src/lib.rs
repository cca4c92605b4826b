pub mod activity_cache;
pub mod cache;
pub mod comment;
pub mod config;
pub mod context;
pub mod delete;
pub mod destination;
pub mod dispatcher;
pub mod error;
pub mod followers;
pub mod loader;
pub mod lockfile;
pub mod org_hierarchy;
pub mod post;
pub mod records;
pub mod repository;
pub mod stream_view;
pub mod tasks;
pub mod warmer;

pub use context::CacheContext;
pub use error::StoreError;
pub use repository::Repository;
