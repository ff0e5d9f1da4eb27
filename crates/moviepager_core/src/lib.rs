//! Core domain library for MoviePager (config, storage, models, live queries).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer and snapshot transactions.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Observable views over the persisted snapshot.
pub mod live;
/// Data models for the catalog API and persistence.
pub mod models;
/// Store-backed repositories handed to the sync layer.
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, LIST_INFO_KEY};
pub use db::Database;
pub use error::AppError;
pub use live::LiveQuery;
pub use models::{ListInfo, Movie, MoviePage, Snapshot};
pub use repository::{ListInfoRepository, MovieRepository};
