//! Data models for the catalog API and persistence.

/// Movie, list-info and page models.
pub mod movie;

pub use movie::{ListInfo, Movie, MoviePage, Snapshot};

#[cfg(test)]
mod tests;
