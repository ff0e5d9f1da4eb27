//! Shared test-only helpers for moviepager_core.

use crate::models::Movie;
use crate::Database;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Movies with ids `1..=count` and predictable titles.
pub(crate) fn sample_movies(count: u64) -> Vec<Movie> {
    (1..=count)
        .map(|id| Movie::new(id, format!("movie-{}", id)))
        .collect()
}
