//! Movie storage operations backed by redb.

use super::snapshot::{encode_movie_rows, write_movie_rows, SnapshotFeed};
use super::tables::MOVIES;
use crate::{error::AppError, models::Movie};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};
use std::sync::Arc;

/// Accessor for the `movies` table.
#[derive(Clone)]
pub struct MovieDb {
    db: Arc<redb::Database>,
    feed: SnapshotFeed,
}

impl MovieDb {
    pub(super) fn from_shared(db: Arc<redb::Database>, feed: SnapshotFeed) -> Self {
        Self { db, feed }
    }

    /// List all stored movies in insertion order.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list(&self) -> Result<Vec<Movie>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVIES)?;
        let mut movies = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            movies.push(bincode::deserialize(value.value())?);
        }
        Ok(movies)
    }

    /// Number of stored movies.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn count(&self) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MOVIES)?;
        Ok(table.len()?)
    }

    /// Replace every stored movie with `movies`.
    ///
    /// Rows not present in `movies` are removed. The list-info row is left
    /// alone; use [`super::SnapshotOps::replace_snapshot`] to swap both.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn replace_all(&self, movies: &[Movie]) -> Result<(), AppError> {
        let rows = encode_movie_rows(movies)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MOVIES)?;
            write_movie_rows(&mut table, &rows)?;
        }
        write_txn.commit()?;
        self.feed.publish_after_commit(&self.db);
        Ok(())
    }

    /// Delete every stored movie.
    ///
    /// # Errors
    /// Returns an error when storage operations fail.
    pub fn clear(&self) -> Result<(), AppError> {
        self.replace_all(&[])
    }
}
