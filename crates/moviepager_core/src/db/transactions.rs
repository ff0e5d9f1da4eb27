//! Atomic cross-table writes that keep movies and list info paired.

use super::snapshot::{encode_movie_rows, write_movie_rows};
use super::tables::{LIST_INFO, MOVIES};
use super::Database;
use crate::constants::LIST_INFO_KEY;
use crate::error::AppError;
use crate::models::{ListInfo, Movie};

/// Snapshot-level operations that write both tables in one transaction.
pub struct SnapshotOps;

impl SnapshotOps {
    /// Replace the movie collection and the list-info singleton together.
    ///
    /// Every previously stored movie is removed; nothing is merged. Observers
    /// are notified once, after the commit.
    ///
    /// # Arguments
    /// - `db`: Open database handle.
    /// - `info`: Pagination metadata of the response being stored.
    /// - `movies`: Full result list of the response being stored.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail. On
    /// error nothing is committed.
    pub fn replace_snapshot(
        db: &Database,
        info: &ListInfo,
        movies: &[Movie],
    ) -> Result<(), AppError> {
        let rows = encode_movie_rows(movies)?;
        let encoded_info = bincode::serialize(&ListInfo {
            id: LIST_INFO_KEY,
            ..*info
        })?;

        let write_txn = db.db.begin_write()?;
        {
            let mut movie_table = write_txn.open_table(MOVIES)?;
            let mut info_table = write_txn.open_table(LIST_INFO)?;
            write_movie_rows(&mut movie_table, &rows)?;
            info_table.insert(LIST_INFO_KEY, encoded_info.as_slice())?;
        }
        write_txn.commit()?;
        db.feed().publish_after_commit(&db.db);
        Ok(())
    }

    /// Delete every movie and the list-info singleton together.
    ///
    /// # Errors
    /// Returns an error when storage operations fail.
    pub fn clear_snapshot(db: &Database) -> Result<(), AppError> {
        let write_txn = db.db.begin_write()?;
        {
            let mut movie_table = write_txn.open_table(MOVIES)?;
            let mut info_table = write_txn.open_table(LIST_INFO)?;
            movie_table.retain(|_, _| false)?;
            info_table.retain(|_, _| false)?;
        }
        write_txn.commit()?;
        db.feed().publish_after_commit(&db.db);
        Ok(())
    }
}
