//! List-info singleton storage backed by redb.

use super::snapshot::SnapshotFeed;
use super::tables::LIST_INFO;
use crate::{constants::LIST_INFO_KEY, error::AppError, models::ListInfo};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the `list_info` table.
#[derive(Clone)]
pub struct ListInfoDb {
    db: Arc<redb::Database>,
    feed: SnapshotFeed,
}

impl ListInfoDb {
    pub(super) fn from_shared(db: Arc<redb::Database>, feed: SnapshotFeed) -> Self {
        Self { db, feed }
    }

    /// Fetch the singleton, if one has been written.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self) -> Result<Option<ListInfo>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIST_INFO)?;
        match table.get(LIST_INFO_KEY)? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Overwrite the singleton.
    ///
    /// The stored row always carries [`LIST_INFO_KEY`] regardless of
    /// `info.id`.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn replace(&self, info: &ListInfo) -> Result<(), AppError> {
        let encoded = bincode::serialize(&ListInfo {
            id: LIST_INFO_KEY,
            ..*info
        })?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LIST_INFO)?;
            table.insert(LIST_INFO_KEY, encoded.as_slice())?;
        }
        write_txn.commit()?;
        self.feed.publish_after_commit(&self.db);
        Ok(())
    }

    /// Delete the singleton.
    ///
    /// # Returns
    /// `true` if a row was removed.
    ///
    /// # Errors
    /// Returns an error when storage operations fail.
    pub fn clear(&self) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(LIST_INFO)?;
            let previous = table.remove(LIST_INFO_KEY)?;
            previous.is_some()
        };
        write_txn.commit()?;
        self.feed.publish_after_commit(&self.db);
        Ok(removed)
    }
}
