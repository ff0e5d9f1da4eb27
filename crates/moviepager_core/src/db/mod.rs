//! Database layer and snapshot transactions for MoviePager.

/// List-info singleton storage helpers.
pub mod list_info;
/// Movie storage helpers.
pub mod movie;
/// Snapshot reads and the change feed.
pub mod snapshot;
/// redb table definitions.
pub mod tables;
/// Atomic two-table snapshot writes.
pub mod transactions;

use crate::constants::REDB_FILE_NAME;
use crate::error::AppError;
use crate::models::Snapshot;
use std::path::Path;
use std::sync::Arc;

pub use snapshot::{read_snapshot, SnapshotFeed};
pub use transactions::SnapshotOps;


/// Database handle with access to the movie and list-info tables.
///
/// All handles derived through [`Database::share`] publish to the same
/// [`SnapshotFeed`], so a write through any of them reaches every observer.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub movies: movie::MovieDb,
    pub list_info: list_info::ListInfoDb,
    feed: SnapshotFeed,
}

impl Database {
    /// Open (or create) the database under the `path` directory.
    ///
    /// # Returns
    /// A fully initialized [`Database`] whose feed holds the committed state.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, redb cannot open
    /// the file (for example when it is already open elsewhere), or the
    /// tables cannot be initialized.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(REDB_FILE_NAME);
        let db = Arc::new(redb::Database::create(&file)?);
        let write_txn = db.begin_write()?;
        write_txn.open_table(tables::MOVIES)?;
        write_txn.open_table(tables::LIST_INFO)?;
        write_txn.commit()?;

        let feed = SnapshotFeed::new(read_snapshot(&db)?);
        tracing::debug!("opened movie database at {}", file.display());
        Ok(Self::from_parts(db, feed))
    }

    fn from_parts(db: Arc<redb::Database>, feed: SnapshotFeed) -> Self {
        Self {
            movies: movie::MovieDb::from_shared(db.clone(), feed.clone()),
            list_info: list_info::ListInfoDb::from_shared(db.clone(), feed.clone()),
            db,
            feed,
        }
    }

    /// Clone this handle for another component in the same process.
    ///
    /// redb refuses a second open of the same file, so components share the
    /// underlying instance and its feed instead.
    pub fn share(&self) -> Self {
        Self::from_parts(self.db.clone(), self.feed.clone())
    }

    /// Change feed shared by every handle on this database.
    pub fn feed(&self) -> &SnapshotFeed {
        &self.feed
    }

    /// Read the committed snapshot directly from storage.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn snapshot(&self) -> Result<Snapshot, AppError> {
        read_snapshot(&self.db)
    }

    /// Re-publish the committed snapshot to observers.
    ///
    /// # Returns
    /// `true` when the published value changed.
    ///
    /// # Errors
    /// Returns an error when the snapshot cannot be read.
    pub fn refresh_feed(&self) -> Result<bool, AppError> {
        self.feed.refresh(&self.db)
    }
}
