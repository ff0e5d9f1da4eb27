//! Snapshot reads and the change feed that backs live queries.

use super::tables::{LIST_INFO, MOVIES};
use crate::constants::LIST_INFO_KEY;
use crate::error::AppError;
use crate::models::{ListInfo, Movie, Snapshot};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;
use tokio::sync::watch;

pub(super) fn encode_movie_rows(movies: &[Movie]) -> Result<Vec<(u32, Vec<u8>)>, AppError> {
    crate::models::movie::dedupe_by_id(movies)
        .into_iter()
        .enumerate()
        .map(|(position, movie)| {
            let key = u32::try_from(position).map_err(|_| {
                AppError::StorageMessage("Too many movies for a single snapshot".to_string())
            })?;
            Ok((key, bincode::serialize(movie)?))
        })
        .collect()
}

pub(super) fn write_movie_rows(
    table: &mut redb::Table<'_, u32, &'static [u8]>,
    rows: &[(u32, Vec<u8>)],
) -> Result<(), AppError> {
    table.retain(|_, _| false)?;
    for (position, encoded) in rows {
        table.insert(*position, encoded.as_slice())?;
    }
    Ok(())
}

/// Read the full movie collection and list info in one read transaction.
///
/// # Returns
/// The committed [`Snapshot`], movies ordered by insertion position.
///
/// # Errors
/// Returns an error when storage access or deserialization fails.
pub fn read_snapshot(db: &redb::Database) -> Result<Snapshot, AppError> {
    let read_txn = db.begin_read()?;

    let movies_table = read_txn.open_table(MOVIES)?;
    let mut movies = Vec::new();
    for entry in movies_table.iter()? {
        let (_, value) = entry?;
        movies.push(bincode::deserialize::<Movie>(value.value())?);
    }

    let info_table = read_txn.open_table(LIST_INFO)?;
    let list_info = match info_table.get(LIST_INFO_KEY)? {
        Some(value) => Some(bincode::deserialize::<ListInfo>(value.value())?),
        None => None,
    };

    Ok(Snapshot { movies, list_info })
}

/// Broadcasts the committed snapshot to every live query.
///
/// Cloning shares the same underlying channel.
#[derive(Clone)]
pub struct SnapshotFeed {
    tx: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl SnapshotFeed {
    pub(crate) fn new(initial: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Last snapshot published to observers.
    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Re-read the store and publish if the committed state differs.
    ///
    /// The read happens while the channel is held, so concurrent refreshes
    /// publish in commit order.
    ///
    /// # Returns
    /// `true` when observers were notified.
    ///
    /// # Errors
    /// Returns an error when the snapshot cannot be read; observers keep the
    /// previous value.
    pub(crate) fn refresh(&self, db: &redb::Database) -> Result<bool, AppError> {
        let mut outcome = Ok(());
        let changed = self.tx.send_if_modified(|current| match read_snapshot(db) {
            Ok(next) if **current != next => {
                *current = Arc::new(next);
                true
            }
            Ok(_) => false,
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome.map(|()| changed)
    }

    /// Refresh after a committed write, logging instead of failing.
    ///
    /// The write is already durable at this point; a failed re-read only
    /// delays observers until the next successful refresh.
    pub(crate) fn publish_after_commit(&self, db: &redb::Database) {
        if let Err(err) = self.refresh(db) {
            tracing::error!("Failed to publish snapshot after commit: {}", err);
        }
    }
}
