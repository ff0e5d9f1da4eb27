//! Observable projections over the persisted snapshot.

use crate::error::AppError;
use crate::models::{ListInfo, Movie, Snapshot};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// A continuously updating view of one part of the store.
///
/// Every live query on a database is fed from the same snapshot channel, so
/// movies and list info read through [`LiveQuery::snapshot`] always belong to
/// the same write. [`LiveQuery::changed`] wakes on any snapshot change, not
/// only changes to the projected part.
pub struct LiveQuery<T> {
    rx: watch::Receiver<Arc<Snapshot>>,
    project: fn(&Snapshot) -> T,
}

impl<T> Clone for LiveQuery<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            project: self.project,
        }
    }
}

impl<T> fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("snapshot", &*self.rx.borrow())
            .finish()
    }
}

fn project_movies(snapshot: &Snapshot) -> Vec<Movie> {
    snapshot.movies.clone()
}

fn project_list_info(snapshot: &Snapshot) -> Option<ListInfo> {
    snapshot.list_info
}

fn project_snapshot(snapshot: &Snapshot) -> Snapshot {
    snapshot.clone()
}

impl LiveQuery<Vec<Movie>> {
    /// Live query over all stored movies.
    pub fn movies(rx: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self {
            rx,
            project: project_movies,
        }
    }
}

impl LiveQuery<Option<ListInfo>> {
    /// Live query over the list-info singleton.
    pub fn list_info(rx: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self {
            rx,
            project: project_list_info,
        }
    }
}

impl LiveQuery<Snapshot> {
    /// Live query over the whole snapshot.
    pub fn snapshot(rx: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self {
            rx,
            project: project_snapshot,
        }
    }
}

impl<T> LiveQuery<T> {
    /// Current projected value, without marking it seen.
    pub fn get(&self) -> T {
        (self.project)(&self.rx.borrow())
    }

    /// Current projected value, marking it seen for [`Self::has_changed`].
    pub fn get_and_mark_seen(&mut self) -> T {
        (self.project)(&self.rx.borrow_and_update())
    }

    /// The whole snapshot behind this query.
    pub fn snapshot_now(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    /// Whether a snapshot newer than the last seen one was published.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next published snapshot and return the projected value.
    ///
    /// # Errors
    /// Returns [`AppError::FeedClosed`] once every database handle is gone.
    pub async fn changed(&mut self) -> Result<T, AppError> {
        self.rx.changed().await.map_err(|_| AppError::FeedClosed)?;
        Ok(self.get_and_mark_seen())
    }
}
