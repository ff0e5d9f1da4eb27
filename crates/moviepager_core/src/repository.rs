//! Store-backed repositories.
//!
//! These are thin mediators: they own no state beyond a shared [`Database`]
//! handle, and every write goes straight to storage. Observers receive the
//! result through the live queries once the write commits.

use crate::db::{Database, SnapshotOps};
use crate::error::AppError;
use crate::live::LiveQuery;
use crate::models::{ListInfo, Movie, Snapshot};

/// Mediator for the movie collection.
pub struct MovieRepository {
    store: Database,
}

impl Clone for MovieRepository {
    fn clone(&self) -> Self {
        Self {
            store: self.store.share(),
        }
    }
}

impl MovieRepository {
    /// Build a repository sharing `db`'s underlying storage and feed.
    pub fn new(db: &Database) -> Self {
        Self { store: db.share() }
    }

    /// Live query over all stored movies.
    pub fn current_movies(&self) -> LiveQuery<Vec<Movie>> {
        LiveQuery::movies(self.store.feed().subscribe())
    }

    /// Live query over movies and list info together.
    pub fn current_snapshot(&self) -> LiveQuery<Snapshot> {
        LiveQuery::snapshot(self.store.feed().subscribe())
    }

    /// Replace the whole movie collection.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn replace_all(&self, movies: &[Movie]) -> Result<(), AppError> {
        self.store.movies.replace_all(movies)
    }

    /// Replace the movie collection and the list info in one transaction.
    ///
    /// # Errors
    /// Returns an error when the write fails; nothing is committed then.
    pub fn replace_snapshot(&self, info: &ListInfo, movies: &[Movie]) -> Result<(), AppError> {
        SnapshotOps::replace_snapshot(&self.store, info, movies)
    }

    /// Delete every stored movie.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn clear_all(&self) -> Result<(), AppError> {
        self.store.movies.clear()
    }

    /// Delete movies and list info in one transaction.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn clear_snapshot(&self) -> Result<(), AppError> {
        SnapshotOps::clear_snapshot(&self.store)
    }

    /// Re-publish what is persisted to every observer.
    ///
    /// # Returns
    /// The snapshot observers now hold.
    ///
    /// # Errors
    /// Returns an error when the store cannot be read.
    pub fn reload(&self) -> Result<Snapshot, AppError> {
        self.store.refresh_feed()?;
        Ok(self.store.feed().current().as_ref().clone())
    }
}

/// Mediator for the list-info singleton.
pub struct ListInfoRepository {
    store: Database,
}

impl Clone for ListInfoRepository {
    fn clone(&self) -> Self {
        Self {
            store: self.store.share(),
        }
    }
}

impl ListInfoRepository {
    /// Build a repository sharing `db`'s underlying storage and feed.
    pub fn new(db: &Database) -> Self {
        Self { store: db.share() }
    }

    /// Live query over the list-info singleton.
    pub fn current_list_info(&self) -> LiveQuery<Option<ListInfo>> {
        LiveQuery::list_info(self.store.feed().subscribe())
    }

    /// Overwrite the singleton.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn replace_info(&self, info: &ListInfo) -> Result<(), AppError> {
        self.store.list_info.replace(info)
    }

    /// Delete the singleton.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn clear_info(&self) -> Result<(), AppError> {
        self.store.list_info.clear().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_movies, setup_temp_db};

    #[test]
    fn repositories_share_one_store() {
        let (db, _dir) = setup_temp_db();
        let movies = MovieRepository::new(&db);
        let info = ListInfoRepository::new(&db);
        let observed_movies = movies.current_movies();
        let observed_info = info.current_list_info();

        movies.replace_all(&sample_movies(3)).expect("replace movies");
        info.replace_info(&ListInfo::new(1, 3, 1)).expect("replace info");

        assert_eq!(observed_movies.get(), sample_movies(3));
        assert_eq!(observed_info.get(), Some(ListInfo::new(1, 3, 1)));
        assert_eq!(db.snapshot().expect("snapshot").movies.len(), 3);
    }

    #[test]
    fn clear_operations_empty_their_record_kind() {
        let (db, _dir) = setup_temp_db();
        let movies = MovieRepository::new(&db);
        let info = ListInfoRepository::new(&db);
        movies
            .replace_snapshot(&ListInfo::new(1, 2, 1), &sample_movies(2))
            .expect("replace");

        movies.clear_all().expect("clear movies");
        let snapshot = movies.current_snapshot().get();
        assert!(snapshot.movies.is_empty());
        assert!(snapshot.list_info.is_some());

        info.clear_info().expect("clear info");
        assert!(movies.current_snapshot().get().is_empty());
    }

    #[test]
    fn cloned_repository_writes_reach_original_observers() {
        let (db, _dir) = setup_temp_db();
        let info = ListInfoRepository::new(&db);
        let observed = info.current_list_info();

        info.clone()
            .replace_info(&ListInfo::new(2, 40, 2))
            .expect("replace via clone");

        assert_eq!(observed.get(), Some(ListInfo::new(2, 40, 2)));
    }

    #[test]
    fn reload_reports_persisted_state() {
        let (db, _dir) = setup_temp_db();
        let movies = MovieRepository::new(&db);
        movies
            .replace_snapshot(&ListInfo::new(1, 2, 1), &sample_movies(2))
            .expect("replace");

        let reloaded = movies.reload().expect("reload");
        assert_eq!(reloaded.movies, sample_movies(2));
        assert_eq!(reloaded.list_info, Some(ListInfo::new(1, 2, 1)));
    }
}
