//! Sync controller wiring.
//!
//! The controller is the caller-facing half: it validates requests, forwards
//! them to the observation worker and hands out live queries. All decisions
//! and every store write happen on the worker thread.

mod worker;

use crate::connectivity::Connectivity;
use crate::error::SyncError;
use crate::protocol::{SyncCmd, SyncEvent};
use crate::remote::CatalogClient;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use moviepager_core::{
    ListInfo, ListInfoRepository, LiveQuery, Movie, MovieRepository, Snapshot,
};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

use self::worker::SyncWorker;

/// Collaborators injected into [`SyncController::initialize`].
pub struct SyncDeps {
    pub movies: MovieRepository,
    pub list_info: ListInfoRepository,
    pub catalog: Arc<dyn CatalogClient>,
    pub connectivity: Arc<dyn Connectivity>,
    /// Runtime that executes remote fetches.
    pub runtime: tokio::runtime::Handle,
    pub api_key: String,
}

/// Orchestrates "load page N" against the network or the persisted snapshot.
pub struct SyncController {
    cmd_tx: Sender<SyncCmd>,
    evt_rx: Receiver<SyncEvent>,
    movies: LiveQuery<Vec<Movie>>,
    list_info: LiveQuery<Option<ListInfo>>,
    snapshot: LiveQuery<Snapshot>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SyncController {
    /// Clear the persisted snapshot, bind the live queries and start the worker.
    ///
    /// Every session starts empty: the first observation is an empty movie
    /// list with no list info, until a load succeeds.
    ///
    /// # Returns
    /// A running controller.
    ///
    /// # Errors
    /// Returns an error when the store cannot be cleared or the worker thread
    /// cannot be spawned.
    pub fn initialize(deps: SyncDeps) -> Result<Self, SyncError> {
        let SyncDeps {
            movies,
            list_info,
            catalog,
            connectivity,
            runtime,
            api_key,
        } = deps;

        movies.clear_snapshot()?;
        let movies_query = movies.current_movies();
        let snapshot_query = movies.current_snapshot();
        let list_info_query = list_info.current_list_info();

        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let worker = SyncWorker::new(
            movies,
            catalog,
            connectivity,
            runtime,
            api_key,
            cmd_tx.clone(),
            evt_tx,
        );
        let handle = thread::Builder::new()
            .name("moviepager-sync".to_string())
            .spawn(move || worker.run(cmd_rx))?;
        info!("sync controller initialized with an empty snapshot");

        Ok(Self {
            cmd_tx,
            evt_rx,
            movies: movies_query,
            list_info: list_info_query,
            snapshot: snapshot_query,
            worker: Some(handle),
        })
    }

    /// Request page `page`.
    ///
    /// Returns as soon as the request is queued. The outcome arrives through
    /// the live queries and as a [`SyncEvent`].
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidPage`] for page `0` and
    /// [`SyncError::WorkerStopped`] if the worker is gone.
    pub fn load_page(&self, page: u32) -> Result<(), SyncError> {
        if page == 0 {
            return Err(SyncError::InvalidPage(page));
        }
        self.cmd_tx
            .send(SyncCmd::Load { page })
            .map_err(|_| SyncError::WorkerStopped)
    }

    /// Cancel every in-flight fetch.
    ///
    /// Blocks until the worker has processed the request; no fetch issued
    /// before this call writes to the store or emits an event afterwards.
    /// Later remote loads are refused, cached loads still work. Safe to call
    /// repeatedly.
    ///
    /// # Errors
    /// Returns [`SyncError::WorkerStopped`] if the worker is gone.
    pub fn dispose(&self) -> Result<(), SyncError> {
        let (ack_tx, ack_rx) = bounded(1);
        self.cmd_tx
            .send(SyncCmd::Dispose { ack: ack_tx })
            .map_err(|_| SyncError::WorkerStopped)?;
        ack_rx.recv().map_err(|_| SyncError::WorkerStopped)
    }

    /// Live query over the current movie list.
    pub fn movies(&self) -> LiveQuery<Vec<Movie>> {
        self.movies.clone()
    }

    /// Live query over the current list info.
    pub fn list_info(&self) -> LiveQuery<Option<ListInfo>> {
        self.list_info.clone()
    }

    /// Live query over movies and list info as one consistent pair.
    pub fn snapshot(&self) -> LiveQuery<Snapshot> {
        self.snapshot.clone()
    }

    /// Side channel of load outcomes and failure notifications.
    pub fn events(&self) -> &Receiver<SyncEvent> {
        &self.evt_rx
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SyncCmd::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("sync worker panicked");
            }
        }
    }
}
