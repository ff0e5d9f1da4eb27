//! Observation worker: the single thread that mutates state and emits events.

use crate::connectivity::Connectivity;
use crate::error::FetchError;
use crate::protocol::{SyncCmd, SyncEvent};
use crate::remote::CatalogClient;
use crossbeam_channel::{Receiver, Sender};
use moviepager_core::{MoviePage, MovieRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

/// Reports a fetch back to the worker exactly once.
///
/// Lives inside the fetch task. If the task is dropped before it produces a
/// result (panic, abort, runtime shut down) the guard reports a transport
/// failure instead, so the request never lingers in the in-flight set.
/// Aborted requests are already gone from that set and their report is
/// ignored.
struct CompletionGuard {
    cmd_tx: Sender<SyncCmd>,
    request_id: u64,
    page: u32,
    sent: bool,
}

impl CompletionGuard {
    fn send(mut self, result: Result<MoviePage, FetchError>) {
        self.sent = true;
        self.report(result);
    }

    fn report(&self, result: Result<MoviePage, FetchError>) {
        // Fails only once the worker has shut down.
        let _ = self.cmd_tx.send(SyncCmd::FetchCompleted {
            request_id: self.request_id,
            page: self.page,
            result,
        });
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.sent {
            self.report(Err(FetchError::Transport(
                "fetch task ended without a result".to_string(),
            )));
        }
    }
}

pub(super) struct SyncWorker {
    movies: MovieRepository,
    catalog: Arc<dyn CatalogClient>,
    connectivity: Arc<dyn Connectivity>,
    runtime: tokio::runtime::Handle,
    api_key: String,
    cmd_tx: Sender<SyncCmd>,
    evt_tx: Sender<SyncEvent>,
    in_flight: HashMap<u64, AbortHandle>,
    next_request_id: u64,
    disposed: bool,
}

impl SyncWorker {
    pub(super) fn new(
        movies: MovieRepository,
        catalog: Arc<dyn CatalogClient>,
        connectivity: Arc<dyn Connectivity>,
        runtime: tokio::runtime::Handle,
        api_key: String,
        cmd_tx: Sender<SyncCmd>,
        evt_tx: Sender<SyncEvent>,
    ) -> Self {
        Self {
            movies,
            catalog,
            connectivity,
            runtime,
            api_key,
            cmd_tx,
            evt_tx,
            in_flight: HashMap::new(),
            next_request_id: 0,
            disposed: false,
        }
    }

    pub(super) fn run(mut self, cmd_rx: Receiver<SyncCmd>) {
        for cmd in cmd_rx.iter() {
            match cmd {
                SyncCmd::Load { page } => {
                    if self.connectivity.is_reachable() {
                        self.load_remote(page);
                    } else {
                        self.load_cached(page);
                    }
                }
                SyncCmd::FetchCompleted {
                    request_id,
                    page,
                    result,
                } => self.complete(request_id, page, result),
                SyncCmd::Dispose { ack } => {
                    self.cancel_all();
                    self.disposed = true;
                    let _ = ack.send(());
                }
                SyncCmd::Shutdown => {
                    self.cancel_all();
                    break;
                }
            }
        }
        debug!("sync worker stopped");
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.evt_tx.send(event);
    }

    fn load_remote(&mut self, page: u32) {
        if self.disposed {
            debug!(page, "ignoring remote load after dispose");
            return;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let catalog = Arc::clone(&self.catalog);
        let api_key = self.api_key.clone();
        let completion = CompletionGuard {
            cmd_tx: self.cmd_tx.clone(),
            request_id,
            page,
            sent: false,
        };
        let task = self.runtime.spawn(async move {
            let result = catalog.fetch_page(&api_key, page).await;
            completion.send(result);
        });
        // Completions queue behind this command, so the handle is registered
        // before the worker can see the result. That holds for the guard's
        // fallback too, which fires inside `spawn` on a shut-down runtime.
        self.in_flight.insert(request_id, task.abort_handle());
        info!(
            page,
            request_id,
            in_flight = self.in_flight.len(),
            "fetching movie page"
        );
    }

    fn load_cached(&self, page: u32) {
        match self.movies.reload() {
            Ok(snapshot) => {
                debug!(
                    page,
                    movies = snapshot.movies.len(),
                    "network unreachable, serving cached snapshot"
                );
                self.emit(SyncEvent::ServedFromCache {
                    page,
                    movies: snapshot.movies.len(),
                });
            }
            Err(err) => {
                error!("reading cached movies failed: {}", err);
                self.emit(SyncEvent::LoadFailed {
                    page,
                    message: format!("Reading cached movies failed: {}", err),
                });
            }
        }
    }

    fn complete(&mut self, request_id: u64, page: u32, result: Result<MoviePage, FetchError>) {
        if self.in_flight.remove(&request_id).is_none() {
            debug!(page, request_id, "dropping completion of cancelled fetch");
            return;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(page, "movie fetch failed: {}", err);
                self.emit(SyncEvent::LoadFailed {
                    page,
                    message: err.to_string(),
                });
                return;
            }
        };

        let info = response.list_info();
        match self.movies.replace_snapshot(&info, &response.results) {
            Ok(()) => {
                info!(
                    page = info.page,
                    total_pages = info.total_pages,
                    movies = response.results.len(),
                    "replaced movie snapshot"
                );
                self.emit(SyncEvent::PageLoaded {
                    page,
                    movies: response.results.len(),
                });
            }
            Err(err) => {
                error!(page, "storing fetched page failed: {}", err);
                self.emit(SyncEvent::LoadFailed {
                    page,
                    message: format!("Storing page {} failed: {}", page, err),
                });
            }
        }
    }

    fn cancel_all(&mut self) {
        let cancelled = self.in_flight.len();
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        if cancelled > 0 {
            debug!(cancelled, "cancelled in-flight fetches");
        }
    }
}
