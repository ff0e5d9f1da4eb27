//! Shared test-only helpers for moviepager_sync.

use crate::connectivity::{Connectivity, StaticConnectivity};
use crate::controller::{SyncController, SyncDeps};
use crate::error::FetchError;
use crate::protocol::SyncEvent;
use crate::remote::CatalogClient;
use async_trait::async_trait;
use crossbeam_channel::Receiver;
use moviepager_core::{Database, ListInfoRepository, Movie, MoviePage, MovieRepository};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Notify;

pub(crate) const TEST_API_KEY: &str = "test-key";

/// Catalog that replays queued results, optionally holding each call until released.
#[derive(Default)]
pub(crate) struct ScriptedCatalog {
    responses: Mutex<VecDeque<Result<MoviePage, FetchError>>>,
    requests: Mutex<Vec<(String, u32)>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    echo: bool,
}

impl ScriptedCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold every fetch until `gate` is notified.
    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Answer every unscripted call with a two-movie page for the requested page.
    pub(crate) fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub(crate) fn push(&self, result: Result<MoviePage, FetchError>) {
        self.responses.lock().expect("responses lock").push_back(result);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn fetch_page(&self, api_key: &str, page: u32) -> Result<MoviePage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push((api_key.to_string(), page));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let scripted = self.responses.lock().expect("responses lock").pop_front();
        match scripted {
            Some(result) => result,
            None if self.echo => Ok(movie_page(page, 40, 2, &echo_ids(page))),
            None => Err(FetchError::Transport("no scripted response".to_string())),
        }
    }
}

pub(crate) fn movie_page(page: u32, total_results: u64, total_pages: u32, ids: &[u64]) -> MoviePage {
    MoviePage {
        page,
        total_results,
        total_pages,
        results: ids
            .iter()
            .map(|id| Movie::new(*id, format!("movie-{}", id)))
            .collect(),
    }
}

/// Movie ids served by [`ScriptedCatalog::echoing`] for `page`.
pub(crate) fn echo_ids(page: u32) -> [u64; 2] {
    let base = u64::from(page) * 100;
    [base + 1, base + 2]
}

pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, dir)
}

/// Start a controller over `db` with arbitrary collaborators.
pub(crate) fn start_controller(
    db: &Database,
    catalog: Arc<dyn CatalogClient>,
    connectivity: Arc<dyn Connectivity>,
    runtime: tokio::runtime::Handle,
) -> SyncController {
    SyncController::initialize(SyncDeps {
        movies: MovieRepository::new(db),
        list_info: ListInfoRepository::new(db),
        catalog,
        connectivity,
        runtime,
        api_key: TEST_API_KEY.to_string(),
    })
    .expect("initialize controller")
}

/// A running controller over a temp database, a scripted catalog and a
/// switchable connectivity flag.
///
/// Field order matters: the controller must stop before the runtime and the
/// temp dir go away.
pub(crate) struct Harness {
    pub controller: SyncController,
    pub catalog: Arc<ScriptedCatalog>,
    pub connectivity: Arc<StaticConnectivity>,
    pub db: Database,
    _runtime: tokio::runtime::Runtime,
    _dir: TempDir,
}

impl Harness {
    pub(crate) fn online(catalog: ScriptedCatalog) -> Self {
        let (db, dir) = setup_temp_db();
        Self::start(db, dir, catalog, true)
    }

    pub(crate) fn offline(catalog: ScriptedCatalog) -> Self {
        let (db, dir) = setup_temp_db();
        Self::start(db, dir, catalog, false)
    }

    pub(crate) fn start(db: Database, dir: TempDir, catalog: ScriptedCatalog, reachable: bool) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime");
        let catalog = Arc::new(catalog);
        let connectivity = Arc::new(StaticConnectivity::new(reachable));
        let controller = start_controller(
            &db,
            catalog.clone(),
            connectivity.clone(),
            runtime.handle().clone(),
        );

        Self {
            controller,
            catalog,
            connectivity,
            db,
            _runtime: runtime,
            _dir: dir,
        }
    }

    pub(crate) fn events(&self) -> &Receiver<SyncEvent> {
        self.controller.events()
    }
}

pub(crate) fn recv_event(rx: &Receiver<SyncEvent>) -> SyncEvent {
    rx.recv_timeout(Duration::from_secs(2))
        .expect("expected sync event")
}

pub(crate) fn assert_no_event(rx: &Receiver<SyncEvent>) {
    if let Ok(event) = rx.recv_timeout(Duration::from_millis(300)) {
        panic!("unexpected event: {:?}", event);
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}
