//! Protocol types for the sync observation worker.

use crate::error::FetchError;
use crossbeam_channel::Sender;
use moviepager_core::MoviePage;

/// Commands consumed by the observation worker, one at a time.
#[derive(Debug)]
pub(crate) enum SyncCmd {
    /// Load a page: remotely when reachable, otherwise from the store.
    Load { page: u32 },
    /// A fetch task finished; applied only if its request is still in flight.
    FetchCompleted {
        request_id: u64,
        page: u32,
        result: Result<MoviePage, FetchError>,
    },
    /// Cancel every in-flight fetch, then acknowledge.
    Dispose { ack: Sender<()> },
    /// Cancel every in-flight fetch and stop the worker.
    Shutdown,
}

/// Notifications produced by the worker for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A remote page replaced the persisted snapshot; `movies` counts the response rows.
    PageLoaded { page: u32, movies: usize },
    /// The network was unreachable; observers were pointed at the cached snapshot.
    ServedFromCache { page: u32, movies: usize },
    /// A load failed; the persisted snapshot is unchanged.
    LoadFailed { page: u32, message: String },
}

impl SyncEvent {
    /// Page the event refers to.
    pub fn page(&self) -> u32 {
        match self {
            Self::PageLoaded { page, .. }
            | Self::ServedFromCache { page, .. }
            | Self::LoadFailed { page, .. } => *page,
        }
    }

    /// User-facing text for transient notifications, if the event warrants one.
    pub fn notification(&self) -> Option<String> {
        match self {
            Self::LoadFailed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }
}
