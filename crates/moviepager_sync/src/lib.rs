//! Network-or-cache synchronization for the paged movie list.
//!
//! [`SyncController`] owns a single observation worker thread. Remote fetches
//! run on a tokio runtime and report back to that worker, which is the only
//! place persisted state changes and events are emitted.

/// Reachability checks.
pub mod connectivity;
/// The sync controller and its observation worker.
pub mod controller;
/// Error types for fetches and controller calls.
pub mod error;
/// Command/event protocol between callers, fetch tasks and the worker.
pub mod protocol;
/// Remote catalog client.
pub mod remote;

pub use connectivity::{Connectivity, StaticConnectivity, TcpConnectivity};
pub use controller::{SyncController, SyncDeps};
pub use error::{FetchError, SyncError};
pub use protocol::SyncEvent;
pub use remote::{CatalogClient, HttpCatalogClient};

#[cfg(test)]
pub(crate) mod test_support;
