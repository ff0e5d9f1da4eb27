//! Reachability checks deciding between the remote and cached paths.

use moviepager_core::constants::{
    DEFAULT_REACHABILITY_CACHE_TTL_MS, DEFAULT_REACHABILITY_TIMEOUT_MS,
};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Synchronous, side-effect free network reachability check.
///
/// Called on the sync worker thread for every load, so implementations must
/// answer quickly; anything slow delays queued completions and `dispose`.
pub trait Connectivity: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Checks reachability by opening a TCP connection to the catalog host.
///
/// One check spends at most `timeout` connecting, across all resolved
/// addresses, and its answer is reused for `cache_ttl`. Name resolution is
/// not bounded.
#[derive(Debug)]
pub struct TcpConnectivity {
    url: reqwest::Url,
    timeout: Duration,
    cache_ttl: Duration,
    cached: Mutex<Option<(Instant, bool)>>,
}

impl TcpConnectivity {
    pub fn new(url: reqwest::Url) -> Self {
        Self {
            url,
            timeout: Duration::from_millis(DEFAULT_REACHABILITY_TIMEOUT_MS),
            cache_ttl: Duration::from_millis(DEFAULT_REACHABILITY_CACHE_TTL_MS),
            cached: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse each answer for `cache_ttl`; zero checks on every call.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    fn connect_once(&self) -> bool {
        let Some(host) = self.url.host_str() else {
            return false;
        };
        let Some(port) = self.url.port_or_known_default() else {
            return false;
        };

        let Ok(addrs) = (host, port).to_socket_addrs() else {
            return false;
        };
        let deadline = Instant::now() + self.timeout;
        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if TcpStream::connect_timeout(&addr, remaining).is_ok() {
                return true;
            }
        }
        false
    }
}

impl Connectivity for TcpConnectivity {
    fn is_reachable(&self) -> bool {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((checked_at, reachable)) = *cached {
            if checked_at.elapsed() < self.cache_ttl {
                return reachable;
            }
        }
        let reachable = self.connect_once();
        *cached = Some((Instant::now(), reachable));
        reachable
    }
}

/// Fixed reachability answer, switchable at runtime.
///
/// Used for forced offline mode and for driving both paths in tests.
#[derive(Debug, Default)]
pub struct StaticConnectivity {
    reachable: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}
