//! Shared constants used across MoviePager crates.

/// Default base URL of the remote movie catalog.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:38412";

/// Path segment of the paged movie listing endpoint.
pub const MOVIES_ENDPOINT: &str = "movies";

/// Default request timeout for catalog calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect timeout used by the TCP reachability check, in milliseconds.
pub const DEFAULT_REACHABILITY_TIMEOUT_MS: u64 = 250;

/// How long a reachability answer is reused before probing again, in milliseconds.
pub const DEFAULT_REACHABILITY_CACHE_TTL_MS: u64 = 1_000;

/// Fixed key of the list-info singleton row.
pub const LIST_INFO_KEY: u32 = 1;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "movies.redb";
