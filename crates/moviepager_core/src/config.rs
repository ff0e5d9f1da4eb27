//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for MoviePager.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    /// Skip the reachability check and always serve the cached snapshot.
    pub offline: bool,
}

fn expand_tilde<F>(path: String, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir(lookup) {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn resolve_home_dir<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(home) = non_blank(lookup, "HOME") {
        return Some(PathBuf::from(home));
    }

    if let Some(profile) = non_blank(lookup, "USERPROFILE") {
        return Some(PathBuf::from(profile));
    }

    if let (Some(drive), Some(path)) = (
        non_blank(lookup, "HOMEDRIVE"),
        non_blank(lookup, "HOMEPATH"),
    ) {
        return Some(PathBuf::from(format!("{}{}", drive, path)));
    }

    env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Recognized variables: `DB_PATH`, `MOVIES_API_URL`, `MOVIES_API_KEY`,
    /// `REQUEST_TIMEOUT_SECS` and `MOVIEPAGER_OFFLINE`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            db_path: non_blank(&lookup, "DB_PATH")
                .map(|path| expand_tilde(path, &lookup))
                .unwrap_or_else(|| {
                    let home = resolve_home_dir(&lookup).unwrap_or_else(|| PathBuf::from("."));
                    let cache_dir = home.join(".cache").join("moviepager");
                    cache_dir.join("db").to_string_lossy().to_string()
                }),
            api_base_url: non_blank(&lookup, "MOVIES_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_key: lookup("MOVIES_API_KEY").unwrap_or_default(),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|secs| secs.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            offline: lookup("MOVIEPAGER_OFFLINE")
                .and_then(|value| parse_env_flag(&value))
                .unwrap_or(false),
        }
    }
}
