//! Movie records, the list-info singleton, and the paged catalog response.

use crate::constants::LIST_INFO_KEY;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog movie as returned by the remote API and stored locally.
///
/// Only `id` and `title` are required on the wire; everything else falls
/// back to its default so sparse catalog entries still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub adult: bool,
}

impl Movie {
    /// Create a movie with only identity and title set.
    ///
    /// # Returns
    /// A [`Movie`] with default display attributes.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            original_language: None,
            adult: false,
        }
    }

    /// Release year parsed from a `YYYY-MM-DD` release date, if present.
    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// Pagination state of the last successful fetch.
///
/// There is at most one of these per store; it is always keyed by
/// [`LIST_INFO_KEY`] and overwritten wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    pub id: u32,
    pub page: u32,
    pub total_results: u64,
    pub total_pages: u32,
}

impl ListInfo {
    /// Build the singleton record for the given pagination values.
    pub fn new(page: u32, total_results: u64, total_pages: u32) -> Self {
        Self {
            id: LIST_INFO_KEY,
            page,
            total_results,
            total_pages,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Page number following this one, or `None` on the last page.
    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page().then(|| self.page + 1)
    }

    /// Page number preceding this one, or `None` on the first page.
    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous_page().then(|| self.page - 1)
    }
}

/// One page of the remote catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub total_results: u64,
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
}

impl MoviePage {
    /// Pagination metadata carried by this page.
    pub fn list_info(&self) -> ListInfo {
        ListInfo::new(self.page, self.total_results, self.total_pages)
    }
}

/// The persisted movie collection paired with its list info.
///
/// Both halves always come from the same write transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub movies: Vec<Movie>,
    pub list_info: Option<ListInfo>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.list_info.is_none()
    }
}

/// Collapse repeated catalog ids so each id is stored once.
///
/// The last occurrence of an id wins and keeps its position among the
/// surviving rows, matching replace-on-conflict insert semantics.
pub(crate) fn dedupe_by_id(movies: &[Movie]) -> Vec<&Movie> {
    let mut last_index: HashMap<u64, usize> = HashMap::with_capacity(movies.len());
    for (index, movie) in movies.iter().enumerate() {
        last_index.insert(movie.id, index);
    }
    movies
        .iter()
        .enumerate()
        .filter(|(index, movie)| last_index.get(&movie.id) == Some(index))
        .map(|(_, movie)| movie)
        .collect()
}
