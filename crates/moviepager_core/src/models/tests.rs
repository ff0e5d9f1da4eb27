//! Model decoding and pagination helper tests.

use super::movie::dedupe_by_id;
use super::*;
use crate::constants::LIST_INFO_KEY;

#[test]
fn test_page_decodes_catalog_json() {
    let body = r#"{
        "page": 1,
        "total_results": 40,
        "total_pages": 2,
        "results": [
            {
                "id": 550,
                "title": "Fight Club",
                "overview": "An insomniac office worker...",
                "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
                "release_date": "1999-10-15",
                "vote_average": 8.4,
                "vote_count": 26280,
                "popularity": 61.4,
                "genre_ids": [18],
                "video": false
            },
            { "id": 13, "title": "Forrest Gump" }
        ]
    }"#;

    let page: MoviePage = serde_json::from_str(body).expect("decode page");
    assert_eq!(page.list_info(), ListInfo::new(1, 40, 2));
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].title, "Fight Club");
    assert_eq!(page.results[0].release_year(), Some(1999));
    assert_eq!(page.results[1], Movie::new(13, "Forrest Gump"));
    assert_eq!(page.results[1].release_year(), None);
}

#[test]
fn test_page_without_results_decodes_empty() {
    let page: MoviePage =
        serde_json::from_str(r#"{"page":3,"total_results":0,"total_pages":0}"#).expect("decode");
    assert!(page.results.is_empty());
}

#[test]
fn test_movie_requires_id_and_title() {
    assert!(serde_json::from_str::<Movie>(r#"{"title":"No id"}"#).is_err());
    assert!(serde_json::from_str::<Movie>(r#"{"id":1}"#).is_err());
}

#[test]
fn test_movie_bincode_roundtrip_keeps_optional_fields() {
    let mut movie = Movie::new(7, "Se7en");
    movie.poster_path = Some("/se7en.jpg".to_string());
    movie.vote_average = 8.3;
    let bytes = bincode::serialize(&movie).expect("encode");
    let decoded: Movie = bincode::deserialize(&bytes).expect("decode");
    assert_eq!(decoded, movie);
}

#[test]
fn test_list_info_uses_singleton_key() {
    assert_eq!(ListInfo::new(4, 100, 5).id, LIST_INFO_KEY);
}

#[test]
fn test_list_info_paging_helpers() {
    let first = ListInfo::new(1, 40, 2);
    assert_eq!(first.next_page(), Some(2));
    assert_eq!(first.previous_page(), None);

    let last = ListInfo::new(2, 40, 2);
    assert_eq!(last.next_page(), None);
    assert_eq!(last.previous_page(), Some(1));

    let empty = ListInfo::new(1, 0, 0);
    assert!(!empty.has_next_page());
    assert!(!empty.has_previous_page());
}

#[test]
fn test_dedupe_keeps_last_occurrence() {
    let movies = vec![
        Movie::new(1, "first"),
        Movie::new(2, "two"),
        Movie::new(1, "second"),
        Movie::new(3, "three"),
    ];
    let titles: Vec<&str> = dedupe_by_id(&movies)
        .iter()
        .map(|m| m.title.as_str())
        .collect();
    assert_eq!(titles, vec!["two", "second", "three"]);
}

#[test]
fn test_snapshot_emptiness() {
    assert!(Snapshot::default().is_empty());
    let snapshot = Snapshot {
        movies: Vec::new(),
        list_info: Some(ListInfo::new(1, 0, 0)),
    };
    assert!(!snapshot.is_empty());
}
