//! In-process catalog server for HTTP integration tests.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;

pub(crate) const API_KEY: &str = "integration-key";
/// Page whose body is served truncated.
pub(crate) const BROKEN_PAGE: u32 = 13;
pub(crate) const TOTAL_PAGES: u32 = 2;
pub(crate) const TOTAL_RESULTS: u64 = 40;

pub(crate) fn page_ids(page: u32) -> Vec<u64> {
    let base = u64::from(page) * 100;
    vec![base + 1, base + 2]
}

async fn list_movies(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status_code": 7,
                "status_message": "Invalid API key",
                "success": false
            })),
        )
            .into_response();
    }

    let Some(page) = params.get("page").and_then(|raw| raw.parse::<u32>().ok()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing page" }))).into_response();
    };
    if page == BROKEN_PAGE {
        return (StatusCode::OK, "{\"page\": 13, \"results\": [").into_response();
    }

    let results: Vec<_> = page_ids(page)
        .into_iter()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Movie {}", id),
                "overview": "",
                "release_date": "2019-06-01",
                "vote_average": 7.5,
                "vote_count": 120
            })
        })
        .collect();
    Json(json!({
        "page": page,
        "total_results": TOTAL_RESULTS,
        "total_pages": TOTAL_PAGES,
        "results": results
    }))
    .into_response()
}

pub(crate) fn catalog_router() -> Router {
    Router::new().route("/movies", get(list_movies))
}

/// Serve the catalog on an ephemeral port of the current runtime.
pub(crate) async fn spawn_catalog() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind catalog listener");
    let addr = listener.local_addr().expect("catalog addr");
    tokio::spawn(async move {
        axum::serve(listener, catalog_router())
            .await
            .expect("serve catalog");
    });
    addr
}

/// Address nothing is listening on.
pub(crate) fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    addr
}
