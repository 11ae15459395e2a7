//! Restart Persistence Tests
//!
//! Drives the router with tower's `oneshot`, then reopens the data directory
//! to confirm every accepted mutation survived.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use labor_board_core::PositionCatalog;
use labor_board_server::{build_router, AppState, ServerConfig, SharedState};
use tower::ServiceExt;

const BOUNDARY: &str = "labor-board-test-boundary";

fn multipart_body(file_name: &str, contents: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = contents
    )
}

async fn send(state: &SharedState, config: &ServerConfig, request: Request<Body>) -> StatusCode {
    let app = build_router(state.clone(), &config.static_dir);
    app.oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_mutations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::with_data_dir(dir.path());
    let state = AppState::open(&config).unwrap();

    let csv = "Date,Associate Name,Performance\n09/02/2024,Alice,High\n09/02/2024,Bob,Low\n";
    let upload = Request::builder()
        .method("POST")
        .uri("/uploadfile/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("roster.csv", csv)))
        .unwrap();
    assert_eq!(send(&state, &config, upload).await, StatusCode::OK);

    let assign = Request::builder()
        .method("POST")
        .uri("/update_position/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("date=2024-09-02&position=Packer+1&associate=Bob"))
        .unwrap();
    assert_eq!(send(&state, &config, assign).await, StatusCode::OK);

    let count = Request::builder()
        .method("POST")
        .uri("/update_position_count/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"position":"Problem Solve","action":"add"}"#))
        .unwrap();
    assert_eq!(send(&state, &config, count).await, StatusCode::OK);

    let before = state.board.read().await.clone();
    drop(state);

    let reopened = AppState::open(&config).unwrap();
    let after = reopened.board.read().await;
    assert_eq!(*after, before);

    let day = after.get("2024-09-02").unwrap();
    assert_eq!(day.associates, vec!["Alice", "Bob"]);
    assert_eq!(day.slot("Packer 1").and_then(|s| s.associate.as_deref()), Some("Bob"));
    assert_eq!(
        after.catalog().count("Problem Solve"),
        PositionCatalog::pack_default().count("Problem Solve").map(|c| c + 1)
    );
}

#[tokio::test]
async fn test_viewed_day_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::with_data_dir(dir.path());
    let state = AppState::open(&config).unwrap();

    let view = Request::builder()
        .uri("/?date_str=2024-12-01")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&state, &config, view).await, StatusCode::OK);
    assert!(state.board.read().await.contains("2024-12-01"));
    drop(state);

    let reopened = AppState::open(&config).unwrap();
    assert!(!reopened.board.read().await.contains("2024-12-01"));
}

#[tokio::test]
async fn test_corrupt_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::with_data_dir(dir.path());
    std::fs::write(config.store_path(), "{ not json").unwrap();

    let state = AppState::open(&config).unwrap();
    let board = state.board.read().await;
    assert_eq!(board.day_count(), 0);
    assert_eq!(board.catalog(), &PositionCatalog::pack_default());
}
