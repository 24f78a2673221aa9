//! HTTP surface tests against a live router on a local port.

mod common;

use puzzle_server::clients::memory::MemoryApi;
use serde_json::{json, Value};

async fn server_with(api: MemoryApi) -> String {
    common::spawn_server(common::service(api)).await
}

#[tokio::test]
async fn test_health() {
    let base = server_with(MemoryApi::default()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_themes_list_catalog() {
    let base = server_with(MemoryApi::default()).await;

    let themes: Vec<Value> = reqwest::get(format!("{base}/api/themes"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!themes.is_empty());
    let mate = themes
        .iter()
        .find(|t| t["key"] == "mateIn2")
        .expect("mateIn2 listed");
    assert!(mate["description"].as_str().unwrap().starts_with("Mate in 2"));
}

#[tokio::test]
async fn test_create_worksheet_returns_pdf() {
    let base = server_with(MemoryApi::default().with_activity(common::pool(12, "fork"))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/worksheets"))
        .json(&json!({ "theme": "fork", "minRating": 800, "maxRating": 1400, "count": 9 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"chess_puzzles_fork.pdf\""
    );
    let bytes = resp.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_invalid_requests_are_bad_request() {
    let base = server_with(MemoryApi::default()).await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "theme": "fork", "minRating": 1400, "maxRating": 1400 }),
        json!({ "theme": "fork", "count": 37 }),
        json!({ "theme": "fork", "count": 0 }),
    ] {
        let resp = client
            .post(format!("{base}/api/worksheets"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body: {body}");
        let detail: Value = resp.json().await.unwrap();
        assert!(detail["detail"].is_string());
    }
}

#[tokio::test]
async fn test_no_puzzles_is_not_found() {
    let base = server_with(MemoryApi::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/worksheets"))
        .json(&json!({ "theme": "zugzwang", "count": 4 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "No puzzles found matching your criteria");
}
