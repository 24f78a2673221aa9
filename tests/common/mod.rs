#![allow(dead_code)]

use std::sync::Arc;

use puzzle_core::PuzzleRecord;
use puzzle_server::clients::memory::MemoryApi;
use puzzle_server::config::Config;
use puzzle_server::routes;
use puzzle_server::service::WorksheetService;

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A record whose setup move is 1. e4 and whose answer is 1... e5.
pub fn record(id: &str, rating: i64, themes: &[&str]) -> PuzzleRecord {
    PuzzleRecord::new(
        id,
        START,
        vec!["e2e4".to_string(), "e7e5".to_string()],
        rating,
        themes.iter().map(|t| t.to_string()).collect(),
    )
    .expect("valid fixture")
}

/// `n` records tagged `theme`, rated inside 800-1400.
pub fn pool(n: usize, theme: &str) -> Vec<PuzzleRecord> {
    (0..n)
        .map(|i| record(&format!("{theme}{i:03}"), 800 + (i as i64 * 17) % 600, &[theme, "short"]))
        .collect()
}

/// Config with no network-only knobs that slow tests down.
pub fn config() -> Config {
    let mut config = Config::default();
    config.sources.probe_attempts_per_puzzle = 2;
    config
}

pub fn service(api: MemoryApi) -> WorksheetService {
    WorksheetService::with_api(Arc::new(api), &config())
}

/// Serve the router on an ephemeral local port and return its base URL.
pub async fn spawn_server(service: WorksheetService) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let app = routes::router(Arc::new(service));

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{addr}")
}
