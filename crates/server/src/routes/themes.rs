use axum::Json;
use puzzle_core::themes::CATALOG;
use serde::Serialize;

#[derive(Serialize)]
pub struct ThemeEntry {
    pub key: &'static str,
    pub description: &'static str,
}

/// GET /api/themes
pub async fn list_themes() -> Json<Vec<ThemeEntry>> {
    Json(
        CATALOG
            .iter()
            .map(|&(key, description)| ThemeEntry { key, description })
            .collect(),
    )
}
