pub mod health;
pub mod themes;
pub mod worksheets;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::service::WorksheetService;

pub fn router(service: Arc<WorksheetService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/themes", get(themes::list_themes))
        .route("/api/worksheets", post(worksheets::create_worksheet))
        .layer(Extension(service))
        .layer(cors)
}
