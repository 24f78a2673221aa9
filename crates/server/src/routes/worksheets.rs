use std::sync::Arc;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::error::AppError;
use crate::service::{GenerateRequest, WorksheetService};

/// POST /api/worksheets
/// Body: `{theme, minRating, maxRating, count}`; every field is optional.
pub async fn create_worksheet(
    Extension(service): Extension<Arc<WorksheetService>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let worksheet = service.generate(&request).await?;

    tracing::info!(
        "Generated {} ({} puzzles, {} + {} pages, {} bytes)",
        worksheet.filename,
        worksheet.puzzle_count,
        worksheet.puzzle_pages,
        worksheet.solution_pages,
        worksheet.pdf.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", worksheet.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        worksheet.pdf,
    )
        .into_response())
}
