//! The request pipeline: validate, acquire, sample, lay out, serialize.

use std::sync::Arc;

use puzzle_core::sampler::select;
use puzzle_core::{themes, Criteria, DerivedPuzzle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use worksheet::{layout, write_pdf, LayoutConfig, PdfError};

use crate::clients::lichess::LichessClient;
use crate::clients::PuzzleApi;
use crate::config::Config;
use crate::sources::{SourceChain, SourceError};

pub const MAX_PUZZLES: i64 = 36;

#[derive(Debug, thiserror::Error)]
pub enum WorksheetError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("No puzzles found matching your criteria")]
    NoPuzzlesFound,

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub theme: String,
    pub min_rating: i64,
    pub max_rating: i64,
    pub count: i64,
    /// Fixes the sampling order.
    pub seed: Option<u64>,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            theme: "mateIn2".to_string(),
            min_rating: 800,
            max_rating: 1400,
            count: 36,
            seed: None,
        }
    }
}

impl GenerateRequest {
    /// Check the bounds and return the criteria and puzzle count.
    pub fn validate(&self) -> Result<(Criteria, usize), WorksheetError> {
        let theme = self.theme.trim();
        if theme.is_empty() {
            return Err(WorksheetError::InvalidRequest("Theme must not be empty".to_string()));
        }
        if self.min_rating < 0 {
            return Err(WorksheetError::InvalidRequest("Ratings must not be negative".to_string()));
        }
        if self.min_rating >= self.max_rating {
            return Err(WorksheetError::InvalidRequest(
                "Minimum rating must be less than maximum rating".to_string(),
            ));
        }
        if !(1..=MAX_PUZZLES).contains(&self.count) {
            return Err(WorksheetError::InvalidRequest(format!(
                "Puzzle count must be between 1 and {MAX_PUZZLES}"
            )));
        }

        let max_rating = u32::try_from(self.max_rating).unwrap_or(u32::MAX);
        let min_rating = u32::try_from(self.min_rating).unwrap_or(u32::MAX);
        Ok((Criteria::new(theme, min_rating, max_rating), self.count as usize))
    }

    pub fn filename(&self) -> String {
        let safe: String = self
            .theme
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        format!("chess_puzzles_{safe}.pdf")
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedWorksheet {
    pub pdf: Vec<u8>,
    pub filename: String,
    pub puzzle_count: usize,
    pub puzzle_pages: usize,
    pub solution_pages: usize,
}

/// One instance per process, shared by every request. Holds no mutable
/// state besides the HTTP connection pool inside the client.
pub struct WorksheetService {
    chain: SourceChain,
    layout: LayoutConfig,
}

impl WorksheetService {
    pub fn new(chain: SourceChain, layout: LayoutConfig) -> Self {
        tracing::info!("Puzzle sources: {}", chain.names().join(" -> "));
        Self { chain, layout }
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let api: Arc<dyn PuzzleApi> = Arc::new(LichessClient::new(&config.lichess)?);
        Ok(Self::with_api(api, config))
    }

    pub fn with_api(api: Arc<dyn PuzzleApi>, config: &Config) -> Self {
        Self::new(SourceChain::standard(api, &config.sources), config.layout())
    }

    /// Acquire candidates and sample the puzzles to print.
    pub async fn select_puzzles(
        &self,
        criteria: &Criteria,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Vec<DerivedPuzzle>, WorksheetError> {
        let acquired = self.chain.acquire(criteria, count).await;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let selection = select(acquired.records, &acquired.criteria, count, acquired.backfill, &mut rng);

        for e in &selection.dropped {
            tracing::warn!("Dropped puzzle: {e}");
        }
        if selection.puzzles.is_empty() {
            return Err(WorksheetError::NoPuzzlesFound);
        }

        tracing::info!(
            "Selected {} of {} requested {} puzzles (sources: {})",
            selection.puzzles.len(),
            count,
            criteria.theme,
            acquired.contributors.join(", ")
        );
        Ok(selection.puzzles)
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedWorksheet, WorksheetError> {
        let (criteria, count) = request.validate()?;
        let puzzles = self.select_puzzles(&criteria, count, request.seed).await?;

        let title = themes::title(&criteria.theme);
        let config = self.layout.clone();
        let filename = request.filename();

        tokio::task::spawn_blocking(move || -> Result<GeneratedWorksheet, WorksheetError> {
            let sheet = layout(&puzzles, &title, &config);
            if sheet.notation_fallbacks > 0 || sheet.placeholder_diagrams > 0 {
                tracing::warn!(
                    "Worksheet has {} unreplayable solution moves and {} blank diagrams",
                    sheet.notation_fallbacks,
                    sheet.placeholder_diagrams
                );
            }
            let pdf = write_pdf(&sheet)?;
            Ok(GeneratedWorksheet {
                pdf,
                filename,
                puzzle_count: puzzles.len(),
                puzzle_pages: sheet.puzzle_pages(),
                solution_pages: sheet.solution_pages(),
            })
        })
        .await
        .map_err(|e| WorksheetError::Internal(format!("Worksheet task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(min: i64, max: i64, count: i64) -> GenerateRequest {
        GenerateRequest {
            min_rating: min,
            max_rating: max,
            count,
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert!(request(800, 1400, 36).validate().is_ok());
        assert!(request(800, 1400, 1).validate().is_ok());
        assert!(matches!(request(800, 1400, 0).validate(), Err(WorksheetError::InvalidRequest(_))));
        assert!(matches!(request(800, 1400, 37).validate(), Err(WorksheetError::InvalidRequest(_))));
        assert!(matches!(request(1400, 1400, 9).validate(), Err(WorksheetError::InvalidRequest(_))));
        assert!(matches!(request(-5, 1400, 9).validate(), Err(WorksheetError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: GenerateRequest = serde_json::from_str(r#"{"theme": "fork", "count": 9}"#).unwrap();
        assert_eq!(req.theme, "fork");
        assert_eq!(req.min_rating, 800);
        assert_eq!(req.max_rating, 1400);
        assert_eq!(req.count, 9);
        assert_eq!(req.filename(), "chess_puzzles_fork.pdf");
    }

    #[test]
    fn test_filename_strips_path_characters() {
        let req = GenerateRequest {
            theme: "../fork\"".to_string(),
            ..GenerateRequest::default()
        };
        assert_eq!(req.filename(), "chess_puzzles_fork.pdf");
    }
}
