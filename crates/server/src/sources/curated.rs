//! Last-resort source: a small hand-verified set embedded in the binary.

use std::sync::LazyLock;

use futures::future::BoxFuture;
use puzzle_core::{Backfill, Criteria, PuzzleRecord};
use serde::Deserialize;

use super::{Batch, PuzzleSource, SourceError};

const DATASET: &str = include_str!("../../data/curated_puzzles.json");

#[derive(Debug, Deserialize)]
struct CuratedFile {
    version: u32,
    puzzles: Vec<PuzzleRecord>,
}

/// The embedded set, parsed and validated on first use.
pub static CURATED: LazyLock<Vec<PuzzleRecord>> = LazyLock::new(|| match load(DATASET) {
    Ok((version, puzzles)) => {
        tracing::info!("Loaded curated puzzle set v{}: {} puzzles", version, puzzles.len());
        puzzles
    }
    Err(e) => {
        tracing::warn!("Failed to load curated puzzle set: {}", e);
        Vec::new()
    }
});

/// Parse a curated dataset, dropping entries that fail record validation.
pub fn load(json: &str) -> Result<(u32, Vec<PuzzleRecord>), serde_json::Error> {
    let file: CuratedFile = serde_json::from_str(json)?;
    let puzzles = file
        .puzzles
        .into_iter()
        .filter_map(|p| {
            PuzzleRecord::new(p.id, p.initial_position, p.solution_moves, p.rating.into(), p.themes)
                .map_err(|e| tracing::warn!("Invalid curated puzzle: {e}"))
                .ok()
        })
        .collect();
    Ok((file.version, puzzles))
}

pub struct CuratedSource {
    repeat_to_fill: bool,
}

impl CuratedSource {
    pub fn new(repeat_to_fill: bool) -> Self {
        Self { repeat_to_fill }
    }
}

impl PuzzleSource for CuratedSource {
    fn name(&self) -> &'static str {
        "curated"
    }

    fn last_resort(&self) -> bool {
        true
    }

    fn attempt<'a>(
        &'a self,
        criteria: &'a Criteria,
        _wanted: usize,
    ) -> BoxFuture<'a, Result<Batch, SourceError>> {
        Box::pin(async move {
            let in_band: Vec<PuzzleRecord> = CURATED.iter().filter(|r| criteria.admits(r)).cloned().collect();

            let (records, effective) = if in_band.is_empty() {
                let relaxed = criteria.relaxed();
                let themed: Vec<PuzzleRecord> = CURATED.iter().filter(|r| relaxed.admits(r)).cloned().collect();
                if !themed.is_empty() {
                    tracing::info!(
                        "No curated {} puzzles rated {}-{}; ignoring the rating band",
                        criteria.theme,
                        criteria.min_rating,
                        criteria.max_rating
                    );
                }
                (themed, relaxed)
            } else {
                (in_band, criteria.clone())
            };

            Ok(Batch {
                records,
                criteria: effective,
                backfill: if self.repeat_to_fill {
                    Backfill::Cycle
                } else {
                    Backfill::Unique
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_set_is_valid_and_derivable() {
        let (version, puzzles) = load(DATASET).unwrap();
        assert_eq!(version, 1);
        assert_eq!(puzzles.len(), 6);
        for p in &puzzles {
            let derived = p.derive().unwrap();
            assert!(!derived.remaining_moves.is_empty(), "{}", p.id);
        }
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let json = r#"{"version": 2, "puzzles": [
            {"id": "ok", "fen": "8/8/8/8/8/8/8/K6k w - - 0 1", "moves": ["a1a2"], "rating": 500, "themes": []},
            {"id": "bad", "fen": "nonsense", "moves": ["a1a2"], "rating": 500, "themes": []}
        ]}"#;
        let (version, puzzles) = load(json).unwrap();
        assert_eq!(version, 2);
        assert_eq!(puzzles.len(), 1);
    }

    #[tokio::test]
    async fn test_curated_in_band() {
        let source = CuratedSource::new(false);
        let criteria = Criteria::new("mateIn1", 500, 800);
        let batch = source.attempt(&criteria, 10).await.unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.criteria, criteria);
        assert_eq!(batch.backfill, Backfill::Unique);
    }

    #[tokio::test]
    async fn test_curated_relaxes_rating_band() {
        let source = CuratedSource::new(true);
        let criteria = Criteria::new("fork", 2000, 2500);
        let batch = source.attempt(&criteria, 10).await.unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.criteria, criteria.relaxed());
        assert_eq!(batch.backfill, Backfill::Cycle);
    }

    #[tokio::test]
    async fn test_curated_unknown_theme_is_empty() {
        let batch = CuratedSource::new(false)
            .attempt(&Criteria::new("zugzwang", 0, 3000), 10)
            .await
            .unwrap();
        assert!(batch.records.is_empty());
    }
}
