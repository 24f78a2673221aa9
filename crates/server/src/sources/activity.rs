use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use puzzle_core::Criteria;

use super::{Batch, PuzzleSource, SourceError};
use crate::clients::PuzzleApi;

/// Filters a batch of recently played public puzzles.
pub struct ActivitySource {
    api: Arc<dyn PuzzleApi>,
    batch_per_puzzle: usize,
}

impl ActivitySource {
    pub fn new(api: Arc<dyn PuzzleApi>, batch_per_puzzle: usize) -> Self {
        Self {
            api,
            batch_per_puzzle: batch_per_puzzle.max(1),
        }
    }
}

impl PuzzleSource for ActivitySource {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn attempt<'a>(
        &'a self,
        criteria: &'a Criteria,
        wanted: usize,
    ) -> BoxFuture<'a, Result<Batch, SourceError>> {
        Box::pin(async move {
            let entries = self.api.activity(wanted * self.batch_per_puzzle).await?;
            let scanned = entries.len();

            let mut seen = HashSet::new();
            let records: Vec<_> = entries
                .into_iter()
                .filter(|r| criteria.admits(r) && seen.insert(r.id.clone()))
                .take(wanted)
                .collect();

            tracing::debug!("Activity: {} of {} entries matched", records.len(), scanned);
            Ok(Batch::strict(records, criteria))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::memory::MemoryApi;
    use puzzle_core::PuzzleRecord;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn rec(id: &str, rating: i64, theme: &str) -> PuzzleRecord {
        PuzzleRecord::new(id, START, vec!["e2e4".into()], rating, vec![theme.into()]).unwrap()
    }

    #[tokio::test]
    async fn test_activity_filters_and_requests_batch() {
        let api = Arc::new(MemoryApi::default().with_activity(vec![
            rec("a", 1000, "fork"),
            rec("b", 2000, "fork"),
            rec("c", 1100, "pin"),
            rec("d", 1200, "Fork"),
            rec("a", 1000, "fork"),
            rec("e", 900, "fork"),
        ]));
        let source = ActivitySource::new(api.clone(), 10);

        let batch = source.attempt(&Criteria::new("fork", 800, 1400), 2).await.unwrap();
        let ids: Vec<_> = batch.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(api.activity_requests(), vec![20]);
    }

    #[tokio::test]
    async fn test_activity_propagates_errors() {
        let api = Arc::new(MemoryApi::default().failing_activity());
        let source = ActivitySource::new(api, 10);
        assert!(source.attempt(&Criteria::new("fork", 0, 3000), 1).await.is_err());
    }
}
