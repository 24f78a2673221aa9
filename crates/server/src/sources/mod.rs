//! Puzzle acquisition strategies and the chain that runs them in order.
//!
//! Every strategy may fail on its own. The chain logs the cause and moves on
//! to the next one; only a completely empty result is visible to callers.

pub mod activity;
pub mod curated;
pub mod probe;
pub mod snapshot;

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use puzzle_core::{Backfill, Criteria, PuzzleRecord};

use crate::clients::PuzzleApi;
use crate::config::SourceConfig;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl SourceError {
    pub(crate) fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Http(e)
        }
    }
}

/// What one strategy produced, and under which terms it should be sampled.
#[derive(Debug, Clone)]
pub struct Batch {
    pub records: Vec<PuzzleRecord>,
    /// The criteria the records satisfy. Differs from the request only when a
    /// strategy had to relax the rating band.
    pub criteria: Criteria,
    pub backfill: Backfill,
}

impl Batch {
    pub fn strict(records: Vec<PuzzleRecord>, criteria: &Criteria) -> Self {
        Self {
            records,
            criteria: criteria.clone(),
            backfill: Backfill::Unique,
        }
    }
}

pub trait PuzzleSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Consulted only when every earlier strategy came back empty.
    fn last_resort(&self) -> bool {
        false
    }

    /// Look for up to `wanted` records matching `criteria`.
    fn attempt<'a>(
        &'a self,
        criteria: &'a Criteria,
        wanted: usize,
    ) -> BoxFuture<'a, Result<Batch, SourceError>>;
}

/// Records gathered by [`SourceChain::acquire`].
#[derive(Debug, Clone)]
pub struct Acquired {
    pub records: Vec<PuzzleRecord>,
    pub criteria: Criteria,
    pub backfill: Backfill,
    /// Names of the strategies that contributed at least one record.
    pub contributors: Vec<&'static str>,
}

pub struct SourceChain {
    sources: Vec<Box<dyn PuzzleSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn PuzzleSource>>) -> Self {
        Self { sources }
    }

    /// `[snapshot (if configured), activity, probe, curated]`.
    pub fn standard(api: Arc<dyn PuzzleApi>, config: &SourceConfig) -> Self {
        let mut sources: Vec<Box<dyn PuzzleSource>> = Vec::new();
        if let Some(path) = &config.snapshot_path {
            sources.push(Box::new(snapshot::SnapshotSource::new(
                path.clone(),
                config.snapshot_max_scanned,
            )));
        }
        sources.push(Box::new(activity::ActivitySource::new(
            api.clone(),
            config.activity_batch_per_puzzle,
        )));
        sources.push(Box::new(probe::ProbeSource::new(api, config.probe_attempts_per_puzzle)));
        sources.push(Box::new(curated::CuratedSource::new(config.curated_repeat_to_fill)));
        Self::new(sources)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order until `count` unique records are collected.
    /// Records whose setup move does not replay are not counted.
    pub async fn acquire(&self, criteria: &Criteria, count: usize) -> Acquired {
        let mut acquired = Acquired {
            records: Vec::new(),
            criteria: criteria.clone(),
            backfill: Backfill::Unique,
            contributors: Vec::new(),
        };
        let mut seen = HashSet::new();

        for source in &self.sources {
            if acquired.records.len() >= count {
                break;
            }
            if source.last_resort() && !acquired.records.is_empty() {
                continue;
            }

            let wanted = count - acquired.records.len();
            tracing::debug!("Trying {} source for {} puzzles", source.name(), wanted);

            let batch = match source.attempt(criteria, wanted).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("{} source failed: {}", source.name(), e);
                    continue;
                }
            };

            let before = acquired.records.len();
            for record in batch.records {
                if let Err(e) = record.derive() {
                    tracing::debug!("{} source returned unusable puzzle: {}", source.name(), e);
                    continue;
                }
                if seen.insert(record.id.clone()) {
                    acquired.records.push(record);
                }
            }
            let added = acquired.records.len() - before;
            tracing::info!("{} source returned {} new puzzles", source.name(), added);

            if added > 0 {
                acquired.contributors.push(source.name());
                if source.last_resort() {
                    acquired.criteria = batch.criteria;
                    acquired.backfill = batch.backfill;
                }
            }
        }

        acquired
    }
}
