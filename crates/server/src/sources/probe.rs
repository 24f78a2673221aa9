use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use puzzle_core::Criteria;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Batch, PuzzleSource, SourceError};
use crate::clients::PuzzleApi;

pub const ID_LENGTH: usize = 5;

/// Tries the daily puzzle, then random ids, until enough matches turn up or
/// the attempt cap is hit. Individual probe failures are skipped.
pub struct ProbeSource {
    api: Arc<dyn PuzzleApi>,
    attempts_per_puzzle: usize,
    rng: Mutex<StdRng>,
}

impl ProbeSource {
    pub fn new(api: Arc<dyn PuzzleApi>, attempts_per_puzzle: usize) -> Self {
        Self::with_rng(api, attempts_per_puzzle, StdRng::from_entropy())
    }

    pub fn with_rng(api: Arc<dyn PuzzleApi>, attempts_per_puzzle: usize, rng: StdRng) -> Self {
        Self {
            api,
            attempts_per_puzzle,
            rng: Mutex::new(rng),
        }
    }

    fn random_id(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (&mut *rng)
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect()
    }
}

impl PuzzleSource for ProbeSource {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn attempt<'a>(
        &'a self,
        criteria: &'a Criteria,
        wanted: usize,
    ) -> BoxFuture<'a, Result<Batch, SourceError>> {
        Box::pin(async move {
            let mut records = Vec::new();
            let mut seen = HashSet::new();

            match self.api.daily().await {
                Ok(daily) if criteria.admits(&daily) => {
                    seen.insert(daily.id.clone());
                    records.push(daily);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Daily puzzle unavailable: {e}"),
            }

            let max_attempts = wanted.saturating_mul(self.attempts_per_puzzle);
            let mut attempts = 0;
            while records.len() < wanted && attempts < max_attempts {
                attempts += 1;
                let id = self.random_id();

                match self.api.puzzle(&id).await {
                    Ok(Some(record)) if criteria.admits(&record) && seen.insert(record.id.clone()) => {
                        tracing::debug!("Found puzzle {} ({}/{})", record.id, records.len() + 1, wanted);
                        records.push(record);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!("Probe {id} failed: {e}"),
                }
            }

            records.truncate(wanted);
            tracing::info!(
                "Probe found {} of {} puzzles in {} attempts",
                records.len(),
                wanted,
                attempts
            );
            Ok(Batch::strict(records, criteria))
        })
    }
}
