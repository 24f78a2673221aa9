use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Mutex;

use futures::future::BoxFuture;
use puzzle_core::sampler::{oversample, Oversample};
use puzzle_core::snapshot::SnapshotReader;
use puzzle_core::{Criteria, PuzzleRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Batch, PuzzleSource, SourceError};

/// Streams a local bulk snapshot file and samples matches from it.
pub struct SnapshotSource {
    path: PathBuf,
    policy: Oversample,
    rng: Mutex<StdRng>,
}

impl SnapshotSource {
    pub fn new(path: PathBuf, max_scanned: usize) -> Self {
        Self::with_rng(path, max_scanned, StdRng::from_entropy())
    }

    pub fn with_rng(path: PathBuf, max_scanned: usize, rng: StdRng) -> Self {
        Self {
            path,
            policy: Oversample {
                max_scanned,
                ..Oversample::default()
            },
            rng: Mutex::new(rng),
        }
    }
}

impl PuzzleSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn attempt<'a>(
        &'a self,
        criteria: &'a Criteria,
        wanted: usize,
    ) -> BoxFuture<'a, Result<Batch, SourceError>> {
        let seed: u64 = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .gen();
        let path = self.path.clone();
        let policy = self.policy;
        let owned = criteria.clone();

        Box::pin(async move {
            let records = tokio::task::spawn_blocking(move || -> Result<Vec<PuzzleRecord>, SourceError> {
                let file = File::open(&path)?;
                let mut reader = SnapshotReader::new(BufReader::new(file)).scan_limit(policy.max_scanned);
                let mut rng = StdRng::seed_from_u64(seed);
                let picked = oversample(reader.by_ref(), &owned, wanted, policy, &mut rng);

                if reader.skipped() > 0 {
                    tracing::debug!("Skipped {} malformed rows in {}", reader.skipped(), path.display());
                }
                match reader.take_error() {
                    Some(e) => Err(SourceError::Io(e)),
                    None => Ok(picked),
                }
            })
            .await
            .map_err(|e| SourceError::Task(e.to_string()))??;

            Ok(Batch::strict(records, criteria))
        })
    }
}
