pub mod lichess;
pub mod memory;

use futures::future::BoxFuture;
use puzzle_core::PuzzleRecord;

use crate::sources::SourceError;

/// Remote puzzle endpoints the acquisition strategies depend on.
pub trait PuzzleApi: Send + Sync {
    /// Recently played public puzzles, at most `max`.
    fn activity(&self, max: usize) -> BoxFuture<'_, Result<Vec<PuzzleRecord>, SourceError>>;

    /// The featured puzzle of the day.
    fn daily(&self) -> BoxFuture<'_, Result<PuzzleRecord, SourceError>>;

    /// One puzzle by id. `Ok(None)` when the id does not exist.
    fn puzzle<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<PuzzleRecord>, SourceError>>;
}
