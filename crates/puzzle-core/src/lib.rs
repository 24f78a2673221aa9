//! Chess-domain building blocks for printable puzzle worksheets.
//!
//! Everything in this crate is pure: no network, no filesystem, no logging.
//! Callers feed records in and get derived puzzles, samples and notation out.

pub mod notation;
pub mod pgn;
pub mod puzzle;
pub mod sampler;
pub mod snapshot;
pub mod themes;

pub use puzzle::{DerivedPuzzle, PuzzleError, PuzzleRecord, Side};
pub use sampler::{Backfill, Criteria};
