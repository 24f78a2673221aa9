//! Rating/theme filtering and randomized sampling of candidate puzzles.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::puzzle::{DerivedPuzzle, PuzzleError, PuzzleRecord};

/// What the caller asked for: one theme and an inclusive rating band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub theme: String,
    pub min_rating: u32,
    pub max_rating: u32,
}

impl Criteria {
    pub fn new(theme: impl Into<String>, min_rating: u32, max_rating: u32) -> Self {
        Self {
            theme: theme.into(),
            min_rating,
            max_rating,
        }
    }

    pub fn matches(&self, record: &PuzzleRecord) -> bool {
        (self.min_rating..=self.max_rating).contains(&record.rating)
            && record.has_theme(&self.theme)
    }

    /// A match whose setup move also replays, so it can be printed.
    pub fn admits(&self, record: &PuzzleRecord) -> bool {
        self.matches(record) && record.derive().is_ok()
    }

    /// Same theme, any rating.
    pub fn relaxed(&self) -> Self {
        Self {
            theme: self.theme.clone(),
            min_rating: 0,
            max_rating: u32::MAX,
        }
    }
}

/// How to handle a pool smaller than the requested count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backfill {
    /// Return every unique match once.
    #[default]
    Unique,
    /// Cycle through the matches until the count is reached.
    Cycle,
}

/// Bounds for sampling out of a long stream of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oversample {
    /// Matches collected per requested puzzle before the stream is abandoned.
    pub factor: usize,
    /// Hard cap on records read from the stream.
    pub max_scanned: usize,
}

impl Default for Oversample {
    fn default() -> Self {
        Self {
            factor: 5,
            max_scanned: 100_000,
        }
    }
}

/// Collect up to `count * factor` unique printable matches from a stream, shuffle them
/// and keep `count`. Records early in the stream get no advantage over later
/// ones inside the collected window.
pub fn oversample<I, R>(
    records: I,
    criteria: &Criteria,
    count: usize,
    policy: Oversample,
    rng: &mut R,
) -> Vec<PuzzleRecord>
where
    I: IntoIterator<Item = PuzzleRecord>,
    R: Rng + ?Sized,
{
    let target = count.saturating_mul(policy.factor);
    let mut seen = HashSet::new();
    let mut pool = Vec::new();

    for record in records.into_iter().take(policy.max_scanned) {
        if pool.len() >= target {
            break;
        }
        if criteria.admits(&record) && seen.insert(record.id.clone()) {
            pool.push(record);
        }
    }

    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Result of [`select`]: the puzzles to print plus the records that were
/// dropped because their setup move did not replay.
#[derive(Debug, Default)]
pub struct Selection {
    pub puzzles: Vec<DerivedPuzzle>,
    pub dropped: Vec<PuzzleError>,
}

/// Filter, deduplicate by id, shuffle, derive and truncate to `count`.
///
/// Records that fail derivation are skipped and do not count toward `count`.
pub fn select<R>(
    candidates: Vec<PuzzleRecord>,
    criteria: &Criteria,
    count: usize,
    backfill: Backfill,
    rng: &mut R,
) -> Selection
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::new();
    let mut pool: Vec<PuzzleRecord> = candidates
        .into_iter()
        .filter(|r| criteria.matches(r) && seen.insert(r.id.clone()))
        .collect();
    pool.shuffle(rng);

    let mut selection = Selection::default();
    for record in &pool {
        if selection.puzzles.len() >= count {
            break;
        }
        match record.derive() {
            Ok(puzzle) => selection.puzzles.push(puzzle),
            Err(e) => selection.dropped.push(e),
        }
    }

    let unique = selection.puzzles.len();
    if backfill == Backfill::Cycle && unique > 0 {
        let mut i = 0;
        while selection.puzzles.len() < count {
            let repeat = selection.puzzles[i % unique].clone();
            selection.puzzles.push(repeat);
            i += 1;
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn rec(id: &str, rating: u32, themes: &[&str]) -> PuzzleRecord {
        PuzzleRecord {
            id: id.to_string(),
            initial_position: START.to_string(),
            solution_moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            rating,
            themes: themes.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn pool(n: usize, rating: u32, theme: &str) -> Vec<PuzzleRecord> {
        (0..n).map(|i| rec(&format!("p{i}"), rating, &[theme])).collect()
    }

    #[test]
    fn test_criteria_bounds_are_inclusive() {
        let c = Criteria::new("mateIn2", 800, 1400);
        assert!(c.matches(&rec("a", 800, &["mateIn2"])));
        assert!(c.matches(&rec("b", 1400, &["MATEIN2"])));
        assert!(!c.matches(&rec("c", 799, &["mateIn2"])));
        assert!(!c.matches(&rec("d", 1401, &["mateIn2"])));
        assert!(!c.matches(&rec("e", 1000, &["mateIn1"])));
    }

    #[test]
    fn test_select_small_pool_returns_unique_matches_only() {
        let mut rng = StdRng::seed_from_u64(7);
        let criteria = Criteria::new("fork", 800, 1400);
        let selection = select(pool(10, 1000, "fork"), &criteria, 36, Backfill::Unique, &mut rng);

        assert_eq!(selection.puzzles.len(), 10);
        let ids: HashSet<_> = selection.puzzles.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_select_cycle_fills_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let criteria = Criteria::new("fork", 0, 3000);
        let selection = select(pool(3, 1000, "fork"), &criteria, 7, Backfill::Cycle, &mut rng);

        assert_eq!(selection.puzzles.len(), 7);
        assert_eq!(selection.puzzles[0], selection.puzzles[3]);
        assert_eq!(selection.puzzles[1], selection.puzzles[4]);
    }

    #[test]
    fn test_select_cycle_with_empty_pool_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let criteria = Criteria::new("pin", 0, 3000);
        let selection = select(pool(3, 1000, "fork"), &criteria, 5, Backfill::Cycle, &mut rng);
        assert!(selection.puzzles.is_empty());
    }

    #[test]
    fn test_select_dedupes_by_id() {
        let mut rng = StdRng::seed_from_u64(1);
        let criteria = Criteria::new("fork", 0, 3000);
        let mut candidates = pool(2, 1000, "fork");
        candidates.push(rec("p0", 1000, &["fork"]));
        let selection = select(candidates, &criteria, 10, Backfill::Unique, &mut rng);
        assert_eq!(selection.puzzles.len(), 2);
    }

    #[test]
    fn test_select_skips_underivable_without_counting() {
        let mut rng = StdRng::seed_from_u64(3);
        let criteria = Criteria::new("fork", 0, 3000);
        let mut candidates = pool(3, 1000, "fork");
        let mut broken = rec("bad", 1000, &["fork"]);
        broken.solution_moves = vec!["e2e5".to_string()];
        candidates.push(broken);

        let selection = select(candidates, &criteria, 4, Backfill::Unique, &mut rng);
        assert_eq!(selection.puzzles.len(), 3);
        assert_eq!(selection.dropped.len(), 1);
        assert!(selection.puzzles.iter().all(|p| p.id != "bad"));
    }

    #[test]
    fn test_oversample_respects_scan_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let criteria = Criteria::new("fork", 0, 3000);
        let mut stream = pool(50, 1000, "pin");
        stream.extend(pool(5, 1000, "fork").into_iter().map(|mut r| {
            r.id = format!("late-{}", r.id);
            r
        }));

        let policy = Oversample { factor: 5, max_scanned: 50 };
        assert!(oversample(stream.clone(), &criteria, 3, policy, &mut rng).is_empty());

        let policy = Oversample { factor: 5, max_scanned: 100 };
        assert_eq!(oversample(stream, &criteria, 3, policy, &mut rng).len(), 3);
    }

    #[test]
    fn test_oversample_stops_at_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let criteria = Criteria::new("fork", 0, 3000);
        let stream = pool(1000, 1000, "fork");
        let picked = oversample(stream, &criteria, 4, Oversample::default(), &mut rng);

        assert_eq!(picked.len(), 4);
        // Only the first count * factor matches are eligible.
        for r in &picked {
            let n: usize = r.id.trim_start_matches('p').parse().unwrap();
            assert!(n < 20);
        }
    }

    #[test]
    fn test_oversample_passes_over_underivable_records() {
        let mut rng = StdRng::seed_from_u64(2);
        let criteria = Criteria::new("fork", 0, 3000);
        let mut stream: Vec<_> = (0..3)
            .map(|i| {
                let mut r = rec(&format!("bad{i}"), 1000, &["fork"]);
                r.solution_moves = vec!["e2e5".to_string()];
                r
            })
            .collect();
        stream.extend(pool(4, 1000, "fork"));

        let policy = Oversample { factor: 1, max_scanned: 100 };
        let picked = oversample(stream, &criteria, 4, policy, &mut rng);
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|r| r.derive().is_ok()));
    }

    #[test]
    fn test_admits_requires_replayable_setup() {
        let criteria = Criteria::new("fork", 0, 3000);
        let good = rec("a", 1000, &["fork"]);
        let mut bad = rec("b", 1000, &["fork"]);
        bad.solution_moves = vec!["e2e5".to_string()];

        assert!(criteria.admits(&good));
        assert!(criteria.matches(&bad));
        assert!(!criteria.admits(&bad));
    }

    proptest! {
        #[test]
        fn select_respects_bounds(
            ratings in proptest::collection::vec(0u32..3000, 0..60),
            min in 0u32..1500,
            span in 1u32..1500,
            count in 1usize..40,
            seed in any::<u64>(),
        ) {
            let max = min + span;
            let candidates: Vec<PuzzleRecord> = ratings
                .iter()
                .enumerate()
                .map(|(i, r)| rec(&format!("r{i}"), *r, if i % 3 == 0 { &["pin"] } else { &["Fork"] }))
                .collect();
            let criteria = Criteria::new("fork", min, max);
            let unique_matches = candidates.iter().filter(|r| criteria.matches(r)).count();

            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select(candidates, &criteria, count, Backfill::Unique, &mut rng);

            prop_assert!(selection.puzzles.len() <= count);
            prop_assert_eq!(selection.puzzles.len(), unique_matches.min(count));
            for p in &selection.puzzles {
                prop_assert!(p.rating >= min && p.rating <= max);
                prop_assert!(p.themes.iter().any(|t| t.to_lowercase() == "fork"));
            }
        }
    }
}
