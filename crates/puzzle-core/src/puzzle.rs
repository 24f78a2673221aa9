//! Puzzle records as delivered by a source, and the position the solver faces.
//!
//! Upstream records store the position *before* the opponent's setup move,
//! with that setup move as the first element of the solution. A worksheet has
//! to show the position after it, so every record goes through [`PuzzleRecord::derive`]
//! before it is rendered.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Move, Position};

/// Template prefix for the per-puzzle reference string.
pub const REFERENCE_BASE: &str = "https://lichess.org/training/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("Invalid FEN '{0}'")]
    InvalidFen(String),

    #[error("Puzzle {0} has no solution moves")]
    EmptySolution(String),

    #[error("Puzzle {id} has negative rating {rating}")]
    NegativeRating { id: String, rating: i64 },

    #[error("Puzzle {id}: setup move '{mv}' is not legal in the initial position")]
    IllegalSetupMove { id: String, mv: String },
}

/// Side to move, as printed on the worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("White"),
            Side::Black => f.write_str("Black"),
        }
    }
}

/// A puzzle exactly as a source reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub id: String,
    /// Position before the opponent's setup move.
    #[serde(rename = "fen")]
    pub initial_position: String,
    /// Coordinate moves; element 0 is the opponent's setup move.
    #[serde(rename = "moves")]
    pub solution_moves: Vec<String>,
    pub rating: u32,
    pub themes: Vec<String>,
}

impl PuzzleRecord {
    /// Build a record, rejecting an empty solution, a negative rating or a
    /// FEN that does not parse.
    pub fn new(
        id: impl Into<String>,
        initial_position: impl Into<String>,
        solution_moves: Vec<String>,
        rating: i64,
        themes: Vec<String>,
    ) -> Result<Self, PuzzleError> {
        let id = id.into();
        let initial_position = initial_position.into();

        if solution_moves.is_empty() {
            return Err(PuzzleError::EmptySolution(id));
        }
        if rating < 0 {
            return Err(PuzzleError::NegativeRating { id, rating });
        }
        if initial_position.trim().parse::<Fen>().is_err() {
            return Err(PuzzleError::InvalidFen(initial_position));
        }

        Ok(Self {
            id,
            initial_position: initial_position.trim().to_string(),
            solution_moves,
            rating: u32::try_from(rating).unwrap_or(u32::MAX),
            themes,
        })
    }

    /// Case-insensitive theme membership.
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t.eq_ignore_ascii_case(theme))
    }

    /// Apply the setup move and split off the solver's line.
    ///
    /// Fails as a whole when the setup move is not legal; a record is never
    /// partially used.
    pub fn derive(&self) -> Result<DerivedPuzzle, PuzzleError> {
        let (setup, rest) = self
            .solution_moves
            .split_first()
            .ok_or_else(|| PuzzleError::EmptySolution(self.id.clone()))?;

        let mut pos = parse_position(&self.initial_position)?;
        let mv = legal_move(&pos, setup).ok_or_else(|| PuzzleError::IllegalSetupMove {
            id: self.id.clone(),
            mv: setup.clone(),
        })?;
        pos.play_unchecked(mv);

        Ok(DerivedPuzzle {
            id: self.id.clone(),
            puzzle_position: to_fen(&pos),
            side_to_move: pos.turn().into(),
            setup_move: setup.clone(),
            remaining_moves: rest.to_vec(),
            rating: self.rating,
            themes: self.themes.clone(),
        })
    }
}

/// The position the solver actually faces plus the rest of the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPuzzle {
    pub id: String,
    pub puzzle_position: String,
    pub side_to_move: Side,
    /// The opponent's move that produced `puzzle_position`.
    pub setup_move: String,
    pub remaining_moves: Vec<String>,
    pub rating: u32,
    pub themes: Vec<String>,
}

impl DerivedPuzzle {
    pub fn reference(&self) -> String {
        reference_url(&self.id)
    }
}

pub fn reference_url(id: &str) -> String {
    format!("{REFERENCE_BASE}{id}")
}

/// Parse a FEN into a playable standard-chess position.
pub fn parse_position(fen: &str) -> Result<Chess, PuzzleError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|_| PuzzleError::InvalidFen(fen.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|_| PuzzleError::InvalidFen(fen.to_string()))
}

/// Resolve a coordinate move against `pos`, returning it only if legal.
pub fn legal_move(pos: &Chess, uci: &str) -> Option<Move> {
    let uci: UciMove = uci.trim().parse().ok()?;
    uci.to_move(pos).ok()
}

pub fn to_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn record(fen: &str, moves: &[&str]) -> PuzzleRecord {
        PuzzleRecord::new(
            "test1",
            fen,
            moves.iter().map(|m| m.to_string()).collect(),
            1200,
            vec!["fork".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_derive_applies_setup_move() {
        let derived = record(START, &["e2e4", "e7e5"]).derive().unwrap();
        assert_eq!(
            derived.puzzle_position,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(derived.side_to_move, Side::Black);
        assert_eq!(derived.setup_move, "e2e4");
        assert_eq!(derived.remaining_moves, vec!["e7e5".to_string()]);
    }

    #[test]
    fn test_derive_rejects_illegal_setup_move() {
        let err = record(START, &["e2e5", "e7e5"]).derive().unwrap_err();
        assert_eq!(
            err,
            PuzzleError::IllegalSetupMove { id: "test1".into(), mv: "e2e5".into() }
        );
    }

    #[test]
    fn test_derive_handles_castling_coordinates() {
        let fen = "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQkq - 0 1";
        let derived = record(fen, &["e1g1"]).derive().unwrap();
        assert!(derived.puzzle_position.starts_with("r3k2r/"));
        assert!(derived.puzzle_position.contains("R4RK1 b kq"));
        assert!(derived.remaining_moves.is_empty());
    }

    #[test]
    fn test_new_validates_fields() {
        assert!(matches!(
            PuzzleRecord::new("a", START, vec![], 1000, vec![]),
            Err(PuzzleError::EmptySolution(_))
        ));
        assert!(matches!(
            PuzzleRecord::new("a", START, vec!["e2e4".into()], -5, vec![]),
            Err(PuzzleError::NegativeRating { rating: -5, .. })
        ));
        assert!(matches!(
            PuzzleRecord::new("a", "not a fen", vec!["e2e4".into()], 1000, vec![]),
            Err(PuzzleError::InvalidFen(_))
        ));
    }

    #[test]
    fn test_has_theme_is_case_insensitive() {
        let rec = record(START, &["e2e4"]);
        assert!(rec.has_theme("FORK"));
        assert!(rec.has_theme("fork"));
        assert!(!rec.has_theme("pin"));
    }

    #[test]
    fn test_reference_url() {
        assert_eq!(reference_url("0000D"), "https://lichess.org/training/0000D");
    }
}
