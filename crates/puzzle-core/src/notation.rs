//! Solution lines in algebraic notation with figurine piece glyphs.
//!
//! A move that does not replay on the working position is kept as a
//! bracketed coordinate token and the working position stays where it was.
//! Callers count those tokens as a data-quality signal.

use shakmaty::{san::SanPlus, Color, Position};

use crate::puzzle::{legal_move, parse_position};

const FIGURINES: [(char, char); 5] = [
    ('K', '♔'),
    ('Q', '♕'),
    ('R', '♖'),
    ('B', '♗'),
    ('N', '♘'),
];

/// One solution, one token per input move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotatedSolution {
    pub tokens: Vec<String>,
    /// Number of bracketed fallback tokens.
    pub fallbacks: usize,
}

impl NotatedSolution {
    /// Tokens joined for a single printed line.
    pub fn line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Replace piece letters with figurines. Castling and pawn moves pass through.
pub fn figurine(san: &str) -> String {
    san.chars()
        .map(|c| {
            FIGURINES
                .iter()
                .find(|(letter, _)| *letter == c)
                .map_or(c, |(_, glyph)| *glyph)
        })
        .collect()
}

/// Replay `moves` from `position` and render each as a numbered SAN token.
///
/// White moves get `"<n>. "`, the first black move of a move number gets
/// `"<n>... "`, a black move following its white move is bare.
pub fn format_solution<S: AsRef<str>>(position: &str, moves: &[S]) -> NotatedSolution {
    let mut solution = NotatedSolution::default();

    let Ok(mut pos) = parse_position(position) else {
        for uci in moves {
            solution.tokens.push(bracket(uci.as_ref()));
        }
        solution.fallbacks = moves.len();
        return solution;
    };

    let mut last_numbered: Option<u32> = None;

    for uci in moves {
        let uci = uci.as_ref();
        let Some(mv) = legal_move(&pos, uci) else {
            solution.tokens.push(bracket(uci));
            solution.fallbacks += 1;
            continue;
        };

        let number = pos.fullmoves().get();
        let turn = pos.turn();
        let san = figurine(&SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string());

        let token = match turn {
            Color::White => format!("{number}. {san}"),
            Color::Black if last_numbered != Some(number) => format!("{number}... {san}"),
            Color::Black => san,
        };
        last_numbered = Some(number);
        solution.tokens.push(token);
    }

    solution
}

fn bracket(uci: &str) -> String {
    format!("[{uci}]")
}
