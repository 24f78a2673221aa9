//! PGN movetext utilities: a lightweight regex-based parser.
//!
//! Used to rebuild a puzzle's initial position when a source only ships the
//! game's movetext and the ply at which the puzzle starts.

use std::sync::LazyLock;

use regex::Regex;
use shakmaty::{Chess, Position};

use crate::puzzle::to_fen;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static VARIATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O").unwrap()
});

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
pub fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(pgn, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");
    let no_variations = VARIATION_RE.replace_all(&no_comments, "");

    MOVE_RE
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Replay a game from the standard start and split it at `ply`.
///
/// Returns the FEN before move `ply` (0-based) and that move as a coordinate
/// move. `None` if the movetext is too short or contains an illegal move.
pub fn position_before_ply(pgn: &str, ply: usize) -> Option<(String, String)> {
    let moves = extract_moves(pgn);
    let mut pos = Chess::default();

    for (i, san_str) in moves.iter().enumerate() {
        let san: shakmaty::san::San = san_str.trim_end_matches(['+', '#']).parse().ok()?;
        let mv = san.to_move(&pos).ok()?;

        if i == ply {
            let uci = mv.to_uci(shakmaty::CastlingMode::Standard).to_string();
            return Some((to_fen(&pos), uci));
        }

        pos.play_unchecked(mv);
    }

    None
}
