//! Supported puzzle themes and their human-readable descriptions.

/// `(key, description)` pairs. The description reads `"<Name> - <summary>"`.
pub const CATALOG: &[(&str, &str)] = &[
    ("advancedPawn", "Advanced Pawn - Pawn close to promotion"),
    ("advantage", "Advantage - Win material or checkmate"),
    ("anastasiaMate", "Anastasia's Mate - Knight and rook mate"),
    ("arabianMate", "Arabian Mate - Knight and rook mate pattern"),
    ("attackingF2F7", "Attacking f2/f7 - Attack weak f-pawn"),
    ("attraction", "Attraction - Lure piece to bad square"),
    ("backRankMate", "Back Rank Mate - Checkmate on back rank"),
    ("bishopEndgame", "Bishop Endgame - Bishop vs bishop/pawns"),
    ("bodenMate", "Boden's Mate - Two bishops checkmate"),
    ("capturingDefender", "Capturing Defender - Remove defending piece"),
    ("castling", "Castling - Castle to safety or attack"),
    ("clearance", "Clearance - Clear square for another piece"),
    ("crushing", "Crushing - Winning by force"),
    ("defensiveMove", "Defensive Move - Find defensive resource"),
    ("deflection", "Deflection - Divert defending piece"),
    ("discoveredAttack", "Discovered Attack - Reveal attack by moving"),
    ("doubleBishopMate", "Double Bishop Mate - Two bishops mate"),
    ("doubleCheck", "Double Check - Check with two pieces"),
    ("dovetailMate", "Dovetail Mate - Queen checkmate pattern"),
    ("enPassant", "En Passant - Special pawn capture"),
    ("endgame", "Endgame - Few pieces remaining"),
    ("equality", "Equality - Achieve equal position"),
    ("exposedKing", "Exposed King - Attack exposed king"),
    ("fork", "Fork - Attack two pieces at once"),
    ("hangingPiece", "Hanging Piece - Win undefended piece"),
    ("hookMate", "Hook Mate - Rook and knight/pawn mate"),
    ("interference", "Interference - Block piece's defense"),
    ("intermezzo", "Intermezzo - In-between move"),
    ("kingsideAttack", "Kingside Attack - Attack on kingside"),
    ("knightEndgame", "Knight Endgame - Knight and pawns"),
    ("long", "Long Puzzle - Many moves required"),
    ("master", "Master Game - From master-level play"),
    ("masterVsMaster", "Master vs Master - Both players masters"),
    ("mate", "Checkmate - Deliver checkmate"),
    ("mateIn1", "Mate in 1 - Checkmate in one move"),
    ("mateIn2", "Mate in 2 - Checkmate in two moves"),
    ("mateIn3", "Mate in 3 - Checkmate in three moves"),
    ("mateIn4", "Mate in 4 - Checkmate in four moves"),
    ("mateIn5", "Mate in 5 - Checkmate in five moves"),
    ("middlegame", "Middlegame - Middle phase of game"),
    ("oneMove", "One Move - Single-move solution"),
    ("opening", "Opening - Early game position"),
    ("pawnEndgame", "Pawn Endgame - Only pawns and kings"),
    ("pin", "Pin - Pin opponent's piece"),
    ("promotion", "Promotion - Promote pawn to queen/piece"),
    ("queenEndgame", "Queen Endgame - Queen and pawns"),
    ("queenRookEndgame", "Queen & Rook Endgame - Queen and rook"),
    ("queensideAttack", "Queenside Attack - Attack on queenside"),
    ("quietMove", "Quiet Move - Non-forcing winning move"),
    ("rookEndgame", "Rook Endgame - Rook and pawns"),
    ("sacrifice", "Sacrifice - Give up material for advantage"),
    ("short", "Short Puzzle - Few moves required"),
    ("skewer", "Skewer - Attack through another piece"),
    ("smotheredMate", "Smothered Mate - Knight checkmate"),
    ("superGM", "Super GM - From top grandmaster games"),
    ("trappedPiece", "Trapped Piece - Win trapped piece"),
    ("underPromotion", "Under Promotion - Promote to non-queen"),
    ("veryLong", "Very Long Puzzle - Many moves required"),
    ("xRayAttack", "X-Ray Attack - Attack through pieces"),
    ("zugzwang", "Zugzwang - Any move worsens position"),
];

/// Description for a theme key; unknown keys are returned unchanged.
pub fn describe(theme: &str) -> &str {
    CATALOG
        .iter()
        .find(|(key, _)| *key == theme)
        .map_or(theme, |(_, desc)| desc)
}

pub fn is_known(theme: &str) -> bool {
    CATALOG.iter().any(|(key, _)| *key == theme)
}

/// Heading label for a worksheet: the catalog name for a known theme,
/// otherwise the key in title case.
pub fn title(theme: &str) -> String {
    match CATALOG.iter().find(|(key, _)| *key == theme) {
        Some((_, desc)) => desc.split(" - ").next().unwrap_or(desc).to_string(),
        None => title_case(theme),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
