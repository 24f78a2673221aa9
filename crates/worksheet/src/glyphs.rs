//! Embedded bitmap resources for diagrams: piece sprites and a label font.

use shakmaty::Role;

pub const SPRITE_SIZE: usize = 12;

/// `#` is ink, `.` is body fill, space is transparent.
pub type Sprite = [&'static str; SPRITE_SIZE];

const PAWN: Sprite = [
    "            ",
    "            ",
    "     ##     ",
    "    #..#    ",
    "    #..#    ",
    "     ##     ",
    "    #..#    ",
    "   #....#   ",
    "   #....#   ",
    "  #......#  ",
    "  ########  ",
    "            ",
];

const KNIGHT: Sprite = [
    "            ",
    "     ##     ",
    "    #..##   ",
    "   #.....#  ",
    "  #...#..#  ",
    "  #..# #.#  ",
    "   ## #..#  ",
    "     #...#  ",
    "    #....#  ",
    "   #......# ",
    "  ######### ",
    "            ",
];

const BISHOP: Sprite = [
    "            ",
    "     ##     ",
    "    #..#    ",
    "   #.#..#   ",
    "   #..#.#   ",
    "   #....#   ",
    "    #..#    ",
    "    #..#    ",
    "   #....#   ",
    "  #......#  ",
    "  ########  ",
    "            ",
];

const ROOK: Sprite = [
    "            ",
    " ##  ##  ## ",
    " #.##..##.# ",
    " #........# ",
    "  ########  ",
    "   #....#   ",
    "   #....#   ",
    "   #....#   ",
    "  #......#  ",
    " #........# ",
    " ########## ",
    "            ",
];

const QUEEN: Sprite = [
    "            ",
    " #   ##   # ",
    " ## #..# ## ",
    " #.##..##.# ",
    " #........# ",
    "  #......#  ",
    "   #....#   ",
    "   #....#   ",
    "  #......#  ",
    " #........# ",
    " ########## ",
    "            ",
];

const KING: Sprite = [
    "     ##     ",
    "    ####    ",
    "     ##     ",
    "  ## ## ##  ",
    " #..#..#..# ",
    " #........# ",
    "  #......#  ",
    "   #....#   ",
    "   #....#   ",
    "  #......#  ",
    " ########## ",
    "            ",
];

pub fn piece(role: Role) -> &'static Sprite {
    match role {
        Role::Pawn => &PAWN,
        Role::Knight => &KNIGHT,
        Role::Bishop => &BISHOP,
        Role::Rook => &ROOK,
        Role::Queen => &QUEEN,
        Role::King => &KING,
    }
}

pub const FONT_WIDTH: usize = 5;
pub const FONT_HEIGHT: usize = 7;

/// 5x7 glyph rows, most significant of the low five bits is the left column.
pub fn label(c: char) -> Option<[u8; FONT_HEIGHT]> {
    let rows = match c {
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        _ => return None,
    };
    Some(rows)
}
