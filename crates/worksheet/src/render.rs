//! Board diagrams as PNG rasters.
//!
//! The side to move sits at the bottom. For Black the board is turned half
//! way round: rank and file traversal both reverse, and the coordinate labels
//! follow. Output is byte-for-byte deterministic for identical input.

use puzzle_core::puzzle::parse_position;
use puzzle_core::{PuzzleError, Side};
use shakmaty::{uci::UciMove, Color, File, Piece, Position, Rank, Square};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::glyphs::{self, FONT_HEIGHT, FONT_WIDTH, SPRITE_SIZE};

pub const IMAGE_SIZE: u32 = 480;
const OFFSET: f32 = 40.0;
const SQUARE: f32 = 50.0;
const SPRITE_SCALE: f32 = 3.0;
const FONT_SCALE: f32 = 2.0;

type Rgb = (u8, u8, u8);

const LIGHT: Rgb = (255, 255, 255);
const DARK: Rgb = (200, 200, 200);
const HIGHLIGHT: Rgb = (176, 176, 176);
const OUTLINE: Rgb = (100, 100, 100);
const INK: Rgb = (0, 0, 0);
const WHITE_BODY: Rgb = (255, 255, 255);
const BLACK_BODY: Rgb = (60, 60, 60);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] PuzzleError),

    #[error("No glyph for '{0}'")]
    MissingGlyph(char),

    #[error("Could not allocate a {0}x{0} canvas")]
    Canvas(u32),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub orientation: Side,
    /// Origin and destination of the highlighted move, if any.
    pub highlighted: Option<(Square, Square)>,
    /// True when rendering failed and this is a blank stand-in.
    pub placeholder: bool,
}

/// Render `position`, falling back to a blank diagram on any failure.
pub fn render(position: &str, highlight: Option<&str>) -> RenderedDiagram {
    match try_render(position, highlight) {
        Ok(diagram) => diagram,
        Err(e) => {
            tracing::warn!("Diagram render failed for '{}': {}", position, e);
            placeholder()
        }
    }
}

pub fn try_render(position: &str, highlight: Option<&str>) -> Result<RenderedDiagram, RenderError> {
    let pos = parse_position(position)?;
    let orientation = Side::from(pos.turn());
    let highlighted = highlight.and_then(highlight_squares);

    let mut pixmap = Pixmap::new(IMAGE_SIZE, IMAGE_SIZE).ok_or(RenderError::Canvas(IMAGE_SIZE))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    fill(&mut pixmap, OFFSET - 2.0, OFFSET - 2.0, 8.0 * SQUARE + 4.0, 8.0 * SQUARE + 4.0, OUTLINE);

    for row in 0..8u32 {
        for col in 0..8u32 {
            let sq = square_at(orientation, row, col);
            let x = OFFSET + col as f32 * SQUARE;
            let y = OFFSET + row as f32 * SQUARE;

            let color = if highlighted.is_some_and(|(from, to)| sq == from || sq == to) {
                HIGHLIGHT
            } else if (row + col) % 2 == 0 {
                LIGHT
            } else {
                DARK
            };
            fill(&mut pixmap, x, y, SQUARE, SQUARE, color);

            if let Some(piece) = pos.board().piece_at(sq) {
                draw_piece(&mut pixmap, piece, x, y);
            }
        }
    }

    let (files, ranks) = labels(orientation);
    let label_w = FONT_WIDTH as f32 * FONT_SCALE;
    let label_h = FONT_HEIGHT as f32 * FONT_SCALE;
    for (i, c) in files.chars().enumerate() {
        let x = OFFSET + i as f32 * SQUARE + (SQUARE - label_w) / 2.0;
        draw_label(&mut pixmap, c, x, OFFSET + 8.0 * SQUARE + 8.0)?;
    }
    for (i, c) in ranks.chars().enumerate() {
        let y = OFFSET + i as f32 * SQUARE + (SQUARE - label_h) / 2.0;
        draw_label(&mut pixmap, c, OFFSET - 8.0 - label_w, y)?;
    }

    Ok(RenderedDiagram {
        png: encode(&pixmap)?,
        width: IMAGE_SIZE,
        height: IMAGE_SIZE,
        orientation,
        highlighted,
        placeholder: false,
    })
}

/// A blank framed diagram.
pub fn placeholder() -> RenderedDiagram {
    let png = Pixmap::new(IMAGE_SIZE, IMAGE_SIZE)
        .and_then(|mut pixmap| {
            pixmap.fill(tiny_skia::Color::WHITE);
            fill(&mut pixmap, OFFSET - 2.0, OFFSET - 2.0, 8.0 * SQUARE + 4.0, 8.0 * SQUARE + 4.0, OUTLINE);
            fill(&mut pixmap, OFFSET, OFFSET, 8.0 * SQUARE, 8.0 * SQUARE, LIGHT);
            encode(&pixmap).ok()
        })
        .unwrap_or_default();

    RenderedDiagram {
        png,
        width: IMAGE_SIZE,
        height: IMAGE_SIZE,
        orientation: Side::White,
        highlighted: None,
        placeholder: true,
    }
}

/// Board square shown at display `row` (0 = top) and `col` (0 = left).
pub fn square_at(orientation: Side, row: u32, col: u32) -> Square {
    let (rank, file) = match orientation {
        Side::White => (7 - row, col),
        Side::Black => (row, 7 - col),
    };
    Square::from_coords(File::new(file), Rank::new(rank))
}

/// File letters left to right and rank numbers top to bottom.
pub fn labels(orientation: Side) -> (&'static str, &'static str) {
    match orientation {
        Side::White => ("abcdefgh", "87654321"),
        Side::Black => ("hgfedcba", "12345678"),
    }
}

fn highlight_squares(uci: &str) -> Option<(Square, Square)> {
    match uci.trim().parse::<UciMove>().ok()? {
        UciMove::Normal { from, to, .. } => Some((from, to)),
        _ => None,
    }
}

fn draw_piece(pixmap: &mut Pixmap, piece: Piece, x: f32, y: f32) {
    let body = match piece.color {
        Color::White => WHITE_BODY,
        Color::Black => BLACK_BODY,
    };
    let inset = (SQUARE - SPRITE_SIZE as f32 * SPRITE_SCALE) / 2.0;

    for (r, line) in glyphs::piece(piece.role).iter().enumerate() {
        for (c, cell) in line.chars().enumerate() {
            let color = match cell {
                '#' => INK,
                '.' => body,
                _ => continue,
            };
            fill(
                pixmap,
                x + inset + c as f32 * SPRITE_SCALE,
                y + inset + r as f32 * SPRITE_SCALE,
                SPRITE_SCALE,
                SPRITE_SCALE,
                color,
            );
        }
    }
}

fn draw_label(pixmap: &mut Pixmap, c: char, x: f32, y: f32) -> Result<(), RenderError> {
    let rows = glyphs::label(c).ok_or(RenderError::MissingGlyph(c))?;
    for (r, bits) in rows.iter().enumerate() {
        for col in 0..FONT_WIDTH {
            if bits & (1 << (FONT_WIDTH - 1 - col)) != 0 {
                fill(
                    pixmap,
                    x + col as f32 * FONT_SCALE,
                    y + r as f32 * FONT_SCALE,
                    FONT_SCALE,
                    FONT_SCALE,
                    OUTLINE,
                );
            }
        }
    }
    Ok(())
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, (r, g, b): Rgb) {
    let Some(rect) = Rect::from_xywh(x, y, w, h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn encode(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    {
        let mut enc = png::Encoder::new(&mut out, pixmap.width(), pixmap.height());
        enc.set_color(png::ColorType::Rgba);
        enc.set_depth(png::BitDepth::Eight);
        enc.set_filter(png::FilterType::NoFilter);
        enc.set_compression(png::Compression::Default);
        let mut writer = enc.write_header()?;
        writer.write_image_data(pixmap.data())?;
        writer.finish()?;
    }
    Ok(out)
}
