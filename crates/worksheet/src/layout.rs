//! Page layout for a worksheet.
//!
//! Produces a display list per page in PDF user space (points, origin at the
//! bottom-left). Puzzle pages hold a 3x3 grid of diagrams; solution pages
//! are one continuous flow of single-line answers that spills onto as many
//! pages as needed.

use puzzle_core::notation::format_solution;
use puzzle_core::DerivedPuzzle;

use crate::render::{render, RenderedDiagram};

pub const INCH: f32 = 72.0;

/// Geometry and typography. Every value is overridable.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub columns: usize,
    pub rows: usize,
    /// Left/right page margin of the puzzle grid.
    pub side_margin: f32,
    /// Distance from the top edge to the top of the first grid row.
    pub grid_top: f32,
    /// Vertical space reserved by the title block and bottom margin together.
    pub grid_vertical_inset: f32,
    /// Height of one slot from diagram bottom to the number line.
    pub slot_height: f32,
    pub diagram_size: f32,
    pub title_y: f32,
    pub subtitle_y: f32,
    pub solutions_top: f32,
    pub solutions_bottom: f32,
    pub line_height: f32,
    pub max_lines_per_page: usize,
    /// Horizontal offset of the solution text from the `#n:` label.
    pub solution_indent: f32,
    /// Distance of the reference column from the right edge.
    pub reference_column: f32,
    pub highlight_setup_move: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::letter()
    }
}

impl LayoutConfig {
    pub fn letter() -> Self {
        Self {
            page_width: 8.5 * INCH,
            page_height: 11.0 * INCH,
            columns: 3,
            rows: 3,
            side_margin: 0.5 * INCH,
            grid_top: 1.25 * INCH,
            grid_vertical_inset: 1.5 * INCH,
            slot_height: 2.3 * INCH,
            diagram_size: 2.0 * INCH,
            title_y: 0.5 * INCH,
            subtitle_y: 0.75 * INCH,
            solutions_top: 1.0 * INCH,
            solutions_bottom: 0.5 * INCH,
            line_height: 0.18 * INCH,
            max_lines_per_page: 30,
            solution_indent: 0.3 * INCH,
            reference_column: 3.0 * INCH,
            highlight_setup_move: false,
        }
    }

    pub fn a4() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            ..Self::letter()
        }
    }

    pub fn per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Bottom-left corner of each diagram slot, row-major.
    pub fn slots(&self) -> Vec<(f32, f32)> {
        let col_width = (self.page_width - 2.0 * self.side_margin) / self.columns as f32;
        let row_height = (self.page_height - self.grid_vertical_inset) / self.rows as f32;

        let mut slots = Vec::with_capacity(self.per_page());
        for row in 0..self.rows {
            for col in 0..self.columns {
                let x = self.side_margin + col as f32 * col_width;
                let y = self.page_height - self.grid_top - row as f32 * row_height - self.slot_height;
                slots.push((x, y));
            }
        }
        slots
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the horizontal center of the run.
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: Font,
    pub align: Align,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub diagram: RenderedDiagram,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Puzzles { page_number: usize, puzzle_numbers: Vec<usize> },
    Solutions { page_number: usize, puzzle_numbers: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetPage {
    pub kind: PageKind,
    pub texts: Vec<TextRun>,
    pub images: Vec<ImagePlacement>,
}

impl WorksheetPage {
    fn new(kind: PageKind) -> Self {
        Self {
            kind,
            texts: Vec::new(),
            images: Vec::new(),
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        self.texts.push(TextRun {
            x,
            y,
            size,
            font,
            align: Align::Left,
            text: text.into(),
        });
    }

    fn centered(&mut self, x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        self.texts.push(TextRun {
            x,
            y,
            size,
            font,
            align: Align::Center,
            text: text.into(),
        });
    }

    pub fn is_solutions(&self) -> bool {
        matches!(self.kind, PageKind::Solutions { .. })
    }
}

/// A laid-out document, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<WorksheetPage>,
    /// Bracketed fallback tokens across all solution lines.
    pub notation_fallbacks: usize,
    /// Diagrams that rendered as placeholders.
    pub placeholder_diagrams: usize,
}

impl Worksheet {
    pub fn puzzle_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_solutions()).count()
    }

    pub fn solution_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_solutions()).count()
    }
}

/// Lay out puzzle pages followed by the solution flow.
pub fn layout(puzzles: &[DerivedPuzzle], theme_label: &str, config: &LayoutConfig) -> Worksheet {
    let mut worksheet = Worksheet {
        page_width: config.page_width,
        page_height: config.page_height,
        pages: Vec::new(),
        notation_fallbacks: 0,
        placeholder_diagrams: 0,
    };

    let per_page = config.per_page().max(1);
    for (i, chunk) in puzzles.chunks(per_page).enumerate() {
        let page = puzzle_page(chunk, i * per_page, i + 1, theme_label, config);
        worksheet.placeholder_diagrams += page.images.iter().filter(|img| img.diagram.placeholder).count();
        worksheet.pages.push(page);
    }

    if !puzzles.is_empty() {
        let (pages, fallbacks) = solution_pages(puzzles, theme_label, config);
        worksheet.pages.extend(pages);
        worksheet.notation_fallbacks = fallbacks;
    }

    tracing::debug!(
        "Laid out {} puzzles on {} puzzle pages and {} solution pages",
        puzzles.len(),
        worksheet.puzzle_pages(),
        worksheet.solution_pages()
    );

    worksheet
}

fn puzzle_page(
    chunk: &[DerivedPuzzle],
    first_index: usize,
    page_number: usize,
    theme_label: &str,
    config: &LayoutConfig,
) -> WorksheetPage {
    let numbers: Vec<usize> = (first_index + 1..=first_index + chunk.len()).collect();
    let mut page = WorksheetPage::new(PageKind::Puzzles {
        page_number,
        puzzle_numbers: numbers.clone(),
    });

    let center = config.page_width / 2.0;
    page.centered(
        center,
        config.page_height - config.title_y,
        16.0,
        Font::Bold,
        format!("Chess Puzzles - {theme_label} (Page {page_number})"),
    );
    page.centered(
        center,
        config.page_height - config.subtitle_y,
        10.0,
        Font::Regular,
        "Find the best move for the side to play!",
    );

    for ((puzzle, (x, y)), number) in chunk.iter().zip(config.slots()).zip(numbers) {
        let top = y + config.slot_height;
        page.text(x, top, 9.0, Font::Bold, format!("#{number}"));
        page.text(x, top - 0.15 * INCH, 7.0, Font::Regular, format!("Rating: {}", puzzle.rating));
        page.text(x, top - 0.30 * INCH, 7.0, Font::Bold, format!("{} to move", puzzle.side_to_move));
        if !puzzle.id.is_empty() {
            page.text(x, top - 0.45 * INCH, 5.0, Font::Regular, puzzle.reference());
        }

        let highlight = config.highlight_setup_move.then_some(puzzle.setup_move.as_str());
        page.images.push(ImagePlacement {
            x,
            y,
            size: config.diagram_size,
            diagram: render(&puzzle.puzzle_position, highlight),
        });
    }

    page
}

fn solution_pages(puzzles: &[DerivedPuzzle], theme_label: &str, config: &LayoutConfig) -> (Vec<WorksheetPage>, usize) {
    let new_page = |page_number: usize| {
        let mut page = WorksheetPage::new(PageKind::Solutions {
            page_number,
            puzzle_numbers: Vec::new(),
        });
        page.centered(
            config.page_width / 2.0,
            config.page_height - config.title_y,
            14.0,
            Font::Bold,
            format!("Solutions - {theme_label} (Page {page_number})"),
        );
        page
    };

    let mut pages = Vec::new();
    let mut page = new_page(1);
    let mut y = config.page_height - config.solutions_top;
    let mut lines = 0;
    let mut fallbacks = 0;

    for (idx, puzzle) in puzzles.iter().enumerate() {
        if puzzle.puzzle_position.trim().is_empty() || puzzle.remaining_moves.is_empty() {
            continue;
        }

        if y < config.solutions_bottom || lines >= config.max_lines_per_page {
            let next = pages.len() + 2;
            pages.push(std::mem::replace(&mut page, new_page(next)));
            y = config.page_height - config.solutions_top;
            lines = 0;
        }

        let number = idx + 1;
        let solution = format_solution(&puzzle.puzzle_position, &puzzle.remaining_moves);
        if solution.fallbacks > 0 {
            tracing::warn!(
                "Puzzle {} (#{}): {} solution moves did not replay",
                puzzle.id,
                number,
                solution.fallbacks
            );
            fallbacks += solution.fallbacks;
        }

        let left = config.side_margin;
        page.text(left, y, 8.0, Font::Bold, format!("#{number}:"));
        page.text(left + config.solution_indent, y, 8.0, Font::Regular, solution.line());
        if !puzzle.id.is_empty() {
            page.text(config.page_width - config.reference_column, y, 6.0, Font::Regular, puzzle.reference());
        }
        if let PageKind::Solutions { puzzle_numbers, .. } = &mut page.kind {
            puzzle_numbers.push(number);
        }

        y -= config.line_height;
        lines += 1;
    }

    if lines > 0 {
        pages.push(page);
    }
    (pages, fallbacks)
}
