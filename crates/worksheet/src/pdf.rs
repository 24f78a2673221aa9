//! Serialize a laid-out [`Worksheet`] to PDF.
//!
//! Text uses the standard Helvetica faces in WinAnsi encoding. Those faces
//! have no chess glyphs, so figurines are written back as piece letters.
//! Diagrams are embedded as Flate-compressed RGB image XObjects.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use crate::layout::{Align, Font, TextRun, Worksheet};
use crate::render::RenderedDiagram;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Diagram decode failed: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("Unsupported diagram format: {0:?}")]
    UnsupportedImage(png::ColorType),
}

/// Write every page of `worksheet` into a single PDF document.
pub fn write_pdf(worksheet: &Worksheet) -> Result<Vec<u8>, PdfError> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media_box = Rect::new(0.0, 0.0, worksheet.page_width, worksheet.page_height);
    let mut page_ids = Vec::with_capacity(worksheet.pages.len());

    for page in &worksheet.pages {
        let page_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let mut content = Content::new();
        let mut images = Vec::new();

        for placement in &page.images {
            if placement.diagram.png.is_empty() {
                tracing::debug!("Skipping empty diagram at ({}, {})", placement.x, placement.y);
                continue;
            }
            let name = format!("Im{}", images.len() + 1);
            let image_id = alloc.bump();
            write_image(&mut pdf, image_id, &placement.diagram)?;

            content.save_state();
            content.transform([placement.size, 0.0, 0.0, placement.size, placement.x, placement.y]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
            images.push((name, image_id));
        }

        for run in &page.texts {
            write_text(&mut content, run);
        }

        pdf.stream(content_id, &content.finish());

        let mut pdf_page = pdf.page(page_id);
        pdf_page.media_box(media_box);
        pdf_page.parent(tree_id);
        pdf_page.contents(content_id);
        let mut resources = pdf_page.resources();
        resources.fonts().pair(REGULAR, regular_id).pair(BOLD, bold_id);
        if !images.is_empty() {
            let mut x_objects = resources.x_objects();
            for (name, id) in &images {
                x_objects.pair(Name(name.as_bytes()), *id);
            }
            x_objects.finish();
        }
        resources.finish();
        pdf_page.finish();
    }

    let count = page_ids.len() as i32;
    pdf.pages(tree_id).kids(page_ids).count(count);

    Ok(pdf.finish())
}

fn write_text(content: &mut Content, run: &TextRun) {
    let (font, widths) = match run.font {
        Font::Regular => (REGULAR, &HELVETICA),
        Font::Bold => (BOLD, &HELVETICA_BOLD),
    };
    let encoded = win_ansi(&run.text);
    let x = match run.align {
        Align::Left => run.x,
        Align::Center => run.x - text_width(&encoded, widths, run.size) / 2.0,
    };

    content.begin_text();
    content.set_font(font, run.size);
    content.next_line(x, run.y);
    content.show(Str(&encoded));
    content.end_text();
}

fn write_image(pdf: &mut Pdf, id: Ref, diagram: &RenderedDiagram) -> Result<(), PdfError> {
    let decoder = png::Decoder::new(diagram.png.as_slice());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];

    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => pixels.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect(),
        png::ColorType::Rgb => pixels.to_vec(),
        other => return Err(PdfError::UnsupportedImage(other)),
    };
    let compressed = compress_to_vec_zlib(&rgb, 6);

    let mut image = pdf.image_xobject(id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(info.width as i32);
    image.height(info.height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();
    Ok(())
}

/// Encode text for a WinAnsi Type1 font.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '♔' | '♚' => b'K',
            '♕' | '♛' => b'Q',
            '♖' | '♜' => b'R',
            '♗' | '♝' => b'B',
            '♘' | '♞' => b'N',
            ' '..='~' => c as u8,
            _ => b'?',
        })
        .collect()
}

fn text_width(encoded: &[u8], widths: &[u16; 95], size: f32) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|b| match b {
            32..=126 => widths[(b - 32) as usize] as u32,
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Advance widths for ASCII 32..=126, in thousandths of an em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, LayoutConfig};
    use puzzle_core::PuzzleRecord;

    fn sample(n: usize) -> Worksheet {
        let puzzles: Vec<_> = (0..n)
            .map(|i| {
                PuzzleRecord::new(
                    format!("p{i}"),
                    "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
                    vec!["g8f6".into(), "h5f7".into()],
                    600,
                    vec!["mateIn1".into()],
                )
                .unwrap()
                .derive()
                .unwrap()
            })
            .collect();
        layout(&puzzles, "Mate in 1", &LayoutConfig::default())
    }

    #[test]
    fn test_pdf_has_header_and_pages() {
        let bytes = write_pdf(&sample(10)).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 3"));
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains("(4. Qxf7#)"));
    }

    #[test]
    fn test_pdf_is_deterministic() {
        assert_eq!(write_pdf(&sample(2)).unwrap(), write_pdf(&sample(2)).unwrap());
    }

    #[test]
    fn test_win_ansi_maps_figurines() {
        assert_eq!(win_ansi("4. ♕xf7#"), b"4. Qxf7#");
        assert_eq!(win_ansi("é"), b"?");
    }

    #[test]
    fn test_text_width() {
        let w = text_width(b"ii", &HELVETICA, 10.0);
        assert!((w - 4.44).abs() < 1e-4);
    }
}
