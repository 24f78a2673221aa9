//! Printable worksheet output: board diagrams, page layout and PDF.

mod glyphs;
pub mod layout;
pub mod pdf;
pub mod render;

pub use layout::{layout, LayoutConfig, Worksheet, WorksheetPage};
pub use pdf::{write_pdf, PdfError};
pub use render::{render, RenderError, RenderedDiagram};
