//! PDF export via `printpdf`: the flattened text blocks rendered line by line
//! on A4 pages with a built-in font.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::text::flatten;
use super::ExportError;
use crate::pipeline::types::ProcessedDocument;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_STEP_MM: f32 = 5.0;
const BODY_FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 14.0;

pub fn render(entries: &[ProcessedDocument]) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "OCR Results",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text("OCR Results", TITLE_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
    y -= LINE_STEP_MM * 2.0;

    for line in flatten(entries).lines() {
        if y < MARGIN_MM {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.is_empty() {
            layer.use_text(line, BODY_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        }
        y -= LINE_STEP_MM;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| ExportError::Pdf(e.to_string()))?;
    buf.into_inner().map_err(|e| ExportError::Pdf(e.to_string()))
}
