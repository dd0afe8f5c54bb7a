//! Excel workbook export via `rust_xlsxwriter`.
//!
//! One table sheet (only when any table rows exist) with a styled header row,
//! and one text sheet with every document's extracted and translated blocks.
//! Row heights on the text sheet are a heuristic from line counts so multi-line
//! cells stay readable.

use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};

use super::sheet::TableSheet;
use super::ExportError;
use crate::models::result::TableRow;
use crate::pipeline::types::ProcessedDocument;

const LINE_HEIGHT_PTS: f64 = 15.0;
const MAX_ROW_HEIGHT_PTS: f64 = 300.0;
const TEXT_COLUMN_WIDTH: f64 = 60.0;

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        ExportError::Workbook(e.to_string())
    }
}

pub fn build_workbook(entries: &[ProcessedDocument]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let all_rows: Vec<TableRow> = entries
        .iter()
        .flat_map(|e| e.table_data.iter().cloned())
        .collect();
    let sheet = TableSheet::from_rows(&all_rows);
    if !sheet.is_empty() {
        write_table_sheet(&mut workbook, &sheet)?;
    }
    write_text_sheet(&mut workbook, entries)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_table_sheet(workbook: &mut Workbook, sheet: &TableSheet) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Table Data")?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2));

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, header, &header_format)?;
        worksheet.set_column_width(col as u16, 20.0)?;
    }
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col as u16, cell)?;
        }
    }
    Ok(())
}

fn write_text_sheet(
    workbook: &mut Workbook,
    entries: &[ProcessedDocument],
) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Document Text")?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2));
    let wrap_format = Format::new().set_text_wrap();

    for (col, header) in ["File", "Extracted Text", "Japanese Translation"]
        .iter()
        .enumerate()
    {
        worksheet.write_with_format(0, col as u16, *header, &header_format)?;
    }
    worksheet.set_column_width(0, 30.0)?;
    worksheet.set_column_width(1, TEXT_COLUMN_WIDTH)?;
    worksheet.set_column_width(2, TEXT_COLUMN_WIDTH)?;

    for (idx, entry) in entries.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, &entry.file_name)?;
        worksheet.write_with_format(row, 1, &entry.extracted_text, &wrap_format)?;
        worksheet.write_with_format(row, 2, &entry.translated_text, &wrap_format)?;
        worksheet.set_row_height(row, row_height(entry))?;
    }
    Ok(())
}

/// Height from the taller of the two text blocks, capped.
fn row_height(entry: &ProcessedDocument) -> f64 {
    let lines = entry
        .extracted_text
        .lines()
        .count()
        .max(entry.translated_text.lines().count())
        .max(1);
    (lines as f64 * LINE_HEIGHT_PTS).min(MAX_ROW_HEIGHT_PTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::entry;

    #[test]
    fn workbook_bytes_are_xlsx() {
        let bytes = build_workbook(&[entry("a.pdf")]).unwrap();
        // XLSX is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn workbook_without_table_rows_still_builds() {
        let mut e = entry("a.pdf");
        e.table_data.clear();
        assert!(!build_workbook(&[e]).unwrap().is_empty());
    }

    #[test]
    fn row_height_tracks_line_count() {
        let mut e = entry("a.pdf");
        e.extracted_text = "one\ntwo\nthree\nfour".into();
        e.translated_text = "一".into();
        assert_eq!(row_height(&e), 4.0 * LINE_HEIGHT_PTS);
    }

    #[test]
    fn row_height_is_capped() {
        let mut e = entry("a.pdf");
        e.extracted_text = "line\n".repeat(100);
        assert_eq!(row_height(&e), MAX_ROW_HEIGHT_PTS);
    }
}
