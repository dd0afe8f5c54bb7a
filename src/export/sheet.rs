//! Tabular sheet model.
//!
//! OCR table rows are string-keyed maps whose column sets may differ row to
//! row. The sheet flattens them: the column set is the union of all keys in
//! first-seen order, and a row without a key gets an empty cell.

use crate::models::result::TableRow;

#[derive(Debug, Clone, PartialEq)]
pub struct TableSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSheet {
    pub fn from_rows(rows: &[TableRow]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let cells = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| row.get(header).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            headers,
            rows: cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Strings render bare; anything else renders as its JSON text.
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> TableRow {
        let mut row = TableRow::new();
        for (k, v) in pairs {
            row.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        row
    }

    #[test]
    fn headers_are_union_in_first_seen_order() {
        let rows = vec![
            row(&[("Item", "Widget"), ("Qty", "3")]),
            row(&[("Qty", "5"), ("Unit Price", "120")]),
        ];
        let sheet = TableSheet::from_rows(&rows);
        assert_eq!(sheet.headers, vec!["Item", "Qty", "Unit Price"]);
    }

    #[test]
    fn missing_keys_are_empty_cells() {
        let rows = vec![
            row(&[("Item", "Widget")]),
            row(&[("Unit Price", "120")]),
        ];
        let sheet = TableSheet::from_rows(&rows);
        assert_eq!(sheet.rows[0], vec!["Widget", ""]);
        assert_eq!(sheet.rows[1], vec!["", "120"]);
    }

    #[test]
    fn cells_round_trip_against_source_rows() {
        let rows = vec![
            row(&[("商品名", "ウィジェット"), ("数量", "3")]),
            row(&[("商品名", "ガジェット"), ("数量", "7")]),
        ];
        let sheet = TableSheet::from_rows(&rows);

        for (sheet_row, source) in sheet.rows.iter().zip(&rows) {
            for (header, cell) in sheet.headers.iter().zip(sheet_row) {
                assert_eq!(source.get(header).unwrap().as_str().unwrap(), cell);
            }
        }
    }

    #[test]
    fn non_string_values_render_as_json() {
        let mut r = TableRow::new();
        r.insert("Qty".into(), serde_json::json!(3));
        r.insert("Active".into(), serde_json::json!(true));
        let sheet = TableSheet::from_rows(&[r]);
        assert!(sheet.rows[0].contains(&"3".to_string()));
        assert!(sheet.rows[0].contains(&"true".to_string()));
    }

    #[test]
    fn empty_input_is_empty_sheet() {
        let sheet = TableSheet::from_rows(&[]);
        assert!(sheet.is_empty());
        assert!(sheet.headers.is_empty());
    }
}
