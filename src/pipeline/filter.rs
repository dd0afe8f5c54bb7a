//! Header-bleed row filter.
//!
//! Vision models sometimes carry the column headers of one table into the
//! rows of the next fragment, producing rows whose keys are headers from a
//! different table. Rows with a key containing any deny-listed substring are
//! dropped whole, for both display and export.

use crate::models::result::TableRow;

/// Default deny-list, tuned to the contract documents this service is fed.
pub const DEFAULT_DENY_SUBSTRINGS: &[&str] = &["Product Name", "Term"];

#[derive(Debug, Clone)]
pub struct HeaderBleedFilter {
    deny_substrings: Vec<String>,
}

impl Default for HeaderBleedFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_SUBSTRINGS.iter().map(|s| s.to_string()))
    }
}

impl HeaderBleedFilter {
    pub fn new(deny_substrings: impl IntoIterator<Item = String>) -> Self {
        Self {
            deny_substrings: deny_substrings.into_iter().collect(),
        }
    }

    /// True if any key of the row contains a deny-listed substring.
    pub fn is_bleed_row(&self, row: &TableRow) -> bool {
        row.keys()
            .any(|key| self.deny_substrings.iter().any(|deny| key.contains(deny)))
    }

    /// Rows with no deny-listed key, original order preserved.
    pub fn retain_rows(&self, rows: &[TableRow]) -> Vec<TableRow> {
        rows.iter()
            .filter(|row| !self.is_bleed_row(row))
            .cloned()
            .collect()
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
    fn clean_rows_pass() {
        let filter = HeaderBleedFilter::default();
        let rows = vec![row(&[("Item", "Widget"), ("Qty", "3")])];
        assert_eq!(filter.retain_rows(&rows).len(), 1);
    }

    #[test]
    fn deny_listed_key_drops_whole_row() {
        let filter = HeaderBleedFilter::default();
        let rows = vec![
            row(&[("Item", "Widget")]),
            row(&[("Product Name", "bled header"), ("Qty", "3")]),
        ];
        let kept = filter.retain_rows(&rows);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].contains_key("Item"));
    }

    #[test]
    fn match_is_substring_not_exact() {
        let filter = HeaderBleedFilter::default();
        let rows = vec![row(&[("Contract Term (months)", "12")])];
        assert!(filter.retain_rows(&rows).is_empty());
    }

    #[test]
    fn deny_list_is_configurable() {
        let filter = HeaderBleedFilter::new(vec!["見出し".to_string()]);
        let rows = vec![
            row(&[("Product Name", "kept under custom list")]),
            row(&[("見出し1", "dropped")]),
        ];
        let kept = filter.retain_rows(&rows);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].contains_key("Product Name"));
    }

    #[test]
    fn order_of_kept_rows_preserved() {
        let filter = HeaderBleedFilter::default();
        let rows = vec![
            row(&[("A", "1")]),
            row(&[("Term", "x")]),
            row(&[("B", "2")]),
        ];
        let kept = filter.retain_rows(&rows);
        assert!(kept[0].contains_key("A"));
        assert!(kept[1].contains_key("B"));
    }
}
