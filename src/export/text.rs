//! Flattened plain-text export: per document, the extracted text and the
//! Japanese translation under plain section headers.

use crate::pipeline::types::ProcessedDocument;

pub fn flatten(entries: &[ProcessedDocument]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("===== {} =====\n\n", entry.file_name));
        out.push_str("--- Extracted Text ---\n");
        out.push_str(&entry.extracted_text);
        out.push_str("\n\n--- Japanese Translation ---\n");
        out.push_str(&entry.translated_text);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::entry;

    #[test]
    fn both_blocks_present_per_document() {
        let text = flatten(&[entry("a.pdf"), entry("b.pdf")]);
        assert_eq!(text.matches("--- Extracted Text ---").count(), 2);
        assert_eq!(text.matches("--- Japanese Translation ---").count(), 2);
        assert!(text.contains("===== a.pdf ====="));
        assert!(text.contains("請求書 第42号"));
    }

    #[test]
    fn empty_entries_flatten_to_empty_string() {
        assert!(flatten(&[]).is_empty());
    }
}
