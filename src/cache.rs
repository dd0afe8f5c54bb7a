//! Single-slot result cache.
//!
//! Holds the processed entries of the most recent batch so the results view
//! can render without re-querying. Every batch overwrites the slot whole; the
//! durable fallback is re-deriving entries from the document and result rows.

use std::sync::Mutex;

use crate::pipeline::types::ProcessedDocument;

#[derive(Default)]
pub struct ResultCache {
    slot: Mutex<Option<Vec<ProcessedDocument>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with this batch's entries.
    pub fn store(&self, entries: Vec<ProcessedDocument>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(entries);
        }
    }

    pub fn load(&self) -> Option<Vec<ProcessedDocument>> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(name: &str) -> ProcessedDocument {
        ProcessedDocument {
            document_id: Uuid::new_v4(),
            file_name: name.to_string(),
            file_path: format!("u/{name}"),
            extracted_text: String::new(),
            translated_text: String::new(),
            table_data: Vec::new(),
            preview_url: "/public/x".to_string(),
        }
    }

    #[test]
    fn slot_starts_empty() {
        assert!(ResultCache::new().load().is_none());
    }

    #[test]
    fn store_overwrites_whole_slot() {
        let cache = ResultCache::new();
        cache.store(vec![entry("a.pdf"), entry("b.pdf")]);
        cache.store(vec![entry("c.pdf")]);

        let entries = cache.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "c.pdf");
    }

    #[test]
    fn clear_empties_slot() {
        let cache = ResultCache::new();
        cache.store(vec![entry("a.pdf")]);
        cache.clear();
        assert!(cache.load().is_none());
    }
}
