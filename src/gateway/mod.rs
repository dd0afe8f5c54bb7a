//! Remote OCR/translation gateway.
//!
//! The pipeline talks to a remote vision model through the `OcrGateway` trait;
//! the wire protocol (chat-completion envelope, code-fence stripping, JSON
//! payload parsing) lives behind it. The buffered client is the production
//! implementation; the streaming keep-alive relay is an opt-in adapter for the
//! `/api/ocr` route.

pub mod client;
pub mod keepalive;
pub mod parse;

pub use client::RemoteOcrClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::result::TableRow;

/// Instruction sent with every extraction request. The model must return a
/// single JSON object with `extractedText`, `translatedText`, and `tableData`.
pub const EXTRACTION_PROMPT: &str = "\
You are an OCR and translation engine for business documents. Given the \
attached document image, return a single JSON object with exactly these keys:\n\
- \"extractedText\": every piece of visible text, transcribed verbatim in the \
original language, preserving reading order.\n\
- \"translatedText\": a complete Japanese translation of the extracted text.\n\
- \"tableData\": an array of objects, one per table row. Use the column \
headers exactly as they appear in the document as the object keys. Do not \
invent generic column names, do not change capitalization, and do not reuse \
headers from one table for rows of a different table.\n\
Return only the JSON object, with no surrounding prose.";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Model API key not configured")]
    NotConfigured,

    #[error("Upstream model error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("OCR request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// Structured output of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrExtraction {
    pub extracted_text: String,
    pub translated_text: String,
    pub table_rows: Vec<TableRow>,
}

/// One extraction per document page image, supplied as a data URL.
///
/// `extract` is the batch path: an unparseable model payload degrades to raw
/// text instead of failing. `extract_strict` is the regeneration path: an
/// unparseable payload is an error, so the stored result is left untouched.
#[async_trait]
pub trait OcrGateway: Send + Sync {
    async fn extract(&self, image_data_url: &str) -> Result<OcrExtraction, GatewayError>;

    async fn extract_strict(&self, image_data_url: &str)
        -> Result<OcrExtraction, GatewayError>;
}

// ──────────────────────────────────────────────
// Mock gateway (testing)
// ──────────────────────────────────────────────

/// Mock gateway returning a fixed outcome per call, in order. Once the queue
/// is exhausted the last outcome repeats.
#[cfg(test)]
pub struct MockOcrGateway {
    outcomes: std::sync::Mutex<Vec<Result<OcrExtraction, GatewayError>>>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockOcrGateway {
    pub fn succeeding(extraction: OcrExtraction) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(vec![Ok(extraction)]),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(vec![Err(error)]),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn sequence(outcomes: Vec<Result<OcrExtraction, GatewayError>>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl MockOcrGateway {
    fn next_outcome(&self) -> Result<OcrExtraction, GatewayError> {
        let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let outcomes = self.outcomes.lock().unwrap();
        let idx = n.min(outcomes.len() - 1);
        match &outcomes[idx] {
            Ok(e) => Ok(e.clone()),
            Err(err) => Err(clone_error(err)),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrGateway for MockOcrGateway {
    async fn extract(&self, _image_data_url: &str) -> Result<OcrExtraction, GatewayError> {
        self.next_outcome()
    }

    async fn extract_strict(
        &self,
        _image_data_url: &str,
    ) -> Result<OcrExtraction, GatewayError> {
        self.next_outcome()
    }
}

#[cfg(test)]
fn clone_error(err: &GatewayError) -> GatewayError {
    match err {
        GatewayError::NotConfigured => GatewayError::NotConfigured,
        GatewayError::Upstream { status, body } => GatewayError::Upstream {
            status: *status,
            body: body.clone(),
        },
        GatewayError::Timeout(s) => GatewayError::Timeout(*s),
        GatewayError::Network(m) => GatewayError::Network(m.clone()),
        GatewayError::InvalidResponse(m) => GatewayError::InvalidResponse(m.clone()),
    }
}
