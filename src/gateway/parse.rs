//! Response parsing for the chat-completion wire format.
//!
//! The payload is `choices[0].message.content`; models frequently wrap the
//! JSON in a Markdown code fence, so the fence is stripped before parsing.
//! Batch processing uses the lenient parse (malformed JSON degrades to a raw
//! text result); regeneration uses the strict parse (malformed JSON is an
//! error, so a good stored result is never overwritten with a degraded one).

use serde::Deserialize;

use super::{GatewayError, OcrExtraction};
use crate::models::result::TableRow;

/// Marker stored as the translation when the model returns unparseable JSON.
pub const TRANSLATION_UNAVAILABLE: &str =
    "Could not translate document (Invalid JSON returned).";

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Deserialize)]
struct ExtractionPayload {
    #[serde(rename = "extractedText", default)]
    extracted_text: String,
    #[serde(rename = "translatedText", default)]
    translated_text: String,
    #[serde(rename = "tableData", default)]
    table_data: Vec<TableRow>,
}

/// Pull the model's text payload out of the chat-completion envelope.
pub fn payload_from_envelope(body: &serde_json::Value) -> Result<String, GatewayError> {
    let envelope: ChatCompletion = serde_json::from_value(body.clone())
        .map_err(|e| GatewayError::InvalidResponse(format!("bad envelope: {e}")))?;
    let first = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("empty choices".to_string()))?;
    Ok(first.message.content)
}

/// Strip a leading ```` ```json ```` (or bare ```` ``` ````) fence and the
/// matching trailing fence, if present.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag up to the first newline.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Strict parse: the content must be the JSON object the prompt asked for.
pub fn parse_strict(content: &str) -> Result<OcrExtraction, GatewayError> {
    let stripped = strip_code_fences(content);
    let payload: ExtractionPayload = serde_json::from_str(stripped)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad payload: {e}")))?;
    Ok(OcrExtraction {
        extracted_text: payload.extracted_text,
        translated_text: payload.translated_text,
        table_rows: payload.table_data,
    })
}

/// Lenient parse: malformed JSON degrades to the raw text with a fixed
/// translation-unavailable marker and no table rows. The document still
/// completes.
pub fn parse_lenient(content: &str) -> OcrExtraction {
    match parse_strict(content) {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::warn!(error = %e, "Model returned unparseable payload, degrading to raw text");
            OcrExtraction {
                extracted_text: strip_code_fences(content).to_string(),
                translated_text: TRANSLATION_UNAVAILABLE.to_string(),
                table_rows: Vec::new(),
            }
        }
    }
}
