//! Buffered HTTP client for the remote vision model (chat-completion wire
//! format). One POST per page image, hard timeout, full-body response.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::parse::{parse_lenient, parse_strict, payload_from_envelope};
use super::{GatewayError, OcrExtraction, OcrGateway, EXTRACTION_PROMPT};

/// Ceiling on one extraction round trip. Large multi-table scans routinely
/// take minutes on the remote model.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub struct RemoteOcrClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl RemoteOcrClient {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Chat-completion request body for one page image.
    pub fn request_body(&self, image_data_url: &str, stream: bool) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": EXTRACTION_PROMPT},
                    {"type": "image_url", "image_url": {"url": image_data_url}},
                ],
            }],
            "temperature": 0.1,
            "response_format": {"type": "json_object"},
            "stream": stream,
        })
    }

    pub fn authorized_request(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::RequestBuilder, GatewayError> {
        let key = self.api_key.as_deref().ok_or(GatewayError::NotConfigured)?;
        Ok(self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(body))
    }

    /// Run one buffered round trip and return the model's text payload.
    async fn fetch_content(&self, image_data_url: &str) -> Result<String, GatewayError> {
        let body = self.request_body(image_data_url, false);
        let request = self.authorized_request(&body)?;

        let start = std::time::Instant::now();
        let response = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            request.send(),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.timeout_secs))?
        .map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout_secs)
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let content = payload_from_envelope(&envelope)?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            content_len = content.len(),
            "OCR round trip complete"
        );
        Ok(content)
    }
}

#[async_trait]
impl OcrGateway for RemoteOcrClient {
    async fn extract(&self, image_data_url: &str) -> Result<OcrExtraction, GatewayError> {
        let content = self.fetch_content(image_data_url).await?;
        Ok(parse_lenient(&content))
    }

    async fn extract_strict(
        &self,
        image_data_url: &str,
    ) -> Result<OcrExtraction, GatewayError> {
        let content = self.fetch_content(image_data_url).await?;
        parse_strict(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let client = RemoteOcrClient::new("https://model.example/v1/chat", "gemini-2.5-flash", None, 10);
        let body = client.request_body("data:image/png;base64,AAAA", false);
        assert!(matches!(
            client.authorized_request(&body),
            Err(GatewayError::NotConfigured)
        ));
    }

    #[test]
    fn request_body_shape() {
        let client = RemoteOcrClient::new(
            "https://model.example/v1/chat/",
            "gemini-2.5-flash",
            Some("key".into()),
            10,
        );
        assert_eq!(client.endpoint(), "https://model.example/v1/chat");

        let body = client.request_body("data:image/png;base64,AAAA", false);
        assert_eq!(body["model"], "gemini-2.5-flash");
        assert_eq!(body["stream"], false);
        assert_eq!(body["response_format"]["type"], "json_object");
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn prompt_pins_table_header_rules() {
        assert!(EXTRACTION_PROMPT.contains("exactly as they appear"));
        assert!(EXTRACTION_PROMPT.contains("Japanese"));
    }
}
