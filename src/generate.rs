//! Generation backend: one bounded call to the upstream text generator
//!
//! The backend issues exactly one outbound call per `generate` invocation and
//! never retries internally; retries are the orchestrator's responsibility.
//! `HttpGenerator` speaks the OpenAI-compatible chat-completions wire format
//! with ordered text/image parts and `response_format: json_object`.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::error::TaskError;
use crate::types::{AttemptMode, ContentPart, GenerationRequest};

/// A black-box capability: `generate(request, mode) -> raw text`.
///
/// Implementations return whatever text the upstream produced, or an empty
/// string when the upstream returns no content. They do not parse or
/// validate.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
        mode: AttemptMode,
    ) -> Result<String, TaskError>;
}

/// The schema instruction appended after the user content, phrased per mode.
pub fn schema_instruction(schema: &str, mode: AttemptMode) -> String {
    match mode {
        AttemptMode::Lenient => {
            format!("Output JSON ONLY following this schema:\n{schema}")
        }
        AttemptMode::Strict => format!(
            "You MUST output ONLY valid JSON matching this schema - no extra text, \
             no markdown fences, no commentary:\n{schema}"
        ),
    }
}

/// OpenAI-compatible chat-completions backend.
pub struct HttpGenerator {
    api_key: SecretString,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl HttpGenerator {
    pub fn new(api_key: SecretString, base_url: String, model: String) -> Self {
        Self::with_client(api_key, base_url, model, reqwest::Client::new())
    }

    pub fn with_client(
        api_key: SecretString,
        base_url: String,
        model: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            base_url,
            model,
            http_client,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_headers(&self) -> Result<HeaderMap, TaskError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| TaskError::UpstreamTransport(format!("Invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_payload(&self, request: &GenerationRequest, mode: AttemptMode) -> Value {
        let mut content: Vec<Value> = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({ "type": "text", "text": text }),
                ContentPart::ImageUrl(url) => json!({
                    "type": "image_url",
                    "image_url": { "url": url },
                }),
            })
            .collect();
        content.push(json!({
            "type": "text",
            "text": schema_instruction(request.schema, mode),
        }));

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.persona },
                { "role": "user", "content": content },
            ],
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        mode: AttemptMode,
    ) -> Result<String, TaskError> {
        let payload = self.build_payload(request, mode);

        let resp = self
            .http_client
            .post(self.build_url())
            .headers(self.build_headers()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TaskError::UpstreamTransport(format!("Generator request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(TaskError::UpstreamTransport(format!(
                "Generator returned {status}: {text}"
            )));
        }

        let body: Value = resp.json().await.map_err(|e| {
            TaskError::UpstreamTransport(format!("Failed to read generator response: {e}"))
        })?;

        // Empty string when the upstream returns no content.
        Ok(body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
