use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    generate::http::{json_or_error, trim_base},
};

const PROVIDER: &str = "anthropic";
pub const API_VERSION: &str = "2023-06-01";

/// Messages API client.
#[derive(Clone, Debug)]
pub struct AnthropicClient {
    http: Client,
    base: String,
    key: Option<String>,
}

impl AnthropicClient {
    pub fn new(http: Client, base: &str, key: Option<String>) -> Self {
        Self {
            http,
            base: trim_base(base).to_string(),
            key,
        }
    }

    pub fn is_available(&self) -> bool {
        self.key.is_some()
    }

    #[tracing::instrument(level = "debug", skip(self, system, prompt))]
    pub async fn message(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
    ) -> CarouselResult<String> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| CarouselError::unavailable(PROVIDER))?;

        let mut body = json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(system) = system {
            body["system"] = Value::String(system.to_string());
        }

        let resp = self
            .http
            .post(format!("{}/messages", self.base))
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let body = json_or_error(PROVIDER, resp).await?;
        first_text(&body)
    }
}

/// Concatenated `text` blocks of a messages response.
fn first_text(body: &Value) -> CarouselResult<String> {
    let text: String = body
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(CarouselError::provider("anthropic response has no text content"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/generate/anthropic.rs"]
mod tests;
