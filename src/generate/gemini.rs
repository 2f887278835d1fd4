use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    assets::decode::sniff_mime,
    foundation::error::{CarouselError, CarouselResult},
    generate::http::{decode_b64, json_or_error, trim_base},
    layout::canvas::AspectRatio,
};

const PROVIDER: &str = "gemini";
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// `generateContent` client for text and inline images.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    base: String,
    key: Option<String>,
}

impl GeminiClient {
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

    async fn generate_content(&self, model: &str, body: &Value) -> CarouselResult<Value> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| CarouselError::unavailable(PROVIDER))?;
        let resp = self
            .http
            .post(format!("{}/models/{model}:generateContent", self.base))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;
        json_or_error(PROVIDER, resp).await
    }

    #[tracing::instrument(level = "debug", skip(self, system, prompt))]
    pub async fn text(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
    ) -> CarouselResult<String> {
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": max_tokens },
        });
        if let Some(system) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        let resp = self.generate_content(model, &body).await?;

        let text: String = parts(&resp)
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(CarouselError::provider("gemini response has no text part"));
        }
        Ok(text.to_string())
    }

    #[tracing::instrument(level = "debug", skip(self, prompt, reference))]
    pub async fn image(
        &self,
        prompt: &str,
        aspect: AspectRatio,
        reference: Option<&[u8]>,
    ) -> CarouselResult<Vec<u8>> {
        let mut request_parts = vec![json!({ "text": prompt })];
        if let Some(bytes) = reference {
            request_parts.push(json!({
                "inlineData": {
                    "mimeType": sniff_mime(bytes),
                    "data": base64_encode(bytes),
                }
            }));
        }
        let body = json!({
            "contents": [{ "role": "user", "parts": request_parts }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": aspect.tag() },
            },
        });
        let resp = self.generate_content(IMAGE_MODEL, &body).await?;

        let data = parts(&resp)
            .find_map(|p| {
                p.get("inlineData")
                    .or_else(|| p.get("inline_data"))
                    .and_then(|d| d.get("data"))
                    .and_then(Value::as_str)
            })
            .ok_or_else(|| CarouselError::provider("gemini response has no image part"))?;
        decode_b64(PROVIDER, data)
    }
}

fn parts(resp: &Value) -> impl Iterator<Item = &Value> {
    resp.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/gemini.rs"]
mod tests;
