use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::{Value, json};

use crate::{
    assets::decode::sniff_mime,
    foundation::error::{CarouselError, CarouselResult},
    generate::http::{decode_b64, json_or_error, str_at, trim_base},
    layout::canvas::AspectRatio,
    model::slide::Quality,
};

const PROVIDER: &str = "openai";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1.5";

/// Output size for an aspect; the API has no 4:5, so portrait tags share one size.
pub fn image_size(aspect: AspectRatio) -> &'static str {
    match aspect {
        AspectRatio::Square => "1024x1024",
        AspectRatio::Portrait9x16 | AspectRatio::Portrait4x5 => "1024x1536",
    }
}

/// Chat completions and image generation/edits.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: Client,
    base: String,
    key: Option<String>,
    image_model: String,
}

impl OpenAiClient {
    pub fn new(http: Client, base: &str, key: Option<String>, image_model: &str) -> Self {
        Self {
            http,
            base: trim_base(base).to_string(),
            key,
            image_model: image_model.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.key.is_some()
    }

    fn key(&self) -> CarouselResult<&str> {
        self.key
            .as_deref()
            .ok_or_else(|| CarouselError::unavailable(PROVIDER))
    }

    #[tracing::instrument(level = "debug", skip(self, system, prompt))]
    pub async fn chat(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
    ) -> CarouselResult<String> {
        let key = self.key()?;
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base))
            .bearer_auth(key)
            .json(&json!({
                "model": model,
                "max_tokens": max_tokens,
                "messages": messages,
            }))
            .send()
            .await?;
        let body = json_or_error(PROVIDER, resp).await?;
        Ok(str_at(PROVIDER, &body, "/choices/0/message/content")?
            .trim()
            .to_string())
    }

    /// Generate an image, switching to the edits endpoint when a reference is supplied.
    #[tracing::instrument(level = "debug", skip(self, prompt, reference), fields(model = %self.image_model))]
    pub async fn image(
        &self,
        prompt: &str,
        aspect: AspectRatio,
        quality: Quality,
        reference: Option<&[u8]>,
    ) -> CarouselResult<Vec<u8>> {
        let key = self.key()?;
        let size = image_size(aspect);

        let request = match reference {
            None => self
                .http
                .post(format!("{}/images/generations", self.base))
                .bearer_auth(key)
                .json(&json!({
                    "model": self.image_model,
                    "prompt": prompt,
                    "size": size,
                    "quality": quality.tag(),
                    "output_format": "png",
                    "n": 1,
                })),
            Some(bytes) => {
                let mime = sniff_mime(bytes);
                let ext = mime.trim_start_matches("image/");
                let part = Part::bytes(bytes.to_vec())
                    .file_name(format!("reference.{ext}"))
                    .mime_str(mime)?;
                let form = Form::new()
                    .text("model", self.image_model.clone())
                    .text("prompt", prompt.to_string())
                    .text("size", size)
                    .text("quality", quality.tag())
                    .part("image", part);
                self.http
                    .post(format!("{}/images/edits", self.base))
                    .bearer_auth(key)
                    .multipart(form)
            }
        };

        let body: Value = json_or_error(PROVIDER, request.send().await?).await?;
        decode_b64(PROVIDER, str_at(PROVIDER, &body, "/data/0/b64_json")?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/openai.rs"]
mod tests;
