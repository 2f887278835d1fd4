use reqwest::{Client, header::AUTHORIZATION};
use serde_json::{Value, json};

use crate::{
    assets::decode::{encode_data_uri, sniff_mime},
    foundation::error::{CarouselError, CarouselResult},
    generate::{
        http::{download, json_or_error, str_at, trim_base},
        provider::{GeneratedVideo, VideoModel, VideoRequest},
    },
    jobs::poll::{FalQueueTask, PollOpts, poll_until_terminal},
    layout::canvas::AspectRatio,
};

const PROVIDER: &str = "fal";
pub const KONTEXT_EDIT: &str = "fal-ai/flux-pro/kontext";
pub const KONTEXT_TEXT: &str = "fal-ai/flux-pro/kontext/text-to-image";
pub const FLUX_LORA: &str = "fal-ai/flux-lora";
pub const LORA_TRAINING: &str = "fal-ai/flux-lora-fast-training";

/// Queue path for a Kling clip, animated from a start frame or from text alone.
pub fn kling_path(model: VideoModel, from_image: bool) -> String {
    let mode = if from_image { "image-to-video" } else { "text-to-video" };
    format!("fal-ai/kling-video/v3/{}/{mode}", model.tier())
}

/// `image_size` preset for the Flux LoRA endpoint.
pub fn lora_image_size(aspect: AspectRatio) -> &'static str {
    match aspect {
        AspectRatio::Portrait9x16 => "portrait_16_9",
        AspectRatio::Portrait4x5 => "portrait_4_3",
        AspectRatio::Square => "square_hd",
    }
}

/// Trained LoRA weights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoraWeights {
    pub weights_url: String,
    pub config_url: Option<String>,
}

/// fal.ai client: synchronous Flux runs plus queued Kling video and LoRA training.
#[derive(Clone, Debug)]
pub struct FalClient {
    http: Client,
    base: String,
    queue_base: String,
    key: Option<String>,
    poll: PollOpts,
}

impl FalClient {
    pub fn new(
        http: Client,
        base: &str,
        queue_base: &str,
        key: Option<String>,
        poll: PollOpts,
    ) -> Self {
        Self {
            http,
            base: trim_base(base).to_string(),
            queue_base: trim_base(queue_base).to_string(),
            key,
            poll,
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

    async fn post(&self, url: String, payload: &Value) -> CarouselResult<Value> {
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Key {}", self.key()?))
            .json(payload)
            .send()
            .await?;
        json_or_error(PROVIDER, resp).await
    }

    /// Run a model synchronously and return its JSON output.
    pub async fn run(&self, model_path: &str, payload: &Value) -> CarouselResult<Value> {
        self.post(format!("{}/{model_path}", self.base), payload).await
    }

    /// Put a request on the queue.
    pub async fn submit(&self, model_path: &str, payload: &Value) -> CarouselResult<FalQueueTask> {
        let body = self
            .post(format!("{}/{model_path}", self.queue_base), payload)
            .await?;
        let task = FalQueueTask::from_submit(self.http.clone(), self.key()?, &body)?;
        tracing::info!(model = model_path, request_id = %task.request_id, "queued fal request");
        Ok(task)
    }

    async fn first_image(&self, output: &Value) -> CarouselResult<Vec<u8>> {
        let url = str_at(PROVIDER, output, "/images/0/url")?;
        download(&self.http, PROVIDER, url).await
    }

    /// Flux Kontext: edit a reference image, or text-to-image without one.
    #[tracing::instrument(level = "debug", skip(self, prompt, reference))]
    pub async fn kontext(
        &self,
        prompt: &str,
        aspect: AspectRatio,
        reference: Option<&[u8]>,
    ) -> CarouselResult<Vec<u8>> {
        let mut payload = json!({
            "prompt": prompt,
            "aspect_ratio": aspect.tag(),
            "output_format": "png",
            "sync_mode": true,
        });
        let path = match reference {
            Some(bytes) => {
                payload["image_url"] = Value::String(encode_data_uri(sniff_mime(bytes), bytes));
                KONTEXT_EDIT
            }
            None => KONTEXT_TEXT,
        };
        let output = self.run(path, &payload).await?;
        self.first_image(&output).await
    }

    #[tracing::instrument(level = "debug", skip(self, prompt))]
    pub async fn lora(
        &self,
        weights_url: &str,
        prompt: &str,
        aspect: AspectRatio,
    ) -> CarouselResult<Vec<u8>> {
        let payload = json!({
            "prompt": prompt,
            "image_size": lora_image_size(aspect),
            "loras": [{ "path": weights_url, "scale": 1.0 }],
            "output_format": "png",
            "sync_mode": true,
        });
        let output = self.run(FLUX_LORA, &payload).await?;
        self.first_image(&output).await
    }

    /// Queue a Kling clip, poll it to completion, then download the video.
    #[tracing::instrument(level = "debug", skip(self, req), fields(model = req.model.id()))]
    pub async fn video(&self, req: &VideoRequest) -> CarouselResult<GeneratedVideo> {
        let mut payload = json!({
            "prompt": req.prompt,
            "duration": req.duration_secs.to_string(),
            "aspect_ratio": req.aspect.tag(),
            "generate_audio": req.generate_audio,
        });
        if let Some(frame) = req.start_frame.as_deref() {
            payload["image_url"] = Value::String(encode_data_uri(sniff_mime(frame), frame));
        }
        let path = kling_path(req.model, req.start_frame.is_some());

        let task = self.submit(&path, &payload).await?;
        let output = poll_until_terminal(&task, self.poll).await?;
        let url = str_at(PROVIDER, &output, "/video/url")
            .map_err(|_| CarouselError::provider("fal reported success but returned no video url"))?
            .to_string();
        let bytes = download(&self.http, PROVIDER, &url).await?;
        Ok(GeneratedVideo {
            bytes,
            source_url: url,
        })
    }

    /// Train a Flux LoRA from a zip of images and wait for the weights.
    #[tracing::instrument(level = "info", skip(self, images_zip_url))]
    pub async fn train_lora(
        &self,
        images_zip_url: &str,
        trigger_word: &str,
    ) -> CarouselResult<LoraWeights> {
        let payload = json!({
            "images_data_url": images_zip_url,
            "trigger_word": trigger_word,
        });
        let task = self.submit(LORA_TRAINING, &payload).await?;
        let output = poll_until_terminal(&task, self.poll).await?;
        Ok(LoraWeights {
            weights_url: str_at(PROVIDER, &output, "/diffusers_lora_file/url")?.to_string(),
            config_url: output
                .pointer("/config_file/url")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/fal.rs"]
mod tests;
