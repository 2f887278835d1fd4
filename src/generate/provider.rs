use async_trait::async_trait;

use crate::{
    foundation::error::CarouselResult, layout::canvas::AspectRatio, model::slide::Quality,
};

/// Text models the studio can route to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextModel {
    #[default]
    ClaudeHaiku,
    Gpt4oMini,
    GeminiFlash,
}

impl TextModel {
    pub const ALL: [TextModel; 3] = [Self::ClaudeHaiku, Self::Gpt4oMini, Self::GeminiFlash];

    /// Client-facing identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::ClaudeHaiku => "claude-haiku",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::GeminiFlash => "gemini-2.5-flash",
        }
    }

    /// Model name sent on the wire.
    pub fn api_model(self) -> &'static str {
        match self {
            Self::ClaudeHaiku => "claude-haiku-4-5-20251001",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::GeminiFlash => "gemini-2.5-flash",
        }
    }

    pub fn resolve(id: Option<&str>) -> Self {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Self::default();
        };
        match id.to_ascii_lowercase().as_str() {
            "claude-haiku" | "claude" | "claude-haiku-4-5" => Self::ClaudeHaiku,
            "gpt-4o-mini" | "openai" => Self::Gpt4oMini,
            "gemini-2.5-flash" | "gemini" => Self::GeminiFlash,
            other => {
                tracing::warn!(model = other, "unknown text model, using default");
                Self::default()
            }
        }
    }
}

/// Image models, including a caller-supplied Flux LoRA.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageModel {
    #[default]
    GptImage,
    FluxKontext,
    GeminiFlashImage,
    FluxLora { weights_url: String },
}

impl ImageModel {
    pub const LORA_PREFIX: &'static str = "lora:";

    pub fn id(&self) -> String {
        match self {
            Self::GptImage => "gpt-image-1.5".into(),
            Self::FluxKontext => "flux".into(),
            Self::GeminiFlashImage => "gemini-2.5-flash-image".into(),
            Self::FluxLora { weights_url } => format!("{}{weights_url}", Self::LORA_PREFIX),
        }
    }

    pub fn resolve(id: Option<&str>) -> Self {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Self::default();
        };
        if let Some(url) = id.strip_prefix(Self::LORA_PREFIX) {
            let url = url.trim();
            if !url.is_empty() {
                return Self::FluxLora {
                    weights_url: url.to_string(),
                };
            }
        }
        match id.to_ascii_lowercase().as_str() {
            "gpt-image-1.5" | "gpt-image-1" | "openai" => Self::GptImage,
            "flux" | "flux-kontext" | "flux-pro-kontext" => Self::FluxKontext,
            "gemini-2.5-flash-image" | "gemini" | "nano-banana" => Self::GeminiFlashImage,
            other => {
                tracing::warn!(model = other, "unknown image model, using default");
                Self::default()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VideoModel {
    #[default]
    Kling3,
    Kling3Pro,
}

impl VideoModel {
    pub fn id(self) -> &'static str {
        match self {
            Self::Kling3 => "kling-3",
            Self::Kling3Pro => "kling-3-pro",
        }
    }

    /// Tier segment of the queue endpoint path.
    pub fn tier(self) -> &'static str {
        match self {
            Self::Kling3 => "standard",
            Self::Kling3Pro => "pro",
        }
    }

    pub fn resolve(id: Option<&str>) -> Self {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Self::default();
        };
        match id.to_ascii_lowercase().as_str() {
            "kling-3" | "kling" | "kling-3-standard" => Self::Kling3,
            "kling-3-pro" => Self::Kling3Pro,
            other => {
                tracing::warn!(model = other, "unknown video model, using default");
                Self::default()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRequest {
    pub model: TextModel,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

impl TextRequest {
    pub fn new(model: TextModel, prompt: impl Into<String>) -> Self {
        Self {
            model,
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageRequest {
    pub model: ImageModel,
    pub prompt: String,
    pub aspect: AspectRatio,
    pub quality: Quality,
    /// Encoded reference image the result should follow.
    pub reference_image: Option<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoRequest {
    pub model: VideoModel,
    pub prompt: String,
    /// Encoded start frame; without one the clip is generated from text.
    pub start_frame: Option<Vec<u8>>,
    pub duration_secs: u32,
    pub aspect: AspectRatio,
    pub generate_audio: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedVideo {
    pub bytes: Vec<u8>,
    pub source_url: String,
}

/// Outbound generation capability. Every call may fail; nothing is cached.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate_text(&self, req: &TextRequest) -> CarouselResult<String>;

    /// Encoded image bytes (PNG or JPEG, as the provider returns them).
    async fn generate_image(&self, req: &ImageRequest) -> CarouselResult<Vec<u8>>;

    async fn generate_video(&self, req: &VideoRequest) -> CarouselResult<GeneratedVideo>;
}

/// API keys per provider; `None` marks the provider unavailable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
    pub fal: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub anthropic: String,
    pub gemini: String,
    pub fal: String,
    pub fal_queue: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com/v1".into(),
            anthropic: "https://api.anthropic.com/v1".into(),
            gemini: "https://generativelanguage.googleapis.com/v1beta".into(),
            fal: "https://fal.run".into(),
            fal_queue: "https://queue.fal.run".into(),
        }
    }
}

impl ProviderEndpoints {
    /// Every provider served from one base URL, as a mock server does.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            openai: format!("{base}/openai"),
            anthropic: format!("{base}/anthropic"),
            gemini: format!("{base}/gemini"),
            fal: format!("{base}/fal"),
            fal_queue: format!("{base}/queue"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/provider.rs"]
mod tests;
