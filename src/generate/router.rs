use async_trait::async_trait;

use crate::{
    foundation::error::CarouselResult,
    generate::{
        anthropic::AnthropicClient,
        fal::FalClient,
        gemini::GeminiClient,
        http,
        openai::OpenAiClient,
        provider::{
            GeneratedVideo, GenerationProvider, ImageModel, ImageRequest, ProviderCredentials,
            ProviderEndpoints, TextModel, TextRequest, VideoRequest,
        },
    },
    jobs::poll::PollOpts,
};

/// Routes each request to the adapter serving its resolved model.
#[derive(Clone, Debug)]
pub struct ProviderRouter {
    pub openai: OpenAiClient,
    pub anthropic: AnthropicClient,
    pub gemini: GeminiClient,
    pub fal: FalClient,
}

impl ProviderRouter {
    pub fn new(
        credentials: ProviderCredentials,
        endpoints: &ProviderEndpoints,
        openai_image_model: &str,
        poll: PollOpts,
    ) -> CarouselResult<Self> {
        let client = http::client()?;
        Ok(Self {
            openai: OpenAiClient::new(
                client.clone(),
                &endpoints.openai,
                credentials.openai,
                openai_image_model,
            ),
            anthropic: AnthropicClient::new(
                client.clone(),
                &endpoints.anthropic,
                credentials.anthropic,
            ),
            gemini: GeminiClient::new(client.clone(), &endpoints.gemini, credentials.gemini),
            fal: FalClient::new(
                client,
                &endpoints.fal,
                &endpoints.fal_queue,
                credentials.fal,
                poll,
            ),
        })
    }

    /// Names of providers with a credential configured.
    pub fn available(&self) -> Vec<&'static str> {
        [
            ("openai", self.openai.is_available()),
            ("anthropic", self.anthropic.is_available()),
            ("gemini", self.gemini.is_available()),
            ("fal", self.fal.is_available()),
        ]
        .into_iter()
        .filter_map(|(name, ok)| ok.then_some(name))
        .collect()
    }
}

#[async_trait]
impl GenerationProvider for ProviderRouter {
    async fn generate_text(&self, req: &TextRequest) -> CarouselResult<String> {
        let model = req.model.api_model();
        let system = req.system.as_deref();
        match req.model {
            TextModel::ClaudeHaiku => {
                self.anthropic
                    .message(model, system, &req.prompt, req.max_tokens)
                    .await
            }
            TextModel::Gpt4oMini => self.openai.chat(model, system, &req.prompt, req.max_tokens).await,
            TextModel::GeminiFlash => self.gemini.text(model, system, &req.prompt, req.max_tokens).await,
        }
    }

    async fn generate_image(&self, req: &ImageRequest) -> CarouselResult<Vec<u8>> {
        let reference = req.reference_image.as_deref();
        match &req.model {
            ImageModel::GptImage => {
                self.openai
                    .image(&req.prompt, req.aspect, req.quality, reference)
                    .await
            }
            ImageModel::FluxKontext => self.fal.kontext(&req.prompt, req.aspect, reference).await,
            ImageModel::GeminiFlashImage => self.gemini.image(&req.prompt, req.aspect, reference).await,
            ImageModel::FluxLora { weights_url } => {
                if reference.is_some() {
                    tracing::debug!("flux lora ignores the reference image");
                }
                self.fal.lora(weights_url, &req.prompt, req.aspect).await
            }
        }
    }

    async fn generate_video(&self, req: &VideoRequest) -> CarouselResult<GeneratedVideo> {
        self.fal.video(req).await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/router.rs"]
mod tests;
