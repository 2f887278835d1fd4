//! Per-slide production: render or generate, watermark, store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    assets::{
        decode::decode_image,
        store::{AssetResolver, load_first},
    },
    foundation::{
        core::Vec2,
        error::{CarouselError, CarouselResult},
    },
    generate::{
        prompt,
        provider::{GenerationProvider, ImageModel, ImageRequest, TextModel, VideoModel, VideoRequest},
    },
    model::{
        brand::Brand,
        job::BatchRequest,
        slide::{IconPosition, ImageUsage, MemeSlide, MockupSlide, Quality, SlideSpec},
    },
    render::{
        layers::{apply_icon_watermark, composite, meme_caption_layer},
        raster::Rasterizer,
        slide::{IconStamp, SlideInputs, render_mockup},
    },
    storage::{ObjectStore, StoredObject, slide_filename},
};

/// Settings shared by every slide of one batch.
#[derive(Clone, Debug)]
pub struct BatchContext {
    pub job_id: String,
    pub brand: Brand,
    /// Watermark position, when the icon is requested.
    pub icon: Option<IconPosition>,
    pub quality: Quality,
    pub image_model: ImageModel,
    pub text_model: TextModel,
    pub video_model: VideoModel,
    pub refine_prompts: bool,
}

impl BatchContext {
    pub fn from_request(job_id: &str, req: &BatchRequest) -> Self {
        Self {
            job_id: job_id.to_string(),
            brand: Brand::resolve(req.brand.as_deref()),
            icon: req.include_icon.then_some(req.icon_position),
            quality: req.quality,
            image_model: ImageModel::resolve(req.image_model.as_deref()),
            text_model: TextModel::resolve(req.text_model.as_deref()),
            video_model: VideoModel::resolve(req.video_model.as_deref()),
            refine_prompts: req.refine_prompts,
        }
    }
}

/// Produces one slide of a batch. An `Err` fails that slide only.
#[async_trait]
pub trait SlideWorker: Send + Sync {
    async fn produce(
        &self,
        ctx: &BatchContext,
        slide_number: usize,
        slide: &SlideSpec,
    ) -> CarouselResult<StoredObject>;
}

async fn blocking<T, F>(f: F) -> CarouselResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CarouselResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CarouselError::Other(anyhow::anyhow!("render task aborted: {e}")))?
}

/// Production worker wired to providers, assets and the object store.
#[derive(Clone)]
pub struct StudioWorker {
    provider: Arc<dyn GenerationProvider>,
    assets: Arc<dyn AssetResolver>,
    store: Arc<dyn ObjectStore>,
    raster: Rasterizer,
}

impl StudioWorker {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        assets: Arc<dyn AssetResolver>,
        store: Arc<dyn ObjectStore>,
        raster: Rasterizer,
    ) -> Self {
        Self {
            provider,
            assets,
            store,
            raster,
        }
    }

    /// Bytes of a referenced asset; a reference that does not resolve fails the slide.
    async fn reference(&self, slide: &SlideSpec) -> CarouselResult<Option<Vec<u8>>> {
        match slide.reference_image() {
            Some(id) => self.assets.load(id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn brand_icon(&self, brand: &Brand) -> CarouselResult<Option<Vec<u8>>> {
        let icon = load_first(self.assets.as_ref(), &brand.icon_asset_ids()).await?;
        if icon.is_none() {
            tracing::warn!(brand = %brand.id, "no brand icon asset, skipping watermark");
        }
        Ok(icon)
    }

    async fn prompt_for(&self, ctx: &BatchContext, kind: &str, detail: Option<&str>, raw: String) -> String {
        if !ctx.refine_prompts {
            return raw;
        }
        let context = prompt::refinement_context(kind, &ctx.brand, detail);
        prompt::refine(self.provider.as_ref(), ctx.text_model, &ctx.brand, &context, &raw).await
    }

    async fn watermark(&self, ctx: &BatchContext, image: Vec<u8>) -> CarouselResult<Vec<u8>> {
        let Some(position) = ctx.icon else {
            return Ok(image);
        };
        let Some(icon) = self.brand_icon(&ctx.brand).await? else {
            return Ok(image);
        };
        let caption = ctx.brand.icon_caption.clone();
        let raster = self.raster.clone();
        blocking(move || {
            apply_icon_watermark(&image, &icon, caption.as_deref(), position, Vec2::ZERO, &raster)
        })
        .await
    }

    async fn store(
        &self,
        ctx: &BatchContext,
        slide_number: usize,
        ext: &str,
        bytes: Vec<u8>,
    ) -> CarouselResult<StoredObject> {
        let filename = slide_filename(&ctx.brand.id, &ctx.job_id, slide_number, ext);
        self.store.put(&filename, bytes).await
    }

    async fn mockup(&self, ctx: &BatchContext, slide: &MockupSlide) -> CarouselResult<Vec<u8>> {
        let image = match slide.image_usage {
            ImageUsage::AiBackground => {
                let raw = prompt::ai_background_prompt(slide, &ctx.brand);
                let prompt = self.prompt_for(ctx, "background", None, raw).await;
                let bytes = self
                    .provider
                    .generate_image(&ImageRequest {
                        model: ctx.image_model.clone(),
                        prompt,
                        aspect: slide.aspect_ratio,
                        quality: ctx.quality,
                        reference_image: None,
                    })
                    .await?;
                Some(bytes)
            }
            ImageUsage::NoImage => None,
            ImageUsage::Phone | ImageUsage::Figure | ImageUsage::Background => {
                match slide.screenshot_image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    Some(id) => Some(self.assets.load(id).await?),
                    None => None,
                }
            }
        };
        let frame = if slide.image_usage == ImageUsage::Phone {
            load_first(self.assets.as_ref(), &ctx.brand.frame_asset_ids()).await?
        } else {
            None
        };
        let icon = match ctx.icon {
            Some(position) => self.brand_icon(&ctx.brand).await?.map(|bytes| (bytes, position)),
            None => None,
        };

        let slide = slide.clone();
        let brand = ctx.brand.clone();
        let raster = self.raster.clone();
        blocking(move || {
            let inputs = SlideInputs {
                image: image.as_deref().map(decode_image).transpose()?,
                phone_frame: frame.as_deref().map(decode_image).transpose()?,
                icon: match icon {
                    Some((bytes, position)) => Some(IconStamp {
                        image: decode_image(&bytes)?,
                        caption: brand.icon_caption.clone(),
                        position,
                    }),
                    None => None,
                },
            };
            render_mockup(&slide, &brand, &inputs, &raster)?.encode_png()
        })
        .await
    }

    async fn generated_image(
        &self,
        ctx: &BatchContext,
        spec: &SlideSpec,
        raw: String,
        detail: Option<&str>,
    ) -> CarouselResult<Vec<u8>> {
        let reference_image = self.reference(spec).await?;
        let prompt = self.prompt_for(ctx, spec.kind(), detail, raw).await;
        let image = self
            .provider
            .generate_image(&ImageRequest {
                model: ctx.image_model.clone(),
                prompt,
                aspect: spec.aspect(),
                quality: ctx.quality,
                reference_image,
            })
            .await?;
        self.watermark(ctx, image).await
    }

    async fn meme(&self, ctx: &BatchContext, spec: &SlideSpec, slide: &MemeSlide) -> CarouselResult<Vec<u8>> {
        let reference_image = self.reference(spec).await?;
        let scene = self
            .provider
            .generate_image(&ImageRequest {
                model: ctx.image_model.clone(),
                prompt: prompt::meme_prompt(slide, &ctx.brand),
                aspect: slide.aspect_ratio,
                quality: ctx.quality,
                reference_image,
            })
            .await?;

        let (top, bottom) = (slide.copy.headline.clone(), slide.copy.body.clone());
        let raster = self.raster.clone();
        let captioned = blocking(move || {
            let mut base = decode_image(&scene)?;
            if let Some(layer) = meme_caption_layer(base.width(), base.height(), &top, &bottom, &raster)? {
                composite(&mut base, &[layer])?;
            }
            base.encode_png()
        })
        .await?;
        self.watermark(ctx, captioned).await
    }
}

#[async_trait]
impl SlideWorker for StudioWorker {
    #[tracing::instrument(level = "debug", skip_all, fields(job = %ctx.job_id, slide = slide_number, kind = slide.kind()))]
    async fn produce(
        &self,
        ctx: &BatchContext,
        slide_number: usize,
        slide: &SlideSpec,
    ) -> CarouselResult<StoredObject> {
        match slide {
            SlideSpec::Mockup(m) => {
                let png = self.mockup(ctx, m).await?;
                self.store(ctx, slide_number, "png", png).await
            }
            SlideSpec::Text(t) => {
                let raw = prompt::text_prompt(t, &ctx.brand);
                let png = self
                    .generated_image(ctx, slide, raw, t.background_style.as_deref())
                    .await?;
                self.store(ctx, slide_number, "png", png).await
            }
            SlideSpec::Photo(p) => {
                let raw = prompt::photo_prompt(p, &ctx.brand);
                let png = self.generated_image(ctx, slide, raw, p.sport.as_deref()).await?;
                self.store(ctx, slide_number, "png", png).await
            }
            SlideSpec::Meme(m) => {
                let png = self.meme(ctx, slide, m).await?;
                self.store(ctx, slide_number, "png", png).await
            }
            SlideSpec::Video(v) => {
                let start_frame = self.reference(slide).await?;
                let video = self
                    .provider
                    .generate_video(&VideoRequest {
                        model: ctx.video_model,
                        prompt: prompt::video_prompt(v),
                        start_frame,
                        duration_secs: v.duration_secs,
                        aspect: v.aspect_ratio,
                        generate_audio: v.generate_audio,
                    })
                    .await?;
                tracing::debug!(source = %video.source_url, "video downloaded");
                self.store(ctx, slide_number, "mp4", video.bytes).await
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/worker.rs"]
mod tests;
