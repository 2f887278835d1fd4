//! Whole-carousel outlines written by a text model from a free-form brief.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    generate::provider::{GenerationProvider, TextModel, TextRequest},
    model::{brand::Brand, job::MAX_BATCH_SLIDES, outline::OutlineSlide, slide::SlideSpec},
};

pub const DEFAULT_SLIDE_COUNT: usize = 7;
const FREEFORM_MAX_TOKENS: u32 = 2048;

/// Outline returned by the model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeformCarousel {
    pub title: String,
    pub slides: Vec<OutlineSlide>,
}

impl FreeformCarousel {
    pub fn to_specs(&self, brand: &Brand) -> Vec<SlideSpec> {
        self.slides.iter().map(|s| s.to_spec(brand)).collect()
    }
}

/// Requested count clamped to `1..=20`. Missing or zero means the default of seven.
pub fn slide_count(requested: Option<usize>) -> usize {
    match requested {
        None | Some(0) => DEFAULT_SLIDE_COUNT,
        Some(n) => n.clamp(1, MAX_BATCH_SLIDES),
    }
}

pub fn freeform_system_prompt(brand: &Brand, count: usize) -> String {
    format!(
        r#"{system}

You are generating carousel slide content for {name} social media (TikTok/Instagram).

Given a freeform prompt from the user, generate exactly {count} slides for a carousel post.

Return ONLY valid JSON with this exact structure (no markdown, no explanation):
{{
  "title": "Short carousel title",
  "slides": [
    {{
      "number": 1,
      "label": "Hook",
      "type": "photo or text",
      "microLabel": "BRAND LABEL",
      "headline": "Main headline text",
      "body": "Supporting body text",
      "highlight": "key phrase to highlight in accent color",
      "sport": "only for photo type - sport shown",
      "setting": "only for photo type - location",
      "action": "only for photo type - what athlete is doing",
      "mood": "only for photo type - emotional tone"
    }}
  ]
}}

Rules:
- First slide should be a strong hook (usually photo type)
- Last slide should be a CTA with "Download {name}, link in bio"
- Mix photo and text types for visual variety
- Headlines should be punchy, under 15 words
- Body text should be 1-2 sentences max
- Highlight the most impactful phrase in each slide
- Use {micro} as default micro-label
- For photo slides, include sport/setting/action/mood fields
- Content should match the brand's tone and content pillars"#,
        system = brand.system_prompt,
        name = brand.name,
        micro = brand.default_micro_label,
    )
}

/// Span from the first `{` to the last `}`, which strips code fences and chatter around the
/// object. `None` when there is no such span.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Ask `model` for a carousel outline of `count` slides about `brief`.
///
/// An empty brief is a `Validation` error. Provider failures pass through; an empty or
/// unparseable reply is a `Provider` error.
#[tracing::instrument(skip_all, fields(brand = %brand.id, model = model.id()))]
pub async fn freeform_carousel(
    provider: &dyn GenerationProvider,
    model: TextModel,
    brand: &Brand,
    brief: &str,
    count: Option<usize>,
) -> CarouselResult<FreeformCarousel> {
    let brief = brief.trim();
    if brief.is_empty() {
        return Err(CarouselError::validation("freeform generation needs a prompt"));
    }
    let count = slide_count(count);
    let mut req =
        TextRequest::new(model, brief).with_system(freeform_system_prompt(brand, count));
    req.max_tokens = FREEFORM_MAX_TOKENS;

    let reply = provider.generate_text(&req).await?;
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(CarouselError::provider("text model returned no outline"));
    }
    let json = extract_json_object(reply).unwrap_or(reply);
    let outline: FreeformCarousel = serde_json::from_str(json).map_err(|e| {
        CarouselError::provider(format!("could not parse the outline as JSON: {e}"))
    })?;
    tracing::info!(slides = outline.slides.len(), requested = count, "freeform outline ready");
    Ok(outline)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/freeform.rs"]
mod tests;
