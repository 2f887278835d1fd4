//! Prompt builders for generated slides, and refinement through a text model.

use crate::{
    generate::provider::{GenerationProvider, TextModel, TextRequest},
    layout::canvas::{AspectRatio, CanvasSpec},
    model::{
        brand::Brand,
        slide::{MemeSlide, MockupSlide, PhotoSlide, SlideCopy, TextSlide, VideoSlide},
    },
};

pub const REFINEMENT_INSTRUCTIONS: &str = "Your job: take a raw image-generation prompt and refine it. Your refinements should:
- Strengthen text legibility instructions (exact spelling, letter spacing for tricky words, font weight)
- Keep the stated safe zones free of text
- Keep backgrounds clean, simple and uncluttered
- Preserve ALL exact quoted text from the original; never change the user's words
- Keep the prompt concise and direct with no markdown and no explanation

For photo slides with people, push for realism over cinematic drama: natural skin texture, soft natural daylight, candid and unposed, shallow depth of field. Avoid the words perfect, flawless, ultra-detailed, 8K, hyper-realistic and masterpiece.

Return ONLY the refined prompt text.";

const VIDEO_PROMPT_LIMIT: usize = 500;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    non_blank(Some(value)).unwrap_or(fallback)
}

/// `"focus"` becomes `"f - o - c - u - s"`.
pub fn spaced_letters(word: &str) -> String {
    word.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Spelling instruction for a comma-separated word list.
pub fn tricky_words_line(tricky: Option<&str>) -> Option<String> {
    let words: Vec<&str> = tricky?
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    let spelled = words
        .iter()
        .map(|w| format!("\"{w}\": \"{}\"", spaced_letters(w)))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Spell these tricky words letter-by-letter: {spelled}."))
}

fn frame_line(aspect: AspectRatio) -> String {
    let canvas = CanvasSpec::for_aspect(aspect);
    format!(
        "{}x{} ({})",
        canvas.width,
        canvas.height,
        aspect.tag()
    )
}

fn safe_zone_line(aspect: AspectRatio) -> String {
    let sz = CanvasSpec::for_aspect(aspect).safe_zone;
    format!(
        "safe zones (top {}px, bottom {}px, sides {}px)",
        sz.top, sz.bottom, sz.left
    )
}

fn palette_line(brand: &Brand) -> String {
    let c = brand.colors;
    format!(
        "brand palette primary {}, accent {}, white {}, secondary {}, CTA color {} (CTA only)",
        c.primary.to_hex(),
        c.accent.to_hex(),
        c.white.to_hex(),
        c.secondary.to_hex(),
        c.cta.to_hex(),
    )
}

fn micro_label<'a>(copy: &'a SlideCopy, brand: &'a Brand) -> &'a str {
    or_default(&copy.micro_label, &brand.default_micro_label)
}

/// Minimalist typographic slide rendered entirely by the image model.
pub fn text_prompt(slide: &TextSlide, brand: &Brand) -> String {
    let copy = &slide.copy;
    let background = non_blank(slide.background_style.as_deref()).unwrap_or(brand.default_background.as_str());
    let layout = non_blank(slide.layout_template.as_deref()).unwrap_or("Classic left lane");

    let mut blocks = vec![
        format!("Micro-label (EXACT text):\n\"{}\"", micro_label(copy, brand)),
        format!(
            "Headline (EXACT, verbatim, include line breaks exactly as shown):\n\"{}\"",
            or_default(&copy.headline, "Your mind leads your body")
        ),
    ];
    if let Some(phrase) = copy.highlight() {
        blocks.push(format!(
            "Highlight ONLY this phrase in accent color {}: \"{phrase}\"",
            brand.colors.accent.to_hex()
        ));
    }
    if let Some(body) = non_blank(Some(copy.body.as_str())) {
        blocks.push(format!("Body text (EXACT, verbatim):\n\"{body}\""));
    }
    if let Some(citation) = non_blank(slide.citation.as_deref()) {
        blocks.push(format!("Optional citation (EXACT, verbatim):\n\"{citation}\""));
    }

    let mut sections = vec![
        format!(
            "Create a minimalist premium carousel slide ({}) for {}.",
            frame_line(slide.aspect_ratio),
            brand.name
        ),
        format!("Background: {background} using {}.", palette_line(brand)),
        format!(
            "Composition: {layout}. Large left-aligned text block within {}. Plenty of negative space.",
            safe_zone_line(slide.aspect_ratio)
        ),
        blocks.join("\n\n"),
        "Typography: modern sans-serif like Inter or SF Pro, headline extra-bold with tight line-height, body regular with comfortable line-height, high readability.".to_string(),
        "Do NOT add any logos or icons; the brand watermark is added after generation.".to_string(),
    ];
    sections.extend(tricky_words_line(slide.tricky_words.as_deref()));
    sections.push(
        "Hard constraints: no words beyond the quoted text, no watermarks, no clutter, high contrast, perfectly legible text."
            .to_string(),
    );
    sections.join("\n\n")
}

/// Candid sports photo with overlaid copy.
pub fn photo_prompt(slide: &PhotoSlide, brand: &Brand) -> String {
    let copy = &slide.copy;
    let field = |v: &Option<String>, fallback: &'static str| -> String {
        non_blank(v.as_deref()).unwrap_or(fallback).to_string()
    };
    let sport = field(&slide.sport, "track");
    let setting = field(&slide.setting, "empty stadium at dusk");
    let action = field(&slide.action, "head down, slow breathing");
    let mood = field(&slide.mood, "calm intensity, disciplined");
    let overlay_style = field(&slide.overlay_style, "dark gradient");
    let placement = field(&slide.overlay_placement, "bottom third");
    let accent = brand.colors.accent.to_hex();

    let mut lines = vec![
        format!(
            "Create a candid, authentic-looking sports photo for a carousel slide ({}). Shot on a phone camera, 50mm equivalent lens, medium close-up at eye level.",
            frame_line(slide.aspect_ratio)
        ),
        format!("Scene: {sport} athlete in {setting}, {action}. Honest and unposed moment."),
        "Subject: one athlete, natural proportions, real skin texture, worn gear without brand logos.".to_string(),
        "Lighting: soft natural daylight, natural color balance, shallow depth of field, subtle film grain.".to_string(),
        format!("Mood: {mood}."),
        format!("Composition: simple, clean background. Leave negative space for text in the {placement}, inside the {}.", safe_zone_line(slide.aspect_ratio)),
        format!("Add a subtle {overlay_style} behind text for readability; the image stays dominant."),
        "Overlay text (EXACT, verbatim):".to_string(),
        format!("Micro-label: \"{}\"", micro_label(copy, brand)),
        format!("Headline: \"{}\"", or_default(&copy.headline, "Calm is a competitive advantage")),
    ];
    if let Some(phrase) = copy.highlight() {
        lines.push(format!("Highlight ONLY: \"{phrase}\" in accent {accent}"));
    }
    if let Some(body) = non_blank(Some(copy.body.as_str())) {
        lines.push(format!("Body: \"{body}\""));
    }
    lines.push("Typography: modern sans-serif, headline bold, body regular, clean kerning.".to_string());
    lines.push(format!(
        "Brand palette accents only (accent {accent}, CTA color {} for CTA only).",
        brand.colors.cta.to_hex()
    ));
    lines.extend(tricky_words_line(slide.tricky_words.as_deref()));
    lines.push(
        "Hard constraints: no extra text beyond quoted, no watermarks, no random logos, no distorted faces or hands, no heavy retouching."
            .to_string(),
    );
    if slide.reference_image.is_some() {
        lines.push(reference_instruction(
            slide.reference_usage.as_deref(),
            slide.reference_instructions.as_deref(),
        ));
    }
    lines.join("\n")
}

/// How the model should treat an attached reference image.
pub fn reference_instruction(usage: Option<&str>, instructions: Option<&str>) -> String {
    let usage = non_blank(usage).unwrap_or("background inspiration");
    match non_blank(instructions) {
        Some(extra) => format!("Reference image provided: use it as {usage}. {extra}"),
        None => format!("Reference image provided: use it as {usage}."),
    }
}

/// Text-free photo placed behind a mockup slide's copy.
pub fn ai_background_prompt(slide: &MockupSlide, brand: &Brand) -> String {
    let setting = non_blank(slide.ai_bg_setting.as_deref()).unwrap_or(brand.default_background.as_str());
    let mood = non_blank(slide.ai_bg_mood.as_deref()).unwrap_or("calm, focused, premium");
    format!(
        "Background photo ({}) for a {} carousel slide. Setting: {setting}. Mood: {mood}. \
         Simple and believable, soft natural light, subtle film grain. Leave generous negative \
         space for overlaid text. Absolutely no text, letters, logos or watermarks.",
        frame_line(slide.aspect_ratio),
        brand.name
    )
}

/// Scene for a meme slide; captions are drawn locally afterwards.
pub fn meme_prompt(slide: &MemeSlide, brand: &Brand) -> String {
    let scene = non_blank(slide.scene.as_deref())
        .or_else(|| non_blank(Some(slide.copy.headline.as_str())))
        .unwrap_or("an athlete reacting to a tough training day");
    format!(
        "Create a funny, relatable meme image ({}) for {}'s audience. Scene: {scene}. \
         Expressive subject, clear focal point, plain areas at the top and bottom of the frame. \
         Do not render any text, captions, letters or logos.",
        frame_line(slide.aspect_ratio),
        brand.name
    )
}

pub fn video_prompt(slide: &VideoSlide) -> String {
    let base = non_blank(Some(slide.prompt.as_str())).unwrap_or(slide.copy.headline.trim());
    let base: String = base.chars().take(VIDEO_PROMPT_LIMIT).collect();
    format!(
        "{base}\n\nVertical {} framing, natural camera motion, realistic lighting, no on-screen text or logos.",
        slide.aspect_ratio.tag()
    )
}

/// One-line description of the slide given to the refinement model.
pub fn refinement_context(kind: &str, brand: &Brand, detail: Option<&str>) -> String {
    match kind {
        "photo" => format!(
            "This is a photo-led slide for {} featuring a {} scene with text overlay.",
            brand.name,
            non_blank(detail).unwrap_or("athlete")
        ),
        "text" => format!(
            "This is a text-only minimalist slide for {} with a {} background.",
            brand.name,
            non_blank(detail).unwrap_or("dark premium")
        ),
        other => format!("This is a {other} slide for {}.", brand.name),
    }
}

/// Refine `raw` through the text model; any failure or empty answer keeps `raw`.
#[tracing::instrument(level = "debug", skip_all, fields(brand = %brand.id, model = model.id()))]
pub async fn refine(
    provider: &dyn GenerationProvider,
    model: TextModel,
    brand: &Brand,
    context: &str,
    raw: &str,
) -> String {
    let req = TextRequest::new(
        model,
        format!("{context}\n\nRefine this image-generation prompt:\n\n{raw}"),
    )
    .with_system(format!("{}\n\n{REFINEMENT_INSTRUCTIONS}", brand.system_prompt));

    match provider.generate_text(&req).await {
        Ok(refined) if !refined.trim().is_empty() => {
            tracing::debug!("prompt refined");
            refined.trim().to_string()
        }
        Ok(_) => {
            tracing::warn!("refinement returned nothing, using raw prompt");
            raw.to_string()
        }
        Err(err) => {
            tracing::warn!(error = %err, "refinement failed, using raw prompt");
            raw.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/prompt.rs"]
mod tests;
