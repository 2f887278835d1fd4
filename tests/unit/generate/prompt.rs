use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::{
    foundation::error::{CarouselError, CarouselResult},
    generate::provider::{GeneratedVideo, ImageRequest, VideoRequest},
};

/// Text model stub that records the last request.
struct Scripted {
    reply: CarouselResult<String>,
    seen: Mutex<Option<TextRequest>>,
}

impl Scripted {
    fn new(reply: CarouselResult<String>) -> Self {
        Self {
            reply,
            seen: Mutex::new(None),
        }
    }
}

#[async_trait]
impl GenerationProvider for Scripted {
    async fn generate_text(&self, req: &TextRequest) -> CarouselResult<String> {
        *self.seen.lock().unwrap() = Some(req.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(err) => Err(CarouselError::provider(err.to_string())),
        }
    }

    async fn generate_image(&self, _req: &ImageRequest) -> CarouselResult<Vec<u8>> {
        Err(CarouselError::provider("not scripted"))
    }

    async fn generate_video(&self, _req: &VideoRequest) -> CarouselResult<GeneratedVideo> {
        Err(CarouselError::provider("not scripted"))
    }
}

fn brand() -> Brand {
    Brand::resolve(None)
}

#[test]
fn tricky_words_are_spelled_out() {
    assert_eq!(spaced_letters("focus"), "f - o - c - u - s");
    assert_eq!(
        tricky_words_line(Some(" proprioception, ,VO2 ")).unwrap(),
        "Spell these tricky words letter-by-letter: \"proprioception\": \"p - r - o - p - r - i - o - c - e - p - t - i - o - n\", \"VO2\": \"V - O - 2\"."
    );
    assert_eq!(tricky_words_line(Some(" , ")), None);
    assert_eq!(tricky_words_line(None), None);
}

#[test]
fn text_prompt_quotes_copy_and_palette() {
    let slide = TextSlide {
        copy: SlideCopy {
            micro_label: String::new(),
            headline: "Calm wins races".into(),
            body: "Breathe before you sprint.".into(),
            highlight_phrase: Some("Calm".into()),
        },
        citation: Some("Journal of Sport Psych, 2021".into()),
        ..TextSlide::default()
    };
    let prompt = text_prompt(&slide, &brand());
    assert!(prompt.contains("\"Calm wins races\""));
    assert!(prompt.contains("Highlight ONLY this phrase in accent color #73a6d1: \"Calm\""));
    assert!(prompt.contains("\"Breathe before you sprint.\""));
    assert!(prompt.contains("Journal of Sport Psych, 2021"));
    // blank micro label falls back to the brand default
    assert!(prompt.contains(&format!("\"{}\"", brand().default_micro_label)));
    assert!(prompt.contains("1080x1920 (9:16)"));
    assert!(prompt.contains("top 120px, bottom 200px, sides 90px"));
}

#[test]
fn photo_prompt_uses_defaults_and_reference_note() {
    let slide = PhotoSlide {
        copy: SlideCopy {
            headline: "Own the start".into(),
            ..SlideCopy::default()
        },
        sport: Some("sprint".into()),
        reference_image: Some("uploads/ref.png".into()),
        reference_usage: Some("pose reference".into()),
        ..PhotoSlide::default()
    };
    let prompt = photo_prompt(&slide, &brand());
    assert!(prompt.contains("Scene: sprint athlete in empty stadium at dusk"));
    assert!(prompt.contains("Headline: \"Own the start\""));
    assert!(!prompt.contains("Body:"));
    assert!(prompt.ends_with("Reference image provided: use it as pose reference."));
}

#[test]
fn scene_prompts_forbid_rendered_text() {
    let meme = MemeSlide {
        scene: Some("a coach staring at a stopwatch".into()),
        ..MemeSlide::default()
    };
    let prompt = meme_prompt(&meme, &brand());
    assert!(prompt.contains("a coach staring at a stopwatch"));
    assert!(prompt.contains("Do not render any text"));

    let mockup = MockupSlide::default();
    let prompt = ai_background_prompt(&mockup, &brand());
    assert!(prompt.contains(&brand().default_background));
    assert!(prompt.contains("no text"));
}

#[test]
fn video_prompt_falls_back_to_headline_and_truncates() {
    let slide = VideoSlide {
        copy: SlideCopy {
            headline: "Explosive starts".into(),
            ..SlideCopy::default()
        },
        prompt: "   ".into(),
        reference_image: None,
        duration_secs: 5,
        aspect_ratio: AspectRatio::Portrait9x16,
        generate_audio: false,
    };
    assert!(video_prompt(&slide).starts_with("Explosive starts\n\n"));

    let long = VideoSlide {
        prompt: "x".repeat(900),
        ..slide
    };
    let prompt = video_prompt(&long);
    assert_eq!(prompt.split("\n\n").next().unwrap().len(), 500);
}

#[tokio::test]
async fn refine_returns_model_output_with_brand_system_prompt() {
    let stub = Scripted::new(Ok("  refined  ".into()));
    let b = brand();
    let out = refine(&stub, TextModel::ClaudeHaiku, &b, "ctx", "raw prompt").await;
    assert_eq!(out, "refined");

    let seen = stub.seen.lock().unwrap().clone().unwrap();
    assert!(seen.system.unwrap().starts_with(&b.system_prompt));
    assert!(seen.prompt.starts_with("ctx\n\nRefine this image-generation prompt:"));
    assert!(seen.prompt.ends_with("raw prompt"));
}

#[tokio::test]
async fn refine_falls_back_to_raw_prompt() {
    let failing = Scripted::new(Err(CarouselError::unavailable("anthropic")));
    assert_eq!(
        refine(&failing, TextModel::ClaudeHaiku, &brand(), "ctx", "raw").await,
        "raw"
    );
    let empty = Scripted::new(Ok("   ".into()));
    assert_eq!(
        refine(&empty, TextModel::ClaudeHaiku, &brand(), "ctx", "raw").await,
        "raw"
    );
}

#[test]
fn refinement_context_names_the_slide() {
    let b = brand();
    assert!(refinement_context("photo", &b, Some("sprint")).contains("featuring a sprint scene"));
    assert!(refinement_context("text", &b, None).contains("dark premium background"));
    assert_eq!(
        refinement_context("meme", &b, None),
        format!("This is a meme slide for {}.", b.name)
    );
}
