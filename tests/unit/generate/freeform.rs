use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::{
    generate::provider::{GeneratedVideo, ImageRequest, VideoRequest},
    model::outline::OutlineKind,
};

/// Replies with `reply`, or reports Anthropic as unconfigured when there is none.
struct Scripted {
    reply: Option<String>,
    seen: Mutex<Vec<TextRequest>>,
}

impl Scripted {
    fn new(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> TextRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl GenerationProvider for Scripted {
    async fn generate_text(&self, req: &TextRequest) -> CarouselResult<String> {
        self.seen.lock().unwrap().push(req.clone());
        self.reply
            .clone()
            .ok_or_else(|| CarouselError::unavailable("anthropic"))
    }

    async fn generate_image(&self, _req: &ImageRequest) -> CarouselResult<Vec<u8>> {
        Err(CarouselError::provider("not scripted"))
    }

    async fn generate_video(&self, _req: &VideoRequest) -> CarouselResult<GeneratedVideo> {
        Err(CarouselError::provider("not scripted"))
    }
}

const OUTLINE: &str = r#"{
  "title": "Pressure is a privilege",
  "slides": [
    {"number": 1, "label": "Hook", "type": "photo", "headline": "Pressure is a privilege",
     "body": "Nerves mean it matters.", "highlight": "privilege", "sport": "tennis",
     "setting": "center court", "action": "serving", "mood": "focused"},
    {"number": "2", "label": "CTA", "type": "text", "microLabel": "TRAIN",
     "headline": "Download Athlete Mindset, link in bio", "body": ""}
  ]
}"#;

#[test]
fn slide_count_defaults_to_seven_and_clamps_to_twenty() {
    assert_eq!(slide_count(None), 7);
    assert_eq!(slide_count(Some(0)), 7);
    assert_eq!(slide_count(Some(1)), 1);
    assert_eq!(slide_count(Some(12)), 12);
    assert_eq!(slide_count(Some(500)), 20);
}

#[tokio::test]
async fn requested_count_is_clamped_in_the_request() {
    let brand = Brand::resolve(None);
    let provider = Scripted::new(Some(OUTLINE));

    freeform_carousel(&provider, TextModel::ClaudeHaiku, &brand, "pressure", Some(64))
        .await
        .unwrap();
    let req = provider.last();
    let system = req.system.as_deref().unwrap();
    assert!(system.contains("generate exactly 20 slides"));
    assert!(system.starts_with(&brand.system_prompt));
    assert!(system.contains(&format!("Use {} as default micro-label", brand.default_micro_label)));
    assert_eq!(req.max_tokens, 2048);
    assert_eq!(req.prompt, "pressure");

    freeform_carousel(&provider, TextModel::ClaudeHaiku, &brand, "pressure", None)
        .await
        .unwrap();
    assert!(provider.last().system.unwrap().contains("generate exactly 7 slides"));
}

#[tokio::test]
async fn fenced_reply_is_extracted_and_mapped_to_slides() {
    let brand = Brand::resolve(None);
    let fenced = format!("Here is your carousel:\n```json\n{OUTLINE}\n```\nEnjoy!");
    let provider = Scripted::new(Some(&fenced));

    let outline = freeform_carousel(&provider, TextModel::ClaudeHaiku, &brand, "nerves", Some(2))
        .await
        .unwrap();
    assert_eq!(outline.title, "Pressure is a privilege");
    assert_eq!(outline.slides.len(), 2);
    assert_eq!(outline.slides[0].kind, OutlineKind::Photo);
    assert_eq!(outline.slides[1].number, 2);

    let specs = outline.to_specs(&brand);
    let SlideSpec::Photo(hook) = &specs[0] else {
        panic!("expected a photo slide, got {:?}", specs[0]);
    };
    assert_eq!(hook.sport.as_deref(), Some("tennis"));
    assert_eq!(hook.copy.highlight_phrase.as_deref(), Some("privilege"));
    assert_eq!(hook.copy.micro_label, brand.default_micro_label);
    let SlideSpec::Text(cta) = &specs[1] else {
        panic!("expected a text slide, got {:?}", specs[1]);
    };
    assert_eq!(cta.copy.micro_label, "TRAIN");
    assert!(specs.iter().all(|s| s.validate().is_ok()));
}

#[test]
fn json_object_span_runs_first_brace_to_last() {
    assert_eq!(extract_json_object("```json\n{\"a\": {\"b\": 1}}\n```"), Some("{\"a\": {\"b\": 1}}"));
    assert_eq!(extract_json_object("no braces here"), None);
    assert_eq!(extract_json_object("} backwards {"), None);
}

#[tokio::test]
async fn unparseable_reply_is_a_provider_error() {
    let brand = Brand::resolve(None);
    let provider = Scripted::new(Some("Sorry, I can't help with { that."));

    let err = freeform_carousel(&provider, TextModel::ClaudeHaiku, &brand, "x", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::Provider(_)), "{err}");
    assert!(err.to_string().contains("parse"));

    let blank = Scripted::new(Some("   "));
    let err = freeform_carousel(&blank, TextModel::ClaudeHaiku, &brand, "x", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::Provider(_)), "{err}");
}

#[tokio::test]
async fn empty_brief_and_missing_provider_fail_cleanly() {
    let brand = Brand::resolve(None);
    let provider = Scripted::new(Some(OUTLINE));
    let err = freeform_carousel(&provider, TextModel::ClaudeHaiku, &brand, "  ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::Validation(_)), "{err}");
    assert!(provider.seen.lock().unwrap().is_empty());

    let unconfigured = Scripted::new(None);
    let err = freeform_carousel(&unconfigured, TextModel::ClaudeHaiku, &brand, "x", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::ProviderUnavailable { provider: "anthropic" }));
}
