use super::*;

#[test]
fn mockup_slide_reads_client_json_with_string_numbers() {
    let json = r#"{
        "slideType": "mockup",
        "microLabel": "MENTAL REPS",
        "headline": "Calm is a skill",
        "highlightPhrase": "calm",
        "mockupLayout": "phone-left",
        "mockupTheme": "light",
        "imageUsage": "figure",
        "phoneAngle": "-12",
        "figureBorderRadius": "30",
        "bgOverlayOpacity": 0.4,
        "headlineOffsetY": "15",
        "aspectRatio": "4:5"
    }"#;
    let slide: SlideSpec = serde_json::from_str(json).unwrap();
    let SlideSpec::Mockup(m) = slide else {
        panic!("expected mockup slide");
    };
    assert_eq!(m.copy.headline, "Calm is a skill");
    assert_eq!(m.copy.highlight(), Some("calm"));
    assert_eq!(m.mockup_layout, MockupLayout::PhoneLeft);
    assert_eq!(m.mockup_theme, ThemeKind::Light);
    assert_eq!(m.image_usage, ImageUsage::Figure);
    assert_eq!(m.phone_angle, -12.0);
    assert_eq!(m.figure_border_radius, 30.0);
    assert_eq!(m.bg_overlay_opacity, 0.4);
    assert_eq!(m.aspect_ratio, AspectRatio::Portrait4x5);
    assert_eq!(m.headline_font_size, 82.0);
    assert_eq!(m.offsets.headline_offset_y, Some(15.0));
}

#[test]
fn mockup_defaults_match_studio_defaults() {
    let slide: SlideSpec =
        serde_json::from_str(r#"{"slideType":"mockup","headline":"x"}"#).unwrap();
    let SlideSpec::Mockup(m) = slide else {
        panic!("expected mockup slide");
    };
    assert_eq!(m, MockupSlide {
        copy: SlideCopy {
            headline: "x".into(),
            ..SlideCopy::default()
        },
        ..MockupSlide::default()
    });
    assert_eq!(m.phone_angle, -8.0);
    assert_eq!(m.figure_position, FigureAnchor::CenterRight);
}

#[test]
fn unknown_keywords_fall_back_to_defaults() {
    assert_eq!(IconPosition::parse("middle-of-nowhere"), IconPosition::BottomRight);
    assert_eq!(IconPosition::parse("TOP-LEFT"), IconPosition::TopLeft);
    assert_eq!(ImageUsage::parse("ai-background"), ImageUsage::AiBackground);
    assert_eq!(
        serde_json::to_string(&ImageUsage::NoImage).unwrap(),
        "\"none\""
    );
}

#[test]
fn legacy_offset_applies_only_without_per_element_values() {
    let legacy = ElementOffsets {
        text_offset_x: Some(10.0),
        text_offset_y: Some(-4.0),
        ..ElementOffsets::default()
    };
    assert_eq!(legacy.for_element(TextElement::Body), Vec2::new(10.0, -4.0));
    assert_eq!(legacy.for_element(TextElement::Micro), Vec2::new(10.0, -4.0));

    let mixed = ElementOffsets {
        headline_offset_x: Some(5.0),
        ..legacy
    };
    assert_eq!(mixed.for_element(TextElement::Headline), Vec2::new(5.0, 0.0));
    assert_eq!(mixed.for_element(TextElement::Body), Vec2::ZERO);
}

#[test]
fn icon_offsets_are_clamped() {
    let offsets = ElementOffsets {
        icon_offset_x: Some(-900.0),
        icon_offset_y: Some(20.0),
        ..ElementOffsets::default()
    };
    assert_eq!(offsets.icon(), Vec2::new(-500.0, 20.0));
}

#[test]
fn validation_requires_per_type_fields() {
    let no_headline: SlideSpec = serde_json::from_str(r#"{"slideType":"photo"}"#).unwrap();
    assert!(matches!(no_headline.validate(), Err(CarouselError::Validation(_))));

    let video: SlideSpec =
        serde_json::from_str(r#"{"slideType":"video","prompt":"sprinter blocks"}"#).unwrap();
    video.validate().unwrap();

    let long_video: SlideSpec = serde_json::from_str(
        r#"{"slideType":"video","prompt":"x","durationSecs":60}"#,
    )
    .unwrap();
    assert!(long_video.validate().is_err());

    let meme: SlideSpec = serde_json::from_str(r#"{"slideType":"meme","body":"me"}"#).unwrap();
    meme.validate().unwrap();
    let empty_meme: SlideSpec = serde_json::from_str(r#"{"slideType":"meme"}"#).unwrap();
    assert!(empty_meme.validate().is_err());
}

#[test]
fn reference_image_ignores_blank_ids() {
    let slide: SlideSpec = serde_json::from_str(
        r#"{"slideType":"text","headline":"h","referenceImage":"  "}"#,
    )
    .unwrap();
    assert_eq!(slide.reference_image(), None);
    assert_eq!(slide.kind(), "text");
}

#[test]
fn unknown_slide_type_is_rejected() {
    assert!(serde_json::from_str::<SlideSpec>(r#"{"slideType":"hologram"}"#).is_err());
}

#[test]
fn video_headline_stands_in_for_missing_prompt() {
    let headline_only: SlideSpec =
        serde_json::from_str(r#"{"slideType":"video","headline":"Hold the line"}"#).unwrap();
    headline_only.validate().unwrap();

    let blank: SlideSpec =
        serde_json::from_str(r#"{"slideType":"video","prompt":"  ","headline":""}"#).unwrap();
    let err = blank.validate().unwrap_err();
    assert!(err.to_string().contains("prompt or headline"), "{err}");
}
