use super::*;

fn vars(pairs: &[(&str, &str)]) -> StudioConfig {
    StudioConfig::from_vars(pairs.iter().copied()).unwrap()
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = vars(&[]);
    assert_eq!(cfg, StudioConfig::default());
    assert_eq!(cfg.poll.interval, Duration::from_secs(5));
    assert_eq!(cfg.poll.timeout, Duration::from_secs(600));
    assert_eq!(cfg.poll.max_consecutive_failures, 5);
    assert_eq!(cfg.job_retention, Duration::from_secs(1800));
    assert_eq!(cfg.openai_image_model, "gpt-image-1.5");
    assert_eq!(cfg.credentials, ProviderCredentials::default());
}

#[test]
fn credentials_and_fallback_names() {
    let cfg = vars(&[
        ("OPENAI_API_KEY", "sk-1"),
        ("ANTHROPIC_API_KEY", "  "),
        ("GOOGLE_API_KEY", "g-2"),
        ("FAL_KEY", "f-3"),
    ]);
    assert_eq!(cfg.credentials.openai.as_deref(), Some("sk-1"));
    assert_eq!(cfg.credentials.anthropic, None);
    assert_eq!(cfg.credentials.gemini.as_deref(), Some("g-2"));
    assert_eq!(cfg.credentials.fal.as_deref(), Some("f-3"));

    let cfg = vars(&[
        ("GEMINI_API_KEY", "primary"),
        ("GOOGLE_API_KEY", "secondary"),
    ]);
    assert_eq!(cfg.credentials.gemini.as_deref(), Some("primary"));
}

#[test]
fn tunables_parse_and_zero_falls_back() {
    let cfg = vars(&[
        ("CAROUSEL_OUTPUT_DIR", "/srv/out"),
        ("CAROUSEL_PUBLIC_PREFIX", "https://cdn.example/slides"),
        ("CAROUSEL_JOB_RETENTION_SECS", "60"),
        ("CAROUSEL_POLL_INTERVAL_SECS", "0"),
        ("CAROUSEL_POLL_TIMEOUT_SECS", ""),
        ("CAROUSEL_POLL_MAX_FAILURES", "2"),
        ("OPENAI_IMAGE_MODEL", "gpt-image-1"),
    ]);
    assert_eq!(cfg.output_dir, PathBuf::from("/srv/out"));
    assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
    assert_eq!(cfg.public_prefix, "https://cdn.example/slides");
    assert_eq!(cfg.job_retention, Duration::from_secs(60));
    assert_eq!(cfg.poll.interval, Duration::from_secs(5));
    assert_eq!(cfg.poll.timeout, Duration::from_secs(600));
    assert_eq!(cfg.poll.max_consecutive_failures, 2);
    assert_eq!(cfg.openai_image_model, "gpt-image-1");
}

#[test]
fn router_reports_configured_providers() {
    let cfg = vars(&[("FAL_API_KEY", "k"), ("OPENAI_API_KEY", "o")]);
    let router = cfg.router().unwrap();
    assert_eq!(router.available(), vec!["openai", "fal"]);
}

#[test]
fn non_numeric_tunable_is_a_configuration_error() {
    let err = StudioConfig::from_vars([("CAROUSEL_POLL_TIMEOUT_SECS", "ten")]).unwrap_err();
    assert!(matches!(err, CarouselError::Validation(_)), "{err}");
    assert!(err.to_string().contains("configuration"));
}

#[test]
fn unrelated_variables_are_ignored() {
    let cfg = vars(&[("PATH", "/usr/bin"), ("HOME", "/root"), ("OPENAI_API_KEY", "sk")]);
    assert_eq!(cfg.credentials.openai.as_deref(), Some("sk"));
    assert_eq!(cfg.output_dir, PathBuf::from("output"));
}
