use super::*;
use crate::model::slide::{MockupSlide, SlideCopy};

fn ok(n: usize) -> SlideResult {
    SlideResult::from_result(
        n,
        Ok(StoredObject {
            url: format!("/output/{n}.png"),
            filename: format!("{n}.png"),
        }),
    )
}

fn mockup(headline: &str) -> SlideSpec {
    SlideSpec::Mockup(MockupSlide {
        copy: SlideCopy {
            headline: headline.into(),
            ..SlideCopy::default()
        },
        ..MockupSlide::default()
    })
}

#[test]
fn results_must_arrive_in_order() {
    let mut job = RenderJob::new("j", "b", 2);
    assert!(job.record(ok(2)).is_err());
    job.begin_slide(1).unwrap();
    job.record(ok(1)).unwrap();
    assert_eq!(job.completed, 1);
    assert!(job.record(ok(1)).is_err());
    job.begin_slide(2).unwrap();
    job.record(SlideResult::from_result(2, Err(CarouselError::provider("429")))).unwrap();
    job.finish().unwrap();

    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.succeeded(), 1);
    assert_eq!(job.slides[1].error.as_deref(), Some("provider error: 429"));
}

#[test]
fn terminal_states_are_immutable() {
    let mut job = RenderJob::new("j", "b", 1);
    assert!(job.finish().is_err());
    assert!(job.fail("loop crashed"));
    assert!(!job.fail("again"));
    assert_eq!(job.error.as_deref(), Some("loop crashed"));
    assert!(job.begin_slide(1).is_err());
    assert!(job.record(ok(1)).is_err());
}

#[test]
fn snapshot_serializes_in_client_shape() {
    let mut job = RenderJob::new("abc", "trackspeed", 1);
    job.begin_slide(1).unwrap();
    job.record(ok(1)).unwrap();
    job.finish().unwrap();
    let v = serde_json::to_value(&job).unwrap();
    assert_eq!(v["status"], "done");
    assert_eq!(v["slides"][0]["slideNumber"], 1);
    assert_eq!(v["slides"][0]["ok"], true);
    assert!(v.get("error").is_none());
}

#[test]
fn batch_size_is_bounded() {
    assert!(BatchRequest::new(vec![]).validate().is_err());
    assert!(BatchRequest::new(vec![mockup("x"); 21]).validate().is_err());
    BatchRequest::new(vec![mockup("x"); 20]).validate().unwrap();
}

#[test]
fn batch_validation_names_the_bad_slide() {
    let err = BatchRequest::new(vec![mockup("fine"), mockup("")])
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("slide 2"));
}

#[test]
fn batch_accepts_legacy_icon_keys() {
    let req: BatchRequest = serde_json::from_str(
        r#"{"slides":[{"slideType":"mockup","headline":"h"}],"includeOwl":true,"owlPosition":"top-left"}"#,
    )
    .unwrap();
    assert!(req.include_icon);
    assert_eq!(req.icon_position, IconPosition::TopLeft);
    assert!(req.refine_prompts);
}
