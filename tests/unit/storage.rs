use super::*;

#[tokio::test]
async fn local_store_writes_and_builds_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDirStore::new(dir.path(), "/output/");
    let obj = store.put("a/slide.png", vec![1, 2, 3]).await.unwrap();

    assert_eq!(obj.filename, "a/slide.png");
    assert_eq!(obj.url, "/output/a/slide.png");
    assert_eq!(std::fs::read(dir.path().join("a/slide.png")).unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn local_store_rejects_escaping_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDirStore::new(dir.path(), "/output");
    assert!(store.put("../x.png", vec![]).await.is_err());
}

#[test]
fn slide_filenames_carry_job_and_number() {
    let name = slide_filename("trackspeed", "abc123", 4, "png");
    assert!(name.starts_with("carousel_trackspeed_abc123_s4_"));
    assert!(name.ends_with(".png"));
    assert_ne!(name, slide_filename("trackspeed", "abc123", 4, "png"));
}
