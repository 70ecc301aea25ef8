use super::*;

const DOC: &str = r#"{
    "audio": "narration.mp3",
    "visuals": [
        { "id": 0, "text": "a cat on a roof", "scriptSegment": "Pertama, kucing naik ke atap.",
          "sceneType": "character_shot", "is_cta": false, "imageUrl": "img/0.png", "error": null },
        { "id": 1, "scriptSegment": "", "imageUrl": null },
        { "id": 2, "scriptSegment": "Like, share dan subscribe yaa.", "sceneType": "cta_like_subscribe",
          "is_cta": true, "imageUrl": "data:image/png;base64,aGVsbG8=" }
    ]
}"#;

#[test]
fn generator_json_field_names_deserialize() {
    let doc: StoryboardDoc = serde_json::from_str(DOC).unwrap();
    assert_eq!(doc.visuals.len(), 3);
    assert_eq!(doc.visuals[0].script_segment, "Pertama, kucing naik ke atap.");
    assert_eq!(doc.visuals[0].scene_type.as_deref(), Some("character_shot"));
    assert_eq!(
        doc.visuals[0].visual_description.as_deref(),
        Some("a cat on a roof")
    );
    assert!(doc.visuals[2].is_cta);
    assert_eq!(doc.visuals[1].image_url, None);
}

#[test]
fn snapshot_resolves_paths_and_data_urls() {
    let doc: StoryboardDoc = serde_json::from_str(DOC).unwrap();
    let sb = Storyboard::new(doc, "/work/project");
    let segs = sb.snapshot().unwrap();
    assert_eq!(segs.len(), 3);
    assert_eq!(
        segs[0].image,
        Some(ImageSource::File(PathBuf::from("/work/project/img/0.png")))
    );
    assert_eq!(segs[1].image, None);
    assert!(segs[2].is_cta);
    match &segs[2].image {
        Some(ImageSource::Inline(bytes)) => assert_eq!(bytes.as_slice(), b"hello"),
        other => panic!("expected inline image, got {other:?}"),
    }
    assert_eq!(
        sb.audio_path().unwrap(),
        Some(PathBuf::from("/work/project/narration.mp3"))
    );
}

#[test]
fn image_references_reject_traversal_and_remote_urls() {
    let root = Path::new("/work");
    assert!(ImageSource::parse("../secret.png", root).is_err());
    assert!(ImageSource::parse("https://example.com/a.png", root).is_err());
    assert!(ImageSource::parse("data:image/png,plain", root).is_err());
    assert!(ImageSource::parse("data:image/png;base64,!!!", root).is_err());
}

#[test]
fn segment_text_weight_source_is_the_caption() {
    let seg = SceneSegment::new("  hello  ", None);
    let text: &str = seg.as_ref();
    assert_eq!(text, "  hello  ");
    assert!(!seg.is_cta);
    assert!(SceneSegment::cta("", None).is_cta);
}
