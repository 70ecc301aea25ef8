use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StoryreelError::MissingAudio
            .to_string()
            .contains("missing audio:")
    );
    assert!(
        StoryreelError::invalid_audio("x")
            .to_string()
            .contains("invalid audio:")
    );
    assert!(
        StoryreelError::EmptyStoryboard
            .to_string()
            .contains("empty storyboard:")
    );
    assert!(
        StoryreelError::image_resolution("x")
            .to_string()
            .contains("image resolution failure:")
    );
    assert!(
        StoryreelError::encoder_unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        StoryreelError::encoder("x")
            .to_string()
            .contains("encoder error:")
    );
    assert!(
        StoryreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StoryreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
