use super::*;
use crate::compose::frame::CompositorStyle;
use crate::foundation::core::Canvas;
use crate::timeline::allocate::allocate;

fn solid(rgba: [u8; 4]) -> Option<Arc<PreparedImage>> {
    Some(Arc::new(PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(rgba.repeat(4)),
    }))
}

fn compositor() -> FrameCompositor {
    FrameCompositor::new(
        Canvas {
            width: 8,
            height: 8,
        },
        CompositorStyle::default(),
        None,
    )
    .unwrap()
}

#[test]
fn composes_only_on_segment_change() {
    let segments = vec![
        SceneSegment::new("aaaaaaaaaa", None),
        SceneSegment::new("bbbbbbbbbb", None),
    ];
    let images = vec![solid([255, 0, 0, 255]), solid([0, 255, 0, 255])];
    let timeline = allocate(&segments, 2.0);
    let mut comp = compositor();
    let mut rl = RenderLoop::new(&segments, &images, &timeline, &mut comp).unwrap();

    let (i0, f0) = rl.tick(0.0).map(|(i, f)| (i, f.clone())).unwrap();
    let (i1, f1) = rl.tick(0.5).map(|(i, f)| (i, f.clone())).unwrap();
    assert_eq!((i0, i1), (0, 0));
    assert_eq!(f0, f1);

    let (i2, f2) = rl.tick(1.0).map(|(i, f)| (i, f.clone())).unwrap();
    assert_eq!(i2, 1);
    assert_ne!(f0, f2);

    rl.tick(5.0).unwrap();
    assert_eq!(
        rl.stats(),
        RenderLoopStats {
            ticks: 4,
            compositions: 2
        }
    );
    assert_eq!(rl.current_frame(), Some(&f2));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let segments = vec![SceneSegment::new("a", None), SceneSegment::new("b", None)];
    let images = vec![None];
    let timeline = allocate(&segments, 1.0);
    let mut comp = compositor();
    assert!(RenderLoop::new(&segments, &images, &timeline, &mut comp).is_err());
}

#[test]
fn empty_storyboard_is_rejected() {
    let segments: Vec<SceneSegment> = Vec::new();
    let timeline = allocate(&segments, 1.0);
    let mut comp = compositor();
    assert!(matches!(
        RenderLoop::new(&segments, &[], &timeline, &mut comp),
        Err(StoryreelError::EmptyStoryboard)
    ));
}
