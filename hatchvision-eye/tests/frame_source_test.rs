//! Tests for the image directory frame source

mod common;

use common::frame_with_strips;
use hatchvision_eye::{Frame, FrameSource, ImageDirSource, VisionError};

#[test]
fn test_replays_images_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    frame_with_strips(&[100, 500]).save(dir.path().join("frame_002.png")).unwrap();
    Frame::new(600, 200).save(dir.path().join("frame_001.png")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut source = ImageDirSource::open(dir.path()).unwrap();
    assert_eq!(source.dimensions(), (600, 200));
    assert_eq!(source.remaining(), 2);

    let first = source.next_frame().unwrap().unwrap();
    assert!(first.pixels().all(|p| p.0 == [0, 0, 0]));
    let second = source.next_frame().unwrap().unwrap();
    assert_eq!(second, frame_with_strips(&[100, 500]));
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn test_unreadable_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    Frame::new(600, 200).save(dir.path().join("a.png")).unwrap();
    std::fs::write(dir.path().join("b.png"), b"truncated").unwrap();
    Frame::new(600, 200).save(dir.path().join("c.png")).unwrap();

    let mut source = ImageDirSource::open(dir.path()).unwrap();
    assert!(source.next_frame().unwrap().is_some());
    assert!(source.next_frame().unwrap().is_some());
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn test_empty_directory_is_a_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(ImageDirSource::open(dir.path()), Err(VisionError::Capture(_))));
    assert!(matches!(
        ImageDirSource::open(dir.path().join("missing")),
        Err(VisionError::Capture(_))
    ));
}
