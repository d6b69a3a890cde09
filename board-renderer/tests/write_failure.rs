//! Descriptor accounting lives in its own test binary so no other test
//! opens files while `/proc/self/fd` is being counted.
#![cfg(target_os = "linux")]

use std::path::Path;

use chess_board_renderer::{
    BoardOptions, BoardRenderer, ImageRef, ImageSource, Layout, PlayerInfo, RenderError, Result,
};
use image::{DynamicImage, Rgba, RgbaImage};

const ENOSPC: i32 = 28;

struct Solid;

impl ImageSource for Solid {
    fn load(&self, _reference: &ImageRef) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            8,
            Rgba([40, 80, 120, 255]),
        )))
    }
}

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

/// Both failure paths run in one test: parallel tests would skew the count.
#[test]
fn failed_writes_are_io_errors_and_close_files() {
    let mut renderer = BoardRenderer::with_source(BoardOptions::default(), Solid).unwrap();
    renderer
        .load_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        .unwrap();
    let alice = PlayerInfo::new("Alice", "alice.png");
    let bob = PlayerInfo::new("Bob", "bob.png");
    renderer
        .render_to_buffer(&alice, &bob, Layout::WhitePerspective)
        .unwrap();

    let before = open_descriptors();

    // open fails
    let missing = std::env::temp_dir()
        .join(format!("board-renderer-missing-{}", std::process::id()))
        .join("board.png");
    assert!(matches!(
        renderer.render_to_file(&missing, &alice, &bob, Layout::BlackPerspective),
        Err(RenderError::Io { .. })
    ));
    assert!(!missing.exists());
    assert_eq!(open_descriptors(), before);

    // open succeeds, write fails
    let full = Path::new("/dev/full");
    if full.exists() {
        for _ in 0..3 {
            match renderer.render_to_file(full, &alice, &bob, Layout::WhitePerspective) {
                Err(RenderError::Io { path, source }) => {
                    assert_eq!(path, full);
                    assert_eq!(source.raw_os_error(), Some(ENOSPC));
                }
                other => panic!("expected Io error, got {other:?}"),
            }
        }
        assert_eq!(open_descriptors(), before);
    }
}
