use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::error::Result;
use crate::geometry::{self, PixelRect, TextAlign};

pub const COLOR_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const COLOR_PLACEHOLDER: Rgba<u8> = Rgba([128, 128, 128, 255]);

const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// The bundled label font.
pub fn default_font() -> Result<FontArc> {
    Ok(FontArc::try_from_slice(FONT_DATA)?)
}

/// Parse TrueType/OpenType bytes into a shareable font.
pub fn load_font(data: Vec<u8>) -> Result<FontArc> {
    Ok(FontArc::try_from_vec(data)?)
}

/// Scale `image` to fill `rect` and alpha-blend it onto the canvas.
pub fn draw_scaled(canvas: &mut RgbaImage, image: &DynamicImage, rect: PixelRect) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let resized = imageops::resize(
        &image.to_rgba8(),
        rect.width,
        rect.height,
        FilterType::Triangle,
    );
    imageops::overlay(canvas, &resized, rect.x as i64, rect.y as i64);
}

/// Plain two-color board, a1 dark in either orientation.
pub fn draw_checkerboard(canvas: &mut RgbaImage, size: u32, light: Rgba<u8>, dark: Rgba<u8>) {
    for row in 0..8u8 {
        for col in 0..8u8 {
            let cell = geometry::cell_rect(size, row, col);
            // Mirroring both axes keeps the parity, so the pattern is layout-independent.
            let color = if (row + col) % 2 == 1 { dark } else { light };
            draw_filled_rect_mut(
                canvas,
                Rect::at(cell.x, cell.y).of_size(cell.width, cell.height),
                color,
            );
        }
    }
}

/// Circular clip region inscribed in a rectangle.
///
/// Only draws made through the clip are affected; the canvas itself carries
/// no clip state afterwards.
#[derive(Debug, Clone, Copy)]
pub struct CircleClip {
    rect: PixelRect,
}

impl CircleClip {
    pub fn inscribed(rect: PixelRect) -> Self {
        Self { rect }
    }

    /// Fraction of the pixel at local `(x, y)` covered by the circle.
    fn coverage(&self, x: u32, y: u32) -> f32 {
        let r = self.rect.width.min(self.rect.height) as f32 / 2.0;
        let dx = x as f32 + 0.5 - self.rect.width as f32 / 2.0;
        let dy = y as f32 + 0.5 - self.rect.height as f32 / 2.0;
        let d = (dx * dx + dy * dy).sqrt();
        (r - d + 0.5).clamp(0.0, 1.0)
    }

    fn mask(&self, image: &mut RgbaImage) {
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let coverage = self.coverage(x, y);
            pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
        }
    }

    /// Scale `image` into the clip rectangle and draw only the part inside the circle.
    pub fn draw_image(&self, canvas: &mut RgbaImage, image: &DynamicImage) {
        if self.rect.width == 0 || self.rect.height == 0 {
            return;
        }
        let mut scaled = imageops::resize(
            &image.to_rgba8(),
            self.rect.width,
            self.rect.height,
            FilterType::Triangle,
        );
        self.mask(&mut scaled);
        imageops::overlay(canvas, &scaled, self.rect.x as i64, self.rect.y as i64);
    }

    /// Fill the circle with a solid color.
    pub fn fill(&self, canvas: &mut RgbaImage, color: Rgba<u8>) {
        let mut disc = RgbaImage::from_pixel(self.rect.width, self.rect.height, color);
        self.mask(&mut disc);
        imageops::overlay(canvas, &disc, self.rect.x as i64, self.rect.y as i64);
    }
}

/// Stand-in drawn when an avatar can't be loaded and placeholders are enabled.
pub fn draw_placeholder_avatar(canvas: &mut RgbaImage, rect: PixelRect) {
    CircleClip::inscribed(rect).fill(canvas, COLOR_PLACEHOLDER);
}

/// Draw a single line of text with its baseline at `baseline`.
///
/// `x` is the left edge for [`TextAlign::Left`] and the right edge for [`TextAlign::Right`].
pub fn draw_label(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    x: i32,
    baseline: i32,
    align: TextAlign,
    color: Rgba<u8>,
) {
    if text.is_empty() {
        return;
    }
    let scale = PxScale::from(geometry::NAME_FONT_PX);
    let ascent = font.as_scaled(scale).ascent();
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Right => x - text_size(scale, font, text).0 as i32,
    };
    let top = baseline - ascent.round() as i32;
    draw_text_mut(canvas, color, left, top, scale, font, text);
}
