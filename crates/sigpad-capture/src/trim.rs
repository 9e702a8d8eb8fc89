//! Ink trimming: crop a capture raster to its non-transparent content.
//!
//! Downstream aspect-ratio math must see the ink, not the blank canvas around
//! it, so every export goes through here.

use image::{RgbaImage, imageops};
use serde::Serialize;

/// Axis-aligned pixel rectangle: `x`/`y` is the top-left pixel, `width`/`height`
/// in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Grow by `pad` on every side, clamped to a `max_w` x `max_h` buffer.
    pub fn padded(self, pad: u32, max_w: u32, max_h: u32) -> PixelRect {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = (self.x + self.width).saturating_add(pad).min(max_w);
        let y1 = (self.y + self.height).saturating_add(pad).min(max_h);
        PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// A cropped copy of the ink region and where it came from.
#[derive(Debug, Clone)]
pub struct TrimmedImage {
    pub image: RgbaImage,
    /// Region of the source buffer that was copied (padding included).
    pub bounds: PixelRect,
}

/// Bounding box of every pixel with non-zero alpha, or `None` if blank.
pub fn ink_bounds(buffer: &RgbaImage) -> Option<PixelRect> {
    let (w, h) = buffer.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, px) in buffer.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    if !found {
        return None;
    }
    debug_assert!(max_x < w && max_y < h);
    Some(PixelRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop `buffer` to its ink plus `pad` pixels of margin.
/// Returns `None` when nothing has been drawn.
pub fn trim(buffer: &RgbaImage, pad: u32) -> Option<TrimmedImage> {
    let ink = ink_bounds(buffer)?;
    let bounds = ink.padded(pad, buffer.width(), buffer.height());
    let image = imageops::crop_imm(buffer, bounds.x, bounds.y, bounds.width, bounds.height)
        .to_image();
    log::trace!(
        "trim: ink {}x{} at ({}, {}), exported {}x{}",
        ink.width,
        ink.height,
        ink.x,
        ink.y,
        bounds.width,
        bounds.height
    );
    Some(TrimmedImage { image, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn with_ink(w: u32, h: u32, r: PixelRect) -> RgbaImage {
        let mut img = RgbaImage::new(w, h);
        for y in r.y..r.y + r.height {
            for x in r.x..r.x + r.width {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        img
    }

    #[test]
    fn blank_buffer_has_no_bounds() {
        let img = RgbaImage::new(64, 32);
        assert_eq!(ink_bounds(&img), None);
        assert!(trim(&img, 10).is_none());
    }

    #[test]
    fn trim_pads_known_rect() {
        let r = PixelRect {
            x: 40,
            y: 30,
            width: 50,
            height: 20,
        };
        let img = with_ink(200, 100, r);
        let t = trim(&img, 10).unwrap();
        assert_eq!(
            t.bounds,
            PixelRect {
                x: 30,
                y: 20,
                width: 70,
                height: 40
            }
        );
        assert_eq!(t.image.dimensions(), (70, 40));
    }

    #[test]
    fn trim_clamps_to_edges() {
        let r = PixelRect {
            x: 2,
            y: 0,
            width: 10,
            height: 5,
        };
        let img = with_ink(16, 8, r);
        let t = trim(&img, 10).unwrap();
        assert_eq!(
            t.bounds,
            PixelRect {
                x: 0,
                y: 0,
                width: 16,
                height: 8
            }
        );
    }

    #[test]
    fn faint_pixels_count_as_ink() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(7, 3, Rgba([0, 0, 0, 1]));
        assert_eq!(
            ink_bounds(&img),
            Some(PixelRect {
                x: 7,
                y: 3,
                width: 1,
                height: 1
            })
        );
    }
}
