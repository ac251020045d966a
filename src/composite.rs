// Compositor: camera image + optional reaction in the top-right corner -> FrameBuffer.
// Stills get a min(w,h)/3 box, animations min(w,h)/2; both keep their own aspect ratio.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::overlay::{OverlayKind, RenderableOverlay};
use crate::types::FrameBuffer;

/// Fit `(w, h)` inside a `span x span` square, keeping aspect ratio.
pub fn fit_in_square(w: u32, h: u32, span: u32) -> (u32, u32) {
    if w == 0 || h == 0 || span == 0 {
        return (0, 0);
    }
    let (w64, h64, s) = (w as u64, h as u64, span as u64);
    if w > h {
        (span, ((h64 * s / w64) as u32).max(1))
    } else {
        (((w64 * s / h64) as u32).max(1), span)
    }
}

/// Side of the square an overlay may occupy in a `w x h` surface.
pub fn overlay_span(kind: OverlayKind, w: u32, h: u32) -> u32 {
    match kind {
        OverlayKind::Static => w.min(h) / 3,
        OverlayKind::Animated => w.min(h) / 2,
    }
}

/// Scaled overlay kept from the previous tick.
struct ScaledOverlay {
    id: (u64, usize),
    size: (u32, u32),
    image: RgbaImage,
}

pub struct Compositor {
    filter: FilterType,
    cache: Option<ScaledOverlay>,
}

impl Compositor {
    pub fn new() -> Self {
        Self { filter: FilterType::Triangle, cache: None }
    }

    /// Draw `overlay` onto `frame` and pack the result into `out`.
    /// Visual: the reaction sits in the top-right corner of the live feed, fully opaque
    /// where the picture is opaque; `out` is exactly what the window shows next.
    pub fn compose(
        &mut self,
        mut frame: RgbaImage,
        overlay: Option<RenderableOverlay<'_>>,
        out: &mut FrameBuffer,
    ) {
        if let Some(overlay) = overlay {
            let (w, h) = frame.dimensions();
            let span = overlay_span(overlay.kind, w, h);
            let (ow, oh) = overlay.image.dimensions();
            let size = fit_in_square(ow, oh, span);

            if size.0 > 0 && size.1 > 0 {
                let scaled = self.scaled(overlay, size);
                // Flush with the top-right corner.
                let x = w as i64 - size.0 as i64;
                imageops::overlay(&mut frame, scaled, x, 0);
            }
        }
        out.fill_from_rgba(&frame);
    }

    fn scaled(&mut self, overlay: RenderableOverlay<'_>, size: (u32, u32)) -> &RgbaImage {
        if !self.cache.as_ref().is_some_and(|c| c.id == overlay.id && c.size == size) {
            self.cache = None;
        }
        let filter = self.filter;
        let cached = self.cache.get_or_insert_with(|| ScaledOverlay {
            id: overlay.id,
            size,
            image: imageops::resize(overlay.image, size.0, size.1, filter),
        });
        &cached.image
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn camera(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    fn overlay(image: &RgbaImage, kind: OverlayKind) -> RenderableOverlay<'_> {
        RenderableOverlay { image, kind, id: (0, 0) }
    }

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(fit_in_square(200, 100, 60), (60, 30));
        assert_eq!(fit_in_square(100, 400, 60), (15, 60));
        assert_eq!(fit_in_square(50, 50, 60), (60, 60));
        assert_eq!(fit_in_square(1000, 1, 10), (10, 1));
        assert_eq!(fit_in_square(10, 10, 0), (0, 0));
    }

    #[test]
    fn spans_follow_kind() {
        assert_eq!(overlay_span(OverlayKind::Static, 800, 600), 200);
        assert_eq!(overlay_span(OverlayKind::Animated, 800, 600), 300);
    }

    #[test]
    fn static_overlay_lands_top_right() {
        let img = RgbaImage::from_pixel(10, 10, Rgba(RED));
        let mut out = FrameBuffer::new(0, 0);
        Compositor::new().compose(camera(300, 150), Some(overlay(&img, OverlayKind::Static)), &mut out);

        // span = 150 / 3 = 50
        assert_eq!((out.width, out.height), (300, 150));
        assert_eq!(out.get(299, 0), 0xFFFF_0000);
        assert_eq!(out.get(250, 49), 0xFFFF_0000);
        assert_eq!(out.get(249, 0), 0xFF00_0000);
        assert_eq!(out.get(299, 50), 0xFF00_0000);
    }

    #[test]
    fn animated_overlay_uses_half_span_and_keeps_aspect() {
        let img = RgbaImage::from_pixel(20, 10, Rgba(RED));
        let mut out = FrameBuffer::new(0, 0);
        Compositor::new().compose(camera(200, 200), Some(overlay(&img, OverlayKind::Animated)), &mut out);

        // span = 100, fitted to 100x50 in the corner.
        assert_eq!(out.get(100, 0), 0xFFFF_0000);
        assert_eq!(out.get(199, 49), 0xFFFF_0000);
        assert_eq!(out.get(150, 50), 0xFF00_0000);
        assert_eq!(out.get(99, 0), 0xFF00_0000);
    }

    #[test]
    fn transparent_overlay_pixels_show_camera() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 0]));
        let mut out = FrameBuffer::new(0, 0);
        Compositor::new().compose(camera(90, 90), Some(overlay(&img, OverlayKind::Static)), &mut out);
        assert_eq!(out.get(89, 0), 0xFF00_0000);
    }

    #[test]
    fn no_overlay_is_plain_camera() {
        let mut out = FrameBuffer::new(0, 0);
        Compositor::new().compose(camera(4, 3), None, &mut out);
        assert!(out.pixels.iter().all(|&p| p == 0xFF00_0000));
    }

    #[test]
    fn scaled_overlay_is_reused_for_same_id_and_size() {
        let red = RgbaImage::from_pixel(10, 10, Rgba(RED));
        let blue = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]));
        let mut comp = Compositor::new();
        let mut out = FrameBuffer::new(0, 0);

        comp.compose(camera(90, 90), Some(overlay(&red, OverlayKind::Static)), &mut out);
        // Same id: the cached red scale is drawn even though the source changed.
        comp.compose(camera(90, 90), Some(overlay(&blue, OverlayKind::Static)), &mut out);
        assert_eq!(out.get(89, 0), 0xFFFF_0000);

        let blue_overlay = RenderableOverlay { image: &blue, kind: OverlayKind::Static, id: (1, 0) };
        comp.compose(camera(90, 90), Some(blue_overlay), &mut out);
        assert_eq!(out.get(89, 0), 0xFF00_00FF);
    }
}
