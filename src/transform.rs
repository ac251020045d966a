// Frame transform pipeline: zoom crop -> aspect-fit crop -> scale to window -> circle mask.
// The two crops are plain integer rectangles so they can be checked without pixels.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::types::{RawFrame, ViewState};

/// Sub-rectangle of a frame, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    #[cfg(test)]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 90° correction for sources that deliver frames rotated against the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Orientation {
    #[default]
    None,
    /// Rotate 90° clockwise.
    Cw,
    /// Rotate 90° counter-clockwise.
    Ccw,
}

/// Centered crop of `W/z x H/z`.
pub fn zoom_crop(width: u32, height: u32, zoom: f32) -> CropRect {
    let zoom = zoom.max(1.0);
    let zw = (width as f32 / zoom) as u32;
    let zh = (height as f32 / zoom) as u32;
    CropRect { x: (width - zw) / 2, y: (height - zh) / 2, width: zw, height: zh }
}

/// Largest centered crop inside `zoomed` whose aspect ratio is `target_w / target_h`.
/// Wide windows keep the full width and trim height; tall ones keep the height and
/// trim width. If the preferred axis does not fit, the other one is trimmed instead.
/// Returns `None` when the result would have no area.
pub fn aspect_fit_crop(zoomed: CropRect, target_w: u32, target_h: u32) -> Option<CropRect> {
    if zoomed.is_empty() || target_w == 0 || target_h == 0 {
        return None;
    }
    let (zw, zh) = (zoomed.width as u64, zoomed.height as u64);
    let (tw, th) = (target_w as u64, target_h as u64);

    let trim_height = || {
        let h = zw * th / tw;
        (h <= zh).then_some((zw, h))
    };
    let trim_width = || {
        let w = zh * tw / th;
        (w <= zw).then_some((w, zh))
    };
    let (w, h) = if tw > th {
        trim_height().or_else(trim_width)?
    } else {
        trim_width().or_else(trim_height)?
    };

    let rect = CropRect {
        x: zoomed.x + ((zw - w) / 2) as u32,
        y: zoomed.y + ((zh - h) / 2) as u32,
        width: w as u32,
        height: h as u32,
    };
    (!rect.is_empty()).then_some(rect)
}

/// Both crops for a `width x height` source shown in a `target` window.
pub fn source_region(width: u32, height: u32, zoom: f32, target: (u32, u32)) -> Option<CropRect> {
    aspect_fit_crop(zoom_crop(width, height, zoom), target.0, target.1)
}

pub fn orient(raw: RawFrame, orientation: Orientation) -> RawFrame {
    match orientation {
        Orientation::None => raw,
        Orientation::Cw => imageops::rotate90(&raw),
        Orientation::Ccw => imageops::rotate270(&raw),
    }
}

/// Turns camera frames into window-sized RGBA images.
pub struct FramePipeline {
    orientation: Orientation,
    filter: FilterType,
}

impl FramePipeline {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation, filter: FilterType::Triangle }
    }

    /// Crop, scale and (in circle-view) mask one frame to exactly `target`.
    /// `None` means the crop was degenerate and the tick should be skipped.
    pub fn transform(
        &self,
        raw: RawFrame,
        view: &ViewState,
        target: (u32, u32),
    ) -> Option<RgbaImage> {
        let raw = orient(raw, self.orientation);
        let (w, h) = raw.dimensions();
        let region = source_region(w, h, view.zoom(), target)?;

        let cropped = imageops::crop_imm(&raw, region.x, region.y, region.width, region.height)
            .to_image();
        let scaled = imageops::resize(&cropped, target.0, target.1, self.filter);
        let mut out = DynamicImage::ImageRgb8(scaled).into_rgba8();

        if view.circle_view {
            apply_circle_mask(&mut out);
        }
        Some(out)
    }
}

/// Make everything outside the centered circle of diameter `min(w, h)` transparent.
/// Visual: the camera shows through a round porthole; the corners let the desktop through
/// when the window supports transparency, and read as black when it does not.
pub fn apply_circle_mask(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    let radius = w.min(h) as f32 / 2.0;
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let r2 = radius * radius;

    for (x, y, px) in img.enumerate_pixels_mut() {
        // Test the pixel center against the circle.
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        if dx * dx + dy * dy > r2 {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn assert_aspect(rect: CropRect, w: u32, h: u32) {
        // Integer crops are floored, so allow one pixel of slack on either side.
        let lhs = rect.width as i64 * h as i64;
        let rhs = rect.height as i64 * w as i64;
        assert!(
            (lhs - rhs).abs() <= w.max(h) as i64,
            "{rect:?} does not match {w}x{h}"
        );
    }

    #[test]
    fn zoom_one_is_full_frame() {
        assert_eq!(zoom_crop(640, 480, 1.0), CropRect { x: 0, y: 0, width: 640, height: 480 });
    }

    #[test]
    fn zoom_five_is_centered_fifth() {
        assert_eq!(zoom_crop(640, 480, 5.0), CropRect { x: 256, y: 192, width: 128, height: 96 });
    }

    #[test]
    fn wide_window_trims_height() {
        // 800x500 at zoom 2: half extent, then height = zoomed_width * 500 / 800.
        let zoomed = zoom_crop(640, 480, 2.0);
        assert_eq!(zoomed, CropRect { x: 160, y: 120, width: 320, height: 240 });
        let fit = aspect_fit_crop(zoomed, 800, 500).unwrap();
        assert_eq!(fit, CropRect { x: 160, y: 140, width: 320, height: 200 });
    }

    #[test]
    fn tall_window_trims_width() {
        let fit = aspect_fit_crop(zoom_crop(640, 480, 1.0), 300, 600).unwrap();
        assert_eq!(fit, CropRect { x: 200, y: 0, width: 240, height: 480 });
    }

    #[test]
    fn nearly_square_wide_window_falls_back_to_width() {
        // 600x590 would need 629 rows from a 480 row frame.
        let fit = aspect_fit_crop(zoom_crop(640, 480, 1.0), 600, 590).unwrap();
        assert_eq!(fit.height, 480);
        assert!(fit.width <= 640);
        assert_aspect(fit, 600, 590);
    }

    #[test]
    fn aspect_matches_and_area_shrinks_with_zoom() {
        let windows = [(800, 500), (500, 500), (300, 900), (1920, 1080), (601, 599), (50, 1)];
        for (w, h) in windows {
            let mut last_area = u64::MAX;
            let mut z = 1.0f32;
            while z <= 5.0 {
                let rect = source_region(640, 480, z, (w, h)).unwrap();
                assert_aspect(rect, w, h);
                assert!(rect.x + rect.width <= 640 && rect.y + rect.height <= 480);
                assert!(rect.area() <= last_area, "area grew at zoom {z} for {w}x{h}");
                last_area = rect.area();
                z += 0.1;
            }
        }
    }

    #[test]
    fn degenerate_sizes_yield_none() {
        assert!(source_region(640, 480, 1.0, (0, 500)).is_none());
        assert!(source_region(640, 480, 1.0, (500, 0)).is_none());
        // Zoom 5 on a 4x4 frame floors to nothing.
        assert!(source_region(4, 4, 5.0, (10, 10)).is_none());
        // Extreme aspect ratio: 1 pixel of width per 1000 rows rounds to 0 columns.
        assert!(source_region(4, 4, 1.0, (1, 1000)).is_none());
        assert!(source_region(0, 0, 1.0, (10, 10)).is_none());
    }

    #[test]
    fn transform_output_matches_window() {
        let raw = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let out = FramePipeline::new(Orientation::None)
            .transform(raw, &ViewState::default(), (800, 500))
            .unwrap();
        assert_eq!(out.dimensions(), (800, 500));
        assert_eq!(out.get_pixel(400, 250).0, [10, 20, 30, 255]);
    }

    #[test]
    fn rotation_swaps_axes_before_cropping() {
        let mut raw = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        raw.put_pixel(0, 0, Rgb([255, 0, 0]));
        let rotated = orient(raw, Orientation::Cw);
        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn circle_mask_clears_outside_radius() {
        let raw = RgbImage::from_pixel(320, 240, Rgb([200, 200, 200]));
        let mut view = ViewState::default();
        view.circle_view = true;
        let (w, h) = (400u32, 200u32);
        let out = FramePipeline::new(Orientation::None).transform(raw, &view, (w, h)).unwrap();

        let r = w.min(h) as f32 / 2.0;
        for (x, y, px) in out.enumerate_pixels() {
            let dx = x as f32 + 0.5 - w as f32 / 2.0;
            let dy = y as f32 + 0.5 - h as f32 / 2.0;
            if (dx * dx + dy * dy).sqrt() > r {
                assert_eq!(px.0[3], 0, "({x},{y}) should be transparent");
            }
        }
        assert_eq!(out.get_pixel(200, 100).0[3], 255);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }
}
