// Core types shared by the pipeline, the scheduler and the render loop.

use image::RgbImage;

/// One camera frame as captured (RGB). Owned by the current tick only.
pub type RawFrame = RgbImage;

pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;

pub const OPACITY_MIN: f32 = 0.1;
pub const OPACITY_MAX: f32 = 1.0;
pub const OPACITY_STEP: f32 = 0.1;

/// The buffer minifb presents: one u32 per pixel, 0xAARRGGBB.
/// Alpha is 0 outside the circle in circle-view, 0xFF everywhere else.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Repack an RGBA image into this buffer, reusing the allocation.
    pub fn fill_from_rgba(&mut self, img: &image::RgbaImage) {
        let (w, h) = img.dimensions();
        self.width = w as usize;
        self.height = h as usize;
        self.pixels.clear();
        self.pixels.reserve(self.width * self.height);
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            self.pixels
                .push(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// Interaction state. Only the input dispatcher mutates it; every setter clamps.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    zoom: f32,
    opacity: f32,
    pub circle_view: bool,
    pub frame_visible: bool,
    pub always_on_top: bool,
    pub fullscreen: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: ZOOM_MIN,
            opacity: OPACITY_MAX,
            circle_view: false,
            frame_visible: true,
            always_on_top: false,
            fullscreen: false,
        }
    }
}

impl ViewState {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_nan() { ZOOM_MIN } else { zoom.clamp(ZOOM_MIN, ZOOM_MAX) };
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity =
            if opacity.is_nan() { OPACITY_MAX } else { opacity.clamp(OPACITY_MIN, OPACITY_MAX) };
    }

    pub fn opacity_by(&mut self, delta: f32) {
        self.set_opacity(self.opacity + delta);
    }
}
