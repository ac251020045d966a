// Opens the camera once at startup and hands out RGB frames, one per tick.

use crate::error::Error;
use crate::types::RawFrame;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};
use tracing::info;

/// Anything that yields camera frames. A failed read ends the render loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<RawFrame, Error>;
}

// A small wrapper around nokhwa::Camera so the render loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution and start streaming.
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            fps,
        );

        // Ask for RGB frames, closest to what we requested.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        info!(
            camera = %cam.info().human_name(),
            width = actual.width(),
            height = actual.height(),
            "camera stream open"
        );

        Ok(Self { cam, width: actual.width(), height: actual.height() })
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for CameraCapture {
    /// Blocks until the camera has a new frame, then decodes it to RGB.
    fn next_frame(&mut self) -> Result<RawFrame, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        // Release the device; errors here have nowhere useful to go.
        if let Err(e) = self.cam.stop_stream() {
            tracing::warn!("stopping camera stream: {e}");
        }
    }
}
