// Opens a camera and converts frames into a buffer suitable for the compositor.
// When the source manager calls `next_frame()`, you get a FrameBuffer where
// each pixel is 0x00RRGGBB, at whatever resolution the camera delivers.

use crate::config::CameraConfig;
use crate::error::Error;
use crate::types::{FrameBuffer, pack_rgb};

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// A live video source the background can be fed from.
pub trait CameraFeed {
    /// Block until the next frame is ready and return it.
    fn next_frame(&mut self) -> Result<FrameBuffer, Error>;

    /// Stop streaming and hand the device back to the OS.
    fn release(&mut self);
}

// A small wrapper around nokhwa::Camera so the source manager stays clean.
pub struct CameraCapture {
    cam: Camera,
    streaming: bool,
}

impl CameraCapture {
    /// Open the configured camera at a target resolution (falls back if not exact).
    /// On success we hold an open stream; nothing is drawn yet.
    pub fn open(cfg: &CameraConfig) -> Result<Self, Error> {
        let idx = CameraIndex::Index(cfg.index);

        let fmt = CameraFormat::new(
            Resolution::new(cfg.width, cfg.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            cfg.fps,
        );

        // Ask for RGB frames, as close as possible to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        // This fails when no device exists or permission is denied.
        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!(
            "camera {} streaming at {}x{}",
            cfg.index,
            actual.width(),
            actual.height()
        );

        Ok(Self { cam, streaming: true })
    }
}

impl CameraFeed for CameraCapture {
    fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        if !self.streaming {
            return Err(Error::CameraFrame("stream already released".into()));
        }

        // Pull a frame from the camera (this blocks until a new frame is ready).
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // Decode to an ImageBuffer<Rgb<u8>, Vec<u8>> (handles various raw formats safely).
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();

        Ok(FrameBuffer { width: w as usize, height: h as usize, pixels })
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("stopping camera stream: {e}");
        } else {
            log::info!("camera released");
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}
