// Background source: live camera or a still photo, never both.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{CameraCapture, CameraFeed};
use crate::config::CameraConfig;
use crate::error::Error;
use crate::types::FrameBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Live camera stream.
    #[default]
    Camera,
    /// A photo picked from disk.
    Photo,
}

/// Photo extensions offered by the open dialog.
const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "gif", "tif", "tiff"];

pub type CameraOpener = Box<dyn FnMut() -> Result<Box<dyn CameraFeed>, Error>>;

pub struct SourceManager {
    mode: SourceMode,
    open_camera: CameraOpener,
    camera: Option<Box<dyn CameraFeed>>,
    last_frame: Option<FrameBuffer>,
    photo: Option<FrameBuffer>,
}

impl SourceManager {
    /// Starts in photo mode with no photo (blank background).
    pub fn new(open_camera: CameraOpener) -> Self {
        Self { mode: SourceMode::Photo, open_camera, camera: None, last_frame: None, photo: None }
    }

    /// Manager backed by a real nokhwa camera.
    pub fn with_camera_config(cfg: CameraConfig) -> Self {
        Self::new(Box::new(move || {
            CameraCapture::open(&cfg).map(|c| Box::new(c) as Box<dyn CameraFeed>)
        }))
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_some()
    }

    /// The pixels the compositor should stretch over the surface, if any.
    pub fn background(&self) -> Option<&FrameBuffer> {
        match self.mode {
            SourceMode::Camera => self.last_frame.as_ref(),
            SourceMode::Photo => self.photo.as_ref(),
        }
    }

    /// Switch background mode. Returns true when the background changed.
    pub fn set_mode(&mut self, mode: SourceMode) -> bool {
        match mode {
            SourceMode::Camera => {
                if self.mode == SourceMode::Camera && self.camera.is_some() {
                    return false;
                }
                self.mode = SourceMode::Camera;
                self.last_frame = None;
                match (self.open_camera)() {
                    Ok(cam) => {
                        log::info!("switched to camera");
                        self.camera = Some(cam);
                    }
                    // No fallback: the background just stays blank.
                    Err(e) => log::warn!("camera unavailable: {e}"),
                }
                true
            }
            SourceMode::Photo => {
                if self.mode == SourceMode::Photo {
                    return false;
                }
                self.release_camera();
                self.mode = SourceMode::Photo;
                log::info!("switched to photo");
                true
            }
        }
    }

    /// Decode `path` and make it the background. On failure the current
    /// background is left as it was.
    pub fn load_photo(&mut self, path: &Path) -> Result<(), Error> {
        let img = image::open(path)
            .map_err(|e| Error::Decode { path: path.to_path_buf(), source: e })?
            .to_rgba8();
        let fb = FrameBuffer::from_rgba(&img);
        log::info!("loaded photo {} ({}x{})", path.display(), fb.width, fb.height);

        self.release_camera();
        self.photo = Some(fb);
        self.mode = SourceMode::Photo;
        Ok(())
    }

    /// Ask the user for a photo. `Ok(false)` means the dialog was cancelled.
    pub fn pick_photo(&mut self) -> Result<bool, Error> {
        let picked = rfd::FileDialog::new()
            .set_title("Choose a body photo")
            .add_filter("Images", PHOTO_EXTENSIONS)
            .pick_file();
        match picked {
            Some(path) => self.load_photo(&path).map(|_| true),
            None => Ok(false),
        }
    }

    /// Fetch the next camera frame. Returns true when a new frame arrived.
    pub fn poll(&mut self) -> bool {
        if self.mode != SourceMode::Camera {
            return false;
        }
        let Some(cam) = self.camera.as_mut() else {
            return false;
        };
        match cam.next_frame() {
            Ok(frame) => {
                self.last_frame = Some(frame);
                true
            }
            // Keep showing the previous frame.
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut cam) = self.camera.take() {
            cam.release();
        }
        self.last_frame = None;
    }
}

impl Drop for SourceManager {
    fn drop(&mut self) {
        self.release_camera();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeCamera {
        releases: Rc<Cell<u32>>,
        color: u32,
    }

    impl CameraFeed for FakeCamera {
        fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
            let mut fb = FrameBuffer::new(4, 3);
            fb.fill(self.color);
            Ok(fb)
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    fn manager_with_fake(releases: Rc<Cell<u32>>) -> SourceManager {
        SourceManager::new(Box::new(move || {
            Ok(Box::new(FakeCamera { releases: releases.clone(), color: 0x00_12_34_56 }) as Box<dyn CameraFeed>)
        }))
    }

    fn write_photo(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("body.png");
        RgbaImage::from_pixel(8, 6, Rgba([200, 150, 120, 255])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_photo_upload_releases_camera_exactly_once() {
        let releases = Rc::new(Cell::new(0));
        let mut mgr = manager_with_fake(releases.clone());
        assert!(mgr.set_mode(SourceMode::Camera));
        assert!(mgr.poll());
        assert_eq!(mgr.background().unwrap().pixels[0], 0x00_12_34_56);

        let dir = tempfile::tempdir().unwrap();
        mgr.load_photo(&write_photo(dir.path())).unwrap();

        assert_eq!(releases.get(), 1);
        assert_eq!(mgr.mode(), SourceMode::Photo);
        let bg = mgr.background().unwrap();
        assert_eq!((bg.width, bg.height), (8, 6));
        assert_eq!(bg.pixels[0], 0x00_C8_96_78);

        mgr.set_mode(SourceMode::Photo);
        drop(mgr);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_drop_releases_active_camera() {
        let releases = Rc::new(Cell::new(0));
        let mut mgr = manager_with_fake(releases.clone());
        mgr.set_mode(SourceMode::Camera);
        assert!(mgr.camera_active());
        drop(mgr);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_switching_to_photo_mode_releases_camera() {
        let releases = Rc::new(Cell::new(0));
        let mut mgr = manager_with_fake(releases.clone());
        mgr.set_mode(SourceMode::Camera);
        assert!(mgr.camera_active());
        mgr.set_mode(SourceMode::Photo);
        assert!(!mgr.camera_active());
        assert_eq!(releases.get(), 1);
        assert!(mgr.background().is_none());
    }

    #[test]
    fn test_camera_failure_leaves_blank_background() {
        let mut mgr = SourceManager::new(Box::new(|| -> Result<Box<dyn CameraFeed>, Error> {
            Err(Error::CameraInit("no device".into()))
        }));
        assert!(mgr.set_mode(SourceMode::Camera));
        assert_eq!(mgr.mode(), SourceMode::Camera);
        assert!(!mgr.poll());
        assert!(mgr.background().is_none());
    }

    #[test]
    fn test_bad_photo_keeps_current_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager_with_fake(Rc::new(Cell::new(0)));
        mgr.load_photo(&write_photo(dir.path())).unwrap();

        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not a png").unwrap();
        let err = mgr.load_photo(&junk).unwrap_err();

        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(mgr.background().unwrap().width, 8);
    }

    #[test]
    fn test_poll_in_photo_mode_does_nothing() {
        let mut mgr = manager_with_fake(Rc::new(Cell::new(0)));
        assert!(!mgr.poll());
    }
}
