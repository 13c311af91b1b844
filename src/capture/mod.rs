//! Webcam Capture Module
//!
//! Grabs a single frame and persists it under `<home>/webcam_images/`
//! with a uniquely timestamped filename. The camera itself sits behind
//! the [`FrameSource`] trait; the real device implementation (one
//! exclusive open -> grab -> close per call, no session reuse) needs the
//! `camera` feature and a platform camera backend.

use std::path::PathBuf;

use chrono::Utc;
use image::RgbImage;

use crate::error::Result;
use crate::paths;

/// Anything that can produce one RGB frame.
pub trait FrameSource {
    fn grab(&mut self) -> Result<RgbImage>;
}

/// Grab one frame from the source and persist it.
pub fn capture_from(source: &mut impl FrameSource) -> Result<PathBuf> {
    let frame = source.grab()?;
    save_frame(&frame)
}

/// Write a frame to `<home>/webcam_images/webcam_<timestamp>.jpg`.
/// Filenames carry microseconds; on a collision a counter is appended so
/// consecutive captures never overwrite each other.
pub fn save_frame(frame: &RgbImage) -> Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string();
    let mut path = paths::webcam_image_path(&format!("webcam_{stamp}.jpg"))?;

    let mut attempt = 0u32;
    while path.exists() {
        attempt += 1;
        path = paths::webcam_image_path(&format!("webcam_{stamp}_{attempt}.jpg"))?;
    }

    frame.save(&path)?;
    log::info!("Saved webcam frame to {}", path.display());
    Ok(path)
}

// ============================================================================
// WEBCAM (feature-gated)
// ============================================================================

#[cfg(feature = "camera")]
mod webcam {
    use image::RgbImage;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
    use nokhwa::Camera;

    use super::FrameSource;
    use crate::error::{LearnError, Result};

    /// One physical camera device. Holding the struct keeps the device
    /// open; the block API opens and closes per capture.
    pub struct Webcam {
        camera: Camera,
        index: u32,
    }

    impl Webcam {
        pub fn open(device_index: u32) -> Result<Self> {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
            let mut camera = Camera::new(CameraIndex::Index(device_index), requested)
                .map_err(|e| {
                    LearnError::Camera(format!("cannot open camera {device_index}: {e}"))
                })?;
            camera.open_stream().map_err(|e| {
                LearnError::Camera(format!("cannot start camera {device_index}: {e}"))
            })?;
            Ok(Self {
                camera,
                index: device_index,
            })
        }
    }

    impl FrameSource for Webcam {
        fn grab(&mut self) -> Result<RgbImage> {
            let frame = self.camera.frame().map_err(|e| {
                LearnError::Camera(format!("no frame from camera {}: {e}", self.index))
            })?;
            frame.decode_image::<RgbFormat>().map_err(|e| {
                LearnError::Camera(format!("cannot decode frame from camera {}: {e}", self.index))
            })
        }
    }

    impl Drop for Webcam {
        fn drop(&mut self) {
            let _ = self.camera.stop_stream();
        }
    }

    /// Open the device, grab exactly one frame, close the device, and
    /// persist the frame.
    pub fn capture_webcam_image(device_index: u32) -> Result<std::path::PathBuf> {
        let mut webcam = Webcam::open(device_index)?;
        super::capture_from(&mut webcam)
    }
}

#[cfg(feature = "camera")]
pub use webcam::{capture_webcam_image, Webcam};

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LearnError;
    use crate::testutil::with_temp_home;

    struct FakeCamera {
        frames: Vec<RgbImage>,
    }

    impl FrameSource for FakeCamera {
        fn grab(&mut self) -> Result<RgbImage> {
            self.frames
                .pop()
                .ok_or_else(|| LearnError::Camera("no frame returned".to_string()))
        }
    }

    fn frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
    }

    #[test]
    fn test_capture_writes_decodable_jpeg() {
        with_temp_home(|home| {
            let mut camera = FakeCamera {
                frames: vec![frame(32, 24)],
            };
            let path = capture_from(&mut camera).unwrap();

            assert!(path.starts_with(home.join("webcam_images")));
            let reloaded = image::open(&path).unwrap();
            assert_eq!(reloaded.width(), 32);
            assert_eq!(reloaded.height(), 24);
        });
    }

    #[test]
    fn test_consecutive_captures_get_distinct_names() {
        with_temp_home(|_home| {
            let first = save_frame(&frame(8, 8)).unwrap();
            let second = save_frame(&frame(8, 8)).unwrap();
            assert_ne!(first, second);
            assert!(first.exists() && second.exists());
        });
    }

    #[test]
    fn test_exhausted_source_surfaces_camera_error() {
        with_temp_home(|_home| {
            let mut camera = FakeCamera { frames: vec![] };
            let err = capture_from(&mut camera).unwrap_err();
            assert!(matches!(err, LearnError::Camera(_)));
        });
    }
}
