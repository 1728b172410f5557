use super::DeviceOptions;
use crate::classifier::LeafImage;
use crate::error::{PlantAiError, Result};
use chrono::{DateTime, Local};
use std::io::Cursor;
use std::sync::Arc;

/// Source of live leaf images
pub trait FrameSource: Send + Sync {
    /// Blocks until one frame is captured
    fn capture(&self) -> Result<LeafImage>;
}

/// Wraps a raw RGB frame as a PNG leaf image named after the capture time
pub fn frame_to_image(width: u32, height: u32, rgb: Vec<u8>, taken_at: DateTime<Local>) -> Result<LeafImage> {
    let frame = image::RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        PlantAiError::Camera(format!("frame buffer does not match {}x{}", width, height))
    })?;

    let mut png = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| PlantAiError::ImageLoad(e.to_string()))?;

    let file_name = format!("camera-{}.png", taken_at.format("%Y%m%d-%H%M%S"));
    Ok(LeafImage::from_bytes(file_name, png))
}

#[cfg(feature = "camera")]
pub struct NokhwaCamera {
    index: u32,
}

#[cfg(feature = "camera")]
impl FrameSource for NokhwaCamera {
    fn capture(&self) -> Result<LeafImage> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
        use nokhwa::Camera;

        let camera_error = |e: nokhwa::NokhwaError| PlantAiError::Camera(e.to_string());

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.index), format).map_err(camera_error)?;
        camera.open_stream().map_err(camera_error)?;
        let frame = camera.frame().map_err(camera_error)?;
        if let Err(e) = camera.stop_stream() {
            log::warn!("camera {} did not stop cleanly: {}", self.index, e);
        }

        let decoded = frame.decode_image::<RgbFormat>().map_err(camera_error)?;
        let (width, height) = (decoded.width(), decoded.height());
        frame_to_image(width, height, decoded.into_raw(), Local::now())
    }
}

/// Camera for the session, `None` when built without capture support
#[cfg(feature = "camera")]
pub fn default_camera(options: DeviceOptions) -> Option<Arc<dyn FrameSource>> {
    Some(Arc::new(NokhwaCamera {
        index: options.camera_index,
    }))
}

/// Camera for the session, `None` when built without capture support
#[cfg(not(feature = "camera"))]
pub fn default_camera(_options: DeviceOptions) -> Option<Arc<dyn FrameSource>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frame_to_png_image() {
        let taken_at = Local.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();
        let rgb = vec![0u8, 128, 0].repeat(4 * 3);

        let image = frame_to_image(4, 3, rgb, taken_at).unwrap();
        assert_eq!(image.file_name, "camera-20260314-090500.png");
        assert_eq!(image.mime_type, "image/png");

        let decoded = image.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_frame_size_mismatch() {
        let result = frame_to_image(4, 4, vec![0; 10], Local::now());
        assert!(matches!(result, Err(PlantAiError::Camera(_))));
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn test_no_camera_without_feature() {
        assert!(default_camera(DeviceOptions::default()).is_none());
    }
}
