// src/video.rs - Webcam capture via nokhwa
use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageBuffer};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;

pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    pub fn new(index: u32) -> Result<Self> {
        let format = CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));

        let camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| anyhow!("Failed to open camera {}: {}", index, e))?;

        tracing::info!(index, "camera opened");
        Ok(Self { camera })
    }

    /// Blocking single-frame read, mirrored horizontally so the preview
    /// behaves like a mirror.
    pub fn read_frame(&mut self) -> Result<DynamicImage> {
        if !self.camera.is_stream_open() {
            self.camera
                .open_stream()
                .map_err(|e| anyhow!("Failed to open camera stream: {}", e))?;
        }

        let frame = self
            .camera
            .frame()
            .map_err(|e| anyhow!("Failed to capture frame: {}", e))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| anyhow!("Failed to decode frame: {}", e))?;

        let width = decoded.width();
        let height = decoded.height();
        let rgb_data = decoded.into_vec();

        let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
        for chunk in rgb_data.chunks(3) {
            rgba_data.extend_from_slice(chunk);
            rgba_data.push(255);
        }

        let img = ImageBuffer::from_raw(width, height, rgba_data)
            .ok_or_else(|| anyhow!("Failed to create image buffer"))?;

        let flipped = image::imageops::flip_horizontal(&img);
        Ok(DynamicImage::ImageRgba8(flipped))
    }

    pub fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width(), res.height())
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
        tracing::info!("camera stream stopped");
    }
}
