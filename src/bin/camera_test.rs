// src/bin/camera_test.rs - Capture diagnostic: verifies the camera delivers
// the same 640x480 MJPEG stream the main app requests.
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

/// The exact format the app's camera source asks for.
fn capture_format() -> CameraFormat {
    CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30)
}

/// First CLI argument is the camera index, defaulting to 0.
fn parse_index(args: &[String]) -> u32 {
    args.get(1).and_then(|arg| arg.parse().ok()).unwrap_or(0)
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let index = parse_index(&args);
    tracing::info!(index, "testing camera access");

    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(capture_format()));
    let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
        Ok(camera) => camera,
        Err(e) => {
            tracing::error!("failed to open camera {}: {}", index, e);
            tracing::error!("check that no other app holds the camera and permissions are granted");
            std::process::exit(1);
        }
    };
    tracing::info!("camera opened");

    if let Err(e) = camera.open_stream() {
        tracing::error!("failed to open stream: {}", e);
        std::process::exit(1);
    }
    tracing::info!("stream opened");

    match camera.frame() {
        Ok(frame) => match frame.decode_image::<RgbFormat>() {
            Ok(decoded) => {
                tracing::info!(
                    width = decoded.width(),
                    height = decoded.height(),
                    "frame captured and decoded, camera is usable"
                );
            }
            Err(e) => tracing::error!("captured frame but decode failed: {}", e),
        },
        Err(e) => tracing::error!("failed to capture frame: {}", e),
    }

    let _ = camera.stop_stream();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_defaults_to_zero_and_ignores_garbage() {
        assert_eq!(parse_index(&["camera_test".into()]), 0);
        assert_eq!(parse_index(&["camera_test".into(), "2".into()]), 2);
        assert_eq!(parse_index(&["camera_test".into(), "abc".into()]), 0);
    }

    #[test]
    fn requests_the_app_capture_format() {
        let format = capture_format();
        assert_eq!(format.resolution(), Resolution::new(640, 480));
        assert_eq!(format.format(), FrameFormat::MJPEG);
        assert_eq!(format.frame_rate(), 30);
    }
}
