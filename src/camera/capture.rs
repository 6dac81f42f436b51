//! Live camera input through OpenCV.

use image::RgbImage;
use opencv::core::{Mat, Vec3b};
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use super::{CameraError, FrameSource};

/// Camera device opened by index.
pub struct VideoCaptureSource {
    device: i32,
    capture: Option<VideoCapture>,
}

impl VideoCaptureSource {
    pub fn new(device: i32) -> Self {
        Self {
            device,
            capture: None,
        }
    }

    fn to_rgb(frame: &Mat) -> Result<RgbImage, opencv::Error> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let mut image = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let px = rgb.at_2d::<Vec3b>(y as i32, x as i32)?;
                image.put_pixel(x, y, image::Rgb([px[0], px[1], px[2]]));
            }
        }
        Ok(image)
    }
}

impl FrameSource for VideoCaptureSource {
    fn open(&mut self) -> Result<(), CameraError> {
        let capture = VideoCapture::new(self.device, videoio::CAP_ANY)
            .map_err(|e| CameraError::Backend(e.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|e| CameraError::Backend(e.to_string()))?;
        if !opened {
            return Err(CameraError::DeviceUnavailable(self.device));
        }
        log::info!("Opened camera device {}", self.device);
        self.capture = Some(capture);
        Ok(())
    }

    fn read(&mut self) -> Option<RgbImage> {
        let capture = self.capture.as_mut()?;
        let mut frame = Mat::default();
        match capture.read(&mut frame) {
            Ok(true) if !frame.empty() => match Self::to_rgb(&frame) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Frame conversion failed: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                log::warn!("Camera read failed: {}", e);
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Camera release failed: {}", e);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.capture.is_some()
    }
}
