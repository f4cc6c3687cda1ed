use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::shared::frame::Frame;
use crate::shared::mat_conversion::mat_to_frame;
use crate::video::domain::frame_source::FrameSource;

/// Webcam capture through OpenCV's `VideoCapture`.
pub struct OpenCvCamera {
    index: i32,
    capture: Option<VideoCapture>,
    frames_read: usize,
}

impl OpenCvCamera {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            capture: None,
            frames_read: 0,
        }
    }
}

impl FrameSource for OpenCvCamera {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let capture = VideoCapture::new(self.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("failed to open camera {}", self.index).into());
        }
        log::info!("Opened camera {}", self.index);
        self.capture = Some(capture);
        self.frames_read = 0;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let capture = self.capture.as_mut().ok_or("camera is not open")?;
        let mut mat = Mat::default();
        let grabbed = capture.read(&mut mat)?;
        check_grab(grabbed, &mat, self.index)?;
        let frame = mat_to_frame(&mat, self.frames_read)?;
        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Failed to release camera {}: {e}", self.index);
            }
        }
    }
}

/// A live device has no end of stream, so an empty grab is a failure.
fn check_grab(grabbed: bool, mat: &Mat, index: i32) -> Result<(), Box<dyn std::error::Error>> {
    if !grabbed || mat.empty() {
        return Err(format!("failed to grab frame from camera {index}").into());
    }
    Ok(())
}
