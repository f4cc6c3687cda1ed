use opencv::highgui;

use crate::shared::constants::QUIT_KEY;
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::frame_to_mat;
use crate::video::domain::frame_display::FrameDisplay;

/// A single auto-sized HighGUI window.
pub struct OpenCvWindow {
    title: String,
    created: bool,
}

impl OpenCvWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created: false,
        }
    }
}

impl FrameDisplay for OpenCvWindow {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.created {
            highgui::named_window(&self.title, highgui::WINDOW_AUTOSIZE)?;
            self.created = true;
        }
        highgui::imshow(&self.title, &frame_to_mat(frame)?)?;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let key = highgui::wait_key(1)?;
        Ok(key >= 0 && (key & 0xFF) == QUIT_KEY as i32)
    }

    fn close(&mut self) {
        if self.created {
            if let Err(e) = highgui::destroy_window(&self.title) {
                log::warn!("Failed to close window '{}': {e}", self.title);
            }
            self.created = false;
        }
    }
}
