use crate::shared::frame::Frame;

/// Shows annotated frames and reports whether the user asked to stop.
pub trait FrameDisplay: Send {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Polls for input; `true` once the quit key has been pressed.
    fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>>;

    fn close(&mut self);
}
