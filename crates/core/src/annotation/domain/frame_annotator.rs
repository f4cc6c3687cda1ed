use crate::shared::face_label::FaceLabel;
use crate::shared::frame::Frame;

/// Draws classification results onto a frame in place.
pub trait FrameAnnotator: Send {
    /// Draws one rectangle and one text label per face. An empty slice
    /// leaves the frame untouched.
    fn annotate(&self, frame: &mut Frame, faces: &[FaceLabel]) -> Result<(), Box<dyn std::error::Error>>;
}
