use image::GrayImage;

use crate::shared::region::Region;

/// Domain interface for face detection on a grayscale frame.
///
/// Implementations may keep scratch state between calls, hence `&mut self`.
/// Returned order is implementation-defined and overlapping rectangles are
/// passed through as independent faces.
pub trait FaceDetector: Send {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
