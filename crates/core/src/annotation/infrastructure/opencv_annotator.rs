use opencv::core::{Point, Rect, Scalar};
use opencv::imgproc;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::constants::LABEL_OFFSET_Y;
use crate::shared::face_label::FaceLabel;
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::{copy_mat_into_frame, frame_to_mat};

/// Colors are BGR.
const BOX_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const TEXT_COLOR: (f64, f64, f64) = (36.0, 255.0, 12.0);
const LINE_THICKNESS: i32 = 2;
const FONT_SCALE: f64 = 0.9;

/// Green box around each face with its label just above the top-left corner.
#[derive(Default)]
pub struct OpenCvAnnotator;

impl OpenCvAnnotator {
    pub fn new() -> Self {
        Self
    }
}

impl FrameAnnotator for OpenCvAnnotator {
    fn annotate(&self, frame: &mut Frame, faces: &[FaceLabel]) -> Result<(), Box<dyn std::error::Error>> {
        if faces.is_empty() {
            return Ok(());
        }
        let mut mat = frame_to_mat(frame)?;
        for face in faces {
            let r = face.region;
            imgproc::rectangle(
                &mut mat,
                Rect::new(r.x, r.y, r.width, r.height),
                scalar(BOX_COLOR),
                LINE_THICKNESS,
                imgproc::LINE_8,
                0,
            )?;
            imgproc::put_text(
                &mut mat,
                &face.label,
                Point::new(r.x, r.y - LABEL_OFFSET_Y),
                imgproc::FONT_HERSHEY_SIMPLEX,
                FONT_SCALE,
                scalar(TEXT_COLOR),
                LINE_THICKNESS,
                imgproc::LINE_8,
                false,
            )?;
        }
        copy_mat_into_frame(&mat, frame)
    }
}

fn scalar((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::Region;

    fn black_frame() -> Frame {
        Frame::new(vec![0; 120 * 100 * 3], 120, 100, 3, 0)
    }

    #[test]
    fn test_no_faces_leaves_frame_untouched() {
        let mut frame = black_frame();
        OpenCvAnnotator::new().annotate(&mut frame, &[]).unwrap();
        assert_eq!(frame, black_frame());
    }

    #[test]
    fn test_box_drawn_in_green() {
        let mut frame = black_frame();
        let face = FaceLabel::new(Region::new(30, 40, 50, 40), "happy");
        OpenCvAnnotator::new().annotate(&mut frame, &[face]).unwrap();

        // Top edge of the rectangle at (x=50, y=40).
        let pixel = frame.as_ndarray();
        assert_eq!(
            [pixel[[40, 50, 0]], pixel[[40, 50, 1]], pixel[[40, 50, 2]]],
            [0, 255, 0]
        );
        // Interior stays untouched.
        assert_eq!(pixel[[60, 55, 1]], 0);
    }

    #[test]
    fn test_every_face_gets_its_own_box() {
        let mut frame = black_frame();
        let faces = [
            FaceLabel::new(Region::new(5, 20, 30, 25), "sad"),
            FaceLabel::new(Region::new(45, 30, 30, 25), "neutral"),
            FaceLabel::error(Region::new(85, 40, 30, 25)),
        ];
        OpenCvAnnotator::new().annotate(&mut frame, &faces).unwrap();

        let pixel = frame.as_ndarray();
        for face in &faces {
            let (row, col) = (face.region.y as usize, face.region.x as usize + 15);
            assert_eq!(
                [pixel[[row, col, 0]], pixel[[row, col, 1]], pixel[[row, col, 2]]],
                [0, 255, 0],
                "top edge of {:?}",
                face.region
            );
            assert_eq!(pixel[[row + 12, col, 1]], 0);
        }
    }

    #[test]
    fn test_label_near_top_edge_does_not_fail() {
        let mut frame = black_frame();
        let face = FaceLabel::error(Region::new(0, 0, 30, 30));
        assert!(OpenCvAnnotator::new().annotate(&mut frame, &[face]).is_ok());
    }
}
