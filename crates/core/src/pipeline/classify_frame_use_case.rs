use image::imageops;
use image::GrayImage;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::classification::domain::classifier_context::ClassifierContext;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_label::FaceLabel;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::sample::{NormalizedSample, SampleError};

/// Detects, classifies, and annotates the faces in a single frame.
///
/// Failures never abort the frame: a failed detection leaves it
/// unannotated and a failed region is labeled with the error sentinel.
pub struct ClassifyFrameUseCase {
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
}

impl ClassifyFrameUseCase {
    pub fn new(detector: Box<dyn FaceDetector>, annotator: Box<dyn FrameAnnotator>) -> Self {
        Self {
            detector,
            annotator,
        }
    }

    /// Annotates `frame` in place and returns one label per detected region,
    /// in detection order.
    pub fn execute(&mut self, context: &ClassifierContext, frame: &mut Frame) -> Vec<FaceLabel> {
        let gray = frame.to_grayscale();
        let regions = match self.detector.detect(&gray) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!("Face detection failed on frame {}: {e}", frame.index());
                return Vec::new();
            }
        };
        if regions.is_empty() {
            return Vec::new();
        }

        let faces: Vec<FaceLabel> = regions
            .into_iter()
            .map(|region| match classify_region(context, &gray, region) {
                Ok(label) => FaceLabel::new(region, label),
                Err(e) => {
                    log::warn!(
                        "Classification failed for region {region:?} on frame {}: {e}",
                        frame.index()
                    );
                    FaceLabel::error(region)
                }
            })
            .collect();
        log::debug!("Frame {}: {} face(s)", frame.index(), faces.len());

        if let Err(e) = self.annotator.annotate(frame, &faces) {
            log::warn!("Failed to annotate frame {}: {e}", frame.index());
        }
        faces
    }
}

/// Crops `region` from the grayscale frame and classifies it.
fn classify_region(
    context: &ClassifierContext,
    gray: &GrayImage,
    region: Region,
) -> Result<String, Box<dyn std::error::Error>> {
    let (width, height) = gray.dimensions();
    let r = region
        .clamp_to(width, height)
        .ok_or(SampleError::RegionOutsideFrame { width, height })?;
    let crop = imageops::crop_imm(gray, r.x as u32, r.y as u32, r.width as u32, r.height as u32)
        .to_image();
    let sample = NormalizedSample::from_gray(&crop)?;
    Ok(context.classify(&sample)?.to_string())
}
