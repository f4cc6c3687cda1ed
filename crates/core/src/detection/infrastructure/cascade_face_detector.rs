//! Haar-cascade face detector backed by OpenCV's `CascadeClassifier`.
use std::path::{Path, PathBuf};

use image::GrayImage;
use opencv::core::{self, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};
use crate::shared::mat_conversion::gray_to_mat;
use crate::shared::region::Region;

/// Sensitivity knobs for multi-scale detection.
///
/// A smaller `scale_factor` scans more pyramid levels (higher recall, more
/// cost); a smaller `min_neighbors` accepts weaker clusters (more false
/// positives). `min_face_size` of 0 leaves the detector's default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeConfig {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_face_size: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_face_size: 0,
        }
    }
}

pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
    config: CascadeConfig,
}

impl CascadeFaceDetector {
    /// Loads a cascade XML file. Fails if the file is missing or unparsable.
    pub fn new(cascade_path: &Path, config: CascadeConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let path = cascade_path
            .to_str()
            .ok_or_else(|| format!("cascade path is not valid UTF-8: {}", cascade_path.display()))?;
        let mut classifier = CascadeClassifier::default()?;
        if !classifier.load(path)? {
            return Err(format!("failed to load cascade from {}", cascade_path.display()).into());
        }
        log::info!("Loaded face cascade from {}", cascade_path.display());
        Ok(Self { classifier, config })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let mat = gray_to_mat(image)?;
        let min = self.config.min_face_size as i32;
        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &mat,
            &mut faces,
            self.config.scale_factor,
            self.config.min_neighbors,
            0,
            Size::new(min, min),
            Size::new(0, 0),
        )?;
        Ok(faces
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}

/// Finds the cascade file: the configured path if it exists, otherwise
/// the same file name under OpenCV's bundled `haarcascades/` data.
pub fn resolve_cascade_path(configured: &Path) -> Option<PathBuf> {
    if configured.exists() {
        return Some(configured.to_path_buf());
    }
    let name = configured.file_name()?.to_str()?;
    let found = core::find_file(&format!("haarcascades/{name}"), false, true).ok()?;
    if found.is_empty() {
        None
    } else {
        Some(PathBuf::from(found))
    }
}
