use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use burn::data::dataset::Dataset;
use image::ImageReader;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::grayscale::rgb_to_gray;
use crate::shared::label_set::LabelSet;
use crate::shared::sample::NormalizedSample;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no class subdirectories in {0}")]
    NoClasses(PathBuf),
    #[error("no decodable images in {0}")]
    NoImages(PathBuf),
    #[error("dataset loading interrupted")]
    Interrupted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledSample {
    pub sample: NormalizedSample,
    pub class_index: usize,
}

/// Images from a `root/<class>/<image>` tree, normalized and indexed
/// against a label set.
#[derive(Debug)]
pub struct ImageDataset {
    labels: LabelSet,
    samples: Vec<LabeledSample>,
    skipped: usize,
}

impl ImageDataset {
    /// Loads a training tree; classes are the subdirectory names sorted
    /// lexicographically. `cancel` is polled between files.
    pub fn load(root: &Path, cancel: &AtomicBool) -> Result<Self, DatasetError> {
        let labels = LabelSet::new(discover_classes(root)?);
        let mut dataset = Self::empty(labels.clone());
        for (index, name) in labels.names().iter().enumerate() {
            dataset.load_class(&root.join(name), name, index, cancel)?;
        }
        dataset.ensure_not_empty(root)?;
        Ok(dataset)
    }

    /// Loads a held-out tree against existing labels. Classes the labels
    /// don't know are skipped with a warning.
    pub fn load_with_labels(
        root: &Path,
        labels: &LabelSet,
        cancel: &AtomicBool,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::empty(labels.clone());
        for name in discover_classes(root)? {
            match labels.index_of(&name) {
                Some(index) => dataset.load_class(&root.join(&name), &name, index, cancel)?,
                None => log::warn!(
                    "Skipping class '{name}' in {}: not present in training data",
                    root.display()
                ),
            }
        }
        dataset.ensure_not_empty(root)?;
        Ok(dataset)
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Number of image files that failed to decode.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Seeded shuffle, then holds out `ceil(len * fraction)` samples for
    /// validation. At least one sample always stays in the training part.
    pub fn split(self, fraction: f64, seed: u64) -> (Self, Self) {
        let mut samples = self.samples;
        let validation = if samples.len() < 2 {
            Vec::new()
        } else {
            samples.shuffle(&mut StdRng::seed_from_u64(seed));
            let held_out =
                ((samples.len() as f64 * fraction).ceil() as usize).clamp(1, samples.len() - 1);
            samples.split_off(samples.len() - held_out)
        };
        let part = |samples| Self {
            labels: self.labels.clone(),
            samples,
            skipped: 0,
        };
        (part(samples), part(validation))
    }

    fn empty(labels: LabelSet) -> Self {
        Self {
            labels,
            samples: Vec::new(),
            skipped: 0,
        }
    }

    fn load_class(
        &mut self,
        dir: &Path,
        name: &str,
        class_index: usize,
        cancel: &AtomicBool,
    ) -> Result<(), DatasetError> {
        let mut files = list_dir(dir)?
            .into_iter()
            .filter(|p| p.is_file() && is_image_file(p))
            .collect::<Vec<_>>();
        files.sort();

        let mut loaded = 0;
        for path in files {
            if cancel.load(Ordering::Relaxed) {
                return Err(DatasetError::Interrupted);
            }
            match load_image(&path) {
                Ok(sample) => {
                    self.samples.push(LabeledSample {
                        sample,
                        class_index,
                    });
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    self.skipped += 1;
                }
            }
        }
        log::info!("Loaded {loaded} images for {name}");
        Ok(())
    }

    fn ensure_not_empty(&self, root: &Path) -> Result<(), DatasetError> {
        if self.samples.is_empty() {
            return Err(DatasetError::NoImages(root.to_path_buf()));
        }
        Ok(())
    }
}

impl Dataset<LabeledSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<LabeledSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Immediate subdirectory names of `root`, sorted.
pub fn discover_classes(root: &Path) -> Result<Vec<String>, DatasetError> {
    if !root.is_dir() {
        return Err(DatasetError::DirectoryNotFound(root.to_path_buf()));
    }
    let mut classes: Vec<String> = list_dir(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    if classes.is_empty() {
        return Err(DatasetError::NoClasses(root.to_path_buf()));
    }
    classes.sort();
    Ok(classes)
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes an image file into a classifier sample. The format is sniffed
/// from the file content, not the extension.
pub fn load_image(path: &Path) -> Result<NormalizedSample, Box<dyn std::error::Error>> {
    let rgb = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8();
    Ok(NormalizedSample::from_gray(&rgb_to_gray(&rgb))?)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let read_err = |e| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };
    fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(read_err))
        .collect()
}
