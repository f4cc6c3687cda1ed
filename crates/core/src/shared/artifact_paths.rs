use std::path::{Path, PathBuf};

/// Locations of the files the trainer writes and the live classifier reads.
///
/// Resolved once at startup and passed by reference; nothing below the
/// binaries builds paths from literals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    model: PathBuf,
    labels: PathBuf,
}

impl ArtifactPaths {
    pub fn new(model: impl Into<PathBuf>, labels: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            labels: labels.into(),
        }
    }

    /// Path as configured; the recorder forces the `.mpk` extension.
    pub fn model(&self) -> &Path {
        &self.model
    }

    /// The weights file as it exists on disk.
    pub fn model_record(&self) -> PathBuf {
        self.model.with_extension("mpk")
    }

    /// Model hyper-parameters (output width, dropout) stored beside the weights.
    pub fn model_config(&self) -> PathBuf {
        self.model.with_extension("json")
    }

    pub fn training_report(&self) -> PathBuf {
        self.model.with_extension("report.json")
    }

    pub fn labels(&self) -> &Path {
        &self.labels
    }
}
