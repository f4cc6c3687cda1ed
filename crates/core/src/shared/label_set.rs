use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::DEFAULT_LABELS;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write label file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered class names; a name's position is its class index.
///
/// The index used as the training target, the classifier's output index,
/// and the line number in the label file all refer to the same position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }

    /// One label per line, trailing whitespace stripped, order preserved.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().map(|line| line.trim_end().to_string()).collect())
    }

    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let text = fs::read_to_string(path).map_err(|e| LabelError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&text))
    }

    /// Loads labels, falling back to [`DEFAULT_LABELS`] when the file is absent.
    ///
    /// The fallback can disagree with the model's output width; callers
    /// validate the count before use.
    pub fn load_or_default(path: &Path) -> Result<Self, LabelError> {
        if !path.exists() {
            log::warn!(
                "Label file {} not found, using default labels: {}",
                path.display(),
                DEFAULT_LABELS.join(", ")
            );
            return Ok(Self::defaults());
        }
        Self::load(path)
    }

    /// Writes one name per line, each newline-terminated.
    pub fn save(&self, path: &Path) -> Result<(), LabelError> {
        let write_err = |e| LabelError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_file_contents()).map_err(write_err)
    }

    pub fn to_file_contents(&self) -> String {
        self.names.iter().map(|name| format!("{name}\n")).collect()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
