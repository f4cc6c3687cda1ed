use super::constants::ERROR_LABEL;
use super::region::Region;

/// Outcome for one detected face: where it is and what it was classified as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceLabel {
    pub region: Region,
    pub label: String,
}

impl FaceLabel {
    pub fn new(region: Region, label: impl Into<String>) -> Self {
        Self {
            region,
            label: label.into(),
        }
    }

    pub fn error(region: Region) -> Self {
        Self::new(region, ERROR_LABEL)
    }

    pub fn is_error(&self) -> bool {
        self.label == ERROR_LABEL
    }
}
