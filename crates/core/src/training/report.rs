use std::path::Path;

use serde::{Deserialize, Serialize};

/// Where the validation samples came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSource {
    TestDirectory,
    Split,
    None,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub validation_loss: Option<f64>,
    pub validation_accuracy: Option<f64>,
}

/// Summary of a finished training run, written as JSON beside the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub class_names: Vec<String>,
    pub train_samples: usize,
    pub validation_samples: usize,
    pub skipped_images: usize,
    pub validation_source: ValidationSource,
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingReport {
    pub fn final_epoch(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> TrainingReport {
        TrainingReport {
            class_names: vec!["angry".into(), "happy".into()],
            train_samples: 8,
            validation_samples: 2,
            skipped_images: 1,
            validation_source: ValidationSource::Split,
            epochs: vec![
                EpochMetrics {
                    epoch: 1,
                    train_loss: 0.9,
                    train_accuracy: 0.5,
                    validation_loss: Some(0.8),
                    validation_accuracy: Some(0.5),
                },
                EpochMetrics {
                    epoch: 2,
                    train_loss: 0.6,
                    train_accuracy: 0.75,
                    validation_loss: None,
                    validation_accuracy: None,
                },
            ],
        }
    }

    #[test]
    fn test_final_epoch_is_last() {
        assert_eq!(report().final_epoch().map(|m| m.epoch), Some(2));
    }

    #[test]
    fn test_saved_report_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.report.json");
        report().save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"validation_source\": \"split\""));
        assert_eq!(TrainingReport::load(&path).unwrap(), report());
    }
}
