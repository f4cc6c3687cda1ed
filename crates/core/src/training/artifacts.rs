use std::fs;
use std::path::Path;

use burn::config::Config;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;

use crate::classification::infrastructure::emotion_cnn::{EmotionCnn, EmotionCnnConfig};
use crate::shared::artifact_paths::ArtifactPaths;
use crate::shared::label_set::LabelSet;
use crate::training::report::TrainingReport;
use crate::training::trainer::TrainError;

/// Writes the weights record and the config that rebuilds the network.
pub fn save_model<B: Backend>(
    model: &EmotionCnn<B>,
    config: &EmotionCnnConfig,
    paths: &ArtifactPaths,
) -> Result<(), TrainError> {
    let record_path = paths.model_record();
    ensure_parent(&record_path)?;
    model
        .clone()
        .save_file(
            record_path.clone(),
            &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        )
        .map_err(|e| save_error(&record_path, e))?;

    let config_path = paths.model_config();
    config
        .save(&config_path)
        .map_err(|e| save_error(&config_path, e))?;
    log::info!("Saved model to {}", record_path.display());
    Ok(())
}

/// Model, labels, and report; the label file is written in class-index order.
pub fn save_all<B: Backend>(
    model: &EmotionCnn<B>,
    config: &EmotionCnnConfig,
    labels: &LabelSet,
    report: &TrainingReport,
    paths: &ArtifactPaths,
) -> Result<(), TrainError> {
    save_model(model, config, paths)?;
    labels.save(paths.labels())?;
    log::info!("Saved {} labels to {}", labels.len(), paths.labels().display());

    let report_path = paths.training_report();
    report
        .save(&report_path)
        .map_err(|e| save_error(&report_path, e))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), TrainError> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| save_error(parent, e)),
        None => Ok(()),
    }
}

fn save_error(path: &Path, error: impl std::fmt::Display) -> TrainError {
    TrainError::Save {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::report::ValidationSource;
    use burn::backend::NdArray;

    #[test]
    fn test_save_all_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            dir.path().join("out/model.mpk"),
            dir.path().join("out/labels.txt"),
        );
        let config = EmotionCnnConfig::new(2);
        let model = config.init::<NdArray>(&Default::default());
        let labels = LabelSet::parse("calm\nangry\n");
        let report = TrainingReport {
            class_names: labels.names().to_vec(),
            train_samples: 4,
            validation_samples: 1,
            skipped_images: 0,
            validation_source: ValidationSource::Split,
            epochs: Vec::new(),
        };

        save_all(&model, &config, &labels, &report, &paths).unwrap();

        assert!(paths.model_record().is_file());
        assert!(paths.model_config().is_file());
        assert!(paths.training_report().is_file());
        assert_eq!(
            fs::read_to_string(paths.labels()).unwrap(),
            "calm\nangry\n"
        );
        let saved = EmotionCnnConfig::load(paths.model_config()).unwrap();
        assert_eq!(saved.num_classes, 2);
    }
}
