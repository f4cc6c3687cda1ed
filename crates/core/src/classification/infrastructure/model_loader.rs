use std::path::PathBuf;

use burn::config::Config;
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use thiserror::Error;

use crate::classification::domain::classifier_context::ClassifierContext;
use crate::classification::domain::emotion_classifier::{ClassifyError, EmotionClassifier};
use crate::classification::infrastructure::burn_emotion_classifier::{
    BurnEmotionClassifier, InferenceBackend,
};
use crate::classification::infrastructure::emotion_cnn::EmotionCnnConfig;
use crate::shared::artifact_paths::ArtifactPaths;
use crate::shared::label_set::{LabelError, LabelSet};
use crate::shared::sample::NormalizedSample;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model weights not found: {0}")]
    ModelNotFound(PathBuf),
    #[error("model config not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("invalid model config {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("failed to load model weights {path}: {message}")]
    Record { path: PathBuf, message: String },
    #[error(transparent)]
    Labels(#[from] LabelError),
    #[error("label file lists {labels} classes but the model outputs {outputs}")]
    LabelCountMismatch { labels: usize, outputs: usize },
    #[error("model failed a probe inference: {0}")]
    Probe(String),
    #[error(transparent)]
    Context(#[from] ClassifyError),
}

/// Loads the trained model and its labels into a ready classifier context.
///
/// A missing label file falls back to the default labels; every other
/// failure is fatal. The model is probed once with a mid-gray sample so a
/// broken record surfaces at startup rather than on the first face.
pub fn load_context(paths: &ArtifactPaths) -> Result<ClassifierContext, ModelLoadError> {
    let record_path = paths.model_record();
    if !record_path.is_file() {
        return Err(ModelLoadError::ModelNotFound(record_path));
    }
    let config_path = paths.model_config();
    if !config_path.is_file() {
        return Err(ModelLoadError::ConfigNotFound(config_path));
    }

    let config = EmotionCnnConfig::load(&config_path).map_err(|e| ModelLoadError::Config {
        path: config_path.clone(),
        message: e.to_string(),
    })?;

    let device = Default::default();
    let model = config
        .init::<InferenceBackend>(&device)
        .load_file(
            record_path.clone(),
            &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
            &device,
        )
        .map_err(|e| ModelLoadError::Record {
            path: record_path.clone(),
            message: e.to_string(),
        })?;
    log::info!(
        "Loaded emotion model from {} ({} classes)",
        record_path.display(),
        config.num_classes
    );

    let labels = LabelSet::load_or_default(paths.labels())?;
    if labels.len() != config.num_classes {
        return Err(ModelLoadError::LabelCountMismatch {
            labels: labels.len(),
            outputs: config.num_classes,
        });
    }
    let classifier = BurnEmotionClassifier::new(model, device, config.num_classes);
    classifier
        .predict(&NormalizedSample::filled(0.5))
        .map_err(|e| ModelLoadError::Probe(e.to_string()))?;

    Ok(ClassifierContext::new(Box::new(classifier), labels)?)
}
