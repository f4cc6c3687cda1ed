use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use burn::backend::{Autodiff, NdArray};
use burn::config::Config;
use burn::data::dataloader::{DataLoader, DataLoaderBuilder};
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Int, Tensor};
use thiserror::Error;

use crate::classification::infrastructure::emotion_cnn::{EmotionCnn, EmotionCnnConfig};
use crate::shared::artifact_paths::ArtifactPaths;
use crate::shared::label_set::{LabelError, LabelSet};
use crate::training::artifacts;
use crate::training::batcher::{SampleBatch, SampleBatcher};
use crate::training::dataset::{DatasetError, ImageDataset};
use crate::training::report::{EpochMetrics, TrainingReport, ValidationSource};

/// CPU backend with gradient tracking.
pub type TrainingBackend = Autodiff<NdArray>;

type EvalBackend = NdArray;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(DatasetError),
    #[error(transparent)]
    Labels(#[from] LabelError),
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
    #[error("no training samples left after holding out validation data")]
    EmptyTrainingSet,
    #[error("training interrupted")]
    Interrupted,
    #[error("failed to write {path}: {message}")]
    Save { path: PathBuf, message: String },
}

impl From<DatasetError> for TrainError {
    fn from(error: DatasetError) -> Self {
        match error {
            DatasetError::Interrupted => TrainError::Interrupted,
            other => TrainError::Dataset(other),
        }
    }
}

#[derive(Config, Debug)]
pub struct TrainingConfig {
    #[config(default = 10)]
    pub num_epochs: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    /// Fraction held out when no test directory is usable.
    #[config(default = 0.2)]
    pub validation_split: f64,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.num_epochs == 0 {
            return Err(TrainError::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(TrainError::InvalidConfig("batch size must be at least 1".into()));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidConfig("learning rate must be positive".into()));
        }
        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err(TrainError::InvalidConfig(
                "validation split must be between 0 and 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(TrainError::InvalidConfig("dropout must be in [0, 1)".into()));
        }
        Ok(())
    }
}

/// Trains the emotion CNN on a class-per-directory image tree and writes
/// the model, labels, and report.
///
/// `cancel` is polled throughout loading and training, and once more right
/// before saving. Once set, the run stops and nothing is written.
pub struct TrainModelUseCase {
    config: TrainingConfig,
    cancel: Arc<AtomicBool>,
}

impl TrainModelUseCase {
    pub fn new(config: TrainingConfig, cancel: Arc<AtomicBool>) -> Self {
        Self { config, cancel }
    }

    pub fn execute(
        &self,
        train_dir: &Path,
        test_dir: Option<&Path>,
        paths: &ArtifactPaths,
    ) -> Result<TrainingReport, TrainError> {
        self.config.validate()?;

        let dataset = ImageDataset::load(train_dir, &self.cancel)?;
        let labels = dataset.labels().clone();
        let skipped_images = dataset.skipped();
        log::info!(
            "Found {} images in {} classes: {}",
            dataset.len(),
            labels.len(),
            labels.names().join(", ")
        );

        let held_out = match test_dir {
            Some(dir) => self.load_held_out(dir, &labels)?,
            None => None,
        };
        let (train, validation, validation_source) = match held_out {
            Some(validation) => (dataset, validation, ValidationSource::TestDirectory),
            None => {
                let (train, validation) =
                    dataset.split(self.config.validation_split, self.config.seed);
                let source = if validation.is_empty() {
                    ValidationSource::None
                } else {
                    ValidationSource::Split
                };
                (train, validation, source)
            }
        };
        if train.is_empty() {
            return Err(TrainError::EmptyTrainingSet);
        }
        let (train_samples, validation_samples) = (train.len(), validation.len());
        log::info!(
            "Training on {train_samples} samples, validating on {validation_samples} ({validation_source:?})"
        );

        let train_loader: Arc<dyn DataLoader<TrainingBackend, SampleBatch<TrainingBackend>>> =
            DataLoaderBuilder::new(SampleBatcher)
                .batch_size(self.config.batch_size)
                .shuffle(self.config.seed)
                .num_workers(0)
                .build(train);
        let validation_loader: Arc<dyn DataLoader<EvalBackend, SampleBatch<EvalBackend>>> =
            DataLoaderBuilder::new(SampleBatcher)
                .batch_size(self.config.batch_size)
                .num_workers(0)
                .build(validation);

        let model_config = EmotionCnnConfig::new(labels.len()).with_dropout(self.config.dropout);
        let device = Default::default();
        let mut model = model_config.init::<TrainingBackend>(&device);
        let mut optim = AdamConfig::new().init::<TrainingBackend, EmotionCnn<TrainingBackend>>();
        let loss_fn = CrossEntropyLossConfig::new().init::<TrainingBackend>(&device);
        let mut epochs = Vec::with_capacity(self.config.num_epochs);

        for epoch in 1..=self.config.num_epochs {
            let mut totals = EpochTotals::default();

            for batch in train_loader.iter() {
                if self.cancel.load(Ordering::Relaxed) {
                    log::warn!("Training interrupted during epoch {epoch}");
                    return Err(TrainError::Interrupted);
                }
                let logits = model.forward(batch.images);
                let loss = loss_fn.forward(logits.clone(), batch.targets.clone());
                totals.add(&logits, &batch.targets, loss.clone().into_scalar().elem::<f64>());

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(self.config.learning_rate, model, grads);
            }

            let evaluated = if validation_samples > 0 {
                Some(evaluate(&model.valid(), validation_loader.as_ref()))
            } else {
                None
            };
            self.check_cancel()?;

            let metrics = EpochMetrics {
                epoch,
                train_loss: totals.mean_loss(),
                train_accuracy: totals.accuracy(),
                validation_loss: evaluated.map(|t| t.mean_loss()),
                validation_accuracy: evaluated.map(|t| t.accuracy()),
            };
            log_epoch(&metrics, self.config.num_epochs);
            epochs.push(metrics);
        }

        let report = TrainingReport {
            class_names: labels.names().to_vec(),
            train_samples,
            validation_samples,
            skipped_images,
            validation_source,
            epochs,
        };
        self.finish(&model.valid(), &model_config, &labels, &report, paths)?;

        if let Some(last) = report.final_epoch() {
            log::info!("Final training accuracy: {:.4}", last.train_accuracy);
            match last.validation_accuracy {
                Some(acc) => log::info!("Final validation accuracy: {acc:.4}"),
                None => log::info!("No validation samples"),
            }
        }
        Ok(report)
    }

    /// Writes the artifacts unless an interrupt arrived after the last batch.
    fn finish<B: Backend>(
        &self,
        model: &EmotionCnn<B>,
        model_config: &EmotionCnnConfig,
        labels: &LabelSet,
        report: &TrainingReport,
        paths: &ArtifactPaths,
    ) -> Result<(), TrainError> {
        self.check_cancel()?;
        artifacts::save_all(model, model_config, labels, report, paths)
    }

    fn check_cancel(&self) -> Result<(), TrainError> {
        if self.cancel.load(Ordering::Relaxed) {
            log::warn!("Training interrupted");
            return Err(TrainError::Interrupted);
        }
        Ok(())
    }

    /// Held-out samples from `dir`, or `None` when the split should be used.
    fn load_held_out(&self, dir: &Path, labels: &LabelSet) -> Result<Option<ImageDataset>, TrainError> {
        match ImageDataset::load_with_labels(dir, labels, &self.cancel) {
            Ok(dataset) => Ok(Some(dataset)),
            Err(DatasetError::Interrupted) => Err(TrainError::Interrupted),
            Err(DatasetError::DirectoryNotFound(path)) => {
                log::warn!(
                    "Test directory {} not found, validating on a split of the training data",
                    path.display()
                );
                Ok(None)
            }
            Err(e) => {
                log::warn!("{e}; validating on a split of the training data");
                Ok(None)
            }
        }
    }
}

/// Running loss and accuracy over one pass of a data loader.
#[derive(Clone, Copy, Debug, Default)]
struct EpochTotals {
    loss_sum: f64,
    correct: usize,
    seen: usize,
}

impl EpochTotals {
    fn add<B: Backend>(&mut self, logits: &Tensor<B, 2>, targets: &Tensor<B, 1, Int>, mean_loss: f64) {
        let [batch_size, _] = logits.dims();
        let correct = logits
            .clone()
            .argmax(1)
            .equal(targets.clone().reshape([batch_size, 1]))
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        self.loss_sum += mean_loss * batch_size as f64;
        self.correct += correct.max(0) as usize;
        self.seen += batch_size;
    }

    fn mean_loss(&self) -> f64 {
        if self.seen == 0 {
            0.0
        } else {
            self.loss_sum / self.seen as f64
        }
    }

    fn accuracy(&self) -> f64 {
        if self.seen == 0 {
            0.0
        } else {
            self.correct as f64 / self.seen as f64
        }
    }
}

/// Loss and accuracy without gradient tracking.
fn evaluate<B: Backend>(
    model: &EmotionCnn<B>,
    loader: &dyn DataLoader<B, SampleBatch<B>>,
) -> EpochTotals {
    let mut totals = EpochTotals::default();
    for batch in loader.iter() {
        let logits = model.forward(batch.images);
        let loss = CrossEntropyLossConfig::new()
            .init::<B>(&logits.device())
            .forward(logits.clone(), batch.targets.clone());
        totals.add(&logits, &batch.targets, loss.into_scalar().elem::<f64>());
    }
    totals
}

fn log_epoch(metrics: &EpochMetrics, total: usize) {
    match (metrics.validation_loss, metrics.validation_accuracy) {
        (Some(loss), Some(acc)) => log::info!(
            "Epoch {}/{total} - loss {:.4} - accuracy {:.4} - val_loss {loss:.4} - val_accuracy {acc:.4}",
            metrics.epoch,
            metrics.train_loss,
            metrics.train_accuracy
        ),
        _ => log::info!(
            "Epoch {}/{total} - loss {:.4} - accuracy {:.4}",
            metrics.epoch,
            metrics.train_loss,
            metrics.train_accuracy
        ),
    }
}
