use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use emotion_core::shared::artifact_paths::ArtifactPaths;
use emotion_core::shared::constants::{
    DEFAULT_LABELS_PATH, DEFAULT_MODEL_PATH, DEFAULT_TEST_DIR, DEFAULT_TRAIN_DIR,
};
use emotion_core::training::trainer::{TrainModelUseCase, TrainingConfig};

/// Train the facial emotion classifier on a class-per-folder image dataset.
#[derive(Parser, Debug)]
#[command(name = "emotion-train")]
struct Cli {
    /// Training images, one subdirectory per emotion.
    #[arg(long, default_value = DEFAULT_TRAIN_DIR)]
    train_dir: PathBuf,

    /// Held-out images with the same layout; a split of the training data
    /// is used when this is missing.
    #[arg(long, default_value = DEFAULT_TEST_DIR)]
    test_dir: PathBuf,

    /// Where to write the trained model.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Where to write the class labels, one per line.
    #[arg(long, default_value = DEFAULT_LABELS_PATH)]
    labels: PathBuf,

    #[arg(long, default_value = "10")]
    epochs: usize,

    #[arg(long, default_value = "32")]
    batch_size: usize,

    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Fraction of training data held out when no test directory is usable.
    #[arg(long, default_value = "0.2")]
    validation_split: f64,

    /// Seed for the split and per-epoch shuffling.
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interrupt received, stopping after the current batch");
        flag.store(true, Ordering::Relaxed);
    })?;

    let config = TrainingConfig::new()
        .with_num_epochs(cli.epochs)
        .with_batch_size(cli.batch_size)
        .with_learning_rate(cli.learning_rate)
        .with_validation_split(cli.validation_split)
        .with_seed(cli.seed);
    let paths = ArtifactPaths::new(&cli.model, &cli.labels);

    let use_case = TrainModelUseCase::new(config, cancel);
    let report = use_case.execute(&cli.train_dir, Some(&cli.test_dir), &paths)?;

    log::info!(
        "Model written to {}, labels to {}",
        paths.model_record().display(),
        paths.labels().display()
    );
    if let Some(last) = report.final_epoch() {
        println!("Training accuracy: {:.4}", last.train_accuracy);
        if let Some(acc) = last.validation_accuracy {
            println!("Validation accuracy: {acc:.4}");
        }
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.train_dir.is_dir() {
        return Err(format!("Training directory not found: {}", cli.train_dir.display()).into());
    }
    if cli.epochs == 0 {
        return Err("Epochs must be at least 1".into());
    }
    if cli.batch_size == 0 {
        return Err("Batch size must be at least 1".into());
    }
    if cli.learning_rate.is_nan() || cli.learning_rate <= 0.0 {
        return Err(format!("Learning rate must be positive, got {}", cli.learning_rate).into());
    }
    if !(cli.validation_split > 0.0 && cli.validation_split < 1.0) {
        return Err(format!(
            "Validation split must be between 0.0 and 1.0 (exclusive), got {}",
            cli.validation_split
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("emotion-train").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.train_dir, PathBuf::from("data/train"));
        assert_eq!(cli.test_dir, PathBuf::from("data/test"));
        assert_eq!(cli.model, PathBuf::from("emotion_detection_model.mpk"));
        assert_eq!(cli.labels, PathBuf::from("emotion_classes.txt"));
        assert_eq!((cli.epochs, cli.batch_size, cli.seed), (10, 32, 42));
    }

    #[test]
    fn test_missing_train_dir_rejected() {
        let cli = parse(&["--train-dir", "/nonexistent/train"]);
        let err = validate(&cli).unwrap_err();
        assert!(err.to_string().contains("Training directory not found"));
    }

    #[test]
    fn test_bad_split_rejected() {
        let dir = std::env::temp_dir();
        let dir = dir.to_str().unwrap();
        assert!(validate(&parse(&["--train-dir", dir, "--validation-split", "1.0"])).is_err());
        assert!(validate(&parse(&["--train-dir", dir, "--epochs", "0"])).is_err());
        assert!(validate(&parse(&["--train-dir", dir])).is_ok());
    }
}
