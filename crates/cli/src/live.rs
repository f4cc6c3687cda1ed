use std::path::PathBuf;
use std::process;

use clap::Parser;

use emotion_core::annotation::infrastructure::opencv_annotator::OpenCvAnnotator;
use emotion_core::classification::infrastructure::model_loader;
use emotion_core::detection::infrastructure::cascade_face_detector::{
    resolve_cascade_path, CascadeConfig, CascadeFaceDetector,
};
use emotion_core::pipeline::classify_frame_use_case::ClassifyFrameUseCase;
use emotion_core::pipeline::live_classify_use_case::LiveClassifyUseCase;
use emotion_core::pipeline::pipeline_logger::LogPipelineLogger;
use emotion_core::shared::artifact_paths::ArtifactPaths;
use emotion_core::shared::constants::{
    DEFAULT_CASCADE_FILE, DEFAULT_LABELS_PATH, DEFAULT_MODEL_PATH, WINDOW_TITLE,
};
use emotion_core::video::infrastructure::opencv_camera::OpenCvCamera;
use emotion_core::video::infrastructure::opencv_window::OpenCvWindow;

/// Classify facial emotions on a live webcam feed. Press 'q' to quit.
#[derive(Parser, Debug)]
#[command(name = "emotion-live")]
struct Cli {
    /// Trained model written by emotion-train.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Class labels, one per line. Defaults are used when missing.
    #[arg(long, default_value = DEFAULT_LABELS_PATH)]
    labels: PathBuf,

    /// Haar cascade XML. Looked up in OpenCV's data directory when the
    /// path does not exist.
    #[arg(long, default_value = DEFAULT_CASCADE_FILE)]
    cascade: PathBuf,

    /// Camera device index.
    #[arg(long, default_value = "0")]
    camera: i32,

    /// Image pyramid step between detection scales (> 1.0).
    #[arg(long, default_value = "1.3")]
    scale_factor: f64,

    /// Overlapping detections required to keep a face.
    #[arg(long, default_value = "5")]
    min_neighbors: i32,

    /// Smallest face side in pixels (0 = detector default).
    #[arg(long, default_value = "0")]
    min_face_size: u32,

    /// Stop after this many frames (0 = run until 'q').
    #[arg(long, default_value = "0")]
    max_frames: usize,
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

    let paths = ArtifactPaths::new(&cli.model, &cli.labels);
    let context = model_loader::load_context(&paths)?;
    log::info!("Labels: {}", context.labels().names().join(", "));

    let cascade = resolve_cascade_path(&cli.cascade)
        .ok_or_else(|| format!("Face cascade not found: {}", cli.cascade.display()))?;
    let detector = CascadeFaceDetector::new(
        &cascade,
        CascadeConfig {
            scale_factor: cli.scale_factor,
            min_neighbors: cli.min_neighbors,
            min_face_size: cli.min_face_size,
        },
    )?;

    let frame_use_case =
        ClassifyFrameUseCase::new(Box::new(detector), Box::new(OpenCvAnnotator::new()));
    let mut use_case = LiveClassifyUseCase::new(
        Box::new(OpenCvCamera::new(cli.camera)),
        Box::new(OpenCvWindow::new(WINDOW_TITLE)),
        frame_use_case,
        Box::new(LogPipelineLogger::default()),
        cli.max_frames,
    );
    use_case.execute(&context)?;
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.scale_factor.is_nan() || cli.scale_factor <= 1.0 {
        return Err(format!("Scale factor must be greater than 1.0, got {}", cli.scale_factor).into());
    }
    if cli.min_neighbors < 0 {
        return Err(format!("Min neighbors must be non-negative, got {}", cli.min_neighbors).into());
    }
    if cli.camera < 0 {
        return Err(format!("Camera index must be non-negative, got {}", cli.camera).into());
    }
    Ok(())
}
