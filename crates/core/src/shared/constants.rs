/// Side length of the square classifier input.
pub const INPUT_SIZE: usize = 48;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Label drawn for a face whose classification failed.
pub const ERROR_LABEL: &str = "Error";

/// Used when the label file is missing; must still match the model width.
pub const DEFAULT_LABELS: &[&str] = &["angry", "happy", "neutral", "sad"];

pub const DEFAULT_MODEL_PATH: &str = "emotion_detection_model.mpk";
pub const DEFAULT_LABELS_PATH: &str = "emotion_classes.txt";
pub const DEFAULT_TRAIN_DIR: &str = "data/train";
pub const DEFAULT_TEST_DIR: &str = "data/test";

pub const DEFAULT_CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";
pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;

pub const WINDOW_TITLE: &str = "Emotion Detector";
pub const QUIT_KEY: char = 'q';

/// Vertical gap between a face box and the baseline of its label.
pub const LABEL_OFFSET_Y: i32 = 10;
