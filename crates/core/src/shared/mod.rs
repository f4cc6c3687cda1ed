pub mod artifact_paths;
pub mod constants;
pub mod face_label;
pub mod frame;
pub mod grayscale;
pub mod label_set;
#[cfg(feature = "opencv")]
pub mod mat_conversion;
pub mod region;
pub mod sample;
