#[cfg(feature = "opencv")]
pub mod opencv_camera;
#[cfg(feature = "opencv")]
pub mod opencv_window;
