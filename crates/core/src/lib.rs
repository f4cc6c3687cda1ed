pub mod annotation;
pub mod classification;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod training;
pub mod video;
