pub mod artifacts;
pub mod batcher;
pub mod dataset;
pub mod report;
pub mod trainer;
