pub mod classifier_context;
pub mod emotion_classifier;
