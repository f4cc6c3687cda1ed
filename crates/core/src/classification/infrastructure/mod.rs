pub mod burn_emotion_classifier;
pub mod emotion_cnn;
pub mod model_loader;
