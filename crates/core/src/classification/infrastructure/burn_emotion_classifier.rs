use burn::backend::NdArray;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::classification::domain::emotion_classifier::{ClassifyError, EmotionClassifier, Prediction};
use crate::classification::infrastructure::emotion_cnn::EmotionCnn;
use crate::shared::constants::INPUT_SIZE;
use crate::shared::sample::NormalizedSample;

/// CPU backend used by the live classifier.
pub type InferenceBackend = NdArray;

/// Runs a trained [`EmotionCnn`] on one sample at a time.
pub struct BurnEmotionClassifier<B: Backend = InferenceBackend> {
    model: EmotionCnn<B>,
    device: B::Device,
    num_classes: usize,
}

impl<B: Backend> BurnEmotionClassifier<B> {
    pub fn new(model: EmotionCnn<B>, device: B::Device, num_classes: usize) -> Self {
        Self {
            model,
            device,
            num_classes,
        }
    }
}

impl<B: Backend> EmotionClassifier for BurnEmotionClassifier<B> {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict(&self, sample: &NormalizedSample) -> Result<Prediction, Box<dyn std::error::Error>> {
        let input = Tensor::<B, 1>::from_floats(sample.data(), &self.device)
            .reshape([1, 1, INPUT_SIZE, INPUT_SIZE]);
        let probabilities = self
            .model
            .probabilities(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ClassifyError::TensorData(format!("{e:?}")))?;
        if probabilities.len() != self.num_classes {
            return Err(ClassifyError::OutputWidth {
                expected: self.num_classes,
                actual: probabilities.len(),
            }
            .into());
        }
        Ok(Prediction::new(probabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::infrastructure::emotion_cnn::EmotionCnnConfig;
    use approx::assert_relative_eq;

    fn classifier(num_classes: usize) -> BurnEmotionClassifier {
        let device = Default::default();
        let model = EmotionCnnConfig::new(num_classes).init::<InferenceBackend>(&device);
        BurnEmotionClassifier::new(model, device, num_classes)
    }

    #[test]
    fn test_predict_returns_distribution() {
        let prediction = classifier(4)
            .predict(&NormalizedSample::filled(0.5))
            .unwrap();
        assert_eq!(prediction.probabilities().len(), 4);
        assert_relative_eq!(prediction.probabilities().iter().sum::<f32>(), 1.0, epsilon = 1e-4);
        assert!(prediction.argmax().is_some());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let classifier = classifier(3);
        let sample = NormalizedSample::filled(0.25);
        let first = classifier.predict(&sample).unwrap();
        let second = classifier.predict(&sample).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_declared_width_mismatch_is_error() {
        let device = Default::default();
        let model = EmotionCnnConfig::new(3).init::<InferenceBackend>(&device);
        let classifier = BurnEmotionClassifier::new(model, device, 5);
        assert!(classifier.predict(&NormalizedSample::filled(0.5)).is_err());
    }
}
