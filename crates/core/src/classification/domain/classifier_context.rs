use crate::classification::domain::emotion_classifier::{ClassifyError, EmotionClassifier};
use crate::shared::label_set::LabelSet;
use crate::shared::sample::NormalizedSample;

/// Everything the frame loop needs that never changes after startup: the
/// trained classifier and the label set that names its outputs.
///
/// Built once, then passed by reference into frame processing.
pub struct ClassifierContext {
    classifier: Box<dyn EmotionClassifier>,
    labels: LabelSet,
}

impl ClassifierContext {
    /// Pairs a classifier with its labels, rejecting a count mismatch.
    pub fn new(
        classifier: Box<dyn EmotionClassifier>,
        labels: LabelSet,
    ) -> Result<Self, ClassifyError> {
        let outputs = classifier.num_classes();
        if labels.len() != outputs {
            return Err(ClassifyError::LabelCountMismatch {
                labels: labels.len(),
                outputs,
            });
        }
        Ok(Self { classifier, labels })
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Runs the classifier and maps the winning index through the label set.
    pub fn classify(&self, sample: &NormalizedSample) -> Result<&str, Box<dyn std::error::Error>> {
        let prediction = self.classifier.predict(sample)?;
        let index = prediction.argmax().ok_or(ClassifyError::NoFiniteOutput)?;
        let label = self
            .labels
            .get(index)
            .ok_or(ClassifyError::LabelOutOfRange {
                index,
                len: self.labels.len(),
            })?;
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::emotion_classifier::Prediction;

    struct FixedClassifier {
        probabilities: Vec<f32>,
        width: usize,
    }

    impl EmotionClassifier for FixedClassifier {
        fn num_classes(&self) -> usize {
            self.width
        }

        fn predict(
            &self,
            _sample: &NormalizedSample,
        ) -> Result<Prediction, Box<dyn std::error::Error>> {
            Ok(Prediction::new(self.probabilities.clone()))
        }
    }

    fn labels(names: &[&str]) -> LabelSet {
        LabelSet::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_classify_maps_argmax_to_label() {
        let context = ClassifierContext::new(
            Box::new(FixedClassifier {
                probabilities: vec![0.1, 0.2, 0.6, 0.1],
                width: 4,
            }),
            labels(&["angry", "happy", "neutral", "sad"]),
        )
        .unwrap();
        let label = context.classify(&NormalizedSample::filled(0.5)).unwrap();
        assert_eq!(label, "neutral");
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let result = ClassifierContext::new(
            Box::new(FixedClassifier {
                probabilities: vec![0.5, 0.5],
                width: 2,
            }),
            LabelSet::defaults(),
        );
        assert!(matches!(
            result,
            Err(ClassifyError::LabelCountMismatch {
                labels: 4,
                outputs: 2
            })
        ));
    }

    #[test]
    fn test_out_of_range_index_is_error_not_panic() {
        // Reports width 2 but emits 3 probabilities with the max past the end.
        let context = ClassifierContext::new(
            Box::new(FixedClassifier {
                probabilities: vec![0.1, 0.1, 0.8],
                width: 2,
            }),
            labels(&["a", "b"]),
        )
        .unwrap();
        let err = context
            .classify(&NormalizedSample::filled(0.5))
            .unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_all_nan_output_is_error() {
        let context = ClassifierContext::new(
            Box::new(FixedClassifier {
                probabilities: vec![f32::NAN, f32::NAN],
                width: 2,
            }),
            labels(&["a", "b"]),
        )
        .unwrap();
        assert!(context.classify(&NormalizedSample::filled(0.5)).is_err());
    }
}
