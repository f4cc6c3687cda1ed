use thiserror::Error;

use crate::shared::sample::NormalizedSample;

#[derive(Error, Debug, PartialEq)]
pub enum ClassifyError {
    #[error("label set has {labels} classes but the classifier outputs {outputs}")]
    LabelCountMismatch { labels: usize, outputs: usize },
    #[error("classifier produced {actual} probabilities, expected {expected}")]
    OutputWidth { expected: usize, actual: usize },
    #[error("classifier output has no finite probability")]
    NoFiniteOutput,
    #[error("predicted class index {index} is outside the {len} known labels")]
    LabelOutOfRange { index: usize, len: usize },
    #[error("failed to read classifier output: {0}")]
    TensorData(String),
}

/// Probability vector over the label set for one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    probabilities: Vec<f32>,
}

impl Prediction {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Index of the highest probability; the first one wins ties and NaN
    /// entries are ignored.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if p <= top => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Domain interface for the trained emotion model.
///
/// Implementations are immutable after construction and shared read-only
/// across every frame and face.
pub trait EmotionClassifier {
    /// Width of the output layer.
    fn num_classes(&self) -> usize;

    fn predict(&self, sample: &NormalizedSample) -> Result<Prediction, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::clear_winner(vec![0.1, 0.7, 0.2], Some(1))]
    #[case::first_wins_tie(vec![0.4, 0.4, 0.2], Some(0))]
    #[case::last(vec![0.1, 0.2, 0.7], Some(2))]
    #[case::nan_skipped(vec![f32::NAN, 0.3, 0.2], Some(1))]
    #[case::all_nan(vec![f32::NAN, f32::NAN], None)]
    #[case::empty(vec![], None)]
    fn test_argmax(#[case] probabilities: Vec<f32>, #[case] expected: Option<usize>) {
        assert_eq!(Prediction::new(probabilities).argmax(), expected);
    }
}
