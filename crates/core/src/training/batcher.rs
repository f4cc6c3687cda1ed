use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::shared::constants::INPUT_SIZE;
use crate::training::dataset::LabeledSample;

/// Stacks labeled samples into an image tensor and class-index targets.
#[derive(Clone, Debug, Default)]
pub struct SampleBatcher;

#[derive(Clone, Debug)]
pub struct SampleBatch<B: Backend> {
    /// `[n, 1, 48, 48]`
    pub images: Tensor<B, 4>,
    /// `[n]`
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<B, LabeledSample, SampleBatch<B>> for SampleBatcher {
    fn batch(&self, items: Vec<LabeledSample>, device: &B::Device) -> SampleBatch<B> {
        let batch_size = items.len();
        let mut pixels = Vec::with_capacity(batch_size * INPUT_SIZE * INPUT_SIZE);
        let mut targets = Vec::with_capacity(batch_size);
        for item in &items {
            pixels.extend_from_slice(item.sample.data());
            targets.push(item.class_index as i64);
        }

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), device)
            .reshape([batch_size, 1, INPUT_SIZE, INPUT_SIZE]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), device);
        SampleBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::sample::NormalizedSample;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_targets() {
        let device = Default::default();
        let items = vec![
            LabeledSample {
                sample: NormalizedSample::filled(0.2),
                class_index: 3,
            },
            LabeledSample {
                sample: NormalizedSample::filled(0.8),
                class_index: 0,
            },
        ];
        let batch: SampleBatch<NdArray> = SampleBatcher.batch(items, &device);

        assert_eq!(batch.images.dims(), [2, 1, INPUT_SIZE, INPUT_SIZE]);
        assert_eq!(batch.targets.into_data().to_vec::<i64>().unwrap(), vec![3, 0]);
        let pixels = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(pixels[0], 0.2);
        assert_eq!(pixels[INPUT_SIZE * INPUT_SIZE], 0.8);
    }
}
