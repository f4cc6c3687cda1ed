use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::shared::constants::INPUT_SIZE;

const CONV_CHANNELS: [usize; 3] = [32, 64, 128];
const HIDDEN_UNITS: usize = 128;

/// Spatial side of the last pooled feature map for a square input.
///
/// Each stage is a 3×3 valid convolution (−2) followed by a 2×2 pool (÷2):
/// 48 → 46 → 23 → 21 → 10 → 8 → 4.
pub const fn feature_map_size(input: usize) -> usize {
    let mut side = input;
    let mut stage = 0;
    while stage < CONV_CHANNELS.len() {
        side = side.saturating_sub(2) / 2;
        stage += 1;
    }
    side
}

/// Flattened feature width feeding the dense head.
pub const FLAT_FEATURES: usize =
    CONV_CHANNELS[2] * feature_map_size(INPUT_SIZE) * feature_map_size(INPUT_SIZE);

#[derive(Config, Debug)]
pub struct EmotionCnnConfig {
    /// Output width; equals the label count.
    pub num_classes: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl EmotionCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionCnn<B> {
        let conv = |input: usize, output: usize| {
            Conv2dConfig::new([input, output], [3, 3]).init::<B>(device)
        };
        EmotionCnn {
            conv1: conv(1, CONV_CHANNELS[0]),
            conv2: conv(CONV_CHANNELS[0], CONV_CHANNELS[1]),
            conv3: conv(CONV_CHANNELS[1], CONV_CHANNELS[2]),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1: LinearConfig::new(FLAT_FEATURES, HIDDEN_UNITS).init(device),
            fc2: LinearConfig::new(HIDDEN_UNITS, self.num_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            activation: Relu::new(),
        }
    }
}

/// Three conv/pool stages, a 128-unit dense layer with dropout, and a
/// linear output over the emotion classes.
///
/// Input is `[batch, 1, 48, 48]` with intensities in `[0, 1]`.
#[derive(Module, Debug)]
pub struct EmotionCnn<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    pool: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
    dropout: Dropout,
    activation: Relu,
}

impl<B: Backend> EmotionCnn<B> {
    /// Unnormalized class scores, `[batch, num_classes]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        let x = self.stage(&self.conv1, images);
        let x = self.stage(&self.conv2, x);
        let x = self.stage(&self.conv3, x);

        let [_, c, h, w] = x.dims();
        let x = x.reshape([batch_size, c * h * w]);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Softmax over the class axis.
    pub fn probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    fn stage(&self, conv: &Conv2d<B>, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(conv.forward(x));
        self.pool.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use burn::backend::NdArray;

    #[test]
    fn test_feature_map_size_for_input() {
        assert_eq!(feature_map_size(48), 4);
        assert_eq!(FLAT_FEATURES, 2048);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = EmotionCnnConfig::new(4).init::<NdArray>(&device);
        let images = Tensor::<NdArray, 4>::zeros([2, 1, INPUT_SIZE, INPUT_SIZE], &device);
        assert_eq!(model.forward(images).dims(), [2, 4]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = Default::default();
        let model = EmotionCnnConfig::new(7).init::<NdArray>(&device);
        let images = Tensor::<NdArray, 4>::ones([1, 1, INPUT_SIZE, INPUT_SIZE], &device);
        let values = model
            .probabilities(images)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(values.len(), 7);
        assert_relative_eq!(values.iter().sum::<f32>(), 1.0, epsilon = 1e-4);
    }
}
