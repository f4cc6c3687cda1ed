use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use ndarray::ArrayView2;
use thiserror::Error;

use super::constants::INPUT_SIZE;

/// Single-channel `f32` intensity image.
pub type IntensityImage = ImageBuffer<Luma<f32>, Vec<f32>>;

#[derive(Error, Debug, PartialEq)]
pub enum SampleError {
    #[error("cannot normalize an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
    #[error("region lies outside the {width}x{height} frame")]
    RegionOutsideFrame { width: u32, height: u32 },
}

/// A 48×48 single-channel image with intensities in `[0, 1]`.
///
/// This is the only input representation the classifier accepts.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedSample {
    data: Vec<f32>,
}

impl NormalizedSample {
    /// Resizes (bilinear) to the input size and rescales 0..=255 to `[0, 1]`.
    pub fn from_gray(image: &GrayImage) -> Result<Self, SampleError> {
        ensure_not_empty(image.width(), image.height())?;
        let side = INPUT_SIZE as u32;
        let data = if image.dimensions() == (side, side) {
            rescale(image.as_raw())
        } else {
            rescale(imageops::resize(image, side, side, FilterType::Triangle).as_raw())
        };
        Ok(Self { data })
    }

    /// Normalizes an image that is already on the unit scale.
    ///
    /// An input that is already 48×48 passes through untouched apart from
    /// clamping, so re-normalizing a sample is a no-op.
    pub fn from_intensities(image: &IntensityImage) -> Result<Self, SampleError> {
        ensure_not_empty(image.width(), image.height())?;
        let side = INPUT_SIZE as u32;
        let values = if image.dimensions() == (side, side) {
            image.as_raw().clone()
        } else {
            imageops::resize(image, side, side, FilterType::Triangle).into_raw()
        };
        Ok(Self {
            data: values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        })
    }

    /// A uniform sample, e.g. `0.5` for mid-gray.
    pub fn filled(value: f32) -> Self {
        Self {
            data: vec![value.clamp(0.0, 1.0); INPUT_SIZE * INPUT_SIZE],
        }
    }

    /// Row-major intensities, `INPUT_SIZE * INPUT_SIZE` long.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((INPUT_SIZE, INPUT_SIZE), &self.data)
            .expect("Sample data length must match input size")
    }

    pub fn to_intensity_image(&self) -> IntensityImage {
        let side = INPUT_SIZE as u32;
        let view = self.as_ndarray();
        IntensityImage::from_fn(side, side, |x, y| Luma([view[[y as usize, x as usize]]]))
    }
}

fn ensure_not_empty(width: u32, height: u32) -> Result<(), SampleError> {
    if width == 0 || height == 0 {
        return Err(SampleError::EmptyImage { width, height });
    }
    Ok(())
}

fn rescale(pixels: &[u8]) -> Vec<f32> {
    pixels.iter().map(|&p| p as f32 / 255.0).collect()
}
