use image::GrayImage;
use ndarray::{ArrayView3, ArrayViewMut3};

use super::grayscale::luma;

/// A single camera frame: contiguous BGR bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque apart from grayscale conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Single-channel luma image of this frame.
    ///
    /// Three- and four-channel frames are read as BGR(A); alpha is ignored.
    /// Single-channel frames are copied as-is.
    pub fn to_grayscale(&self) -> GrayImage {
        let pixels = self.as_ndarray();
        let channels = self.channels;
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let (row, col) = (y as usize, x as usize);
            let value = if channels >= 3 {
                luma(
                    pixels[[row, col, 2]],
                    pixels[[row, col, 1]],
                    pixels[[row, col, 0]],
                )
            } else {
                pixels[[row, col, 0]]
            };
            image::Luma([value])
        })
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
