use image::{GrayImage, Luma, RgbImage};

// ITU-R BT.601 weights in 14-bit fixed point; they sum to 1 << 14.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Luma of one pixel, rounded to nearest.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Converts a decoded RGB image with the same weights used for camera frames,
/// so training and live samples share one intensity scale.
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}
