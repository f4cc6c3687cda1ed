//! Copies between domain pixel buffers and OpenCV matrices.
//!
//! Every conversion copies; no `Mat` ever aliases a `Frame` buffer.
use image::GrayImage;
use opencv::core::{self, Mat, Scalar};
use opencv::prelude::*;

use super::frame::Frame;

pub fn frame_to_mat(frame: &Frame) -> Result<Mat, Box<dyn std::error::Error>> {
    let typ = match frame.channels() {
        1 => core::CV_8UC1,
        3 => core::CV_8UC3,
        4 => core::CV_8UC4,
        n => return Err(format!("unsupported channel count: {n}").into()),
    };
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        typ,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(frame.data());
    Ok(mat)
}

pub fn gray_to_mat(image: &GrayImage) -> Result<Mat, Box<dyn std::error::Error>> {
    let mut mat = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(image.as_raw());
    Ok(mat)
}

/// Builds a BGR frame from an 8-bit three-channel matrix.
pub fn mat_to_frame(mat: &Mat, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    if mat.typ() != core::CV_8UC3 {
        return Err(format!("expected an 8-bit BGR matrix, got type {}", mat.typ()).into());
    }
    let data = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };
    Ok(Frame::new(
        data,
        mat.cols() as u32,
        mat.rows() as u32,
        3,
        index,
    ))
}

/// Writes `mat` back into `frame`; dimensions and channel count must match.
pub fn copy_mat_into_frame(mat: &Mat, frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = mat.data_bytes()?;
    if bytes.len() != frame.data().len() {
        return Err(format!(
            "matrix holds {} bytes, frame holds {}",
            bytes.len(),
            frame.data().len()
        )
        .into());
    }
    frame.data_mut().copy_from_slice(bytes);
    Ok(())
}
