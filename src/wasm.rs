//! WebAssembly exports for pixelplane filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! All functions take flat interleaved u8 data (`height * width * channels`
//! bytes, row-major) and return the same layout. A channel count of 1 is
//! treated as a bare plane.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::error::{Error, Result};
use crate::filters::{filter2d, FilterOptions, Preset};
use crate::image::Image;
use crate::transform::resize;

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn image_from_flat(data: &[u8], width: usize, height: usize, channels: usize) -> Result<Image<u8>> {
    if channels <= 1 {
        Ok(Image::plane(Array2::from_shape_vec((height, width), data.to_vec())?))
    } else {
        let cube = Array3::from_shape_vec((height, width, channels), data.to_vec())?;
        Image::from_array3(cube.view())
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Filter an image with an arbitrary kernel.
///
/// # Arguments
/// * `data` - Flat array of samples (length = width * height * channels)
/// * `kernel` - Flat kernel (length = kernel_width * kernel_height)
/// * `scale` - Kernel divisor; undefined uses the kernel sum
/// * `offset` - Added before clipping
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn filter2d_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f64],
    kernel_width: usize,
    kernel_height: usize,
    scale: Option<f64>,
    offset: f64,
) -> std::result::Result<Vec<u8>, JsValue> {
    let image = image_from_flat(data, width, height, channels).map_err(to_js)?;
    let kernel = Array2::from_shape_vec((kernel_height, kernel_width), kernel.to_vec())
        .map_err(|e| to_js(e.into()))?;

    let mut options = FilterOptions::default().with_offset(offset);
    options.scale = scale;

    let result = filter2d(&image, kernel.view(), &options).map_err(to_js)?;
    Ok(result.to_interleaved())
}

/// Apply a named preset ("blur", "smooth", "sharpen", ...).
#[wasm_bindgen]
pub fn preset_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    name: &str,
) -> std::result::Result<Vec<u8>, JsValue> {
    let preset: Preset = name.parse().map_err(to_js)?;
    let image = image_from_flat(data, width, height, channels).map_err(to_js)?;
    let result = preset.apply(&image).map_err(to_js)?;
    Ok(result.to_interleaved())
}

// ============================================================================
// Transform
// ============================================================================

/// Bilinear resize to `new_width` x `new_height`.
#[wasm_bindgen]
pub fn resize_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    new_width: usize,
    new_height: usize,
) -> std::result::Result<Vec<u8>, JsValue> {
    let image = image_from_flat(data, width, height, channels).map_err(to_js)?;
    let result = resize(&image, new_height, new_width).map_err(to_js)?;
    Ok(result.to_interleaved())
}
