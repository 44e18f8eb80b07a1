//! Bilinear resizing with pixel-centre alignment.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::sample::Sample;

/// Requested output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    pub height: usize,
    pub width: usize,
}

/// Source coordinate of output index `i` along one axis, with the
/// clamped floor/ceil neighbours and the non-negative fractional weight.
/// The weight is zero whenever both neighbours clamp to the same sample.
#[inline]
fn source_axis(ratio: f64, i: usize, len: usize) -> (usize, usize, f64) {
    let s = ratio * (i as f64 + 0.5) - 0.5;
    let last = len as f64 - 1.0;
    let lo = s.floor().clamp(0.0, last) as usize;
    let hi = s.ceil().clamp(0.0, last) as usize;
    let d = if lo == hi { 0.0 } else { (s - s.floor()).max(0.0) };
    (lo, hi, d)
}

/// Resize a single plane to `(new_height, new_width)`.
///
/// Output samples that fall exactly on a source sample are copied without
/// passing through `f64`, so 64-bit integers survive unchanged.
///
/// # Arguments
/// * `plane` - Source plane (height, width)
/// * `new_height` - Output rows, must be positive
/// * `new_width` - Output columns, must be positive
///
/// # Returns
/// Plane of shape (new_height, new_width) with the source sample type
pub fn bilinear_resize<T: Sample>(plane: ArrayView2<T>, new_height: usize, new_width: usize) -> Result<Array2<T>> {
    let (height, width) = plane.dim();
    if new_height == 0 || new_width == 0 {
        return Err(Error::invalid(format!(
            "resize target must be positive, got {new_height}x{new_width}"
        )));
    }
    if height == 0 || width == 0 {
        return Err(Error::invalid(format!("cannot resize an empty {height}x{width} plane")));
    }

    let y_ratio = height as f64 / new_height as f64;
    let x_ratio = width as f64 / new_width as f64;
    let kind = T::KIND;

    // Column lookups are the same for every row.
    let columns: Vec<(usize, usize, f64)> = (0..new_width).map(|x| source_axis(x_ratio, x, width)).collect();

    let mut output = Array2::<T>::default((new_height, new_width));
    for y in 0..new_height {
        let (y_lo, y_hi, dy) = source_axis(y_ratio, y, height);
        for (x, &(x_lo, x_hi, dx)) in columns.iter().enumerate() {
            if dx == 0.0 && dy == 0.0 {
                output[[y, x]] = plane[[y_lo, x_lo]];
                continue;
            }
            let a = plane[[y_lo, x_lo]].to_f64();
            let b = plane[[y_lo, x_hi]].to_f64();
            let c = plane[[y_hi, x_lo]].to_f64();
            let d = plane[[y_hi, x_hi]].to_f64();

            let value = a * (1.0 - dx) * (1.0 - dy) + b * dx * (1.0 - dy) + c * (1.0 - dx) * dy + d * dx * dy;
            output[[y, x]] = T::from_f64(kind.quantize(value));
        }
    }

    Ok(output)
}

/// Resize every channel of `image` to `(height, width)`.
///
/// # Arguments
/// * `image` - Plane or multi-channel image of any sample type
/// * `height` - Output rows, must be positive
/// * `width` - Output columns, must be positive
///
/// # Returns
/// Image with the same channel count and sample type
pub fn resize<T: Sample>(image: &Image<T>, height: usize, width: usize) -> Result<Image<T>> {
    log::debug!(
        "resize: {:?} -> {}x{} ({})",
        image.shape(),
        height,
        width,
        T::KIND
    );
    image.try_map_planes(|plane| bilinear_resize(plane, height, width))
}

pub fn resize_with<T: Sample>(image: &Image<T>, options: &ResizeOptions) -> Result<Image<T>> {
    resize(image, options.height, options.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn small() -> Array2<u8> {
        arr2(&[[56, 8], [8, 32]])
    }

    fn large() -> Array2<u8> {
        arr2(&[[56, 44, 20, 8], [44, 37, 22, 14], [20, 22, 25, 26], [8, 14, 26, 32]])
    }

    #[test]
    fn test_upsample_exact_values() {
        let out = resize(&Image::plane(small()), 4, 4).unwrap();
        assert_eq!(out, Image::Plane(large()));
    }

    #[test]
    fn test_downsample_is_lossy() {
        let out = resize(&Image::plane(large()), 2, 2).unwrap();
        assert_eq!(out, Image::Plane(arr2(&[[45, 16], [16, 27]])));
    }

    #[test]
    fn test_color_resize_per_channel() {
        let image = Image::from_planes(vec![small(), small(), small()]).unwrap();
        let out = resize(&image, 4, 4).unwrap();
        assert_eq!(out.shape(), vec![4, 4, 3]);
        for plane in out.planes() {
            assert_eq!(plane, large());
        }
    }

    #[test]
    fn test_identity_size_is_exact() {
        let plane = arr2(&[[0u8, 255, 17], [3, 128, 254]]);
        let out = resize(&Image::plane(plane.clone()), 2, 3).unwrap();
        assert_eq!(out, Image::Plane(plane));
    }

    #[test]
    fn test_identity_size_keeps_wide_integers() {
        let big = (1u64 << 53) + 1;
        let plane = arr2(&[[big, u64::MAX], [0, big + 2]]);
        let out = resize(&Image::plane(plane.clone()), 2, 2).unwrap();
        assert_eq!(out, Image::Plane(plane));

        let signed = Array2::from_elem((3, 2), -(1i64 << 60) - 1);
        assert_eq!(bilinear_resize(signed.view(), 3, 2).unwrap(), signed);
    }

    #[test]
    fn test_single_sample_source_is_copied() {
        let big = (1u64 << 53) + 1;
        let out = bilinear_resize(arr2(&[[big]]).view(), 3, 5).unwrap();
        assert!(out.iter().all(|&v| v == big));
    }

    #[test]
    fn test_non_proportional_target() {
        let out = resize(&Image::plane(large()), 3, 7).unwrap();
        assert_eq!(out.dim(), (3, 7));
    }

    #[test]
    fn test_float_samples_are_not_rounded() {
        let plane = arr2(&[[0.0f32, 1.0]]);
        let out = bilinear_resize(plane.view(), 1, 4).unwrap();
        assert!((out[[0, 1]] - 0.25).abs() < 1e-6);
        assert!((out[[0, 2]] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_zero_target() {
        let image = Image::plane(small());
        assert!(matches!(resize(&image, 0, 4), Err(Error::InvalidArgument(_))));
        assert!(matches!(resize(&image, 4, 0), Err(Error::InvalidArgument(_))));

        let options: ResizeOptions = serde_json::from_str(r#"{"height": 1, "width": 1}"#).unwrap();
        let out = resize_with(&image, &options).unwrap();
        assert_eq!(out.dim(), (1, 1));
    }
}
