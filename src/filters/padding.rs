//! Border padding for same-size convolution.
//!
//! A plane of shape `[H, W]` filtered with a `[Kh, Kw]` kernel is padded
//! to `[H + 2*(Kh/2), W + 2*(Kw/2)]` so that a valid convolution yields the
//! original extent again. Odd kernels pad symmetrically.

use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Border filled with zero.
    Zero,
    /// Border copies the nearest edge sample (clamped coordinates).
    Replicate,
}

/// Per-axis padding amounts `(pad_h, pad_w)` for a kernel shape.
#[inline]
pub fn pad_amounts(kernel_dim: (usize, usize)) -> (usize, usize) {
    (kernel_dim.0 / 2, kernel_dim.1 / 2)
}

/// Pad a plane for a kernel of shape `kernel_dim`.
pub fn pad_plane(plane: ArrayView2<f64>, kernel_dim: (usize, usize), padding: Padding) -> Array2<f64> {
    let (height, width) = plane.dim();
    let (pad_h, pad_w) = pad_amounts(kernel_dim);
    let out_h = height + pad_h * 2;
    let out_w = width + pad_w * 2;

    let mut padded = Array2::<f64>::zeros((out_h, out_w));
    padded
        .slice_mut(s![pad_h..pad_h + height, pad_w..pad_w + width])
        .assign(&plane);

    if padding == Padding::Zero || height == 0 || width == 0 {
        return padded;
    }

    // Replicate: every border cell reads the clamped source coordinate.
    for y in 0..out_h {
        let sy = (y as isize - pad_h as isize).clamp(0, height as isize - 1) as usize;
        let interior_row = y >= pad_h && y < pad_h + height;
        for x in 0..out_w {
            if interior_row && x >= pad_w && x < pad_w + width {
                continue;
            }
            let sx = (x as isize - pad_w as isize).clamp(0, width as isize - 1) as usize;
            padded[[y, x]] = plane[[sy, sx]];
        }
    }

    padded
}
