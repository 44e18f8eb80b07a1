//! Valid 2-D convolution of an `f64` plane with a kernel.
//!
//! All implementations compute the same quantity: for an input `A`
//! of shape `[R1, C1]` and kernel `B` of shape `[R2, C2]` the output is
//! `[R1-R2+1, C1-C2+1]` with
//!
//! ```text
//! out[i, j] = sum_{u, v} A[i + u, j + v] * B[u, v]
//! ```
//!
//! (the kernel slides over the input without being flipped). Callers pad
//! the input beforehand for a same-size result; each implementation
//! advertises the [`Padding`] it is meant to be combined with.
//!
//! - [`DirectConvolver`]: nested sliding-window accumulation
//! - [`Im2ColConvolver`]: unrolled patch matrix multiplied by the flattened kernel
//! - [`FftConvolver`]: frequency-domain product (faster for large kernels)

use ndarray::{s, Array1, Array2, ArrayView2};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::padding::Padding;
use crate::error::{Error, Result};

/// A valid-convolution implementation.
pub trait Convolver: Send + Sync {
    /// Padding policy the pipeline applies before calling [`Convolver::convolve_valid`].
    fn padding(&self) -> Padding;

    /// Convolve `input` with `kernel`, returning `[R1-R2+1, C1-C2+1]`.
    fn convolve_valid(&self, input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Result<Array2<f64>>;

    fn name(&self) -> &'static str;
}

/// Which convolver the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvolutionStrategy {
    Direct,
    #[default]
    Im2Col,
    Fft,
    /// `Fft` once the kernel area reaches the threshold, `Im2Col` below it.
    Auto,
}

impl std::str::FromStr for ConvolutionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(ConvolutionStrategy::Direct),
            "im2col" => Ok(ConvolutionStrategy::Im2Col),
            "fft" => Ok(ConvolutionStrategy::Fft),
            "auto" => Ok(ConvolutionStrategy::Auto),
            other => Err(Error::invalid(format!("unknown convolution strategy '{other}'"))),
        }
    }
}

impl ConvolutionStrategy {
    pub fn convolver(self, kernel_dim: (usize, usize), fft_threshold: usize) -> Box<dyn Convolver> {
        match self {
            ConvolutionStrategy::Direct => Box::new(DirectConvolver),
            ConvolutionStrategy::Im2Col => Box::new(Im2ColConvolver),
            ConvolutionStrategy::Fft => Box::new(FftConvolver),
            ConvolutionStrategy::Auto => {
                if kernel_dim.0 * kernel_dim.1 >= fft_threshold {
                    Box::new(FftConvolver)
                } else {
                    Box::new(Im2ColConvolver)
                }
            }
        }
    }
}

/// Valid convolution using the unrolled-patch form.
pub fn convolve2d(input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Result<Array2<f64>> {
    Im2ColConvolver.convolve_valid(input, kernel)
}

/// Output shape of a valid convolution, rejecting degenerate kernels.
fn valid_dim(input: (usize, usize), kernel: (usize, usize)) -> Result<(usize, usize)> {
    let (r1, c1) = input;
    let (r2, c2) = kernel;
    if r2 == 0 || c2 == 0 {
        return Err(Error::invalid(format!("kernel must not be empty, got {r2}x{c2}")));
    }
    if r2 > r1 || c2 > c1 {
        return Err(Error::invalid(format!(
            "kernel {r2}x{c2} is larger than input {r1}x{c1}"
        )));
    }
    Ok((r1 - r2 + 1, c1 - c2 + 1))
}

// ============================================================================
// Direct
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectConvolver;

impl Convolver for DirectConvolver {
    fn padding(&self) -> Padding {
        Padding::Zero
    }

    fn convolve_valid(&self, input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (out_h, out_w) = valid_dim(input.dim(), kernel.dim())?;
        let (kh, kw) = kernel.dim();
        let mut output = Array2::<f64>::zeros((out_h, out_w));

        for y in 0..out_h {
            for x in 0..out_w {
                let mut sum = 0.0f64;
                for ky in 0..kh {
                    for kx in 0..kw {
                        sum += input[[y + ky, x + kx]] * kernel[[ky, kx]];
                    }
                }
                output[[y, x]] = sum;
            }
        }

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

// ============================================================================
// Im2Col
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Im2ColConvolver;

/// Unroll every `kh x kw` window of `input` into one row.
///
/// Row order follows output positions in row-major order; column order
/// follows the kernel in row-major order.
pub fn im2col(input: ArrayView2<f64>, kh: usize, kw: usize) -> Result<Array2<f64>> {
    let (out_h, out_w) = valid_dim(input.dim(), (kh, kw))?;
    let rows = out_h
        .checked_mul(out_w)
        .ok_or_else(|| Error::Allocation(format!("patch matrix rows overflow ({out_h}x{out_w})")))?;
    let cols = kh * kw;
    rows.checked_mul(cols)
        .ok_or_else(|| Error::Allocation(format!("patch matrix overflow ({rows}x{cols})")))?;

    let mut mat = Array2::<f64>::zeros((rows, cols));
    for ky in 0..kh {
        for kx in 0..kw {
            let col = ky * kw + kx;
            let window = input.slice(s![ky..ky + out_h, kx..kx + out_w]);
            for ((y, x), &v) in window.indexed_iter() {
                mat[[y * out_w + x, col]] = v;
            }
        }
    }
    Ok(mat)
}

impl Convolver for Im2ColConvolver {
    fn padding(&self) -> Padding {
        Padding::Zero
    }

    fn convolve_valid(&self, input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (out_h, out_w) = valid_dim(input.dim(), kernel.dim())?;
        let (kh, kw) = kernel.dim();

        let patches = im2col(input, kh, kw)?;
        let flat: Array1<f64> = kernel.iter().copied().collect();
        let convolved = patches.dot(&flat);

        Ok(convolved.into_shape_with_order((out_h, out_w))?)
    }

    fn name(&self) -> &'static str {
        "im2col"
    }
}

// ============================================================================
// FFT
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FftConvolver;

/// Spacing of the grid FFT output is snapped onto (2^-20).
///
/// Sums that are exact in binary (integer samples times dyadic kernel
/// weights) come back bit-identical to the spatial convolvers.
pub const FFT_SNAP: f64 = 1.0 / 1_048_576.0;

#[inline]
fn snap(v: f64) -> f64 {
    (v / FFT_SNAP).round() * FFT_SNAP
}

struct Fft2d {
    row_fwd: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            row_fwd: planner.plan_fft_forward(cols),
            col_fwd: planner.plan_fft_forward(rows),
            row_inv: planner.plan_fft_inverse(cols),
            col_inv: planner.plan_fft_inverse(rows),
        }
    }

    fn forward(&self, data: &mut Array2<Complex64>) {
        transform(data, &self.row_fwd, &self.col_fwd);
    }

    fn inverse(&self, data: &mut Array2<Complex64>) {
        transform(data, &self.row_inv, &self.col_inv);
    }
}

/// Separable 2-D transform: rows first, then columns.
fn transform(data: &mut Array2<Complex64>, row_fft: &Arc<dyn Fft<f64>>, col_fft: &Arc<dyn Fft<f64>>) {
    let mut buf: Vec<Complex64> = Vec::with_capacity(data.nrows().max(data.ncols()));

    for mut row in data.rows_mut() {
        buf.clear();
        buf.extend(row.iter().copied());
        row_fft.process(&mut buf);
        row.iter_mut().zip(buf.iter()).for_each(|(dst, &src)| *dst = src);
    }

    for mut col in data.columns_mut() {
        buf.clear();
        buf.extend(col.iter().copied());
        col_fft.process(&mut buf);
        col.iter_mut().zip(buf.iter()).for_each(|(dst, &src)| *dst = src);
    }
}

/// Zero-extend a real plane into a complex buffer of shape `dim`.
fn embed(plane: ArrayView2<f64>, dim: (usize, usize)) -> Array2<Complex64> {
    let mut out = Array2::<Complex64>::zeros(dim);
    let (h, w) = plane.dim();
    out.slice_mut(s![..h, ..w])
        .zip_mut_with(&plane, |dst, &src| *dst = Complex64::new(src, 0.0));
    out
}

impl Convolver for FftConvolver {
    fn padding(&self) -> Padding {
        Padding::Replicate
    }

    fn convolve_valid(&self, input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Result<Array2<f64>> {
        valid_dim(input.dim(), kernel.dim())?;
        let (r1, c1) = input.dim();
        let (r2, c2) = kernel.dim();

        // Linear (non-circular) size; flipping the kernel turns the
        // spectral product into the sliding dot product above.
        let full = (r1 + r2 - 1, c1 + c2 - 1);
        let plan = Fft2d::new(full.0, full.1);

        let mut spectrum = embed(input, full);
        let mut kernel_spectrum = embed(kernel.slice(s![..;-1, ..;-1]), full);
        plan.forward(&mut spectrum);
        plan.forward(&mut kernel_spectrum);

        spectrum.zip_mut_with(&kernel_spectrum, |a, &b| *a *= b);
        plan.inverse(&mut spectrum);

        let norm = 1.0 / (full.0 * full.1) as f64;
        Ok(spectrum
            .slice(s![r2 - 1..r1, c2 - 1..c1])
            .mapv(|v| snap(v.re * norm)))
    }

    fn name(&self) -> &'static str {
        "fft"
    }
}
