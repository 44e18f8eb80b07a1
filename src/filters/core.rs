//! Filter pipeline: normalise, pad, convolve, quantise.
//!
//! `filter2d` is the general entry point used directly and by the named
//! presets. For each plane of the image:
//! 1. the kernel copy is divided by the resolved scale
//! 2. the plane is padded according to the convolver's policy
//! 3. the padded plane is convolved back to its original extent
//! 4. `offset` is added and the result mapped into the sample type
//!    (rounded and clipped for integral types)

use ndarray::{s, Array2, ArrayD, ArrayView2, ArrayViewD};
use serde::{Deserialize, Serialize};

use super::convolve::{ConvolutionStrategy, Convolver};
use super::padding::{pad_amounts, pad_plane};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::sample::Sample;

/// Kernel area from which `ConvolutionStrategy::Auto` switches to FFT.
pub const DEFAULT_FFT_THRESHOLD: usize = 121;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Divisor applied to the kernel; `None` uses the kernel sum.
    pub scale: Option<f64>,
    /// Added to every convolved sample before quantisation.
    pub offset: f64,
    pub strategy: ConvolutionStrategy,
    pub fft_threshold: usize,
    /// Accept even kernel sizes (asymmetric padding).
    pub allow_even_kernel: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            scale: None,
            offset: 0.0,
            strategy: ConvolutionStrategy::default(),
            fft_threshold: DEFAULT_FFT_THRESHOLD,
            allow_even_kernel: false,
        }
    }
}

impl FilterOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_strategy(mut self, strategy: ConvolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Effective divisor: explicit scale or the kernel sum, with zero treated as 1.
pub fn resolve_scale(kernel: ArrayView2<f64>, scale: Option<f64>) -> f64 {
    let scale = scale.unwrap_or_else(|| kernel.sum());
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}

/// Copy of `kernel` divided by the resolved scale.
pub fn normalize_kernel(kernel: ArrayView2<f64>, scale: Option<f64>) -> Array2<f64> {
    let divisor = resolve_scale(kernel, scale);
    kernel.mapv(|v| v * (1.0 / divisor))
}

fn validate_kernel(kernel: ArrayView2<f64>, allow_even: bool) -> Result<()> {
    let (kh, kw) = kernel.dim();
    if kh == 0 || kw == 0 {
        return Err(Error::invalid(format!("kernel must not be empty, got {kh}x{kw}")));
    }
    if !allow_even && (kh % 2 == 0 || kw % 2 == 0) {
        return Err(Error::invalid(format!(
            "even kernels are unsupported for symmetric filtering, got {kh}x{kw}"
        )));
    }
    Ok(())
}

/// Filter one plane with an already normalised kernel.
///
/// # Arguments
/// * `plane` - Input plane (height, width)
/// * `kernel` - Kernel already divided by its scale
/// * `offset` - Added to each filtered sample before rounding/clipping
/// * `convolver` - Convolution implementation; its padding policy is applied first
///
/// # Returns
/// Plane with the same shape and sample type as `plane`
pub fn filter_plane<T: Sample>(
    plane: ArrayView2<T>,
    kernel: ArrayView2<f64>,
    offset: f64,
    convolver: &dyn Convolver,
) -> Result<Array2<T>> {
    let (height, width) = plane.dim();
    if height == 0 || width == 0 {
        return Ok(Array2::<T>::default((height, width)));
    }

    let samples = plane.mapv(|v| v.to_f64());
    let padded = pad_plane(samples.view(), kernel.dim(), convolver.padding());
    let convolved = convolver.convolve_valid(padded.view(), kernel)?;

    // Odd kernels already give (H, W); even ones leave one extra row/col.
    let cropped = convolved.slice(s![..height, ..width]);
    log::trace!(
        "filter_plane: {}x{} via {} -> {:?}",
        height,
        width,
        convolver.name(),
        convolved.dim()
    );

    let kind = T::KIND;
    Ok(cropped.mapv(|v| T::from_f64(kind.quantize(v + offset))))
}

/// Filter an image with an arbitrary kernel.
///
/// The caller's kernel is never modified.
///
/// # Arguments
/// * `image` - Plane or multi-channel image of any sample type
/// * `kernel` - 2D float kernel, odd dimensions unless `allow_even_kernel` is set
/// * `options` - Scale, offset and convolution strategy
///
/// # Returns
/// Image with the same shape and sample type as `image`
pub fn filter2d<T: Sample>(
    image: &Image<T>,
    kernel: ArrayView2<f64>,
    options: &FilterOptions,
) -> Result<Image<T>> {
    validate_kernel(kernel, options.allow_even_kernel)?;

    let divisor = resolve_scale(kernel, options.scale);
    let normalized = normalize_kernel(kernel, options.scale);
    let convolver = options.strategy.convolver(kernel.dim(), options.fft_threshold);

    log::debug!(
        "filter2d: kernel {:?} scale {} offset {} pad {:?} via {} on {:?} {}",
        kernel.dim(),
        divisor,
        options.offset,
        pad_amounts(kernel.dim()),
        convolver.name(),
        image.shape(),
        T::KIND
    );

    let convolver = convolver.as_ref();
    image.try_map_planes(|plane| filter_plane(plane, normalized.view(), options.offset, convolver))
}

/// Filter a raw `[H, W]` / `[H, W, C]` buffer.
pub fn filter2d_dyn<T: Sample>(
    array: ArrayViewD<T>,
    kernel: ArrayView2<f64>,
    options: &FilterOptions,
) -> Result<ArrayD<T>> {
    let image = Image::from_dyn(array)?;
    Ok(filter2d(&image, kernel, options)?.to_dyn())
}
