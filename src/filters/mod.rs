//! Convolution-based spatial filtering.
//!
//! ## Supported Formats
//!
//! Filters accept any [`Image`](crate::image::Image): a bare `[H, W]` plane
//! or `[H, W, C]` with any channel count. Every channel is filtered
//! independently with the same kernel. All [`Sample`](crate::sample::Sample)
//! types are supported; integral outputs are rounded and clipped to the
//! type's range.
//!
//! ## Architecture
//!
//! - [`padding`] - zero / edge-replicate borders
//! - [`convolve`] - valid convolution (direct, im2col, FFT) behind the
//!   [`Convolver`](convolve::Convolver) trait
//! - [`core`] - the `filter2d` pipeline (scale, pad, convolve, quantise)
//! - [`presets`] - fixed kernels (blur, sharpen, emboss, ...)

pub mod convolve;
pub mod core;
pub mod padding;
pub mod presets;

pub use self::convolve::{convolve2d, ConvolutionStrategy, Convolver, DirectConvolver, FftConvolver, Im2ColConvolver};
pub use self::core::{filter2d, filter2d_dyn, normalize_kernel, resolve_scale, FilterOptions};
pub use self::padding::{pad_plane, Padding};
pub use self::presets::{apply_preset, Preset};
