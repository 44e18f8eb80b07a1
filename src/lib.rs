//! pixelplane
//!
//! Image filtering and resampling over dense sample arrays, with PNG/JPEG
//! I/O, Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Buffers are `[height, width]` or `[height, width, channels]` with the
//! channel axis last:
//! - **Plane**: (height, width) - single channel without channel axis
//! - **Multi-channel**: (height, width, C) - e.g. gray+alpha, RGB, RGBA
//!
//! Samples may be any signed/unsigned integer width (8-64 bit) or `f32`/`f64`.
//! Intermediate results are always `f64`; integral outputs are rounded and
//! clipped to the sample type's range.
//!
//! ## Operations
//! - [`filters::filter2d`] - same-size 2-D filtering with scale and offset
//! - [`filters::presets`] - blur, smooth, sharpen, contour, emboss, ...
//! - [`filters::convolve2d`] - valid 2-D convolution
//! - [`transform::resize`] - bilinear resize
//! - [`io::imread`] / [`io::imsave`] - PNG / JPEG files chosen by extension

pub mod error;
pub mod filters;
pub mod image;
pub mod io;
pub mod sample;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::error::{Error, Result};
pub use crate::image::Image;
pub use crate::sample::{Sample, SampleKind};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArrayDyn, PyReadonlyArray2, PyReadonlyArrayDyn};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::{self, ConvolutionStrategy, FilterOptions, Preset};
    use crate::image::Image;
    use crate::io::{self, DecodedImage};
    use crate::sample::Sample;
    use crate::transform;

    fn options(scale: Option<f64>, offset: f64, strategy: &str) -> PyResult<FilterOptions> {
        let strategy: ConvolutionStrategy = strategy.parse()?;
        let mut options = FilterOptions::default().with_offset(offset).with_strategy(strategy);
        options.scale = scale;
        Ok(options)
    }

    fn dims(height: i64, width: i64) -> PyResult<(usize, usize)> {
        if height <= 0 || width <= 0 {
            return Err(PyValueError::new_err(format!(
                "resize target must be positive, got {height}x{width}"
            )));
        }
        Ok((height as usize, width as usize))
    }

    fn filter_impl<'py, T: Sample + numpy::Element>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, T>,
        kernel: PyReadonlyArray2<'py, f64>,
        options: &FilterOptions,
    ) -> PyResult<Bound<'py, PyArrayDyn<T>>> {
        let result = filters::filter2d_dyn(image.as_array(), kernel.as_array(), options)?;
        Ok(result.into_pyarray(py))
    }

    fn resize_impl<'py, T: Sample + numpy::Element>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, T>,
        height: i64,
        width: i64,
    ) -> PyResult<Bound<'py, PyArrayDyn<T>>> {
        let (height, width) = dims(height, width)?;
        let input = Image::from_dyn(image.as_array())?;
        let result = transform::resize(&input, height, width)?;
        Ok(result.to_dyn().into_pyarray(py))
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    /// Filter a u8 image (H, W) or (H, W, C) with an arbitrary kernel.
    ///
    /// # Arguments
    /// * `image` - Input image
    /// * `kernel` - 2D float kernel, odd dimensions
    /// * `scale` - Kernel divisor (default: kernel sum, 1 if the sum is zero)
    /// * `offset` - Added to each filtered sample before clipping
    /// * `strategy` - "im2col", "direct", "fft" or "auto"
    #[pyfunction]
    #[pyo3(signature = (image, kernel, scale=None, offset=0.0, strategy="im2col"))]
    pub fn filter2d<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        kernel: PyReadonlyArray2<'py, f64>,
        scale: Option<f64>,
        offset: f64,
        strategy: &str,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        filter_impl(py, image, kernel, &options(scale, offset, strategy)?)
    }

    /// Filter a f32 image. Values are not rounded or clipped.
    #[pyfunction]
    #[pyo3(signature = (image, kernel, scale=None, offset=0.0, strategy="im2col"))]
    pub fn filter2d_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, f32>,
        kernel: PyReadonlyArray2<'py, f64>,
        scale: Option<f64>,
        offset: f64,
        strategy: &str,
    ) -> PyResult<Bound<'py, PyArrayDyn<f32>>> {
        filter_impl(py, image, kernel, &options(scale, offset, strategy)?)
    }

    /// Valid 2D convolution of two float arrays.
    #[pyfunction]
    pub fn convolve2d<'py>(
        py: Python<'py>,
        arr1: PyReadonlyArray2<'py, f64>,
        arr2: PyReadonlyArray2<'py, f64>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let result = filters::convolve2d(arr1.as_array(), arr2.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Apply a named preset ("blur", "smooth", "sharpen", ...).
    #[pyfunction]
    pub fn preset<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        name: &str,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        let preset: Preset = name.parse()?;
        let input = Image::from_dyn(image.as_array())?;
        Ok(preset.apply(&input)?.to_dyn().into_pyarray(py))
    }

    macro_rules! preset_fn {
        ($($name:ident => $preset:expr),* $(,)?) => {
            $(
                #[pyfunction]
                pub fn $name<'py>(
                    py: Python<'py>,
                    image: PyReadonlyArrayDyn<'py, u8>,
                ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
                    let input = Image::from_dyn(image.as_array())?;
                    Ok($preset.apply(&input)?.to_dyn().into_pyarray(py))
                }
            )*
        };
    }

    preset_fn!(
        blur => Preset::Blur,
        smooth => Preset::Smooth,
        smooth_more => Preset::SmoothMore,
        sharpen => Preset::Sharpen,
        detail => Preset::Detail,
        contour => Preset::Contour,
        edge_enhance => Preset::EdgeEnhance,
        edge_enhance_more => Preset::EdgeEnhanceMore,
        find_edges => Preset::FindEdges,
        emboss => Preset::Emboss,
    );

    // ========================================================================
    // Transform
    // ========================================================================

    /// Bilinear resize of a u8 image.
    #[pyfunction]
    pub fn resize<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        height: i64,
        width: i64,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        resize_impl(py, image, height, width)
    }

    /// Bilinear resize of a f32 image.
    #[pyfunction]
    pub fn resize_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, f32>,
        height: i64,
        width: i64,
    ) -> PyResult<Bound<'py, PyArrayDyn<f32>>> {
        resize_impl(py, image, height, width)
    }

    // ========================================================================
    // I/O
    // ========================================================================

    /// Load a PNG or JPEG file. Returns None for unknown extensions.
    #[pyfunction]
    pub fn imread<'py>(py: Python<'py>, filename: &str) -> PyResult<Option<Bound<'py, PyAny>>> {
        let decoded = match io::imread(filename)? {
            Some(decoded) => decoded,
            None => return Ok(None),
        };
        let array = match decoded {
            DecodedImage::U8(img) => img.to_dyn().into_pyarray(py).into_any(),
            DecodedImage::U16(img) => img.to_dyn().into_pyarray(py).into_any(),
        };
        Ok(Some(array))
    }

    /// Save a u8 image as PNG or JPEG. Returns False for unknown extensions.
    #[pyfunction]
    #[pyo3(signature = (filename, image, quality=None))]
    pub fn imsave<'py>(
        filename: &str,
        image: PyReadonlyArrayDyn<'py, u8>,
        quality: Option<i64>,
    ) -> PyResult<bool> {
        let quality = quality.map(io::check_quality).transpose()?;
        let input = Image::from_dyn(image.as_array())?;
        Ok(io::imsave(filename, &input, quality)?)
    }

    /// pixelplane Rust extension module
    #[pymodule]
    pub fn pixelplane(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Filtering
        m.add_function(wrap_pyfunction!(filter2d, m)?)?;
        m.add_function(wrap_pyfunction!(filter2d_f32, m)?)?;
        m.add_function(wrap_pyfunction!(convolve2d, m)?)?;
        m.add_function(wrap_pyfunction!(preset, m)?)?;

        // Presets
        m.add_function(wrap_pyfunction!(blur, m)?)?;
        m.add_function(wrap_pyfunction!(smooth, m)?)?;
        m.add_function(wrap_pyfunction!(smooth_more, m)?)?;
        m.add_function(wrap_pyfunction!(sharpen, m)?)?;
        m.add_function(wrap_pyfunction!(detail, m)?)?;
        m.add_function(wrap_pyfunction!(contour, m)?)?;
        m.add_function(wrap_pyfunction!(edge_enhance, m)?)?;
        m.add_function(wrap_pyfunction!(edge_enhance_more, m)?)?;
        m.add_function(wrap_pyfunction!(find_edges, m)?)?;
        m.add_function(wrap_pyfunction!(emboss, m)?)?;

        // Transform
        m.add_function(wrap_pyfunction!(resize, m)?)?;
        m.add_function(wrap_pyfunction!(resize_f32, m)?)?;

        // I/O
        m.add_function(wrap_pyfunction!(imread, m)?)?;
        m.add_function(wrap_pyfunction!(imsave, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::pixelplane;
