//! Image container: a single plane or an ordered set of channel planes.
//!
//! Buffers coming from numpy, codecs or callers are `[H, W]` or
//! `[H, W, C]` arrays with the channel axis last. Internally a
//! multi-channel image is kept as one `Array2` per channel so that the
//! filter and resize engines only ever deal with planes; operations are
//! written once over a plane and lifted with [`Image::map_planes`].

use ndarray::{Array2, Array3, ArrayD, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::sample::Sample;

#[derive(Debug, Clone, PartialEq)]
pub enum Image<T> {
    /// `[H, W]` buffer without channel axis.
    Plane(Array2<T>),
    /// `[H, W, C]` buffer stored as `C` planes of identical shape.
    MultiChannel(Vec<Array2<T>>),
}

impl<T: Sample> Image<T> {
    pub fn plane(plane: Array2<T>) -> Self {
        Image::Plane(plane)
    }

    /// Build a multi-channel image from planes.
    ///
    /// At least one plane is required and all planes must share `(H, W)`.
    pub fn from_planes(planes: Vec<Array2<T>>) -> Result<Self> {
        let first = planes
            .first()
            .ok_or_else(|| Error::invalid("multi-channel image needs at least one plane"))?
            .dim();
        if let Some(bad) = planes.iter().find(|p| p.dim() != first) {
            return Err(Error::ShapeMismatch {
                expected: first,
                actual: bad.dim(),
            });
        }
        Ok(Image::MultiChannel(planes))
    }

    /// Split an `[H, W, C]` array into channel planes.
    pub fn from_array3(array: ArrayView3<T>) -> Result<Self> {
        let planes = array
            .axis_iter(Axis(2))
            .map(|plane| plane.to_owned())
            .collect();
        Self::from_planes(planes)
    }

    /// Accept a dynamically shaped buffer: 2-D becomes a plane, 3-D a
    /// multi-channel image. Any other rank is rejected.
    pub fn from_dyn(array: ArrayViewD<T>) -> Result<Self> {
        match array.ndim() {
            2 => {
                let plane = array
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| Error::invalid(e.to_string()))?;
                Ok(Image::Plane(plane.to_owned()))
            }
            3 => {
                let cube = array
                    .into_dimensionality::<Ix3>()
                    .map_err(|e| Error::invalid(e.to_string()))?;
                Self::from_array3(cube)
            }
            n => Err(Error::invalid(format!(
                "expected a [H, W] or [H, W, C] sample buffer, got {n} dimensions"
            ))),
        }
    }

    pub fn height(&self) -> usize {
        self.dim().0
    }

    pub fn width(&self) -> usize {
        self.dim().1
    }

    /// `(H, W)` shared by all planes.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Image::Plane(p) => p.dim(),
            Image::MultiChannel(planes) => planes.first().map(|p| p.dim()).unwrap_or((0, 0)),
        }
    }

    /// Channel count, `None` for a bare plane.
    pub fn channels(&self) -> Option<usize> {
        match self {
            Image::Plane(_) => None,
            Image::MultiChannel(planes) => Some(planes.len()),
        }
    }

    /// Shape as it would appear on the outer buffer.
    pub fn shape(&self) -> Vec<usize> {
        let (h, w) = self.dim();
        match self.channels() {
            None => vec![h, w],
            Some(c) => vec![h, w, c],
        }
    }

    pub fn planes(&self) -> impl Iterator<Item = ArrayView2<'_, T>> + '_ {
        let slice: &[Array2<T>] = match self {
            Image::Plane(p) => std::slice::from_ref(p),
            Image::MultiChannel(planes) => planes.as_slice(),
        };
        slice.iter().map(|p| p.view())
    }

    pub fn plane_at(&self, channel: usize) -> Option<ArrayView2<'_, T>> {
        match self {
            Image::Plane(p) if channel == 0 => Some(p.view()),
            Image::Plane(_) => None,
            Image::MultiChannel(planes) => planes.get(channel).map(|p| p.view()),
        }
    }

    /// Apply `f` to every plane, keeping the variant.
    ///
    /// Channel planes are processed in parallel and gathered in order.
    pub fn map_planes<U, F>(&self, f: F) -> Image<U>
    where
        U: Sample,
        F: Fn(ArrayView2<T>) -> Array2<U> + Send + Sync,
    {
        match self {
            Image::Plane(p) => Image::Plane(f(p.view())),
            Image::MultiChannel(planes) => {
                Image::MultiChannel(planes.par_iter().map(|p| f(p.view())).collect())
            }
        }
    }

    /// Fallible variant of [`Image::map_planes`]; the first error wins.
    pub fn try_map_planes<U, F>(&self, f: F) -> Result<Image<U>>
    where
        U: Sample,
        F: Fn(ArrayView2<T>) -> Result<Array2<U>> + Send + Sync,
    {
        match self {
            Image::Plane(p) => Ok(Image::Plane(f(p.view())?)),
            Image::MultiChannel(planes) => {
                let out = planes
                    .par_iter()
                    .map(|p| f(p.view()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Image::MultiChannel(out))
            }
        }
    }

    /// Reassemble into `[H, W, C]`; a plane becomes `[H, W, 1]`.
    pub fn to_array3(&self) -> Array3<T> {
        let (h, w) = self.dim();
        let c = self.channels().unwrap_or(1);
        let mut out = Array3::<T>::default((h, w, c));
        for (ch, plane) in self.planes().enumerate() {
            out.index_axis_mut(Axis(2), ch).assign(&plane);
        }
        out
    }

    /// Reassemble into a buffer of the original rank.
    pub fn to_dyn(&self) -> ArrayD<T> {
        match self {
            Image::Plane(p) => p.clone().into_dyn(),
            Image::MultiChannel(_) => self.to_array3().into_dyn(),
        }
    }

    /// Interleaved row-major samples (`y`, `x`, `c` order).
    pub fn to_interleaved(&self) -> Vec<T> {
        match self {
            Image::Plane(p) => p.iter().copied().collect(),
            Image::MultiChannel(_) => self.to_array3().iter().copied().collect(),
        }
    }
}
