//! Error type shared by the filter, transform and I/O layers.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Wrong buffer shape, out-of-range quality, zero resize target, bad kernel.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Buffer construction failed (overflowing or inconsistent shape).
    #[error("allocation failed: {0}")]
    Allocation(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Error::Allocation(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<Error> for pyo3::PyErr {
    fn from(err: Error) -> Self {
        use pyo3::exceptions::{PyIOError, PyMemoryError, PyValueError};
        match err {
            Error::InvalidArgument(_) | Error::ShapeMismatch { .. } => {
                PyValueError::new_err(err.to_string())
            }
            Error::Allocation(_) => PyMemoryError::new_err(err.to_string()),
            Error::Decode(_) | Error::Encode(_) | Error::Io(_) => PyIOError::new_err(err.to_string()),
        }
    }
}
