//! Geometric transforms.

pub mod resize;

pub use resize::{bilinear_resize, resize, resize_with, ResizeOptions};
