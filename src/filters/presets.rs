//! Named filter presets.
//!
//! Each preset is a fixed kernel, scale and offset run through
//! [`filter2d`] with the frequency-domain convolver, which pads by
//! replicating the edge samples.

use ndarray::{arr2, Array2};
use std::fmt;
use std::str::FromStr;

use super::convolve::ConvolutionStrategy;
use super::core::{filter2d, FilterOptions};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Blur,
    Smooth,
    SmoothMore,
    Sharpen,
    Detail,
    Contour,
    EdgeEnhance,
    EdgeEnhanceMore,
    FindEdges,
    Emboss,
}

/// 3x3 kernel with `ring` around `center`.
fn ring3(ring: f64, center: f64) -> Array2<f64> {
    let mut kernel = Array2::from_elem((3, 3), ring);
    kernel[[1, 1]] = center;
    kernel
}

impl Preset {
    pub const ALL: [Preset; 10] = [
        Preset::Blur,
        Preset::Smooth,
        Preset::SmoothMore,
        Preset::Sharpen,
        Preset::Detail,
        Preset::Contour,
        Preset::EdgeEnhance,
        Preset::EdgeEnhanceMore,
        Preset::FindEdges,
        Preset::Emboss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Blur => "blur",
            Preset::Smooth => "smooth",
            Preset::SmoothMore => "smooth_more",
            Preset::Sharpen => "sharpen",
            Preset::Detail => "detail",
            Preset::Contour => "contour",
            Preset::EdgeEnhance => "edge_enhance",
            Preset::EdgeEnhanceMore => "edge_enhance_more",
            Preset::FindEdges => "find_edges",
            Preset::Emboss => "emboss",
        }
    }

    pub fn kernel(self) -> Array2<f64> {
        match self {
            Preset::Blur => arr2(&[
                [1.0, 1.0, 1.0, 1.0, 1.0],
                [1.0, 0.0, 0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0, 1.0, 1.0],
            ]),
            Preset::Smooth => ring3(1.0, 5.0),
            Preset::SmoothMore => arr2(&[
                [1.0, 1.0, 1.0, 1.0, 1.0],
                [1.0, 5.0, 5.0, 5.0, 1.0],
                [1.0, 5.0, 44.0, 5.0, 1.0],
                [1.0, 5.0, 5.0, 5.0, 1.0],
                [1.0, 1.0, 1.0, 1.0, 1.0],
            ]),
            Preset::Sharpen => ring3(-2.0, 32.0),
            Preset::Detail => arr2(&[[0.0, -1.0, 0.0], [-1.0, 10.0, -1.0], [0.0, -1.0, 0.0]]),
            Preset::Contour => ring3(-1.0, 8.0),
            Preset::EdgeEnhance => ring3(-1.0, 10.0),
            Preset::EdgeEnhanceMore => ring3(-1.0, 9.0),
            Preset::FindEdges => ring3(-1.0, 8.0),
            Preset::Emboss => arr2(&[[-1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, -1.0]]),
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            Preset::Blur => 16.0,
            Preset::Smooth => 13.0,
            Preset::SmoothMore => 100.0,
            Preset::Sharpen => 16.0,
            Preset::Detail => 6.0,
            Preset::EdgeEnhance => 2.0,
            Preset::Contour | Preset::EdgeEnhanceMore | Preset::FindEdges | Preset::Emboss => 1.0,
        }
    }

    pub fn offset(self) -> f64 {
        match self {
            Preset::Contour => 255.0,
            _ => 0.0,
        }
    }

    pub fn options(self) -> FilterOptions {
        FilterOptions::default()
            .with_scale(self.scale())
            .with_offset(self.offset())
            .with_strategy(ConvolutionStrategy::Fft)
    }

    pub fn apply<T: Sample>(self, image: &Image<T>) -> Result<Image<T>> {
        log::debug!("preset {}", self.name());
        filter2d(image, self.kernel().view(), &self.options())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::invalid(format!("unknown filter preset '{s}'")))
    }
}

pub fn apply_preset<T: Sample>(image: &Image<T>, preset: Preset) -> Result<Image<T>> {
    preset.apply(image)
}

pub fn blur<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Blur.apply(image)
}

pub fn smooth<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Smooth.apply(image)
}

pub fn smooth_more<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::SmoothMore.apply(image)
}

pub fn sharpen<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Sharpen.apply(image)
}

pub fn detail<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Detail.apply(image)
}

pub fn contour<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Contour.apply(image)
}

pub fn edge_enhance<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::EdgeEnhance.apply(image)
}

pub fn edge_enhance_more<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::EdgeEnhanceMore.apply(image)
}

pub fn find_edges<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::FindEdges.apply(image)
}

pub fn emboss<T: Sample>(image: &Image<T>) -> Result<Image<T>> {
    Preset::Emboss.apply(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(h: usize, w: usize, seed: u64) -> Array2<u8> {
        let mut state = seed.wrapping_add(1);
        Array2::from_shape_fn((h, w), |_| {
            state = state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
            (state % 256) as u8
        })
    }

    /// Replicate-padded correlation in integer arithmetic, divided by the
    /// preset scale and rounded half away from zero.
    fn exact_preset(plane: &Array2<u8>, preset: Preset) -> Array2<u8> {
        let kernel = preset.kernel().mapv(|v| v as i64);
        let scale = preset.scale() as i64;
        let offset = preset.offset() as i64;
        let (h, w) = plane.dim();
        let (kh, kw) = kernel.dim();
        let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

        Array2::from_shape_fn((h, w), |(y, x)| {
            let mut sum = 0i64;
            for ky in 0..kh {
                for kx in 0..kw {
                    let sy = clamp(y as isize + ky as isize - (kh / 2) as isize, h);
                    let sx = clamp(x as isize + kx as isize - (kw / 2) as isize, w);
                    sum += plane[[sy, sx]] as i64 * kernel[[ky, kx]];
                }
            }
            let num = sum + offset * scale;
            let rounded = if num >= 0 {
                (2 * num + scale) / (2 * scale)
            } else {
                -((-2 * num + scale) / (2 * scale))
            };
            rounded.clamp(0, 255) as u8
        })
    }

    fn flat(value: u8) -> Image<u8> {
        Image::plane(Array2::from_elem((6, 7), value))
    }

    #[test]
    fn test_kernels_are_odd_and_scales_match_sums() {
        for preset in Preset::ALL {
            let kernel = preset.kernel();
            let (kh, kw) = kernel.dim();
            assert!(kh % 2 == 1 && kw % 2 == 1, "{preset}");

            let sum = kernel.sum();
            let expected = if sum == 0.0 { 1.0 } else { sum };
            assert_eq!(preset.scale(), expected, "{preset}");
        }
    }

    #[test]
    fn test_normalizing_presets_keep_flat_images() {
        // Replicate padding: a flat image stays flat under any sum-normalised kernel.
        for preset in [
            Preset::Blur,
            Preset::Smooth,
            Preset::SmoothMore,
            Preset::Sharpen,
            Preset::Detail,
            Preset::EdgeEnhance,
            Preset::EdgeEnhanceMore,
        ] {
            let out = preset.apply(&flat(90)).unwrap();
            assert!(out.planes().all(|p| p.iter().all(|&v| v == 90)), "{preset}");
        }
    }

    #[test]
    fn test_edge_presets_on_flat_image() {
        let image = flat(90);
        let edges = find_edges(&image).unwrap();
        assert!(edges.planes().all(|p| p.iter().all(|&v| v == 0)));

        let outline = contour(&image).unwrap();
        assert!(outline.planes().all(|p| p.iter().all(|&v| v == 255)));

        let relief = emboss(&image).unwrap();
        assert!(relief.planes().all(|p| p.iter().all(|&v| v == 0)));
    }

    #[test]
    fn test_smooth_preset_interior_matches_spatial_filter() {
        let mut plane = Array2::<u8>::zeros((7, 7));
        plane[[3, 3]] = 255;
        let image = Image::plane(plane);

        let spectral = smooth(&image).unwrap();
        let spatial = filter2d(&image, Preset::Smooth.kernel().view(), &FilterOptions::default()).unwrap();
        // Padding differs only at the border, where both see zeros here.
        assert_eq!(spectral, spatial);
        assert_eq!(spectral.plane_at(0).unwrap()[[3, 3]], 98);
        assert_eq!(spectral.plane_at(0).unwrap()[[2, 3]], 20);
    }

    #[test]
    fn test_presets_match_exact_arithmetic_on_noise() {
        for preset in Preset::ALL {
            for seed in 0..20u64 {
                let plane = noise(16, 16, seed * 7 + 3);
                let out = preset.apply(&Image::plane(plane.clone())).unwrap();
                assert_eq!(
                    out,
                    Image::Plane(exact_preset(&plane, preset)),
                    "{preset} seed {seed}"
                );
            }
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("edge_enhance_more".parse::<Preset>().unwrap(), Preset::EdgeEnhanceMore);
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert!("gaussian".parse::<Preset>().is_err());
    }

    #[test]
    fn test_presets_preserve_shape() {
        let image = Image::from_planes(vec![Array2::<u8>::from_elem((4, 9), 17); 3]).unwrap();
        for preset in Preset::ALL {
            let out = apply_preset(&image, preset).unwrap();
            assert_eq!(out.shape(), vec![4, 9, 3]);
        }
    }
}
