//! PNG/JPEG codec adapters over raw sample buffers.
//!
//! Decoded layouts:
//!
//! | Colour type | Result |
//! |-------------|--------|
//! | Luma | `Plane` |
//! | LumaA | 2 channels |
//! | RGB | 3 channels |
//! | RGBA | 4 channels |
//!
//! 16-bit sources decode to `u16` samples; anything else the codec can
//! produce (float, exotic layouts) is converted to RGBA8.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use ndarray::{Array2, Array3};

use super::ImageFormat;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::sample::Sample;

/// JPEG quality used when the caller does not pass one.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedImage {
    U8(Image<u8>),
    U16(Image<u16>),
}

impl DecodedImage {
    pub fn dim(&self) -> (usize, usize) {
        match self {
            DecodedImage::U8(img) => img.dim(),
            DecodedImage::U16(img) => img.dim(),
        }
    }

    pub fn height(&self) -> usize {
        self.dim().0
    }

    pub fn width(&self) -> usize {
        self.dim().1
    }

    pub fn channels(&self) -> Option<usize> {
        match self {
            DecodedImage::U8(img) => img.channels(),
            DecodedImage::U16(img) => img.channels(),
        }
    }

    /// 8-bit view of the samples; 16-bit data keeps its high byte.
    pub fn into_u8(self) -> Image<u8> {
        match self {
            DecodedImage::U8(img) => img,
            DecodedImage::U16(img) => img.map_planes(|p| p.mapv(|v| (v >> 8) as u8)),
        }
    }
}

/// Sample types the codecs can write directly.
pub trait PixelDepth: Sample {
    const BITS: u8;

    fn color_type(channels: usize) -> Option<ExtendedColorType>;

    /// Bytes in the layout `ImageEncoder::write_image` expects (native endian).
    fn to_bytes(samples: &[Self]) -> Vec<u8>;
}

impl PixelDepth for u8 {
    const BITS: u8 = 8;

    fn color_type(channels: usize) -> Option<ExtendedColorType> {
        match channels {
            1 => Some(ExtendedColorType::L8),
            2 => Some(ExtendedColorType::La8),
            3 => Some(ExtendedColorType::Rgb8),
            4 => Some(ExtendedColorType::Rgba8),
            _ => None,
        }
    }

    fn to_bytes(samples: &[Self]) -> Vec<u8> {
        samples.to_vec()
    }
}

impl PixelDepth for u16 {
    const BITS: u8 = 16;

    fn color_type(channels: usize) -> Option<ExtendedColorType> {
        match channels {
            1 => Some(ExtendedColorType::L16),
            2 => Some(ExtendedColorType::La16),
            3 => Some(ExtendedColorType::Rgb16),
            4 => Some(ExtendedColorType::Rgba16),
            _ => None,
        }
    }

    fn to_bytes(samples: &[Self]) -> Vec<u8> {
        samples.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }
}

/// Validate a quality value coming from an untyped surface.
pub fn check_quality(quality: i64) -> Result<u8> {
    if (0..=100).contains(&quality) {
        Ok(quality as u8)
    } else {
        Err(Error::invalid(format!(
            "quality must be between 0 and 100, got {quality}"
        )))
    }
}

fn from_interleaved<T: Sample>(raw: Vec<T>, width: u32, height: u32, channels: usize) -> Result<Image<T>> {
    let (h, w) = (height as usize, width as usize);
    if channels == 1 {
        Ok(Image::Plane(Array2::from_shape_vec((h, w), raw)?))
    } else {
        let cube = Array3::from_shape_vec((h, w, channels), raw)?;
        Image::from_array3(cube.view())
    }
}

fn from_dynamic(img: DynamicImage) -> Result<DecodedImage> {
    let (w, h) = (img.width(), img.height());
    let decoded = match img {
        DynamicImage::ImageLuma8(buf) => DecodedImage::U8(from_interleaved(buf.into_raw(), w, h, 1)?),
        DynamicImage::ImageLumaA8(buf) => DecodedImage::U8(from_interleaved(buf.into_raw(), w, h, 2)?),
        DynamicImage::ImageRgb8(buf) => DecodedImage::U8(from_interleaved(buf.into_raw(), w, h, 3)?),
        DynamicImage::ImageRgba8(buf) => DecodedImage::U8(from_interleaved(buf.into_raw(), w, h, 4)?),
        DynamicImage::ImageLuma16(buf) => DecodedImage::U16(from_interleaved(buf.into_raw(), w, h, 1)?),
        DynamicImage::ImageLumaA16(buf) => DecodedImage::U16(from_interleaved(buf.into_raw(), w, h, 2)?),
        DynamicImage::ImageRgb16(buf) => DecodedImage::U16(from_interleaved(buf.into_raw(), w, h, 3)?),
        DynamicImage::ImageRgba16(buf) => DecodedImage::U16(from_interleaved(buf.into_raw(), w, h, 4)?),
        other => DecodedImage::U8(from_interleaved(other.into_rgba8().into_raw(), w, h, 4)?),
    };
    log::debug!(
        "decoded {}x{} image with {:?} channels",
        decoded.width(),
        decoded.height(),
        decoded.channels()
    );
    Ok(decoded)
}

/// Decode PNG or JPEG bytes, guessing the format from the signature.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
    from_dynamic(img)
}

/// Decode bytes known to be in `format`.
pub fn decode_as(bytes: &[u8], format: ImageFormat) -> Result<DecodedImage> {
    let img = image::load_from_memory_with_format(bytes, format.into()).map_err(Error::Decode)?;
    from_dynamic(img)
}

/// Encode `image` as `format`.
///
/// `quality` (0-100) only affects JPEG; values above 100 are rejected
/// before the encoder is involved.
pub fn encode<T: PixelDepth>(image: &Image<T>, format: ImageFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    if let Some(q) = quality {
        check_quality(q as i64)?;
    }

    let (h, w) = image.dim();
    let channels = image.channels().unwrap_or(1);
    let color_type = T::color_type(channels).ok_or_else(|| {
        Error::invalid(format!("cannot encode an image with {channels} channels"))
    })?;
    let width = u32::try_from(w).map_err(|_| Error::invalid(format!("width {w} too large")))?;
    let height = u32::try_from(h).map_err(|_| Error::invalid(format!("height {h} too large")))?;
    let bytes = T::to_bytes(&image.to_interleaved());

    let mut out = Vec::new();
    match format {
        ImageFormat::Png => {
            PngEncoder::new(&mut out)
                .write_image(&bytes, width, height, color_type)
                .map_err(Error::Encode)?;
        }
        ImageFormat::Jpeg => {
            if T::BITS != 8 || !(channels == 1 || channels == 3) {
                return Err(Error::invalid(format!(
                    "jpeg supports 8-bit gray or RGB images, got {channels} channels at {} bits",
                    T::BITS
                )));
            }
            // The codec's lowest setting is 1.
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).max(1);
            JpegEncoder::new_with_quality(&mut out, quality)
                .encode(&bytes, width, height, color_type)
                .map_err(Error::Encode)?;
        }
    }

    log::debug!("encoded {}x{}x{} image as {:?} ({} bytes)", w, h, channels, format, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn gradient_rgb() -> Image<u8> {
        let planes = (0..3)
            .map(|c| Array2::from_shape_fn((8, 8), |(y, x)| (y * 24 + x * 8 + c * 10) as u8))
            .collect();
        Image::from_planes(planes).unwrap()
    }

    #[test]
    fn test_png_round_trip_u8() {
        let image = gradient_rgb();
        let bytes = encode(&image, ImageFormat::Png, None).unwrap();
        assert_eq!(decode(&bytes).unwrap(), DecodedImage::U8(image));
    }

    #[test]
    fn test_png_round_trip_gray_and_alpha() {
        let gray = Image::plane(arr2(&[[64u8, 191], [255, 0]]));
        let bytes = encode(&gray, ImageFormat::Png, None).unwrap();
        assert_eq!(decode_as(&bytes, ImageFormat::Png).unwrap(), DecodedImage::U8(gray));

        let la = Image::from_planes(vec![arr2(&[[1u8, 2]]), arr2(&[[128u8, 255]])]).unwrap();
        let bytes = encode(&la, ImageFormat::Png, None).unwrap();
        assert_eq!(decode(&bytes).unwrap().channels(), Some(2));
    }

    #[test]
    fn test_png_round_trip_u16() {
        let plane = Array2::from_shape_fn((5, 6), |(y, x)| (y * 9000 + x * 1234) as u16);
        let image = Image::plane(plane);
        let bytes = encode(&image, ImageFormat::Png, None).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, DecodedImage::U16(image));
        assert_eq!(decoded.into_u8().dim(), (5, 6));
    }

    #[test]
    fn test_quality_validation() {
        let image = gradient_rgb();
        assert!(matches!(
            encode(&image, ImageFormat::Jpeg, Some(101)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(check_quality(-1).is_err());
        assert_eq!(check_quality(0).unwrap(), 0);
        assert!(encode(&image, ImageFormat::Jpeg, Some(0)).is_ok());
    }

    #[test]
    fn test_jpeg_rejects_alpha() {
        let rgba = Image::from_planes(vec![Array2::<u8>::zeros((2, 2)); 4]).unwrap();
        assert!(matches!(
            encode(&rgba, ImageFormat::Jpeg, None),
            Err(Error::InvalidArgument(_))
        ));

        let five = Image::from_planes(vec![Array2::<u8>::zeros((2, 2)); 5]).unwrap();
        assert!(encode(&five, ImageFormat::Png, None).is_err());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode(b"not an image"), Err(Error::Decode(_))));
    }
}
