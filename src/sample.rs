//! Sample element types.
//!
//! Every buffer handled by the crate stores one of a closed set of
//! primitive element types. The set is described by [`SampleKind`] and
//! the per-type behaviour (conversion to and from the `f64` working
//! precision, representable range) by the [`Sample`] trait.
//!
//! | Kind | Rust type | Integral |
//! |------|-----------|----------|
//! | I8 / I16 / I32 / I64 | `i8` .. `i64` | yes |
//! | U8 / U16 / U32 / U64 | `u8` .. `u64` | yes |
//! | F32 / F64 | `f32`, `f64` | no |

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl SampleKind {
    pub const ALL: [SampleKind; 10] = [
        SampleKind::I8,
        SampleKind::I16,
        SampleKind::I32,
        SampleKind::I64,
        SampleKind::U8,
        SampleKind::U16,
        SampleKind::U32,
        SampleKind::U64,
        SampleKind::F32,
        SampleKind::F64,
    ];

    /// Integral kinds are rounded and clipped when leaving the `f64` domain.
    pub fn is_integral(self) -> bool {
        !matches!(self, SampleKind::F32 | SampleKind::F64)
    }

    /// Smallest representable value.
    pub fn min_value(self) -> f64 {
        match self {
            SampleKind::I8 => i8::MIN as f64,
            SampleKind::I16 => i16::MIN as f64,
            SampleKind::I32 => i32::MIN as f64,
            SampleKind::I64 => i64::MIN as f64,
            SampleKind::U8 | SampleKind::U16 | SampleKind::U32 | SampleKind::U64 => 0.0,
            SampleKind::F32 => f32::MIN as f64,
            SampleKind::F64 => f64::MIN,
        }
    }

    /// Largest representable value.
    pub fn max_value(self) -> f64 {
        match self {
            SampleKind::I8 => i8::MAX as f64,
            SampleKind::I16 => i16::MAX as f64,
            SampleKind::I32 => i32::MAX as f64,
            SampleKind::I64 => i64::MAX as f64,
            SampleKind::U8 => u8::MAX as f64,
            SampleKind::U16 => u16::MAX as f64,
            SampleKind::U32 => u32::MAX as f64,
            SampleKind::U64 => u64::MAX as f64,
            SampleKind::F32 => f32::MAX as f64,
            SampleKind::F64 => f64::MAX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SampleKind::I8 => "i8",
            SampleKind::I16 => "i16",
            SampleKind::I32 => "i32",
            SampleKind::I64 => "i64",
            SampleKind::U8 => "u8",
            SampleKind::U16 => "u16",
            SampleKind::U32 => "u32",
            SampleKind::U64 => "u64",
            SampleKind::F32 => "f32",
            SampleKind::F64 => "f64",
        }
    }

    /// Map an `f64` result back into this kind's domain.
    ///
    /// Integral kinds round half away from zero and clamp to the
    /// representable range; float kinds pass the value through.
    #[inline]
    pub fn quantize(self, value: f64) -> f64 {
        if self.is_integral() {
            value.round().clamp(self.min_value(), self.max_value())
        } else {
            value
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primitive element type of an image buffer.
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: SampleKind;

    fn to_f64(self) -> f64;

    /// Saturating conversion (`as` semantics: out-of-range clamps, NaN maps to 0).
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Sample for $ty {
                const KIND: SampleKind = SampleKind::$kind;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_sample!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
