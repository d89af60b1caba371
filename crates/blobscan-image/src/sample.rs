use num_traits::AsPrimitive;

/// Trait for sample types a detector can consume.
///
/// Detectors work on `f32` intensities. Floating point samples are taken as they are, unsigned
/// integers are rescaled to `[0, 1]` and signed integers to `[-1, 1]` by the type's maximum,
/// so thresholds mean the same thing for 8-bit and 16-bit acquisitions.
pub trait Sample: Copy + Send + Sync + 'static {
    /// Convert the sample to a float intensity.
    fn to_f32(self) -> f32;
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}

impl Sample for bool {
    #[inline]
    fn to_f32(self) -> f32 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

macro_rules! impl_unsigned_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline]
            fn to_f32(self) -> f32 {
                AsPrimitive::<f32>::as_(self) / AsPrimitive::<f32>::as_(<$t>::MAX)
            }
        }
    )*};
}

macro_rules! impl_signed_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            #[inline]
            fn to_f32(self) -> f32 {
                (AsPrimitive::<f32>::as_(self) / AsPrimitive::<f32>::as_(<$t>::MAX)).max(-1.0)
            }
        }
    )*};
}

impl_unsigned_sample!(u8, u16, u32);
impl_signed_sample!(i8, i16, i32);

#[cfg(test)]
mod tests {
    use super::Sample;

    #[test]
    fn integer_samples_are_normalized() {
        assert_eq!(255u8.to_f32(), 1.0);
        assert_eq!(0u16.to_f32(), 0.0);
        assert_eq!(i8::MIN.to_f32(), -1.0);
        assert_eq!(i16::MAX.to_f32(), 1.0);
        approx::assert_relative_eq!(51u8.to_f32(), 0.2);
    }

    #[test]
    fn float_samples_pass_through() {
        assert_eq!(3.5f32.to_f32(), 3.5);
        assert_eq!((-2.0f64).to_f32(), -2.0);
        assert_eq!(true.to_f32(), 1.0);
    }
}
