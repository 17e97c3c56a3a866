//! SSE2 emulations of the kernels the 256/512-bit tiers run natively.
//!
//! Each one matches the native instruction bit-for-bit on every input.

use std::arch::x86_64::*;

use crate::cpu_kernels::sse2::Sse2;
use crate::traits::{Intrinsics, TierKernels};

/// 2^23: every float with at least this magnitude is an integer.
const INTEGRAL_THRESHOLD: f32 = 8_388_608.0;

impl TierKernels for Sse2 {
    /// `input & (0 < input)`. The mask is all-ones exactly where max(x, 0)
    /// is x, and zero (including i8::MIN) maps to zero.
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn relu_epi8(input: __m128i) -> __m128i {
        Sse2::and_si(input, Sse2::cmplt_epi8(Sse2::setzero_si(), input))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn relu_epi32(input: __m128i) -> __m128i {
        Sse2::and_si(input, Sse2::cmplt_epi32(Sse2::setzero_si(), input))
    }

    /// Two 32x32 -> 64 multiplies cover the even and the odd lanes; the low
    /// halves are packed and interleaved back into lane order.
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn multiply_epi32(a: __m128i, b: __m128i) -> __m128i {
        let even = Sse2::mul_epu32(a, b);
        let odd = Sse2::mul_epu32(Sse2::srli_si128::<4>(a), Sse2::srli_si128::<4>(b));
        Sse2::unpacklo_epi32(Sse2::shuffle_epi32::<0x08>(even), Sse2::shuffle_epi32::<0x08>(odd))
    }

    /// Truncate, then step negative non-integral lanes down by one.
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn floor(input: __m128) -> __m128 {
        let sign_bit = Sse2::set1_ps(-0.0);
        let truncated = Sse2::cvtepi32_ps(Sse2::cvttps_epi32(input));

        let negative = Sse2::cmplt_ps(input, Sse2::setzero_ps());
        let inexact = Sse2::cmpneq_ps(input, truncated);
        let step = Sse2::and_ps(Sse2::set1_ps(1.0), Sse2::and_ps(negative, inexact));
        let rounded = Sse2::or_ps(Sse2::sub_ps(truncated, step), Sse2::and_ps(input, sign_bit));

        // Large, infinite and NaN lanes do not survive the int32 round trip.
        let magnitude = Sse2::andnot_ps(sign_bit, input);
        let keep = Sse2::cmpnlt_ps(magnitude, Sse2::set1_ps(INTEGRAL_THRESHOLD));
        Sse2::or_ps(Sse2::and_ps(keep, input), Sse2::andnot_ps(keep, rounded))
    }
}
