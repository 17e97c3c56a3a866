//! 128-bit baseline tier.
//!
//! SSE2 lacks 8/32-bit signed max, 32-bit low multiply, native floor,
//! blend and gather. It only implements `Intrinsics`; the compare and
//! bit-mask instructions below are what `kernels::sse2` emulates the gaps
//! with.

use std::arch::x86_64::*;

use crate::cpu_kernels::CpuTier;
use crate::traits::{Intrinsics, Tier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sse2;

impl Tier for Sse2 {
    const CPU: CpuTier = CpuTier::Sse2;
    const WIDTH: usize = 16;

    type Vi = __m128i;
    type Vf = __m128;
    type Vd = __m128d;
}

impl Intrinsics for Sse2 {
    forward_intrinsics! { "sse2";
        fn setzero_si() -> __m128i => _mm_setzero_si128;
        fn setzero_ps() -> __m128 => _mm_setzero_ps;
        fn setzero_pd() -> __m128d => _mm_setzero_pd;

        fn set1_epi8(a: i8) -> __m128i => _mm_set1_epi8;
        fn set1_epi16(a: i16) -> __m128i => _mm_set1_epi16;
        fn set1_epi32(a: i32) -> __m128i => _mm_set1_epi32;
        fn set1_ps(a: f32) -> __m128 => _mm_set1_ps;
        fn set1_pd(a: f64) -> __m128d => _mm_set1_pd;

        fn loadu_si(mem_addr: *const __m128i) -> __m128i => _mm_loadu_si128;
        fn loadu_ps(mem_addr: *const f32) -> __m128 => _mm_loadu_ps;
        fn loadu_pd(mem_addr: *const f64) -> __m128d => _mm_loadu_pd;
        fn storeu_si(mem_addr: *mut __m128i, a: __m128i) => _mm_storeu_si128;
        fn storeu_ps(mem_addr: *mut f32, a: __m128) => _mm_storeu_ps;
        fn storeu_pd(mem_addr: *mut f64, a: __m128d) => _mm_storeu_pd;

        fn add_epi8(a: __m128i, b: __m128i) -> __m128i => _mm_add_epi8;
        fn add_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_add_epi16;
        fn add_epi32(a: __m128i, b: __m128i) -> __m128i => _mm_add_epi32;
        fn adds_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_adds_epi16;
        fn subs_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_subs_epi16;
        fn add_ps(a: __m128, b: __m128) -> __m128 => _mm_add_ps;
        fn add_pd(a: __m128d, b: __m128d) -> __m128d => _mm_add_pd;
        fn sub_ps(a: __m128, b: __m128) -> __m128 => _mm_sub_ps;
        fn sub_pd(a: __m128d, b: __m128d) -> __m128d => _mm_sub_pd;

        fn mullo_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_mullo_epi16;
        fn mul_epu32(a: __m128i, b: __m128i) -> __m128i => _mm_mul_epu32;
        fn madd_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_madd_epi16;
        fn mul_ps(a: __m128, b: __m128) -> __m128 => _mm_mul_ps;
        fn mul_pd(a: __m128d, b: __m128d) -> __m128d => _mm_mul_pd;
        fn div_ps(a: __m128, b: __m128) -> __m128 => _mm_div_ps;

        fn max_epi16(a: __m128i, b: __m128i) -> __m128i => _mm_max_epi16;
        fn max_ps(a: __m128, b: __m128) -> __m128 => _mm_max_ps;
        fn max_pd(a: __m128d, b: __m128d) -> __m128d => _mm_max_pd;
        fn min_ps(a: __m128, b: __m128) -> __m128 => _mm_min_ps;

        fn and_si(a: __m128i, b: __m128i) -> __m128i => _mm_and_si128;
        fn or_si(a: __m128i, b: __m128i) -> __m128i => _mm_or_si128;
        fn and_ps(a: __m128, b: __m128) -> __m128 => _mm_and_ps;

        fn cvtepi32_ps(a: __m128i) -> __m128 => _mm_cvtepi32_ps;
        fn cvtps_epi32(a: __m128) -> __m128i => _mm_cvtps_epi32;
        fn cvttps_epi32(a: __m128) -> __m128i => _mm_cvttps_epi32;

        fn unpacklo_epi32(a: __m128i, b: __m128i) -> __m128i => _mm_unpacklo_epi32;
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn slli_epi16(a: __m128i, imm8: i32) -> __m128i {
        _mm_sll_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn srli_epi16(a: __m128i, imm8: i32) -> __m128i {
        _mm_srl_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn shuffle_epi32<const IMM8: i32>(a: __m128i) -> __m128i {
        _mm_shuffle_epi32::<IMM8>(a)
    }
}

// Compare results are all-ones / all-zeros lane masks.
impl Sse2 {
    forward_intrinsics! { "sse2";
        pub fn cmplt_epi8(a: __m128i, b: __m128i) -> __m128i => _mm_cmplt_epi8;
        pub fn cmplt_epi32(a: __m128i, b: __m128i) -> __m128i => _mm_cmplt_epi32;
        pub fn cmplt_ps(a: __m128, b: __m128) -> __m128 => _mm_cmplt_ps;
        pub fn cmpneq_ps(a: __m128, b: __m128) -> __m128 => _mm_cmpneq_ps;
        pub fn cmpnlt_ps(a: __m128, b: __m128) -> __m128 => _mm_cmpnlt_ps;
        pub fn andnot_ps(a: __m128, b: __m128) -> __m128 => _mm_andnot_ps;
        pub fn or_ps(a: __m128, b: __m128) -> __m128 => _mm_or_ps;
    }

    /// Shift the whole register right by `IMM8` bytes.
    #[inline]
    #[target_feature(enable = "sse2")]
    pub unsafe fn srli_si128<const IMM8: i32>(a: __m128i) -> __m128i {
        _mm_srli_si128::<IMM8>(a)
    }
}
