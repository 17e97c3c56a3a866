//! 256-bit tier.

use std::arch::x86_64::*;

use crate::cpu_kernels::CpuTier;
use crate::traits::{Intrinsics, Tier, Wide};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx2;

impl Tier for Avx2 {
    const CPU: CpuTier = CpuTier::Avx2;
    const WIDTH: usize = 32;

    type Vi = __m256i;
    type Vf = __m256;
    type Vd = __m256d;
}

impl Intrinsics for Avx2 {
    forward_intrinsics! { "avx2";
        fn setzero_si() -> __m256i => _mm256_setzero_si256;
        fn setzero_ps() -> __m256 => _mm256_setzero_ps;
        fn setzero_pd() -> __m256d => _mm256_setzero_pd;

        fn set1_epi8(a: i8) -> __m256i => _mm256_set1_epi8;
        fn set1_epi16(a: i16) -> __m256i => _mm256_set1_epi16;
        fn set1_epi32(a: i32) -> __m256i => _mm256_set1_epi32;
        fn set1_ps(a: f32) -> __m256 => _mm256_set1_ps;
        fn set1_pd(a: f64) -> __m256d => _mm256_set1_pd;

        fn loadu_si(mem_addr: *const __m256i) -> __m256i => _mm256_loadu_si256;
        fn loadu_ps(mem_addr: *const f32) -> __m256 => _mm256_loadu_ps;
        fn loadu_pd(mem_addr: *const f64) -> __m256d => _mm256_loadu_pd;
        fn storeu_si(mem_addr: *mut __m256i, a: __m256i) => _mm256_storeu_si256;
        fn storeu_ps(mem_addr: *mut f32, a: __m256) => _mm256_storeu_ps;
        fn storeu_pd(mem_addr: *mut f64, a: __m256d) => _mm256_storeu_pd;

        fn add_epi8(a: __m256i, b: __m256i) -> __m256i => _mm256_add_epi8;
        fn add_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_add_epi16;
        fn add_epi32(a: __m256i, b: __m256i) -> __m256i => _mm256_add_epi32;
        fn adds_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_adds_epi16;
        fn subs_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_subs_epi16;
        fn add_ps(a: __m256, b: __m256) -> __m256 => _mm256_add_ps;
        fn add_pd(a: __m256d, b: __m256d) -> __m256d => _mm256_add_pd;
        fn sub_ps(a: __m256, b: __m256) -> __m256 => _mm256_sub_ps;
        fn sub_pd(a: __m256d, b: __m256d) -> __m256d => _mm256_sub_pd;

        fn mullo_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_mullo_epi16;
        fn mul_epu32(a: __m256i, b: __m256i) -> __m256i => _mm256_mul_epu32;
        fn madd_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_madd_epi16;
        fn mul_ps(a: __m256, b: __m256) -> __m256 => _mm256_mul_ps;
        fn mul_pd(a: __m256d, b: __m256d) -> __m256d => _mm256_mul_pd;
        fn div_ps(a: __m256, b: __m256) -> __m256 => _mm256_div_ps;

        fn max_epi16(a: __m256i, b: __m256i) -> __m256i => _mm256_max_epi16;
        fn max_ps(a: __m256, b: __m256) -> __m256 => _mm256_max_ps;
        fn max_pd(a: __m256d, b: __m256d) -> __m256d => _mm256_max_pd;
        fn min_ps(a: __m256, b: __m256) -> __m256 => _mm256_min_ps;

        fn and_si(a: __m256i, b: __m256i) -> __m256i => _mm256_and_si256;
        fn or_si(a: __m256i, b: __m256i) -> __m256i => _mm256_or_si256;
        fn and_ps(a: __m256, b: __m256) -> __m256 => _mm256_and_ps;

        fn cvtepi32_ps(a: __m256i) -> __m256 => _mm256_cvtepi32_ps;
        fn cvtps_epi32(a: __m256) -> __m256i => _mm256_cvtps_epi32;
        fn cvttps_epi32(a: __m256) -> __m256i => _mm256_cvttps_epi32;

        fn unpacklo_epi32(a: __m256i, b: __m256i) -> __m256i => _mm256_unpacklo_epi32;
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn slli_epi16(a: __m256i, imm8: i32) -> __m256i {
        _mm256_sll_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn srli_epi16(a: __m256i, imm8: i32) -> __m256i {
        _mm256_srl_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn shuffle_epi32<const IMM8: i32>(a: __m256i) -> __m256i {
        _mm256_shuffle_epi32::<IMM8>(a)
    }
}

impl Wide for Avx2 {
    type Mask = __m256;

    forward_intrinsics! { "avx2";
        fn max_epi8(a: __m256i, b: __m256i) -> __m256i => _mm256_max_epi8;
        fn max_epi32(a: __m256i, b: __m256i) -> __m256i => _mm256_max_epi32;
        fn mullo_epi32(a: __m256i, b: __m256i) -> __m256i => _mm256_mullo_epi32;
        fn floor_ps(a: __m256) -> __m256 => _mm256_floor_ps;
        fn rcp_ps(a: __m256) -> __m256 => _mm256_rcp_ps;
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn cmp_ps<const PRED: i32>(a: __m256, b: __m256) -> __m256 {
        _mm256_cmp_ps::<PRED>(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn blend_ps(mask: __m256, a: __m256, b: __m256) -> __m256 {
        _mm256_blendv_ps(a, b, mask)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn i32gather_ps<const SCALE: i32>(base_addr: *const f32, vindex: __m256i) -> __m256 {
        _mm256_i32gather_ps::<SCALE>(base_addr, vindex)
    }
}

#[cfg(test)]
mod tests;
