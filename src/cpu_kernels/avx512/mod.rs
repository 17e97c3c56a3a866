//! 512-bit tier (AVX-512 F + BW + DQ).
//!
//! Compares produce a `__mmask16` k-register instead of a vector mask.

use std::arch::x86_64::*;

use crate::cpu_kernels::CpuTier;
use crate::traits::{Intrinsics, Tier, Wide};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx512bw;

impl Tier for Avx512bw {
    const CPU: CpuTier = CpuTier::Avx512bw;
    const WIDTH: usize = 64;

    type Vi = __m512i;
    type Vf = __m512;
    type Vd = __m512d;
}

impl Intrinsics for Avx512bw {
    forward_intrinsics! { "avx512f,avx512bw,avx512dq";
        fn setzero_si() -> __m512i => _mm512_setzero_si512;
        fn setzero_ps() -> __m512 => _mm512_setzero_ps;
        fn setzero_pd() -> __m512d => _mm512_setzero_pd;

        fn set1_epi8(a: i8) -> __m512i => _mm512_set1_epi8;
        fn set1_epi16(a: i16) -> __m512i => _mm512_set1_epi16;
        fn set1_epi32(a: i32) -> __m512i => _mm512_set1_epi32;
        fn set1_ps(a: f32) -> __m512 => _mm512_set1_ps;
        fn set1_pd(a: f64) -> __m512d => _mm512_set1_pd;

        fn loadu_ps(mem_addr: *const f32) -> __m512 => _mm512_loadu_ps;
        fn loadu_pd(mem_addr: *const f64) -> __m512d => _mm512_loadu_pd;
        fn storeu_ps(mem_addr: *mut f32, a: __m512) => _mm512_storeu_ps;
        fn storeu_pd(mem_addr: *mut f64, a: __m512d) => _mm512_storeu_pd;

        fn add_epi8(a: __m512i, b: __m512i) -> __m512i => _mm512_add_epi8;
        fn add_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_add_epi16;
        fn add_epi32(a: __m512i, b: __m512i) -> __m512i => _mm512_add_epi32;
        fn adds_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_adds_epi16;
        fn subs_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_subs_epi16;
        fn add_ps(a: __m512, b: __m512) -> __m512 => _mm512_add_ps;
        fn add_pd(a: __m512d, b: __m512d) -> __m512d => _mm512_add_pd;
        fn sub_ps(a: __m512, b: __m512) -> __m512 => _mm512_sub_ps;
        fn sub_pd(a: __m512d, b: __m512d) -> __m512d => _mm512_sub_pd;

        fn mullo_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_mullo_epi16;
        fn mul_epu32(a: __m512i, b: __m512i) -> __m512i => _mm512_mul_epu32;
        fn madd_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_madd_epi16;
        fn mul_ps(a: __m512, b: __m512) -> __m512 => _mm512_mul_ps;
        fn mul_pd(a: __m512d, b: __m512d) -> __m512d => _mm512_mul_pd;
        fn div_ps(a: __m512, b: __m512) -> __m512 => _mm512_div_ps;

        fn max_epi16(a: __m512i, b: __m512i) -> __m512i => _mm512_max_epi16;
        fn max_ps(a: __m512, b: __m512) -> __m512 => _mm512_max_ps;
        fn max_pd(a: __m512d, b: __m512d) -> __m512d => _mm512_max_pd;
        fn min_ps(a: __m512, b: __m512) -> __m512 => _mm512_min_ps;

        fn and_si(a: __m512i, b: __m512i) -> __m512i => _mm512_and_si512;
        fn or_si(a: __m512i, b: __m512i) -> __m512i => _mm512_or_si512;
        fn and_ps(a: __m512, b: __m512) -> __m512 => _mm512_and_ps;

        fn cvtepi32_ps(a: __m512i) -> __m512 => _mm512_cvtepi32_ps;
        fn cvtps_epi32(a: __m512) -> __m512i => _mm512_cvtps_epi32;
        fn cvttps_epi32(a: __m512) -> __m512i => _mm512_cvttps_epi32;

        fn unpacklo_epi32(a: __m512i, b: __m512i) -> __m512i => _mm512_unpacklo_epi32;
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn loadu_si(mem_addr: *const __m512i) -> __m512i {
        _mm512_loadu_si512(mem_addr.cast())
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn storeu_si(mem_addr: *mut __m512i, a: __m512i) {
        _mm512_storeu_si512(mem_addr.cast(), a)
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn slli_epi16(a: __m512i, imm8: i32) -> __m512i {
        _mm512_sll_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn srli_epi16(a: __m512i, imm8: i32) -> __m512i {
        _mm512_srl_epi16(a, _mm_cvtsi32_si128(imm8))
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn shuffle_epi32<const IMM8: i32>(a: __m512i) -> __m512i {
        _mm512_shuffle_epi32::<IMM8>(a)
    }
}

impl Wide for Avx512bw {
    type Mask = __mmask16;

    forward_intrinsics! { "avx512f,avx512bw,avx512dq";
        fn max_epi8(a: __m512i, b: __m512i) -> __m512i => _mm512_max_epi8;
        fn max_epi32(a: __m512i, b: __m512i) -> __m512i => _mm512_max_epi32;
        fn mullo_epi32(a: __m512i, b: __m512i) -> __m512i => _mm512_mullo_epi32;
        fn rcp_ps(a: __m512) -> __m512 => _mm512_rcp14_ps;
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn floor_ps(a: __m512) -> __m512 {
        _mm512_roundscale_ps::<{ _MM_FROUND_TO_NEG_INF | _MM_FROUND_NO_EXC }>(a)
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn cmp_ps<const PRED: i32>(a: __m512, b: __m512) -> __mmask16 {
        _mm512_cmp_ps_mask::<PRED>(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn blend_ps(mask: __mmask16, a: __m512, b: __m512) -> __m512 {
        _mm512_mask_blend_ps(mask, a, b)
    }

    #[inline]
    #[target_feature(enable = "avx512f,avx512bw,avx512dq")]
    unsafe fn i32gather_ps<const SCALE: i32>(base_addr: *const f32, vindex: __m512i) -> __m512 {
        _mm512_i32gather_ps::<SCALE>(vindex, base_addr.cast())
    }
}
