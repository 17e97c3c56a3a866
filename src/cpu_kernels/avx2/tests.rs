use std::arch::x86_64::*;

use super::Avx2;
use crate::traits::{Intrinsics, Tier, Wide};

macro_rules! skip_without_avx2 {
    () => {
        if !Avx2::is_supported() {
            println!("Skipping AVX2 test: AVX2 not supported");
            return;
        }
    };
}

fn epi8(v: __m256i) -> [i8; 32] {
    let mut out = [0i8; 32];
    unsafe { Avx2::storeu_si(out.as_mut_ptr().cast(), v) };
    out
}

fn epi32(v: __m256i) -> [i32; 8] {
    let mut out = [0i32; 8];
    unsafe { Avx2::storeu_si(out.as_mut_ptr().cast(), v) };
    out
}

fn ps(v: __m256) -> [f32; 8] {
    let mut out = [0f32; 8];
    unsafe { Avx2::storeu_ps(out.as_mut_ptr(), v) };
    out
}

#[test]
fn test_avx2_native_max() {
    skip_without_avx2!();
    let a: [i8; 32] = std::array::from_fn(|i| (i as i8).wrapping_mul(37));
    let b: [i8; 32] = std::array::from_fn(|i| 16 - i as i8);
    unsafe {
        let r = Avx2::max_epi8(Avx2::loadu_si(a.as_ptr().cast()), Avx2::loadu_si(b.as_ptr().cast()));
        let expected: [i8; 32] = std::array::from_fn(|i| a[i].max(b[i]));
        assert_eq!(epi8(r), expected);

        let r = Avx2::max_epi32(Avx2::set1_epi32(i32::MIN), Avx2::set1_epi32(-7));
        assert_eq!(epi32(r), [-7; 8]);
    }
}

#[test]
fn test_avx2_mullo_epi32_wraps() {
    skip_without_avx2!();
    unsafe {
        let r = Avx2::mullo_epi32(Avx2::set1_epi32(0x1000_0001), Avx2::set1_epi32(0x10));
        assert_eq!(epi32(r), [0x0000_0010; 8]);
    }
}

#[test]
fn test_avx2_floor_and_rcp() {
    skip_without_avx2!();
    let x = [-0.5f32, -1.0, 2.9999999, -0.0, 1.5, -1.5, 1e9, -3.25];
    unsafe {
        let r = ps(Avx2::floor_ps(Avx2::loadu_ps(x.as_ptr())));
        for (got, v) in r.iter().zip(x) {
            assert_eq!(got.to_bits(), v.floor().to_bits(), "floor({v})");
        }

        let r = ps(Avx2::rcp_ps(Avx2::set1_ps(3.0)));
        for got in r {
            assert!((got - 1.0 / 3.0).abs() <= 1.5 * (2.0f32).powi(-12) / 3.0);
        }
    }
}

#[test]
fn test_avx2_compare_blend() {
    skip_without_avx2!();
    let x = [-2.0f32, -0.0, 0.0, 1.0, f32::NAN, 3.0, -3.0, 0.5];
    unsafe {
        let v = Avx2::loadu_ps(x.as_ptr());
        let mask = Avx2::cmp_ps::<_CMP_LT_OS>(Avx2::setzero_ps(), v);
        let r = ps(Avx2::blend_ps(mask, Avx2::set1_ps(-1.0), Avx2::set1_ps(1.0)));
        assert_eq!(r, [-1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
    }
}

#[test]
fn test_avx2_gather_scale4() {
    skip_without_avx2!();
    let table: [f32; 9] = std::array::from_fn(|i| i as f32 * 10.0);
    let index = [-4i32, 4, 0, 1, -1, 3, 2, -2];
    unsafe {
        let base = table.as_ptr().add(4);
        let r = Avx2::i32gather_ps::<4>(base, Avx2::loadu_si(index.as_ptr().cast()));
        assert_eq!(ps(r), [0.0, 80.0, 40.0, 50.0, 30.0, 70.0, 60.0, 20.0]);
    }
}
