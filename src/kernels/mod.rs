//! # Elementwise kernels
//!
//! Pure register-to-register functions built from the wrapper tables, generic
//! over the tier. Every function here is `#[inline(always)]` so a driver
//! compiled with the tier's `#[target_feature]` sees straight-line
//! instructions.
//!
//! | Kernel | Tiers | Notes |
//! |---|---|---|
//! | `load` / `write` | all | unaligned, offsets in elements |
//! | `quantize` / `unquantize` | all | round to nearest even |
//! | `add_bias` | all | wrapping for integers |
//! | `relu` | all | int8/int32 emulated on Sse2 |
//! | `multiply` | all | int8 emulated everywhere, int32 emulated on Sse2 |
//! | `floor` | all | emulated on Sse2 |
//! | `exp_approx_taylor` / `sigmoid` / `tanh` | `Wide` | need gather |
//!
//! # Safety
//! The kernels execute the instructions of `T`. Calling them on a CPU
//! without the tier is undefined behavior, and pointer arguments must be
//! valid for one full register at the given element offset.

use crate::traits::{Element, Intrinsics, TierKernels, Vector, Wide};

#[cfg(target_arch = "x86_64")]
mod math;

#[cfg(target_arch = "x86_64")]
mod sse2;


#[cfg(target_arch = "x86_64")]
pub use math::{exp_approx_taylor, sigmoid, tanh, EXP_LOOKUP, EXP_MAX, EXP_MIN};

/// Unaligned load of one register from `input + offset`.
#[inline(always)]
pub unsafe fn load<T: TierKernels, S: Element<T>>(input: *const S, offset: usize) -> Vector<T, S> {
    S::load(input, offset)
}

/// Unaligned store of one register at `output + offset`.
#[inline(always)]
pub unsafe fn write<T: TierKernels, S: Element<T>>(input: Vector<T, S>, output: *mut S, offset: usize) {
    S::write(input, output, offset)
}

/// `round_to_nearest_even(input * quant_mult)` per lane.
#[inline(always)]
pub unsafe fn quantize<T: Intrinsics>(input: T::Vf, quant_mult: T::Vf) -> T::Vi {
    T::cvtps_epi32(T::mul_ps(input, quant_mult))
}

#[inline(always)]
pub unsafe fn unquantize<T: Intrinsics>(input: T::Vi, unquant_mult: T::Vf) -> T::Vf {
    T::mul_ps(T::cvtepi32_ps(input), unquant_mult)
}

/// Adds the register loaded from `bias_addr + bias_offset`.
#[inline(always)]
pub unsafe fn add_bias<T: TierKernels, S: Element<T>>(
    input: Vector<T, S>,
    bias_addr: *const S,
    bias_offset: usize,
) -> Vector<T, S> {
    S::add_bias(input, bias_addr, bias_offset)
}

#[inline(always)]
pub unsafe fn relu<T: TierKernels, S: Element<T>>(input: Vector<T, S>) -> Vector<T, S> {
    S::relu(input)
}

#[inline(always)]
pub unsafe fn multiply<T: TierKernels, S: Element<T>>(a: Vector<T, S>, b: Vector<T, S>) -> Vector<T, S> {
    S::multiply(a, b)
}

/// Round toward negative infinity.
#[inline(always)]
pub unsafe fn floor<T: TierKernels>(input: T::Vf) -> T::Vf {
    T::floor(input)
}

/// Low byte of each 8-bit product.
///
/// No tier multiplies bytes, so the even and odd bytes are multiplied as
/// 16-bit lanes and the low bytes are merged back.
#[inline(always)]
pub unsafe fn multiply_epi8<T: Intrinsics>(a: T::Vi, b: T::Vi) -> T::Vi {
    let even = T::mullo_epi16(a, b);
    let odd = T::mullo_epi16(T::srli_epi16(a, 8), T::srli_epi16(b, 8));
    T::or_si(T::slli_epi16(odd, 8), T::srli_epi16(T::slli_epi16(even, 8), 8))
}

// ============================================================================
// Native kernels for the 256/512-bit tiers
// ============================================================================

impl<T: Wide> TierKernels for T {
    #[inline(always)]
    unsafe fn relu_epi8(input: T::Vi) -> T::Vi {
        T::max_epi8(input, T::setzero_si())
    }

    #[inline(always)]
    unsafe fn relu_epi32(input: T::Vi) -> T::Vi {
        T::max_epi32(input, T::setzero_si())
    }

    #[inline(always)]
    unsafe fn multiply_epi32(a: T::Vi, b: T::Vi) -> T::Vi {
        T::mullo_epi32(a, b)
    }

    #[inline(always)]
    unsafe fn floor(input: T::Vf) -> T::Vf {
        T::floor_ps(input)
    }
}

// ============================================================================
// Element overloads
// ============================================================================

impl<T: TierKernels> Element<T> for i8 {
    type Register = T::Vi;

    #[inline(always)]
    unsafe fn load(input: *const i8, offset: usize) -> T::Vi {
        T::loadu_si(input.add(offset).cast())
    }

    #[inline(always)]
    unsafe fn write(input: T::Vi, output: *mut i8, offset: usize) {
        T::storeu_si(output.add(offset).cast(), input)
    }

    #[inline(always)]
    unsafe fn add_bias(input: T::Vi, bias_addr: *const i8, bias_offset: usize) -> T::Vi {
        T::add_epi8(input, <i8 as Element<T>>::load(bias_addr, bias_offset))
    }

    #[inline(always)]
    unsafe fn relu(input: T::Vi) -> T::Vi {
        T::relu_epi8(input)
    }

    #[inline(always)]
    unsafe fn multiply(a: T::Vi, b: T::Vi) -> T::Vi {
        multiply_epi8::<T>(a, b)
    }
}

impl<T: TierKernels> Element<T> for i16 {
    type Register = T::Vi;

    #[inline(always)]
    unsafe fn load(input: *const i16, offset: usize) -> T::Vi {
        T::loadu_si(input.add(offset).cast())
    }

    #[inline(always)]
    unsafe fn write(input: T::Vi, output: *mut i16, offset: usize) {
        T::storeu_si(output.add(offset).cast(), input)
    }

    #[inline(always)]
    unsafe fn add_bias(input: T::Vi, bias_addr: *const i16, bias_offset: usize) -> T::Vi {
        T::add_epi16(input, <i16 as Element<T>>::load(bias_addr, bias_offset))
    }

    #[inline(always)]
    unsafe fn relu(input: T::Vi) -> T::Vi {
        T::max_epi16(input, T::setzero_si())
    }

    #[inline(always)]
    unsafe fn multiply(a: T::Vi, b: T::Vi) -> T::Vi {
        T::mullo_epi16(a, b)
    }
}

impl<T: TierKernels> Element<T> for i32 {
    type Register = T::Vi;

    #[inline(always)]
    unsafe fn load(input: *const i32, offset: usize) -> T::Vi {
        T::loadu_si(input.add(offset).cast())
    }

    #[inline(always)]
    unsafe fn write(input: T::Vi, output: *mut i32, offset: usize) {
        T::storeu_si(output.add(offset).cast(), input)
    }

    #[inline(always)]
    unsafe fn add_bias(input: T::Vi, bias_addr: *const i32, bias_offset: usize) -> T::Vi {
        T::add_epi32(input, <i32 as Element<T>>::load(bias_addr, bias_offset))
    }

    #[inline(always)]
    unsafe fn relu(input: T::Vi) -> T::Vi {
        T::relu_epi32(input)
    }

    #[inline(always)]
    unsafe fn multiply(a: T::Vi, b: T::Vi) -> T::Vi {
        T::multiply_epi32(a, b)
    }
}

impl<T: TierKernels> Element<T> for f32 {
    type Register = T::Vf;

    #[inline(always)]
    unsafe fn load(input: *const f32, offset: usize) -> T::Vf {
        T::loadu_ps(input.add(offset))
    }

    #[inline(always)]
    unsafe fn write(input: T::Vf, output: *mut f32, offset: usize) {
        T::storeu_ps(output.add(offset), input)
    }

    #[inline(always)]
    unsafe fn add_bias(input: T::Vf, bias_addr: *const f32, bias_offset: usize) -> T::Vf {
        T::add_ps(input, T::loadu_ps(bias_addr.add(bias_offset)))
    }

    #[inline(always)]
    unsafe fn relu(input: T::Vf) -> T::Vf {
        T::max_ps(input, T::setzero_ps())
    }

    #[inline(always)]
    unsafe fn multiply(a: T::Vf, b: T::Vf) -> T::Vf {
        T::mul_ps(a, b)
    }
}

impl<T: TierKernels> Element<T> for f64 {
    type Register = T::Vd;

    #[inline(always)]
    unsafe fn load(input: *const f64, offset: usize) -> T::Vd {
        T::loadu_pd(input.add(offset))
    }

    #[inline(always)]
    unsafe fn write(input: T::Vd, output: *mut f64, offset: usize) {
        T::storeu_pd(output.add(offset), input)
    }

    #[inline(always)]
    unsafe fn add_bias(input: T::Vd, bias_addr: *const f64, bias_offset: usize) -> T::Vd {
        T::add_pd(input, T::loadu_pd(bias_addr.add(bias_offset)))
    }

    #[inline(always)]
    unsafe fn relu(input: T::Vd) -> T::Vd {
        T::max_pd(input, T::setzero_pd())
    }

    #[inline(always)]
    unsafe fn multiply(a: T::Vd, b: T::Vd) -> T::Vd {
        T::mul_pd(a, b)
    }
}
