//! Compile-time tier abstraction.
//!
//! A tier is a zero-sized marker type (`Sse2`, `Avx2`, `Avx512bw`) that fixes
//! the register width and the instruction set. Everything above the wrapper
//! layer is generic over `T: Tier` and gets monomorphized once per tier, so
//! no kernel ever branches on the CPU at runtime.
//!
//! Trait stack, leaf first:
//!
//! | Trait | Implemented by | Provides |
//! |---|---|---|
//! | `Tier` | all tiers | register types, width, runtime support check |
//! | `Intrinsics` | all tiers | common hardware table (`cpu_kernels::*`) |
//! | `Wide` | Avx2, Avx512bw | compare/blend, rcp, floor, gather, 8/32-bit max |
//! | `TierKernels` | all tiers | kernels whose implementation differs per tier |
//! | `Element<T>` | i8, i16, i32, f32, f64 | per-element-type kernel overloads |

use crate::cpu_kernels::CpuTier;

/// A SIMD capability level known at compile time.
pub trait Tier: Copy + Default + Send + Sync + 'static {
    const CPU: CpuTier;
    /// Register width in bytes.
    const WIDTH: usize;

    /// Integer register, shared by the 8/16/32-bit lane types.
    type Vi: Copy + Send + Sync + 'static;
    /// float32 register.
    type Vf: Copy + Send + Sync + 'static;
    /// float64 register.
    type Vd: Copy + Send + Sync + 'static;

    /// Whether the running CPU can execute this tier's instructions.
    #[inline]
    fn is_supported() -> bool {
        Self::CPU.is_supported()
    }
}

/// Register type holding lanes of scalar `S` on tier `T`.
pub type Vector<T, S> = <S as Element<T>>::Register;

/// Hardware operations every tier exposes.
///
/// Each method maps to exactly one instruction (or the instruction plus a
/// register move for the count operand of the 16-bit shifts) and inherits
/// its rounding, saturation and lane order.
///
/// # Safety
/// All methods execute the tier's instructions; calling them on a CPU that
/// lacks the tier is undefined behavior.
pub trait Intrinsics: Tier {
    unsafe fn setzero_si() -> Self::Vi;
    unsafe fn setzero_ps() -> Self::Vf;
    unsafe fn setzero_pd() -> Self::Vd;

    unsafe fn set1_epi8(a: i8) -> Self::Vi;
    unsafe fn set1_epi16(a: i16) -> Self::Vi;
    unsafe fn set1_epi32(a: i32) -> Self::Vi;
    unsafe fn set1_ps(a: f32) -> Self::Vf;
    unsafe fn set1_pd(a: f64) -> Self::Vd;

    unsafe fn loadu_si(mem_addr: *const Self::Vi) -> Self::Vi;
    unsafe fn loadu_ps(mem_addr: *const f32) -> Self::Vf;
    unsafe fn loadu_pd(mem_addr: *const f64) -> Self::Vd;
    unsafe fn storeu_si(mem_addr: *mut Self::Vi, a: Self::Vi);
    unsafe fn storeu_ps(mem_addr: *mut f32, a: Self::Vf);
    unsafe fn storeu_pd(mem_addr: *mut f64, a: Self::Vd);

    unsafe fn add_epi8(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn add_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn add_epi32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn adds_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn subs_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn add_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn add_pd(a: Self::Vd, b: Self::Vd) -> Self::Vd;
    unsafe fn sub_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn sub_pd(a: Self::Vd, b: Self::Vd) -> Self::Vd;

    unsafe fn mullo_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    /// Unsigned 32x32 -> 64 multiply of the even 32-bit lanes.
    unsafe fn mul_epu32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn madd_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn mul_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn mul_pd(a: Self::Vd, b: Self::Vd) -> Self::Vd;
    unsafe fn div_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;

    unsafe fn max_epi16(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn max_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn max_pd(a: Self::Vd, b: Self::Vd) -> Self::Vd;
    unsafe fn min_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;

    unsafe fn and_si(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn or_si(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn and_ps(a: Self::Vf, b: Self::Vf) -> Self::Vf;

    unsafe fn cvtepi32_ps(a: Self::Vi) -> Self::Vf;
    /// Float to int32 with the current rounding mode (nearest-even by default).
    unsafe fn cvtps_epi32(a: Self::Vf) -> Self::Vi;
    /// Float to int32 truncating toward zero.
    unsafe fn cvttps_epi32(a: Self::Vf) -> Self::Vi;

    unsafe fn slli_epi16(a: Self::Vi, imm8: i32) -> Self::Vi;
    unsafe fn srli_epi16(a: Self::Vi, imm8: i32) -> Self::Vi;

    /// Shuffle 32-bit lanes within each 128-bit lane.
    unsafe fn shuffle_epi32<const IMM8: i32>(a: Self::Vi) -> Self::Vi;
    unsafe fn unpacklo_epi32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
}

/// Operations that exist natively on the 256-bit tier and above.
///
/// The 128-bit tier does not implement this trait, so kernels
/// that need a gather (`exp_approx_taylor`, `sigmoid`, `tanh`) cannot be
/// instantiated for it.
pub trait Wide: Intrinsics {
    /// Result of a lane-wise float compare: a vector mask on AVX2, a
    /// k-register on AVX-512.
    type Mask: Copy;

    unsafe fn max_epi8(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn max_epi32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn mullo_epi32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn floor_ps(a: Self::Vf) -> Self::Vf;
    /// Approximate reciprocal with the instruction's bounded relative error.
    unsafe fn rcp_ps(a: Self::Vf) -> Self::Vf;
    /// Compare with one of the `_CMP_*` predicates.
    unsafe fn cmp_ps<const PRED: i32>(a: Self::Vf, b: Self::Vf) -> Self::Mask;
    /// Take `b` on lanes where `mask` is set, `a` elsewhere.
    unsafe fn blend_ps(mask: Self::Mask, a: Self::Vf, b: Self::Vf) -> Self::Vf;
    /// Gather `base_addr[vindex[i] * SCALE / 4]` for every lane.
    unsafe fn i32gather_ps<const SCALE: i32>(base_addr: *const f32, vindex: Self::Vi) -> Self::Vf;
}

/// Kernels whose instruction sequence differs between tiers.
///
/// `Wide` tiers get these from a blanket impl over their native
/// instructions; the 128-bit tier emulates them (`kernels::sse2`).
pub trait TierKernels: Intrinsics {
    unsafe fn relu_epi8(input: Self::Vi) -> Self::Vi;
    unsafe fn relu_epi32(input: Self::Vi) -> Self::Vi;
    unsafe fn multiply_epi32(a: Self::Vi, b: Self::Vi) -> Self::Vi;
    unsafe fn floor(input: Self::Vf) -> Self::Vf;
}

/// Scalar lane type with a register representation on tier `T`.
///
/// Supplies the element-type overloads of the kernel layer. Offsets are in
/// elements, not bytes, and are never bounds-checked.
pub trait Element<T: TierKernels>: Copy + Send + Sync + 'static {
    type Register: Copy;

    /// Lanes of `Self` per register.
    const LANES: usize = T::WIDTH / std::mem::size_of::<Self>();

    unsafe fn load(input: *const Self, offset: usize) -> Self::Register;
    unsafe fn write(input: Self::Register, output: *mut Self, offset: usize);
    unsafe fn add_bias(input: Self::Register, bias_addr: *const Self, bias_offset: usize) -> Self::Register;
    unsafe fn relu(input: Self::Register) -> Self::Register;
    unsafe fn multiply(a: Self::Register, b: Self::Register) -> Self::Register;
}
