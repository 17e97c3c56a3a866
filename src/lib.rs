//! qgemm-kernels: tiered x86 SIMD kernels for quantized integer GEMM.
//!
//! The crate sits below a GEMM driver and provides:
//! - **Wrapper tables**: one `#[target_feature]` function per instruction for
//!   the SSE2, AVX2 and AVX-512BW tiers (`cpu_kernels`)
//! - **Kernels**: quantize/unquantize, bias, relu, multiply, floor, exp,
//!   sigmoid and tanh, generic over the tier (`kernels`)
//! - **Callbacks**: per-tile output stages selected at compile time
//!   (`callbacks`)
//!
//! Nothing dispatches at runtime: the driver picks the tier once
//! (`select_cpu_tier`) and instantiates everything for the matching marker
//! type.
//!
//! # Quick Start
//!
//! ```ignore
//! use qgemm_kernels::{new_callback, Avx2, Callback, OutputPosition, UnquantizeAndWrite};
//!
//! let mut callback = new_callback::<Avx2, _>(UnquantizeAndWrite::new(scale, &mut output))?;
//! callback.try_call(accumulator, &OutputPosition::new(row, col, rows, cols))?;
//! ```

#[macro_use]
pub mod macros;

pub mod callbacks;
pub mod cpu_kernels;
pub mod error;
pub mod kernels;
pub mod traits;

pub use callbacks::{
    new_callback, tile_width, Callback, CallbackConfig, CallbackImpl, NoOp, OutputBuffer, OutputPosition,
    UnquantizeAndAddBiasAndWrite, UnquantizeAndWrite,
};
pub use cpu_kernels::{get_cpu_tier, select_cpu_tier, CpuTier, CPU_TIER_ENV};
pub use error::{KernelError, KernelResult};
pub use traits::{Element, Intrinsics, Tier, TierKernels, Vector, Wide};

#[cfg(target_arch = "x86_64")]
pub use cpu_kernels::{avx2::Avx2, sse2::Sse2};

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
pub use cpu_kernels::avx512::Avx512bw;
