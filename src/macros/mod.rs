//! Macro layer for qgemm-kernels.
//!
//! `forward_intrinsics!` writes the per-tier wrapper tables: one
//! `#[target_feature]` method per hardware instruction.

#[macro_use]
pub mod intrinsics;
