use thiserror::Error;

use crate::cpu_kernels::CpuTier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("cpu does not support the {0} tier")]
    UnsupportedTier(CpuTier),
    #[error("cpu supports none of the SIMD tiers")]
    NoSupportedTier,
    #[error("invalid tier override: {0}")]
    InvalidTierOverride(String),
    #[error("{buffer} window [{offset}, {offset} + {width}) exceeds buffer length {len}")]
    OutOfBounds {
        buffer: &'static str,
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("tile ({row_idx}, {col_idx}) of width {width} lies outside a {rows}x{cols} output")]
    InvalidPosition {
        row_idx: usize,
        col_idx: usize,
        rows: usize,
        cols: usize,
        width: usize,
    },
}

pub type KernelResult<T> = Result<T, KernelError>;
