//! # GEMM output callbacks
//!
//! A callback turns the raw int32 accumulator of one output tile into the
//! final written values. The GEMM driver picks a configuration (`NoOp`,
//! `UnquantizeAndWrite`, `UnquantizeAndAddBiasAndWrite`) and a tier; the pair
//! resolves at compile time to exactly one implementation:
//!
//! ```ignore
//! let config = UnquantizeAndWrite::new(1.0 / (a_scale * b_scale), &mut output);
//! let callback: CallbackImpl<Avx2, _> = new_callback::<Avx2, _>(config)?;
//! // per tile, inside the multiply loop:
//! unsafe { callback.call(accumulator, &OutputPosition::new(row, col, rows, cols)) };
//! ```
//!
//! A tile is one register of float32 lanes: 4 on Sse2, 8 on Avx2, 16 on
//! Avx512bw. It is written to `output[row_idx * cols + col_idx..][..width]`.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{KernelError, KernelResult};
use crate::kernels;
use crate::traits::{Element, TierKernels};


/// Float32 lanes per tile on tier `T`.
#[inline(always)]
pub fn tile_width<T: TierKernels>() -> usize {
    <f32 as Element<T>>::LANES
}

// ============================================================================
// Tile position and destination
// ============================================================================

/// Position of the tile being written within a `rows x cols` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPosition {
    pub row_idx: usize,
    pub col_idx: usize,
    pub rows: usize,
    pub cols: usize,
}

impl OutputPosition {
    pub const fn new(row_idx: usize, col_idx: usize, rows: usize, cols: usize) -> Self {
        Self { row_idx, col_idx, rows, cols }
    }

    /// Linear offset of the tile's first element.
    #[inline(always)]
    pub const fn offset(&self) -> usize {
        self.row_idx * self.cols + self.col_idx
    }

    /// `offset()` after checking that a `width`-wide tile lies inside one row
    /// of the output.
    pub fn checked_offset(&self, width: usize) -> KernelResult<usize> {
        let in_row = self.row_idx < self.rows
            && self.col_idx.checked_add(width).is_some_and(|end| end <= self.cols);
        let offset = self
            .row_idx
            .checked_mul(self.cols)
            .and_then(|row_start| row_start.checked_add(self.col_idx));
        match offset {
            Some(offset) if in_row => Ok(offset),
            _ => Err(KernelError::InvalidPosition {
                row_idx: self.row_idx,
                col_idx: self.col_idx,
                rows: self.rows,
                cols: self.cols,
                width,
            }),
        }
    }
}

/// Destination matrix of one multiply.
///
/// Holds the exclusive borrow for `'a`. The pointer never leaves the crate:
/// the only writes go through `Callback::call` and `Callback::try_call`.
///
/// A configuration owns its buffer and cannot be duplicated, so two
/// callbacks never share one destination:
///
/// ```compile_fail
/// use qgemm_kernels::UnquantizeAndWrite;
///
/// let mut output = vec![0.0f32; 4];
/// let config = UnquantizeAndWrite::new(1.0, &mut output);
/// let first = config;
/// let second = config;
/// ```
#[derive(Debug)]
pub struct OutputBuffer<'a> {
    ptr: NonNull<f32>,
    len: usize,
    _marker: PhantomData<&'a mut [f32]>,
}

// SAFETY: OutputBuffer is created from an exclusive borrow and is not Clone.
// Writes through a shared reference happen only in `Callback::call`, whose
// contract forbids concurrent calls on overlapping windows; `try_call` needs
// exclusive access.
unsafe impl Send for OutputBuffer<'_> {}
unsafe impl Sync for OutputBuffer<'_> {}

impl<'a> OutputBuffer<'a> {
    pub fn new(output: &'a mut [f32]) -> Self {
        let len = output.len();
        Self {
            ptr: NonNull::from(output).cast(),
            len,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_mut_ptr(&self) -> *mut f32 {
        self.ptr.as_ptr()
    }
}

impl<'a> From<&'a mut [f32]> for OutputBuffer<'a> {
    fn from(output: &'a mut [f32]) -> Self {
        Self::new(output)
    }
}

fn check_window(buffer: &'static str, offset: usize, width: usize, len: usize) -> KernelResult<()> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(()),
        _ => Err(KernelError::OutOfBounds { buffer, offset, width, len }),
    }
}

// ============================================================================
// Configurations
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Closed set of callback configurations.
///
/// `Impl<T>` names the implementation of this configuration on tier `T`.
pub trait CallbackConfig: sealed::Sealed + Send + Sync {
    const NAME: &'static str;

    type Impl<T: TierKernels>: Callback<T, Config = Self>;
}

/// The implementation of configuration `C` on tier `T`.
pub type CallbackImpl<T, C> = <C as CallbackConfig>::Impl<T>;

/// Discards every tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOp;

/// `output[tile] = accumulator * unquant_mult`
#[derive(Debug)]
pub struct UnquantizeAndWrite<'a> {
    pub unquant_mult: f32,
    output: OutputBuffer<'a>,
}

impl<'a> UnquantizeAndWrite<'a> {
    pub fn new(unquant_mult: f32, output: &'a mut [f32]) -> Self {
        Self { unquant_mult, output: OutputBuffer::new(output) }
    }
}

/// `output[tile] = accumulator * unquant_mult + bias[col_idx..]`
#[derive(Debug)]
pub struct UnquantizeAndAddBiasAndWrite<'a> {
    pub unquant_mult: f32,
    /// One value per output column.
    pub bias: &'a [f32],
    output: OutputBuffer<'a>,
}

impl<'a> UnquantizeAndAddBiasAndWrite<'a> {
    pub fn new(unquant_mult: f32, bias: &'a [f32], output: &'a mut [f32]) -> Self {
        Self { unquant_mult, bias, output: OutputBuffer::new(output) }
    }
}

impl sealed::Sealed for NoOp {}
impl sealed::Sealed for UnquantizeAndWrite<'_> {}
impl sealed::Sealed for UnquantizeAndAddBiasAndWrite<'_> {}

impl CallbackConfig for NoOp {
    const NAME: &'static str = "NoOp";
    type Impl<T: TierKernels> = NoOpImpl<T>;
}

impl<'a> CallbackConfig for UnquantizeAndWrite<'a> {
    const NAME: &'static str = "UnquantizeAndWrite";
    type Impl<T: TierKernels> = UnquantizeAndWriteImpl<'a, T>;
}

impl<'a> CallbackConfig for UnquantizeAndAddBiasAndWrite<'a> {
    const NAME: &'static str = "UnquantizeAndAddBiasAndWrite";
    type Impl<T: TierKernels> = UnquantizeAndAddBiasAndWriteImpl<'a, T>;
}

// ============================================================================
// Callback trait
// ============================================================================

/// Per-tile output stage on tier `T`.
pub trait Callback<T: TierKernels>: Sized + Send + Sync {
    type Config: CallbackConfig;

    /// Caches the broadcast constants of `config`.
    ///
    /// # Safety
    /// The CPU must support `T`.
    unsafe fn new(config: Self::Config) -> Self;

    /// `new` after checking that the CPU supports `T`.
    fn try_new(config: Self::Config) -> KernelResult<Self> {
        if !T::is_supported() {
            return Err(KernelError::UnsupportedTier(T::CPU));
        }
        log::debug!(
            "{} callback on the {} tier ({} lanes)",
            <Self::Config as CallbackConfig>::NAME,
            T::CPU,
            tile_width::<T>()
        );
        // SAFETY: tier support checked above.
        Ok(unsafe { Self::new(config) })
    }

    /// Processes the accumulator of the tile at `info`.
    ///
    /// # Safety
    /// - The tile and, where the configuration has them, its bias and output
    ///   windows must lie inside their buffers (see `check`).
    /// - No concurrent call on the same callback may target an overlapping
    ///   output window.
    unsafe fn call(&self, input: T::Vi, info: &OutputPosition);

    /// Validates everything `call` relies on for the tile at `info`.
    fn check(&self, info: &OutputPosition) -> KernelResult<()>;

    /// `call` after `check`.
    ///
    /// Takes `&mut self`, so it cannot run alongside another call on the same
    /// callback. Workers sharing one callback use `call` and own the tile
    /// partitioning:
    ///
    /// ```compile_fail
    /// use qgemm_kernels::{kernels, new_callback, Callback, OutputPosition, Sse2, UnquantizeAndWrite};
    ///
    /// let mut output = vec![0.0f32; 4];
    /// let callback = new_callback::<Sse2, _>(UnquantizeAndWrite::new(1.0, &mut output)).unwrap();
    /// let input = unsafe { kernels::load::<Sse2, i32>([1i32; 4].as_ptr(), 0) };
    /// std::thread::scope(|s| {
    ///     s.spawn(|| callback.try_call(input, &OutputPosition::new(0, 0, 1, 4)));
    ///     s.spawn(|| callback.try_call(input, &OutputPosition::new(0, 0, 1, 4)));
    /// });
    /// ```
    #[inline]
    fn try_call(&mut self, input: T::Vi, info: &OutputPosition) -> KernelResult<()> {
        self.check(info)?;
        // SAFETY: windows validated by `check`; tier vouched for at
        // construction; the exclusive borrow rules out concurrent calls.
        unsafe { self.call(input, info) };
        Ok(())
    }
}

/// Builds the implementation of `config` on tier `T`, checking CPU support.
pub fn new_callback<T: TierKernels, C: CallbackConfig>(config: C) -> KernelResult<CallbackImpl<T, C>> {
    <C::Impl<T> as Callback<T>>::try_new(config)
}

// ============================================================================
// Implementations
// ============================================================================

pub struct NoOpImpl<T: TierKernels> {
    _tier: PhantomData<T>,
}

impl<T: TierKernels> Callback<T> for NoOpImpl<T> {
    type Config = NoOp;

    #[inline(always)]
    unsafe fn new(_config: NoOp) -> Self {
        Self { _tier: PhantomData }
    }

    #[inline(always)]
    unsafe fn call(&self, _input: T::Vi, _info: &OutputPosition) {}

    fn check(&self, info: &OutputPosition) -> KernelResult<()> {
        info.checked_offset(tile_width::<T>()).map(|_| ())
    }
}

pub struct UnquantizeAndWriteImpl<'a, T: TierKernels> {
    config: UnquantizeAndWrite<'a>,
    unquant_mult: T::Vf,
}

impl<'a, T: TierKernels> Callback<T> for UnquantizeAndWriteImpl<'a, T> {
    type Config = UnquantizeAndWrite<'a>;

    #[inline(always)]
    unsafe fn new(config: UnquantizeAndWrite<'a>) -> Self {
        let unquant_mult = T::set1_ps(config.unquant_mult);
        Self { config, unquant_mult }
    }

    #[inline(always)]
    unsafe fn call(&self, input: T::Vi, info: &OutputPosition) {
        let offset = info.offset();
        debug_assert!(offset + tile_width::<T>() <= self.config.output.len());
        let result = kernels::unquantize::<T>(input, self.unquant_mult);
        kernels::write::<T, f32>(result, self.config.output.as_mut_ptr(), offset);
    }

    fn check(&self, info: &OutputPosition) -> KernelResult<()> {
        let width = tile_width::<T>();
        let offset = info.checked_offset(width)?;
        check_window("output", offset, width, self.config.output.len())
    }
}

pub struct UnquantizeAndAddBiasAndWriteImpl<'a, T: TierKernels> {
    config: UnquantizeAndAddBiasAndWrite<'a>,
    unquant_mult: T::Vf,
}

impl<'a, T: TierKernels> Callback<T> for UnquantizeAndAddBiasAndWriteImpl<'a, T> {
    type Config = UnquantizeAndAddBiasAndWrite<'a>;

    #[inline(always)]
    unsafe fn new(config: UnquantizeAndAddBiasAndWrite<'a>) -> Self {
        let unquant_mult = T::set1_ps(config.unquant_mult);
        Self { config, unquant_mult }
    }

    #[inline(always)]
    unsafe fn call(&self, input: T::Vi, info: &OutputPosition) {
        let offset = info.offset();
        debug_assert!(info.col_idx + tile_width::<T>() <= self.config.bias.len());
        debug_assert!(offset + tile_width::<T>() <= self.config.output.len());
        let result = kernels::unquantize::<T>(input, self.unquant_mult);
        let result = kernels::add_bias::<T, f32>(result, self.config.bias.as_ptr(), info.col_idx);
        kernels::write::<T, f32>(result, self.config.output.as_mut_ptr(), offset);
    }

    fn check(&self, info: &OutputPosition) -> KernelResult<()> {
        let width = tile_width::<T>();
        let offset = info.checked_offset(width)?;
        check_window("bias", info.col_idx, width, self.config.bias.len())?;
        check_window("output", offset, width, self.config.output.len())
    }
}
