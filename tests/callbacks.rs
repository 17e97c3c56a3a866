//! Multi-threaded callback tests: one callback instance shared by a rayon
//! pool through `call`, each worker writing a disjoint set of tiles, then
//! `try_call` once the pool has released it.

#![cfg(target_arch = "x86_64")]

use rayon::prelude::*;

use qgemm_kernels::kernels;
#[cfg(feature = "avx512")]
use qgemm_kernels::Avx512bw;
use qgemm_kernels::{
    new_callback, select_cpu_tier, tile_width, Avx2, Callback, CpuTier, OutputPosition, Sse2, Tier,
    TierKernels, UnquantizeAndAddBiasAndWrite, UnquantizeAndWrite,
};

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

/// Deterministic accumulator matrix in the range an int8 GEMM produces.
fn accumulators(rows: usize, cols: usize) -> Vec<i32> {
    (0..rows * cols)
        .map(|i| ((i as i64 * 2_654_435_761) % 400_001 - 200_000) as i32)
        .collect()
}

fn parallel_tiles<T: TierKernels>(rows: usize, col_tiles: usize) {
    let width = tile_width::<T>();
    let cols = col_tiles * width;
    let acc = accumulators(rows, cols);
    let bias: Vec<f32> = (0..cols).map(|c| (c as f32).sin()).collect();
    let scale = 1.0 / 127.0f32;

    let mut output = vec![f32::NAN; rows * cols];
    {
        let config = UnquantizeAndAddBiasAndWrite::new(scale, &bias, &mut output);
        let mut callback = new_callback::<T, _>(config).expect("tier detected as supported");

        // Each worker owns one row, so no two calls overlap.
        let shared = &callback;
        (0..rows).into_par_iter().for_each(|row| {
            for col in (0..cols).step_by(width) {
                let info = OutputPosition::new(row, col, rows, cols);
                shared.check(&info).expect("tile inside the output");
                unsafe {
                    let input = kernels::load::<T, i32>(acc.as_ptr(), info.offset());
                    shared.call(input, &info);
                }
            }
        });

        // Exclusive access again once the workers are done: rewrite row 0.
        for col in (0..cols).step_by(width) {
            let info = OutputPosition::new(0, col, rows, cols);
            let input = unsafe { kernels::load::<T, i32>(acc.as_ptr(), info.offset()) };
            callback.try_call(input, &info).expect("tile inside the output");
        }
    }

    for (i, got) in output.iter().enumerate() {
        let expected = acc[i] as f32 * scale + bias[i % cols];
        assert_eq!(*got, expected, "element {i} on {:?}", T::CPU);
    }
}

fn parallel_unchecked<T: TierKernels>(rows: usize, col_tiles: usize) {
    let width = tile_width::<T>();
    let cols = col_tiles * width;
    let acc = accumulators(rows, cols);
    let mut output = vec![0.0f32; rows * cols];
    {
        let callback = new_callback::<T, _>(UnquantizeAndWrite::new(0.25, &mut output)).expect("supported tier");
        let tiles: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..cols).step_by(width).map(move |c| (r, c)))
            .collect();
        tiles.par_iter().for_each(|&(row, col)| {
            let info = OutputPosition::new(row, col, rows, cols);
            // SAFETY: the tier is supported, every tile lies inside `output`
            // and each (row, col) pair is visited once.
            unsafe {
                let input = kernels::load::<T, i32>(acc.as_ptr(), info.offset());
                callback.call(input, &info);
            }
        });
    }
    assert!(output.iter().zip(&acc).all(|(o, a)| *o == *a as f32 * 0.25));
}

// ═══════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_parallel_tiles_sse2() {
    parallel_tiles::<Sse2>(64, 8);
    parallel_unchecked::<Sse2>(33, 5);
}

#[test]
fn test_parallel_tiles_avx2() {
    if !Avx2::is_supported() {
        println!("Skipping AVX2 test: AVX2 not supported");
        return;
    }
    parallel_tiles::<Avx2>(64, 8);
    parallel_unchecked::<Avx2>(33, 5);
}

#[cfg(feature = "avx512")]
#[test]
fn test_parallel_tiles_avx512() {
    if !Avx512bw::is_supported() {
        eprintln!("AVX-512 not supported on this CPU, skipping");
        return;
    }
    parallel_tiles::<Avx512bw>(64, 8);
    parallel_unchecked::<Avx512bw>(33, 5);
}

#[test]
fn test_selected_tier_runs() {
    // QGEMM_CPUID may be set by the environment running the suite.
    let tier = match select_cpu_tier() {
        Ok(tier) => tier,
        Err(e) => {
            println!("Skipping: {e}");
            return;
        }
    };
    match tier {
        CpuTier::Sse2 => parallel_tiles::<Sse2>(16, 4),
        CpuTier::Avx2 => parallel_tiles::<Avx2>(16, 4),
        #[cfg(feature = "avx512")]
        CpuTier::Avx512bw => parallel_tiles::<Avx512bw>(16, 4),
        #[cfg(not(feature = "avx512"))]
        CpuTier::Avx512bw => unreachable!("avx512 tier reported without the avx512 feature"),
    }
}
