//! Callback and kernel throughput.
//!
//! Benchmarks: full-matrix output stage per callback configuration, plus the
//! exp/sigmoid/floor kernels, for every tier the host supports.
//! Output sizes: 64x256, 256x1024, 1024x1024 (columns are tile multiples).
//! Report: elements/second.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use qgemm_kernels::kernels;
#[cfg(feature = "avx512")]
use qgemm_kernels::Avx512bw;
use qgemm_kernels::{
    new_callback, tile_width, Avx2, Callback, CallbackConfig, NoOp, OutputPosition, Sse2, Tier, TierKernels,
    UnquantizeAndAddBiasAndWrite, UnquantizeAndWrite, Wide,
};

const SHAPES: &[(usize, usize)] = &[(64, 256), (256, 1024), (1024, 1024)];

fn run_tiles<T: TierKernels, C: CallbackConfig>(callback: &C::Impl<T>, acc: &[i32], rows: usize, cols: usize) {
    let width = tile_width::<T>();
    for row in 0..rows {
        for col in (0..cols).step_by(width) {
            let info = OutputPosition::new(row, col, rows, cols);
            unsafe {
                let input = kernels::load::<T, i32>(acc.as_ptr(), info.offset());
                callback.call(black_box(input), &info);
            }
        }
    }
}

fn bench_tier_callbacks<T: TierKernels>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("callbacks_{}", T::CPU));
    for &(rows, cols) in SHAPES {
        let label = format!("{rows}x{cols}");
        let acc: Vec<i32> = (0..rows * cols).map(|i| (i % 2001) as i32 - 1000).collect();
        let bias: Vec<f32> = (0..cols).map(|c| c as f32 * 0.01).collect();
        let mut output = vec![0.0f32; rows * cols];
        group.throughput(Throughput::Elements((rows * cols) as u64));

        let Ok(noop) = new_callback::<T, _>(NoOp) else { return };
        group.bench_with_input(BenchmarkId::new("noop", &label), &acc, |b, acc| {
            b.iter(|| run_tiles::<T, NoOp>(&noop, acc, rows, cols))
        });

        {
            let Ok(write) = new_callback::<T, _>(UnquantizeAndWrite::new(0.01, &mut output)) else { return };
            group.bench_with_input(BenchmarkId::new("unquantize_write", &label), &acc, |b, acc| {
                b.iter(|| run_tiles::<T, UnquantizeAndWrite>(&write, acc, rows, cols))
            });
        }

        {
            let config = UnquantizeAndAddBiasAndWrite::new(0.01, &bias, &mut output);
            let Ok(write_bias) = new_callback::<T, _>(config) else { return };
            group.bench_with_input(BenchmarkId::new("unquantize_bias_write", &label), &acc, |b, acc| {
                b.iter(|| run_tiles::<T, UnquantizeAndAddBiasAndWrite>(&write_bias, acc, rows, cols))
            });
        }
        black_box(&output);
    }
    group.finish();
}

fn map_floats<T: TierKernels>(input: &[f32], output: &mut [f32], kernel: unsafe fn(T::Vf) -> T::Vf) {
    let lanes = tile_width::<T>();
    for offset in (0..input.len()).step_by(lanes) {
        unsafe {
            let r = kernel(kernels::load::<T, f32>(input.as_ptr(), offset));
            kernels::write::<T, f32>(r, output.as_mut_ptr(), offset);
        }
    }
}

fn bench_tier_math<T: Wide>(c: &mut Criterion) {
    let n = 64 * 1024;
    let input: Vec<f32> = (0..n).map(|i| (i as f32 / n as f32) * 40.0 - 20.0).collect();
    let mut output = vec![0.0f32; n];

    let mut group = c.benchmark_group(format!("math_{}", T::CPU));
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("exp_approx_taylor", |b| {
        b.iter(|| map_floats::<T>(black_box(&input), &mut output, kernels::exp_approx_taylor::<T>))
    });
    group.bench_function("sigmoid", |b| {
        b.iter(|| map_floats::<T>(black_box(&input), &mut output, kernels::sigmoid::<T>))
    });
    group.bench_function("tanh", |b| {
        b.iter(|| map_floats::<T>(black_box(&input), &mut output, kernels::tanh::<T>))
    });
    group.bench_function("floor", |b| {
        b.iter(|| map_floats::<T>(black_box(&input), &mut output, kernels::floor::<T>))
    });
    group.finish();
}

fn bench_sse2_floor(c: &mut Criterion) {
    let n = 64 * 1024;
    let input: Vec<f32> = (0..n).map(|i| (i as f32 / n as f32) * 40.0 - 20.0).collect();
    let mut output = vec![0.0f32; n];
    c.bench_function("math_sse2/floor_emulated", |b| {
        b.iter(|| map_floats::<Sse2>(black_box(&input), &mut output, kernels::floor::<Sse2>))
    });
}

fn bench_callbacks(c: &mut Criterion) {
    bench_tier_callbacks::<Sse2>(c);
    if Avx2::is_supported() {
        bench_tier_callbacks::<Avx2>(c);
    }
    #[cfg(feature = "avx512")]
    {
        if Avx512bw::is_supported() {
            bench_tier_callbacks::<Avx512bw>(c);
        }
    }
}

fn bench_math(c: &mut Criterion) {
    bench_sse2_floor(c);
    if Avx2::is_supported() {
        bench_tier_math::<Avx2>(c);
    }
    #[cfg(feature = "avx512")]
    {
        if Avx512bw::is_supported() {
            bench_tier_math::<Avx512bw>(c);
        }
    }
}

criterion_group!(benches, bench_callbacks, bench_math);
criterion_main!(benches);
