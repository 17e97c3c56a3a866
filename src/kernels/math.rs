//! Exponential and the activations built on it.
//!
//! All three need a lane-indexed gather and are therefore bounded by `Wide`.

use std::arch::x86_64::_CMP_LT_OS;

use crate::traits::Wide;

/// Smallest exponent `exp_approx_taylor` evaluates; lower inputs saturate.
pub const EXP_MIN: i32 = -20;
/// Largest exponent `exp_approx_taylor` evaluates; higher inputs saturate.
pub const EXP_MAX: i32 = 20;

/// `e^k` for `k` in `EXP_MIN..=EXP_MAX`, nearest float32.
#[rustfmt::skip]
pub static EXP_LOOKUP: [f32; 41] = [
    2.0611537e-09, 5.6027964e-09, 1.5229979e-08, 4.1399378e-08, 1.12535176e-07,
    3.0590232e-07, 8.315287e-07, 2.2603294e-06, 6.1442124e-06, 1.670170e-05,
    4.539993e-05, 1.234098e-04, 3.3546262e-04, 9.118820e-04, 2.4787523e-03,
    6.737947e-03, 1.831564e-02, 4.9787067e-02, 1.3533528e-01, 3.6787945e-01,
    1.000000e+00,
    2.7182817e+00, 7.389056e+00, 2.0085537e+01, 5.459815e+01, 1.4841316e+02,
    4.034288e+02, 1.0966332e+03, 2.980958e+03, 8.103084e+03, 2.2026465e+04,
    5.987414e+04, 1.627548e+05, 4.424134e+05, 1.2026042e+06, 3.2690172e+06,
    8.886111e+06, 2.4154952e+07, 6.565997e+07, 1.784823e+08, 4.851652e+08,
];

/// Horner coefficients of the degree-7 Taylor polynomial of `e^r`, highest
/// power first.
const TAYLOR: [f32; 8] = [
    1.0 / 5040.0,
    1.0 / 720.0,
    1.0 / 120.0,
    1.0 / 24.0,
    1.0 / 6.0,
    1.0 / 2.0,
    1.0,
    1.0,
];

/// `e^x` with `x` clamped to `[EXP_MIN, EXP_MAX]`.
///
/// `x = a + r` with `a = floor(x)`: `e^a` comes from `EXP_LOOKUP`, `e^r` for
/// `r` in `[0, 1)` from the Taylor polynomial. Relative error stays below
/// 2e-5 and integer inputs return the table value exactly. NaN lanes
/// saturate to `e^EXP_MIN`.
#[inline(always)]
pub unsafe fn exp_approx_taylor<T: Wide>(input: T::Vf) -> T::Vf {
    let clamped = T::min_ps(
        T::max_ps(input, T::set1_ps(EXP_MIN as f32)),
        T::set1_ps(EXP_MAX as f32),
    );
    let a = T::floor_ps(clamped);
    let r = T::sub_ps(clamped, a);

    let mut poly = T::set1_ps(TAYLOR[0]);
    for &coefficient in &TAYLOR[1..] {
        poly = T::add_ps(T::mul_ps(poly, r), T::set1_ps(coefficient));
    }

    let center = EXP_LOOKUP.as_ptr().add((-EXP_MIN) as usize);
    let table = T::i32gather_ps::<4>(center, T::cvtps_epi32(a));
    T::mul_ps(table, poly)
}

/// `1 / d` from the approximate reciprocal plus one Newton-Raphson step.
#[inline(always)]
unsafe fn reciprocal<T: Wide>(d: T::Vf) -> T::Vf {
    let r = T::rcp_ps(d);
    T::mul_ps(r, T::sub_ps(T::set1_ps(2.0), T::mul_ps(d, r)))
}

/// Logistic function. Positive lanes use `1 - 1 / (1 + e^x)`, the others
/// `1 / (1 + e^-x)`, so both branches stay within `[0, 1]` and the result is
/// non-decreasing in `x`.
#[inline(always)]
pub unsafe fn sigmoid<T: Wide>(input: T::Vf) -> T::Vf {
    let one = T::set1_ps(1.0);
    let zero = T::setzero_ps();
    let exp_x = exp_approx_taylor::<T>(input);
    let exp_neg_x = exp_approx_taylor::<T>(T::sub_ps(zero, input));

    let non_positive = reciprocal::<T>(T::add_ps(one, exp_neg_x));
    let positive = T::sub_ps(one, reciprocal::<T>(T::add_ps(one, exp_x)));
    T::blend_ps(T::cmp_ps::<_CMP_LT_OS>(zero, input), non_positive, positive)
}

#[inline(always)]
pub unsafe fn tanh<T: Wide>(input: T::Vf) -> T::Vf {
    let exp_x = exp_approx_taylor::<T>(input);
    let exp_neg_x = exp_approx_taylor::<T>(T::sub_ps(T::setzero_ps(), input));
    T::div_ps(T::sub_ps(exp_x, exp_neg_x), T::add_ps(exp_x, exp_neg_x))
}
