//! Elementary scalar bijections
//!
//! Numerically stable forms of the functions that move a scalar between the
//! positive real line (or the unit interval) and the whole real line. None of
//! these functions panic or return errors: inputs outside the domain produce
//! `NaN` or an infinity, which then propagates through whatever consumes it.

/// Map a value on the strictly positive real line onto the whole real line.
///
/// Computes `ln(exp(x) - 1)` as `x + ln(-expm1(-x))`, which never evaluates
/// `exp(x)` and therefore cannot overflow for large `x`.
///
/// The input must satisfy `x > 0`. For `x == 0` the result is `-inf`; for
/// `x < 0` it is `NaN`.
///
/// # Examples
///
/// ```
/// use gpparams_rs::transforms::elementary::{softplus, softplus_inverse};
///
/// let z = softplus_inverse(2.0);
/// assert!((softplus(z) - 2.0).abs() < 1e-12);
/// assert!(softplus_inverse(-1.0).is_nan());
/// ```
#[inline]
pub fn softplus_inverse(x: f64) -> f64 {
    x + (-(-x).exp_m1()).ln()
}

/// Map any real value onto the strictly positive real line.
///
/// Computes `ln(1 + exp(x))` as `max(x, 0) + ln1p(exp(-|x|))`, which is finite
/// for every finite `x` and keeps full precision in both tails.
///
/// The result is positive down to `x ≈ -745`; below that `exp(x)` underflows
/// and the result is exactly `0.0`. `SoftplusTransformation::backward` floors it
/// at the smallest positive `f64`.
#[inline]
pub fn softplus(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Derivative of [`softplus`], which is the logistic sigmoid.
#[inline]
pub fn softplus_derivative(x: f64) -> f64 {
    sigmoid(x)
}

/// Logistic sigmoid `1 / (1 + exp(-x))`, evaluated without overflow in either tail.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`sigmoid`]: `ln(p / (1 - p))`.
///
/// `p` must lie in `(0, 1)`; the endpoints map to `∓inf` and anything outside
/// `[0, 1]` yields `NaN`.
#[inline]
pub fn logit(p: f64) -> f64 {
    p.ln() - (-p).ln_1p()
}
