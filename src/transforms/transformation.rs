//! The transformation capability and its built-in specializations
//!
//! A [`Transformation`] pairs two scalar functions:
//!
//! - `forward` moves a value FROM the constrained space INTO the unconstrained space
//! - `backward` moves a value from the unconstrained space back into the constrained space
//!
//! This is the reverse of the usual bijector convention, where "forward" maps an
//! unconstrained value onto the constrained domain. Call sites rely on this exact
//! role assignment: transforming a collection applies `forward`, untransforming
//! applies `backward`.

use std::fmt::Debug;

use crate::transforms::bounds::{Bounds, BoundsError};
use crate::transforms::elementary::{
    logit, sigmoid, softplus, softplus_derivative, softplus_inverse,
};

/// Step size for the finite-difference fallback of [`Transformation::backward_derivative`].
const DERIVATIVE_EPSILON: f64 = 1e-6;

/// Smallest positive `f64` (a subnormal). `softplus` underflows to zero below about `-745`.
const SMALLEST_POSITIVE: f64 = 5e-324;

/// Central difference with a step scaled to the magnitude of `z`.
fn central_difference<F: Fn(f64) -> f64>(f: F, z: f64) -> f64 {
    let h = if z.abs() > 1.0 {
        z.abs() * DERIVATIVE_EPSILON
    } else {
        DERIVATIVE_EPSILON
    };
    (f(z + h) - f(z - h)) / (2.0 * h)
}

/// A bijection between a constrained domain and the whole real line.
///
/// Implementations must satisfy `backward(forward(x)) ≈ x` for every `x` in the
/// constrained domain. Neither direction may panic or return an error for inputs
/// outside the domain; they return a non-finite value instead.
///
/// New transformations are added by implementing this trait; every collection
/// operation accepts `&dyn Transformation`.
pub trait Transformation: Debug + Send + Sync {
    /// Constrained → unconstrained.
    fn forward(&self, x: f64) -> f64;

    /// Unconstrained → constrained.
    fn backward(&self, z: f64) -> f64;

    /// Derivative of [`backward`](Transformation::backward) at `z`.
    ///
    /// Used to pull a constrained-space gradient back into unconstrained space.
    /// The default is a central finite difference.
    fn backward_derivative(&self, z: f64) -> f64 {
        central_difference(|v| self.backward(v), z)
    }

    /// Whether `x` lies in the constrained domain of `forward`.
    fn in_domain(&self, x: f64) -> bool {
        x.is_finite()
    }

    /// Short human-readable name, used in error messages and logs.
    fn name(&self) -> &str;
}

/// The default positivity transform: `forward = softplus_inverse`, `backward = softplus`.
///
/// Used for every parameter that must stay strictly positive (lengthscales,
/// variances, noise scales). `backward` never returns zero: where `softplus`
/// underflows it returns the smallest positive `f64`, which `forward` still maps
/// to a finite value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoftplusTransformation;

impl Transformation for SoftplusTransformation {
    #[inline]
    fn forward(&self, x: f64) -> f64 {
        softplus_inverse(x)
    }

    #[inline]
    fn backward(&self, z: f64) -> f64 {
        let x = softplus(z);
        if x == 0.0 {
            SMALLEST_POSITIVE
        } else {
            x
        }
    }

    #[inline]
    fn backward_derivative(&self, z: f64) -> f64 {
        softplus_derivative(z)
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0 && x.is_finite()
    }

    fn name(&self) -> &str {
        "softplus"
    }
}

/// Leaves values unchanged, for parameters that are already unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityTransformation;

impl Transformation for IdentityTransformation {
    #[inline]
    fn forward(&self, x: f64) -> f64 {
        x
    }

    #[inline]
    fn backward(&self, z: f64) -> f64 {
        z
    }

    #[inline]
    fn backward_derivative(&self, _z: f64) -> f64 {
        1.0
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Maps a finite open interval `(min, max)` onto the real line through a scaled logit.
///
/// `forward(x) = logit((x - min) / (max - min))`,
/// `backward(z) = min + (max - min) * sigmoid(z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidTransformation {
    bounds: Bounds,
}

impl SigmoidTransformation {
    /// Create a sigmoid transformation for finite bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::transforms::{Bounds, SigmoidTransformation, Transformation};
    ///
    /// let t = SigmoidTransformation::new(Bounds::new(0.0, 1.0).unwrap()).unwrap();
    /// assert!((t.backward(t.forward(0.3)) - 0.3).abs() < 1e-12);
    /// assert!(SigmoidTransformation::new(Bounds::positive()).is_err());
    /// ```
    pub fn new(bounds: Bounds) -> Result<Self, BoundsError> {
        // The fields are public, so `Bounds::new` may have been bypassed
        if !(bounds.min < bounds.max) {
            return Err(BoundsError::InvalidBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        if !bounds.is_finite() {
            return Err(BoundsError::NotFinite {
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(Self { bounds })
    }

    /// Shorthand for `SigmoidTransformation::new(Bounds::new(min, max)?)`
    pub fn with_range(min: f64, max: f64) -> Result<Self, BoundsError> {
        Self::new(Bounds::new(min, max)?)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl Transformation for SigmoidTransformation {
    fn forward(&self, x: f64) -> f64 {
        logit((x - self.bounds.min) / self.bounds.width())
    }

    fn backward(&self, z: f64) -> f64 {
        self.bounds.min + self.bounds.width() * sigmoid(z)
    }

    fn backward_derivative(&self, z: f64) -> f64 {
        let s = sigmoid(z);
        self.bounds.width() * s * (1.0 - s)
    }

    fn in_domain(&self, x: f64) -> bool {
        self.bounds.contains(x)
    }

    fn name(&self) -> &str {
        "sigmoid"
    }
}

/// A transformation assembled from two plain functions.
///
/// # Examples
///
/// ```
/// use gpparams_rs::transforms::{FnTransformation, Transformation};
///
/// // Log/exp positivity transform
/// let t = FnTransformation::new("log", f64::ln, f64::exp).with_derivative(f64::exp);
/// assert!((t.backward(t.forward(3.0)) - 3.0).abs() < 1e-12);
/// assert_eq!(t.name(), "log");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnTransformation {
    name: &'static str,
    forward: fn(f64) -> f64,
    backward: fn(f64) -> f64,
    derivative: Option<fn(f64) -> f64>,
    domain: Option<fn(f64) -> bool>,
}

impl FnTransformation {
    pub fn new(name: &'static str, forward: fn(f64) -> f64, backward: fn(f64) -> f64) -> Self {
        Self {
            name,
            forward,
            backward,
            derivative: None,
            domain: None,
        }
    }

    /// Supply the analytic derivative of `backward` instead of the finite-difference fallback
    pub fn with_derivative(mut self, derivative: fn(f64) -> f64) -> Self {
        self.derivative = Some(derivative);
        self
    }

    /// Supply a domain predicate for the opt-in validation layer
    pub fn with_domain(mut self, domain: fn(f64) -> bool) -> Self {
        self.domain = Some(domain);
        self
    }
}

impl Transformation for FnTransformation {
    fn forward(&self, x: f64) -> f64 {
        (self.forward)(x)
    }

    fn backward(&self, z: f64) -> f64 {
        (self.backward)(z)
    }

    fn backward_derivative(&self, z: f64) -> f64 {
        match self.derivative {
            Some(d) => d(z),
            None => central_difference(self.backward, z),
        }
    }

    fn in_domain(&self, x: f64) -> bool {
        match self.domain {
            Some(d) => d(x),
            None => x.is_finite(),
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}
