//! # Transformations
//!
//! Bijections between the constrained space a model parameter lives in and the
//! unconstrained real line that gradient-based optimizers work in.
//!
//! - [`elementary`]: numerically stable scalar functions (`softplus`, `softplus_inverse`, ...)
//! - [`Transformation`]: the forward/backward capability, with the built-in
//!   [`SoftplusTransformation`], [`IdentityTransformation`], [`SigmoidTransformation`]
//!   and [`FnTransformation`]
//! - [`Bounds`]: the interval describing a constrained domain
//!
//! ```rust
//! use gpparams_rs::transforms::{SoftplusTransformation, Transformation};
//!
//! let t = SoftplusTransformation;
//! let unconstrained = t.forward(0.5);
//! assert!((t.backward(unconstrained) - 0.5).abs() < 1e-12);
//! ```

pub mod bounds;
pub mod elementary;
pub mod transformation;

pub use bounds::{Bounds, BoundsError};
pub use elementary::{logit, sigmoid, softplus, softplus_derivative, softplus_inverse};
pub use transformation::{
    FnTransformation, IdentityTransformation, SigmoidTransformation, SoftplusTransformation,
    Transformation,
};
