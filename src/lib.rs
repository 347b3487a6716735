//! # gpparams-rs
//!
//! `gpparams-rs` maps Gaussian-process model parameters between the constrained
//! space they are defined in (positive lengthscales and variances, bounded mixing
//! weights) and the unconstrained space gradient-based optimizers work in.
//!
//! The library provides:
//! - Numerically stable elementary bijections (`softplus`, `softplus_inverse`, ...)
//! - The [`Transformation`] capability with softplus, identity, sigmoid and function-pair specializations
//! - Named parameter collections holding scalars or arrays, with JSON persistence
//! - Collection-level [`transform`] / [`untransform`], per-key dispatch and gradient pull-back
//! - A small fitting loop in unconstrained space
//!
//! Note the direction convention: `forward` goes from constrained to unconstrained
//! space, `backward` returns to constrained space.
//!
//! ## Basic Usage
//!
//! ```
//! use gpparams_rs::{transform, untransform, Params, SoftplusTransformation};
//!
//! let params = Params::new().with("lengthscale", 2.0).with("variance", 0.5);
//! let unconstrained = transform(&params, &SoftplusTransformation);
//! let restored = untransform(&unconstrained, &SoftplusTransformation);
//!
//! assert!((restored.scalar("lengthscale").unwrap() - 2.0).abs() < 1e-10);
//! assert!(params.same_keys(&unconstrained));
//! ```

pub mod error;
pub mod optim;
pub mod params;
pub mod transforms;

// Re-exports for convenience
pub use error::{GpParamsError, Result};
pub use params::{transform, untransform, ParamValue, Params, TransformationMap};
pub use transforms::{SoftplusTransformation, Transformation};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
