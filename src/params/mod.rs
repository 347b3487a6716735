//! # Parameter Collections
//!
//! Named parameter values and the operations that move a whole collection between
//! constrained and unconstrained space.
//!
//! ## Core Components
//!
//! - [`ParamValue`]: a scalar or an n-dimensional array
//! - [`Params`]: a collection of named values, with JSON persistence
//! - [`transform`] / [`untransform`]: apply one transformation to every key
//! - [`TransformationMap`] with [`transform_with`] / [`untransform_with`]: per-key dispatch
//! - [`untransform_gradient`]: chain rule from constrained to unconstrained space
//!
//! ## Example Usage
//!
//! ```rust
//! use gpparams_rs::params::{transform_with, untransform_with, Params, TransformationMap};
//! use gpparams_rs::transforms::IdentityTransformation;
//!
//! let params = Params::new()
//!     .with("lengthscale", vec![1.0, 2.0, 3.0])
//!     .with("variance", 0.5)
//!     .with("mean", -1.0);
//!
//! // Softplus for everything except the mean
//! let transformations = TransformationMap::default().with("mean", IdentityTransformation);
//!
//! let unconstrained = transform_with(&params, &transformations);
//! assert_eq!(unconstrained.scalar("mean"), Some(-1.0));
//!
//! let constrained = untransform_with(&unconstrained, &transformations);
//! assert!((constrained.scalar("variance").unwrap() - 0.5).abs() < 1e-12);
//! ```

pub mod apply;
pub mod collection;
pub mod value;

pub use apply::{
    transform, transform_batch, transform_checked, transform_with, untransform, untransform_batch,
    untransform_gradient, untransform_with, TransformationMap,
};
pub use collection::{Params, SerializationError};
pub use value::ParamValue;
