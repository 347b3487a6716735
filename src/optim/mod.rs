//! # Fitting
//!
//! A small first-order optimization loop that works in unconstrained space while
//! the objective only ever sees constrained values.
//!
//! - [`Objective`]: loss (and optionally gradient) over constrained [`Params`](crate::params::Params)
//! - [`FitConfig`] / [`OptimizerKind`]: iterations, progress reporting, gradient descent or Adam
//! - [`fit`]: the loop itself, returning an [`InferenceState`]
//!
//! Progress is reported through the `log` facade every `log_rate` iterations.

pub mod config;
pub mod fit;
pub mod objective;

pub use config::{FitConfig, OptimizerKind};
pub use fit::{fit, InferenceState, Trainables};
pub use objective::{finite_difference_gradient, Objective};
