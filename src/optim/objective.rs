//! Objectives evaluated on constrained parameters.
//!
//! An [`Objective`] returns a scalar loss for a collection of constrained values.
//! Implementations that know their gradient override
//! [`value_and_grad`](Objective::value_and_grad) and
//! [`has_custom_gradient`](Objective::has_custom_gradient); everything else falls
//! back to central finite differences.

use crate::error::{GpParamsError, Result};
use crate::params::collection::Params;

/// Default step size for finite differences.
const DEFAULT_EPSILON: f64 = 1e-6;

/// A scalar loss over constrained parameters.
pub trait Objective {
    /// Evaluate the loss at `params`.
    fn value(&self, params: &Params) -> Result<f64>;

    /// Evaluate the loss and its gradient with respect to every element of `params`.
    ///
    /// The gradient has the same keys and shapes as `params`.
    fn value_and_grad(&self, params: &Params) -> Result<(f64, Params)> {
        let value = self.value(params)?;
        let grad = finite_difference_gradient(|p| self.value(p), params, None)?;
        Ok((value, grad))
    }

    /// Whether [`value_and_grad`](Objective::value_and_grad) is analytic.
    ///
    /// When this is `false`, [`fit`](crate::optim::fit::fit) takes finite
    /// differences in unconstrained space instead, so every evaluation stays
    /// inside the transformations' domains.
    fn has_custom_gradient(&self) -> bool {
        false
    }
}

impl<F> Objective for F
where
    F: Fn(&Params) -> Result<f64>,
{
    fn value(&self, params: &Params) -> Result<f64> {
        self(params)
    }
}

/// Compute the gradient of a scalar function using central finite differences.
///
/// Every element of every value is perturbed independently; the step is scaled
/// to the magnitude of the element.
///
/// # Arguments
///
/// * `f` - The function to differentiate
/// * `params` - The point at which to evaluate the gradient
/// * `epsilon` - The step size for finite differences (optional)
///
/// # Returns
///
/// * `Result<Params>` - The gradient, with the keys and shapes of `params`
pub fn finite_difference_gradient<F>(f: F, params: &Params, epsilon: Option<f64>) -> Result<Params>
where
    F: Fn(&Params) -> Result<f64>,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    if !(eps > 0.0) {
        return Err(GpParamsError::InvalidConfig(format!(
            "finite difference step must be positive, got {}",
            eps
        )));
    }

    let mut grad = Params::new();
    for key in params.keys() {
        let value = &params[key.as_str()];
        let mut partials = Vec::with_capacity(value.len());

        for (j, x) in value.iter().enumerate() {
            // Adapt epsilon to parameter scale
            let eps_j = if x.abs() > 1.0 { x.abs() * eps } else { eps };

            let forward = params
                .clone()
                .with(key.as_str(), value.map_indexed(|i, v| if i == j { v + eps_j } else { v }));
            let backward = params
                .clone()
                .with(key.as_str(), value.map_indexed(|i, v| if i == j { v - eps_j } else { v }));

            partials.push((f(&forward)? - f(&backward)?) / (2.0 * eps_j));
        }

        grad.insert(key.as_str(), value.map_indexed(|i, _| partials[i]));
    }

    Ok(grad)
}
