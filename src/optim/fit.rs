//! Gradient-based fitting in unconstrained space.
//!
//! [`fit`] takes constrained starting values, moves them into unconstrained space
//! once, and then repeats: untransform → evaluate objective and gradient →
//! pull the gradient back through the transformations → optimizer step.
//! Parameters marked as not trainable keep their starting value exactly.

use std::collections::HashMap;

use crate::error::{GpParamsError, Result};
use crate::optim::config::{FitConfig, OptimizerKind};
use crate::optim::objective::{finite_difference_gradient, Objective};
use crate::params::apply::{
    transform_checked, transform_with, untransform_gradient, untransform_with, TransformationMap,
};
use crate::params::collection::Params;

/// Which parameters the optimizer may change. Keys that are absent are trainable.
pub type Trainables = HashMap<String, bool>;

fn is_trainable(trainables: &Trainables, key: &str) -> bool {
    trainables.get(key).copied().unwrap_or(true)
}

/// Result of a fitting run.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceState {
    /// Final parameters, in constrained space
    pub params: Params,

    /// Objective value at every iteration, in order
    pub history: Vec<f64>,
}

impl InferenceState {
    pub fn unpack(self) -> (Params, Vec<f64>) {
        (self.params, self.history)
    }

    /// The last recorded objective value
    pub fn final_loss(&self) -> Option<f64> {
        self.history.last().copied()
    }
}

/// Combine two collections with the same keys and shapes element-wise.
fn zip_params<F>(a: &Params, b: &Params, f: F) -> Result<Params>
where
    F: Fn(f64, f64) -> f64,
{
    let mut out = Params::new();
    for (key, va) in a {
        let vb = b
            .get(key)
            .ok_or_else(|| GpParamsError::KeyMismatch(format!("missing key '{}'", key)))?;
        let combined = va.zip_map(vb, &f).ok_or_else(|| GpParamsError::ShapeMismatch {
            key: key.clone(),
            expected: va.shape(),
            actual: vb.shape(),
        })?;
        out.insert(key.clone(), combined);
    }
    Ok(out)
}

/// Mutable optimizer state, one per fitting run.
enum OptimizerState {
    GradientDescent {
        learning_rate: f64,
    },
    Adam {
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        m: Params,
        v: Params,
        t: i32,
    },
}

impl OptimizerState {
    fn new(kind: OptimizerKind, like: &Params) -> Self {
        match kind {
            OptimizerKind::GradientDescent { learning_rate } => {
                OptimizerState::GradientDescent { learning_rate }
            }
            OptimizerKind::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let zeros = like.map_values(|_, v| v.zeros_like());
                OptimizerState::Adam {
                    learning_rate,
                    beta1,
                    beta2,
                    epsilon,
                    m: zeros.clone(),
                    v: zeros,
                    t: 0,
                }
            }
        }
    }

    /// Return the next point given the current point and its gradient.
    fn step(&mut self, z: &Params, grad: &Params) -> Result<Params> {
        match self {
            OptimizerState::GradientDescent { learning_rate } => {
                let lr = *learning_rate;
                zip_params(z, grad, |x, g| x - lr * g)
            }
            OptimizerState::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
                m,
                v,
                t,
            } => {
                let (lr, b1, b2, eps) = (*learning_rate, *beta1, *beta2, *epsilon);
                *t += 1;

                *m = zip_params(m, grad, |m, g| b1 * m + (1.0 - b1) * g)?;
                *v = zip_params(v, grad, |v, g| b2 * v + (1.0 - b2) * g * g)?;

                let m_correction = 1.0 - b1.powi(*t);
                let v_correction = 1.0 - b2.powi(*t);
                let update = zip_params(m, v, |m, v| {
                    lr * (m / m_correction) / ((v / v_correction).sqrt() + eps)
                })?;

                zip_params(z, &update, |x, u| x - u)
            }
        }
    }
}

/// Restore frozen keys to their starting constrained values.
fn with_frozen(constrained: Params, start: &Params, trainables: &Trainables) -> Params {
    constrained.map_values(|k, v| {
        if is_trainable(trainables, k) {
            v.clone()
        } else {
            start[k].clone()
        }
    })
}

/// Loss and unconstrained-space gradient at `z`.
///
/// Analytic gradients are pulled back through the transformations. Otherwise the
/// central difference is taken over `z` itself: perturbing a constrained value
/// close to its boundary would step outside the domain.
fn loss_and_gradient<O>(
    objective: &O,
    z: &Params,
    start: &Params,
    trainables: &Trainables,
    transformations: &TransformationMap,
) -> Result<(f64, Params)>
where
    O: Objective + ?Sized,
{
    let constrained =
        |z: &Params| with_frozen(untransform_with(z, transformations), start, trainables);

    if objective.has_custom_gradient() {
        let (loss, grad_theta) = objective.value_and_grad(&constrained(z))?;
        let grad_z = untransform_gradient(z, &grad_theta, transformations)?;
        Ok((loss, grad_z))
    } else {
        let loss = objective.value(&constrained(z))?;
        let grad_z = finite_difference_gradient(|p| objective.value(&constrained(p)), z, None)?;
        Ok((loss, grad_z))
    }
}

/// Minimise `objective` over `params` with gradient steps in unconstrained space.
///
/// # Arguments
///
/// * `objective` - Loss evaluated on constrained parameters
/// * `params` - Starting values, in constrained space
/// * `trainables` - Keys mapped to `false` stay fixed; absent keys are trained
/// * `transformations` - Per-key transformations between the two spaces
/// * `config` - Loop and optimizer settings
///
/// # Returns
///
/// The final constrained parameters and the objective value at every iteration.
/// Fails if the starting value of a trainable parameter lies outside its
/// transformation's domain, if the objective errors, or if the loss becomes
/// non-finite. Frozen parameters are passed to the objective as given and are
/// not checked.
///
/// # Examples
///
/// ```
/// use gpparams_rs::optim::{fit, FitConfig, OptimizerKind, Trainables};
/// use gpparams_rs::params::{Params, TransformationMap};
///
/// // Pull a positive variance towards 3.0
/// let objective = |p: &Params| -> gpparams_rs::Result<f64> {
///     let v = p.scalar("variance").ok_or("missing variance")?;
///     Ok((v - 3.0).powi(2))
/// };
///
/// let config = FitConfig::default()
///     .with_n_iters(500)
///     .with_optimizer(OptimizerKind::adam(0.05));
/// let state = fit(
///     &objective,
///     &Params::new().with("variance", 1.0),
///     &Trainables::new(),
///     &TransformationMap::default(),
///     &config,
/// )
/// .unwrap();
///
/// let (params, history) = state.unpack();
/// assert_eq!(history.len(), 500);
/// assert!((params.scalar("variance").unwrap() - 3.0).abs() < 1e-2);
/// ```
pub fn fit<O>(
    objective: &O,
    params: &Params,
    trainables: &Trainables,
    transformations: &TransformationMap,
    config: &FitConfig,
) -> Result<InferenceState>
where
    O: Objective + ?Sized,
{
    config.validate()?;

    let trainable: Params = params
        .iter()
        .filter(|(k, _)| is_trainable(trainables, k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    transform_checked(&trainable, transformations)?;

    let mut z = transform_with(params, transformations);
    let mut optimizer = OptimizerState::new(config.optimizer, &z);
    let mut history = Vec::with_capacity(config.n_iters);

    let n_trainable = params
        .keys()
        .iter()
        .filter(|k| is_trainable(trainables, k))
        .count();
    log::debug!(
        "Fitting {} of {} parameters for {} iterations with {:?}",
        n_trainable,
        params.len(),
        config.n_iters,
        config.optimizer
    );

    for iteration in 0..config.n_iters {
        let (loss, grad_z) = loss_and_gradient(objective, &z, params, trainables, transformations)?;
        if !loss.is_finite() {
            log::warn!("Objective became non-finite at iteration {}", iteration);
            return Err(GpParamsError::NonFiniteLoss { iteration });
        }

        // Stop the gradient for frozen parameters
        let grad_z = grad_z.map_values(|k, g| {
            if is_trainable(trainables, k) {
                g.clone()
            } else {
                g.zeros_like()
            }
        });

        z = optimizer.step(&z, &grad_z)?;
        history.push(loss);

        if iteration % config.log_rate == 0 || iteration + 1 == config.n_iters {
            log::info!(
                "Iteration {}/{}: objective = {:.6}",
                iteration + 1,
                config.n_iters,
                loss
            );
        }
    }

    let params = with_frozen(untransform_with(&z, transformations), params, trainables);
    Ok(InferenceState { params, history })
}
