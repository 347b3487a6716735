//! Integration tests for the fitting loop

use approx::assert_abs_diff_eq;
use gpparams_rs::optim::{fit, FitConfig, Objective, OptimizerKind, Trainables};
use gpparams_rs::params::{Params, TransformationMap};
use gpparams_rs::transforms::SigmoidTransformation;
use gpparams_rs::Result;

/// Squared distance to a fixed target, with an analytic gradient.
struct Target {
    target: Params,
}

impl Objective for Target {
    fn value(&self, params: &Params) -> Result<f64> {
        Ok(self.value_and_grad(params)?.0)
    }

    fn value_and_grad(&self, params: &Params) -> Result<(f64, Params)> {
        let mut loss = 0.0;
        let mut grad = Params::new();
        for key in params.keys() {
            let value = &params[key.as_str()];
            let target = self
                .target
                .get(&key)
                .ok_or_else(|| format!("no target for '{}'", key))?;
            let diff = value
                .zip_map(target, |x, t| x - t)
                .ok_or("shape mismatch")?;
            loss += diff.iter().map(|d| d * d).sum::<f64>();
            grad.insert(key.as_str(), diff.map(|d| 2.0 * d));
        }
        Ok((loss, grad))
    }

    fn has_custom_gradient(&self) -> bool {
        true
    }
}

#[test]
fn test_fit_with_analytic_gradient() {
    let objective = Target {
        target: Params::new()
            .with("lengthscale", vec![0.3, 4.0])
            .with("mixing", 0.8),
    };
    let start = Params::new()
        .with("lengthscale", vec![1.0, 1.0])
        .with("mixing", 0.5);
    let transformations =
        TransformationMap::default().with("mixing", SigmoidTransformation::with_range(0.0, 1.0).unwrap());
    let config = FitConfig::default()
        .with_n_iters(1000)
        .with_log_rate(100)
        .with_optimizer(OptimizerKind::adam(0.05));

    let (params, history) = fit(&objective, &start, &Trainables::new(), &transformations, &config)
        .unwrap()
        .unpack();

    assert_eq!(history.len(), 1000);
    assert!(history.last().unwrap() < &history[0]);

    let lengthscale: Vec<f64> = params["lengthscale"].iter().collect();
    assert_abs_diff_eq!(lengthscale[0], 0.3, epsilon = 1e-2);
    assert_abs_diff_eq!(lengthscale[1], 4.0, epsilon = 1e-2);
    assert_abs_diff_eq!(params.scalar("mixing").unwrap(), 0.8, epsilon = 1e-2);
}

#[test]
fn test_fit_respects_trainables() {
    let objective = Target {
        target: Params::new().with("variance", 2.0).with("obs_noise", 0.5),
    };
    let start = Params::new().with("variance", 1.0).with("obs_noise", 0.1);

    let mut trainables = Trainables::new();
    trainables.insert("obs_noise".to_string(), false);

    let state = fit(
        &objective,
        &start,
        &trainables,
        &TransformationMap::default(),
        &FitConfig::default().with_n_iters(20),
    )
    .unwrap();

    assert_eq!(state.params.scalar("obs_noise"), Some(0.1));
    assert!(state.params.scalar("variance").unwrap() > 1.0);
}

#[test]
fn test_fit_keeps_input_unchanged() {
    let objective = Target {
        target: Params::new().with("variance", 2.0),
    };
    let start = Params::new().with("variance", 1.0);
    let before = start.clone();

    let _ = fit(
        &objective,
        &start,
        &Trainables::new(),
        &TransformationMap::default(),
        &FitConfig::default().with_n_iters(10),
    )
    .unwrap();

    assert_eq!(start, before);
}

#[test]
fn test_objective_errors_propagate() {
    let objective = Target {
        target: Params::new().with("variance", 2.0),
    };
    let start = Params::new().with("lengthscale", 1.0);

    let result = fit(
        &objective,
        &start,
        &Trainables::new(),
        &TransformationMap::default(),
        &FitConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_fit_near_positive_boundary() {
    // Defined only for positive noise; the start is far below a finite-difference step
    let objective = |p: &Params| -> Result<f64> {
        let noise = p.scalar("obs_noise").ok_or("missing obs_noise")?;
        let variance = p.scalar("variance").ok_or("missing variance")?;
        Ok((noise.ln() - 0.01f64.ln()).powi(2) + (variance.ln()).powi(2))
    };
    let config = FitConfig::default()
        .with_n_iters(300)
        .with_optimizer(OptimizerKind::adam(0.1));

    let state = fit(
        &objective,
        &Params::new().with("obs_noise", 1e-8).with("variance", 5.0),
        &Trainables::new(),
        &TransformationMap::default(),
        &config,
    )
    .unwrap();

    assert!(state.history.iter().all(|loss| loss.is_finite()));
    assert!(state.final_loss().unwrap() < state.history[0]);
    assert!(state.params.scalar("obs_noise").unwrap() > 1e-8);
}
