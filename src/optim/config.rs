//! Configuration options for fitting.
//!
//! This module defines the optimizer choice and the loop settings used by
//! [`fit`](crate::optim::fit::fit).

use serde::{Deserialize, Serialize};

use crate::error::{GpParamsError, Result};

/// First-order optimizer applied in unconstrained space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// Plain gradient descent: `z ← z - learning_rate · ∇z`
    GradientDescent { learning_rate: f64 },

    /// Adam with bias-corrected first and second moment estimates
    Adam {
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
    },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::adam(0.01)
    }
}

impl OptimizerKind {
    /// Adam with the default moment decay rates and the given learning rate
    pub fn adam(learning_rate: f64) -> Self {
        OptimizerKind::Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerKind::GradientDescent { learning_rate } => learning_rate,
            OptimizerKind::Adam { learning_rate, .. } => learning_rate,
        }
    }
}

/// Configuration options for the fitting loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Number of optimization steps. Default: 100
    pub n_iters: usize,

    /// Report progress every `log_rate` steps. Default: 10
    pub log_rate: usize,

    /// Optimizer used in unconstrained space. Default: Adam(0.01)
    pub optimizer: OptimizerKind,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            n_iters: 100,
            log_rate: 10,
            optimizer: OptimizerKind::default(),
        }
    }
}

impl FitConfig {
    pub fn with_n_iters(mut self, n_iters: usize) -> Self {
        self.n_iters = n_iters;
        self
    }

    pub fn with_log_rate(mut self, log_rate: usize) -> Self {
        self.log_rate = log_rate;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Check that the configuration describes a runnable loop.
    pub fn validate(&self) -> Result<()> {
        if self.n_iters == 0 {
            return Err(GpParamsError::InvalidConfig(
                "n_iters must be at least 1".to_string(),
            ));
        }
        if self.log_rate == 0 {
            return Err(GpParamsError::InvalidConfig(
                "log_rate must be at least 1".to_string(),
            ));
        }

        let lr = self.optimizer.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(GpParamsError::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                lr
            )));
        }

        if let OptimizerKind::Adam {
            beta1,
            beta2,
            epsilon,
            ..
        } = self.optimizer
        {
            for (name, beta) in [("beta1", beta1), ("beta2", beta2)] {
                if !(0.0..1.0).contains(&beta) {
                    return Err(GpParamsError::InvalidConfig(format!(
                        "{} must lie in [0, 1), got {}",
                        name, beta
                    )));
                }
            }
            if !(epsilon > 0.0) {
                return Err(GpParamsError::InvalidConfig(format!(
                    "epsilon must be positive, got {}",
                    epsilon
                )));
            }
        }

        Ok(())
    }
}
