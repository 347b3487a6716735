//! Lifting transformations over parameter collections
//!
//! [`transform`] moves every value of a collection into unconstrained space and
//! [`untransform`] brings it back. Both build a new collection with the same key
//! set and never touch their input. Values outside a transformation's domain come
//! out as `NaN`/`inf` rather than as an error; [`transform_checked`] is the opt-in
//! variant that reports them.

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GpParamsError, Result};
use crate::params::collection::Params;
use crate::transforms::transformation::{SoftplusTransformation, Transformation};

/// Per-key transformation lookup with a shared default.
///
/// Keys without an override use the default. Cloning is cheap: transformations
/// are shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct TransformationMap {
    default: Arc<dyn Transformation>,
    overrides: HashMap<String, Arc<dyn Transformation>>,
}

impl Default for TransformationMap {
    /// Softplus for every key
    fn default() -> Self {
        Self::new(SoftplusTransformation)
    }
}

impl TransformationMap {
    /// Create a map that applies `default` to every key
    pub fn new<T: Transformation + 'static>(default: T) -> Self {
        Self::from_shared(Arc::new(default))
    }

    /// Create a map around an already shared default transformation
    pub fn from_shared(default: Arc<dyn Transformation>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Builder-style override for a single key
    ///
    /// # Examples
    ///
    /// ```
    /// use gpparams_rs::params::TransformationMap;
    /// use gpparams_rs::transforms::{IdentityTransformation, Transformation};
    ///
    /// let map = TransformationMap::default().with("mean", IdentityTransformation);
    /// assert_eq!(map.get("mean").name(), "identity");
    /// assert_eq!(map.get("variance").name(), "softplus");
    /// ```
    pub fn with<T: Transformation + 'static>(mut self, key: impl Into<String>, transformation: T) -> Self {
        self.overrides.insert(key.into(), Arc::new(transformation));
        self
    }

    /// Register an override, replacing any previous one for `key`
    pub fn insert(&mut self, key: impl Into<String>, transformation: Arc<dyn Transformation>) {
        self.overrides.insert(key.into(), transformation);
    }

    /// The transformation that applies to `key`
    pub fn get(&self, key: &str) -> &dyn Transformation {
        self.overrides
            .get(key)
            .map(|t| &**t)
            .unwrap_or(&*self.default)
    }

    pub fn default_transformation(&self) -> &dyn Transformation {
        &*self.default
    }

    /// Whether `key` has its own transformation
    pub fn has_override(&self, key: &str) -> bool {
        self.overrides.contains_key(key)
    }
}

/// Move every value into unconstrained space by applying `forward` element-wise.
///
/// # Examples
///
/// ```
/// use gpparams_rs::params::{transform, untransform, Params};
/// use gpparams_rs::transforms::SoftplusTransformation;
///
/// let params = Params::new().with("lengthscale", 2.0).with("variance", 0.5);
/// let unconstrained = transform(&params, &SoftplusTransformation);
/// let restored = untransform(&unconstrained, &SoftplusTransformation);
///
/// for key in params.keys() {
///     let (a, b) = (params.scalar(&key).unwrap(), restored.scalar(&key).unwrap());
///     assert!((a - b).abs() < 1e-10);
/// }
/// ```
pub fn transform(params: &Params, transformation: &dyn Transformation) -> Params {
    params.map_values(|_, v| v.map(|x| transformation.forward(x)))
}

/// Return every value to constrained space by applying `backward` element-wise.
pub fn untransform(params: &Params, transformation: &dyn Transformation) -> Params {
    params.map_values(|_, v| v.map(|z| transformation.backward(z)))
}

/// [`transform`] with per-key dispatch
pub fn transform_with(params: &Params, transformations: &TransformationMap) -> Params {
    params.map_values(|k, v| {
        let t = transformations.get(k);
        v.map(|x| t.forward(x))
    })
}

/// [`untransform`] with per-key dispatch
pub fn untransform_with(params: &Params, transformations: &TransformationMap) -> Params {
    params.map_values(|k, v| {
        let t = transformations.get(k);
        v.map(|z| t.backward(z))
    })
}

/// Like [`transform_with`], but fails on the first value outside its transformation's domain.
///
/// Keys are checked in sorted order so the reported key is deterministic.
pub fn transform_checked(params: &Params, transformations: &TransformationMap) -> Result<Params> {
    for key in params.keys() {
        let t = transformations.get(&key);
        if let Some(value) = params[key.as_str()].iter().find(|&x| !t.in_domain(x)) {
            return Err(GpParamsError::DomainViolation {
                key,
                value,
                transformation: t.name().to_string(),
            });
        }
    }
    Ok(transform_with(params, transformations))
}

/// Pull a gradient taken in constrained space back into unconstrained space.
///
/// `unconstrained` holds the point `z` at which the gradient was taken (the
/// constrained point being `untransform_with(z)`), and `constrained_grad` holds
/// `dL/dθ` under the same keys and shapes. The result is
/// `dL/dz = dL/dθ · backward'(z)`, element-wise.
///
/// Mismatched keys or shapes are a caller error and fail fast.
pub fn untransform_gradient(
    unconstrained: &Params,
    constrained_grad: &Params,
    transformations: &TransformationMap,
) -> Result<Params> {
    if !unconstrained.same_keys(constrained_grad) {
        return Err(GpParamsError::KeyMismatch(format!(
            "parameters have keys {:?}, gradient has keys {:?}",
            unconstrained.keys(),
            constrained_grad.keys()
        )));
    }

    let mut out = Params::new();
    for (key, z) in unconstrained {
        let g = &constrained_grad[key.as_str()];
        let t = transformations.get(key);
        let pulled = z
            .zip_map(g, |z, g| g * t.backward_derivative(z))
            .ok_or_else(|| GpParamsError::ShapeMismatch {
                key: key.clone(),
                expected: z.shape(),
                actual: g.shape(),
            })?;
        out.insert(key.clone(), pulled);
    }
    Ok(out)
}

/// Apply [`transform`] to many collections in parallel. Output order matches input order.
pub fn transform_batch(batch: &[Params], transformation: &dyn Transformation) -> Vec<Params> {
    batch
        .par_iter()
        .map(|params| transform(params, transformation))
        .collect()
}

/// Apply [`untransform`] to many collections in parallel. Output order matches input order.
pub fn untransform_batch(batch: &[Params], transformation: &dyn Transformation) -> Vec<Params> {
    batch
        .par_iter()
        .map(|params| untransform(params, transformation))
        .collect()
}
