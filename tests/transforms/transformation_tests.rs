//! Integration tests for Transformation implementations

use approx::assert_abs_diff_eq;
use gpparams_rs::transforms::{
    softplus, softplus_inverse, Bounds, FnTransformation, IdentityTransformation,
    SigmoidTransformation, SoftplusTransformation, Transformation,
};
use rand::Rng;

use crate::test_helpers::rng;

/// A user-defined transformation: positive values through log/exp.
#[derive(Debug)]
struct LogTransformation;

impl Transformation for LogTransformation {
    fn forward(&self, x: f64) -> f64 {
        x.ln()
    }

    fn backward(&self, z: f64) -> f64 {
        z.exp()
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0 && x.is_finite()
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[test]
fn test_default_transform_direction() {
    let t = SoftplusTransformation;

    // forward = softplus_inverse, backward = softplus
    for &x in &[0.1, 1.0, 10.0] {
        assert_eq!(t.forward(x), softplus_inverse(x));
        assert_eq!(t.backward(x), softplus(x));
    }
    assert_eq!(t.name(), "softplus");
}

#[test]
fn test_bijection_invariant_for_builtins() {
    let transforms: Vec<(Box<dyn Transformation>, Vec<f64>)> = vec![
        (Box::new(SoftplusTransformation), vec![1e-3, 0.5, 2.0, 50.0]),
        (Box::new(IdentityTransformation), vec![-7.0, 0.0, 7.0]),
        (
            Box::new(SigmoidTransformation::new(Bounds::new(-1.0, 1.0).unwrap()).unwrap()),
            vec![-0.99, -0.5, 0.0, 0.5, 0.99],
        ),
        (Box::new(LogTransformation), vec![1e-3, 1.0, 1e3]),
    ];

    for (t, points) in &transforms {
        for &x in points {
            assert!(t.in_domain(x), "{} should accept {}", t.name(), x);
            assert_abs_diff_eq!(t.backward(t.forward(x)), x, epsilon = 1e-9 * x.abs().max(1.0));
        }
    }
}

#[test]
fn test_sigmoid_backward_stays_in_bounds() {
    let t = SigmoidTransformation::with_range(2.0, 3.0).unwrap();
    let mut rng = rng(11);
    for _ in 0..500 {
        let z: f64 = rng.gen_range(-30.0..30.0);
        let x = t.backward(z);
        assert!((2.0..=3.0).contains(&x), "{} escaped bounds", x);
    }
    assert_eq!(t.bounds(), Bounds::new(2.0, 3.0).unwrap());
}

#[test]
fn test_user_transformation_gets_numeric_derivative() {
    let t = LogTransformation;
    for &z in &[-2.0, 0.0, 1.5] {
        assert_abs_diff_eq!(t.backward_derivative(z), z.exp(), epsilon = 1e-6 * z.exp().max(1.0));
    }
}

#[test]
fn test_fn_transformation_matches_user_type() {
    let pair = FnTransformation::new("log", f64::ln, f64::exp);
    for &x in &[0.2, 4.0] {
        assert_eq!(pair.forward(x), LogTransformation.forward(x));
        assert_eq!(pair.backward(x), LogTransformation.backward(x));
    }
}
