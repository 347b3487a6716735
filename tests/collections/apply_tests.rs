//! Integration tests for collection-level transform / untransform

use approx::assert_abs_diff_eq;
use gpparams_rs::params::{
    transform, transform_batch, transform_checked, transform_with, untransform, untransform_batch,
    untransform_gradient, untransform_with, ParamValue, Params, TransformationMap,
};
use gpparams_rs::transforms::{
    softplus_inverse, IdentityTransformation, SigmoidTransformation, SoftplusTransformation,
};
use gpparams_rs::GpParamsError;
use ndarray::array;

use crate::test_helpers::{kernel_params, params_approx_eq, positive_value, rng};

#[test]
fn test_collection_round_trip() {
    let params = Params::new().with("lengthscale", 2.0).with("variance", 0.5);
    let t = SoftplusTransformation;

    let restored = untransform(&transform(&params, &t), &t);
    assert!(params_approx_eq(&params, &restored, 1e-10));
}

#[test]
fn test_random_collections_round_trip() {
    let mut rng = rng(42);
    let t = SoftplusTransformation;

    for _ in 0..50 {
        let params = Params::new()
            .with("variance", positive_value(&mut rng))
            .with(
                "lengthscale",
                (0..5).map(|_| positive_value(&mut rng)).collect::<Vec<_>>(),
            );
        let restored = untransform(&transform(&params, &t), &t);
        assert!(params_approx_eq(&params, &restored, 1e-8));
    }
}

#[test]
fn test_key_set_preservation() {
    let params = kernel_params();
    let t = SoftplusTransformation;

    let forward = transform(&params, &t);
    let backward = untransform(&params, &t);
    assert_eq!(forward.keys(), params.keys());
    assert_eq!(backward.keys(), params.keys());
}

#[test]
fn test_element_wise_matches_manual_application() {
    let params = Params::new().with("lengthscale", vec![1.0, 2.0, 3.0]);
    let out = transform(&params, &SoftplusTransformation);

    let manual: Vec<f64> = [1.0, 2.0, 3.0].iter().map(|&x| softplus_inverse(x)).collect();
    assert_eq!(out["lengthscale"], ParamValue::from(manual));
}

#[test]
fn test_multi_dimensional_arrays_keep_shape() {
    let params = Params::new().with("inducing_scales", array![[0.5, 1.0], [1.5, 2.0], [2.5, 3.0]]);
    let out = transform(&params, &SoftplusTransformation);

    assert_eq!(out["inducing_scales"].shape(), vec![3, 2]);
    let expected: Vec<f64> = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0].iter().map(|&x| softplus_inverse(x)).collect();
    let actual: Vec<f64> = out["inducing_scales"].iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_purity() {
    let params = kernel_params();
    let before = params.clone();

    let unconstrained = transform(&params, &SoftplusTransformation);
    let _ = untransform(&unconstrained, &SoftplusTransformation);

    assert_eq!(params, before);
}

#[test]
fn test_non_finite_propagation_does_not_fail() {
    let params = kernel_params().with("variance", -1.0);
    let out = transform(&params, &SoftplusTransformation);

    assert!(out.scalar("variance").unwrap().is_nan());
    assert!(out["lengthscale"].is_finite());
    assert_eq!(out.len(), params.len());
}

#[test]
fn test_per_key_dispatch() {
    let map = TransformationMap::default()
        .with("mean", IdentityTransformation)
        .with("mixing", SigmoidTransformation::with_range(0.0, 1.0).unwrap());
    let params = kernel_params().with("mean", -4.0).with("mixing", 0.5);

    let z = transform_with(&params, &map);
    assert_eq!(z.scalar("mean"), Some(-4.0));
    assert_abs_diff_eq!(z.scalar("mixing").unwrap(), 0.0, epsilon = 1e-12);
    assert_eq!(z.scalar("variance"), Some(softplus_inverse(0.5)));

    assert!(params_approx_eq(&untransform_with(&z, &map), &params, 1e-10));
}

#[test]
fn test_checked_transform_reports_offending_key() {
    let map = TransformationMap::default();
    assert!(transform_checked(&kernel_params(), &map).is_ok());

    let bad = kernel_params().with("lengthscale", vec![1.0, -0.5, 2.0]);
    match transform_checked(&bad, &map) {
        Err(GpParamsError::DomainViolation { key, value, .. }) => {
            assert_eq!(key, "lengthscale");
            assert_eq!(value, -0.5);
        }
        other => panic!("Expected DomainViolation, got {:?}", other),
    }
}

#[test]
fn test_gradient_pull_back_for_softplus() {
    // θ = softplus(z), so dL/dz = dL/dθ · sigmoid(z)
    let map = TransformationMap::default();
    let z = Params::new().with("variance", 0.0);
    let grad_theta = Params::new().with("variance", 4.0);

    let grad_z = untransform_gradient(&z, &grad_theta, &map).unwrap();
    assert_abs_diff_eq!(grad_z.scalar("variance").unwrap(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_batch_application() {
    let mut rng = rng(3);
    let batch: Vec<Params> = (0..64)
        .map(|_| {
            Params::new()
                .with("variance", positive_value(&mut rng))
                .with("lengthscale", vec![positive_value(&mut rng), positive_value(&mut rng)])
        })
        .collect();
    let t = SoftplusTransformation;

    let unconstrained = transform_batch(&batch, &t);
    for (params, z) in batch.iter().zip(&unconstrained) {
        assert_eq!(*z, transform(params, &t));
    }

    let restored = untransform_batch(&unconstrained, &t);
    for (params, back) in batch.iter().zip(&restored) {
        assert!(params_approx_eq(params, back, 1e-8));
    }
}
