//! End-to-end tangent stage runs plus configuration handling.

use approx::assert_abs_diff_eq;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::f64::consts::SQRT_2;

use crate::cover::{greedy_set_cover, valid_cover};
use crate::data::PointCloud;
use crate::error::TangentError;
use crate::stage::{TangentConfig, TangentStage};
use crate::subspace::SubspaceMethod;
use crate::tests::init;
use crate::weights::{Reduce, WeightMethod};

use super::test_data::{make_circle_hd, make_tilted_plane, unit_square};

#[test]
fn test_stage_on_noisy_circle() {
    init();
    let points = PointCloud::from_rows(&make_circle_hd(200, 0.01, 3, 42)).unwrap();
    let stage = TangentStage::new(TangentConfig::curve(0.1));
    let output = stage.execute(&points).unwrap();

    assert_eq!(output.graph.n_neighborhoods(), 200);
    assert_eq!(output.bundle.len(), 200);
    assert_eq!(output.weights.len(), 200);
    assert_eq!(output.bundle.n_degenerate(), 0);
    assert!(output.weights.iter().all(|w| w.is_finite() && *w >= 0.0));
    // Residuals are bounded by the neighborhood diameter.
    assert!(output.weights.iter().all(|&w| w < 0.2));
    println!("{}", output.summary());
}

#[test]
fn test_stage_on_plane_with_landmarks() {
    let points = PointCloud::from_rows(&make_tilted_plane(200, 1)).unwrap();
    let landmarks: Vec<usize> = (0..200).step_by(10).collect();
    let config = TangentConfig::surface(0.3)
        .with_landmarks(landmarks.clone())
        .with_subspace(SubspaceMethod::Gram);
    let output = TangentStage::new(config).execute(&points).unwrap();

    assert_eq!(output.graph.n_points(), 200);
    assert_eq!(output.graph.landmarks(), landmarks.as_slice());
    assert_eq!(output.bundle.len(), 20);
    assert_eq!(output.weights.len(), 20);
    assert!(output.summary().contains("m=20"));

    // Bundle weights double as set-cover costs.
    let cover = greedy_set_cover(&output.graph, &output.weights);
    if valid_cover(&output.graph, None).unwrap() {
        assert!(valid_cover(&output.graph, Some(&cover.unwrap())).unwrap());
    } else {
        assert!(matches!(cover, Err(TangentError::IncompleteCover { .. })));
    }
}

#[test]
fn test_stage_with_centers_matches_hand_values() {
    let points = unit_square();
    let config = TangentConfig::curve(0.6).with_reduce(Reduce::Mean);
    let output = TangentStage::new(config)
        .execute_with_centers(&points, Some(&points))
        .unwrap();

    for &w in &output.weights {
        assert_abs_diff_eq!(w, SQRT_2 / 3.0, epsilon = 1e-12);
    }
}

#[test]
fn test_stage_accepts_smartcore_input() {
    let rows = make_circle_hd(50, 0.0, 2, 0);
    let dense = DenseMatrix::from_2d_vec(&rows).unwrap();
    let points = PointCloud::from_dense(&dense).unwrap();
    assert_eq!(points.n_points(), 50);
    assert_eq!(points.dim(), 2);
    assert_eq!(points, PointCloud::from_rows(&rows).unwrap());

    let output = TangentStage::new(TangentConfig::curve(0.1))
        .execute(&points)
        .unwrap();
    assert_eq!(output.weights.len(), 50);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_defaults_and_presets() {
    let default = TangentConfig::default();
    assert_eq!(default.radius, 0.25);
    assert_eq!(default.tangent_dim, 2);
    assert_eq!(default.method, WeightMethod::Cosine);
    assert_eq!(default.reduce, Reduce::Mean);
    assert_eq!(default.subspace, SubspaceMethod::Covariance);
    assert!(default.landmarks.is_none());

    let curve = TangentConfig::curve(0.05);
    assert_eq!(curve.tangent_dim, 1);
    assert_eq!(curve.method, WeightMethod::Distance);
    assert_eq!(curve.reduce, Reduce::Max);

    let surface = TangentConfig::surface(0.05).with_tangent_dim(3).with_radius(0.4);
    assert_eq!(surface.tangent_dim, 3);
    assert_eq!(surface.radius, 0.4);

    assert_eq!(TangentStage::with_defaults().config, default);
}

#[test]
fn test_config_json_round_trip() {
    let config = TangentConfig::curve(0.125)
        .with_landmarks(vec![0, 4, 8])
        .with_subspace(SubspaceMethod::Gram);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"method\":\"distance\""));
    assert!(json.contains("\"subspace\":\"gram\""));

    let back: TangentConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    // Missing fields fall back to defaults.
    let partial: TangentConfig =
        serde_json::from_str(r#"{"radius": 0.5, "reduce": "median"}"#).unwrap();
    assert_eq!(partial.radius, 0.5);
    assert_eq!(partial.reduce, Reduce::Median);
    assert_eq!(partial.tangent_dim, 2);

    assert!(serde_json::from_str::<TangentConfig>(r#"{"method": "euclid"}"#).is_err());
}

#[test]
fn test_config_validation() {
    let points = unit_square();

    let bad_radius = TangentConfig::default().with_radius(0.0);
    assert_eq!(bad_radius.validate().unwrap_err(), TangentError::InvalidRadius(0.0));

    let bad_dim = TangentConfig::default().with_tangent_dim(0);
    assert_eq!(bad_dim.validate().unwrap_err(), TangentError::ZeroDimension);

    let angle = TangentConfig::default().with_method(WeightMethod::Angle);
    assert_eq!(
        TangentStage::new(angle).execute(&points).unwrap_err(),
        TangentError::UnsupportedMethod("angle".to_string())
    );

    let too_large = TangentConfig::default().with_tangent_dim(3);
    assert!(too_large.validate().is_ok());
    assert!(matches!(
        TangentStage::new(too_large).execute(&points).unwrap_err(),
        TangentError::DimensionTooLarge { .. }
    ));
}
