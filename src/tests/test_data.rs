//! Seeded synthetic point clouds for tests.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64;
use std::f64::consts::PI;

use crate::data::PointCloud;

/// Corners of the unit square, counter-clockwise from the origin.
pub fn unit_square() -> PointCloud {
    PointCloud::from_rows(&[
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
    ])
    .unwrap()
}

/// `n` evenly spaced points on the unit circle, embedded in the first two of
/// `dims` coordinates, with optional Gaussian noise on every coordinate.
pub fn make_circle_hd(n: usize, noise: f64, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    assert!(dims >= 2);
    let mut rng = Pcg64::seed_from_u64(seed);
    let normal = Normal::new(0.0, noise.max(f64::MIN_POSITIVE)).unwrap();

    (0..n)
        .map(|i| {
            let t = 2.0 * PI * i as f64 / n as f64;
            let mut v = vec![0.0; dims];
            v[0] = t.cos();
            v[1] = t.sin();
            if noise > 0.0 {
                for x in v.iter_mut() {
                    *x += normal.sample(&mut rng);
                }
            }
            v
        })
        .collect()
}

/// Uniform samples on the tilted plane `z = 0.3 x − 0.2 y` over [-1, 1]².
pub fn make_tilted_plane(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x: f64 = rng.random_range(-1.0..1.0);
            let y: f64 = rng.random_range(-1.0..1.0);
            vec![x, y, 0.3 * x - 0.2 * y]
        })
        .collect()
}

/// Gaussian blob in `dims` dimensions with anisotropic scales `1, 1/2, 1/4, …`.
pub fn make_anisotropic_blob(n: usize, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n)
        .map(|_| {
            (0..dims)
                .map(|k| normal.sample(&mut rng) / 2f64.powi(k as i32))
                .collect()
        })
        .collect()
}

/// Unit normal of the tilted plane used by [`make_tilted_plane`].
pub fn tilted_plane_normal() -> [f64; 3] {
    let n = [0.3f64, -0.2, -1.0];
    let norm = n.iter().map(|v| v * v).sum::<f64>().sqrt();
    [n[0] / norm, n[1] / norm, n[2] / norm]
}
