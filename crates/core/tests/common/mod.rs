//! Shared setup for integration tests

#![allow(dead_code)]

use lsm_core::{Grid, SpatialDerivativeAccuracy};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `[-1, 1]^num_dims` with `n` cells per axis.
pub fn centered_grid(num_dims: usize, n: usize, accuracy: SpatialDerivativeAccuracy) -> Grid {
    Grid::with_cell_counts(
        num_dims,
        &vec![n; num_dims],
        &vec![-1.0; num_dims],
        &vec![1.0; num_dims],
        accuracy,
    )
    .unwrap()
}

/// Euclidean distance from `x` to the origin.
pub fn radius(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}
