//! Shared command-line plumbing for the demo binaries

#![allow(dead_code)]

use clap::ValueEnum;
use lsm_core::solver::central_gradient;
use lsm_core::{Field, Grid, Result, SpatialDerivativeAccuracy};
use tracing_subscriber::EnvFilter;

/// Install a `RUST_LOG`-controlled subscriber, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccuracyArg {
    /// ENO1
    Low,
    /// ENO2
    Medium,
    /// ENO3
    High,
    /// WENO5
    VeryHigh,
}

impl From<AccuracyArg> for SpatialDerivativeAccuracy {
    fn from(arg: AccuracyArg) -> Self {
        match arg {
            AccuracyArg::Low => Self::Low,
            AccuracyArg::Medium => Self::Medium,
            AccuracyArg::High => Self::High,
            AccuracyArg::VeryHigh => Self::VeryHigh,
        }
    }
}

/// `[-1, 1]^num_dims` with `cells` cells per axis.
pub fn centered_grid(
    num_dims: usize,
    cells: usize,
    accuracy: SpatialDerivativeAccuracy,
) -> Result<Grid> {
    Grid::with_cell_counts(
        num_dims,
        &vec![cells; num_dims],
        &vec![-1.0; num_dims],
        &vec![1.0; num_dims],
        accuracy,
    )
}

/// Mean and max of `||∇φ| - 1|` over cells with `|φ| < band`, using central
/// differences. Returns `None` when no cell lies in the band.
pub fn distance_error(grid: &Grid, phi: &Field, band: f64) -> Result<Option<(f64, f64)>> {
    let mut grad: Vec<Field> = (0..grid.num_dims()).map(|_| Field::new(grid)).collect();
    {
        let mut views: Vec<_> = grad.iter_mut().map(|g| g.view_mut("grad_phi")).collect();
        central_gradient(&mut views, &phi.view("phi"), &grid.fill_box(), grid.dx())?;
    }
    let errors: Vec<f64> = grid
        .fill_box()
        .points()
        .filter(|&p| phi.get(p).abs() < band)
        .map(|p| {
            let norm = grad.iter().map(|g| g.get(p).powi(2)).sum::<f64>().sqrt();
            (norm - 1.0).abs()
        })
        .collect();
    if errors.is_empty() {
        return Ok(None);
    }
    let mean = errors.iter().sum::<f64>() / errors.len() as f64;
    let max = errors.iter().copied().fold(0.0, f64::max);
    Ok(Some((mean, max)))
}
