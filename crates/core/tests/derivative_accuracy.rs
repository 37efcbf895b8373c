//! Empirical convergence order of the one-sided derivative schemes

mod common;

use lsm_core::solver::OneSidedGradient;
use lsm_core::{Field, Grid, SpatialDerivativeAccuracy};

/// Max error of φ⁺_x and φ⁻_x against `cos x` for `φ = sin x + y²`, over
/// cells with `0.5 ≤ x ≤ 2.5`.
fn max_error(accuracy: SpatialDerivativeAccuracy, n: usize) -> f64 {
    let grid =
        Grid::with_cell_counts(2, &[n, 4], &[0.0, 0.0], &[3.0, 1.0], accuracy).unwrap();
    let phi = Field::from_fn(&grid, |x| x[0].sin() + x[1] * x[1]);
    let mut gradient = OneSidedGradient::new(&grid);
    gradient.compute(&grid, &phi, accuracy.scheme()).unwrap();

    grid.fill_box()
        .points()
        .filter(|&p| (0.5..=2.5).contains(&grid.cell_center(p)[0]))
        .map(|p| {
            let exact = grid.cell_center(p)[0].cos();
            (gradient.plus[0].get(p) - exact)
                .abs()
                .max((gradient.minus[0].get(p) - exact).abs())
        })
        .fold(0.0, f64::max)
}

fn observed_order(accuracy: SpatialDerivativeAccuracy) -> f64 {
    let coarse = max_error(accuracy, 40);
    let fine = max_error(accuracy, 80);
    (coarse / fine).log2()
}

#[test]
fn test_eno1_is_first_order() {
    let order = observed_order(SpatialDerivativeAccuracy::Low);
    assert!(order > 0.8, "observed order {order}");
}

#[test]
fn test_eno2_is_second_order() {
    let order = observed_order(SpatialDerivativeAccuracy::Medium);
    assert!(order > 1.6, "observed order {order}");
}

#[test]
fn test_eno3_is_third_order() {
    let order = observed_order(SpatialDerivativeAccuracy::High);
    assert!(order > 2.5, "observed order {order}");
}

#[test]
fn test_weno5_is_fifth_order_and_beats_eno3() {
    let order = observed_order(SpatialDerivativeAccuracy::VeryHigh);
    assert!(order > 4.5, "observed order {order}");
    assert!(
        max_error(SpatialDerivativeAccuracy::VeryHigh, 80)
            < max_error(SpatialDerivativeAccuracy::High, 80)
    );
}
