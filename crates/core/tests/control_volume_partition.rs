//! Reductions over overlapping patches
//!
//! The domain `[-1, 1]²` is covered by two patches that overlap by four
//! cells around `x = 0`. Control-volume masks give each cell exactly one
//! owner, so per-patch results combine to the single-grid values.

mod common;

use approx::assert_relative_eq;
use common::{centered_grid, radius};
use lsm_core::solver::{
    advection_stable_dt, enclosed_volume, interface_measure, max_norm_diff, ControlVolume,
    ControlVolumeSign,
};
use lsm_core::{Field, Grid, SpatialDerivativeAccuracy};

const ACCURACY: SpatialDerivativeAccuracy = SpatialDerivativeAccuracy::High;

fn level_set(x: &[f64]) -> f64 {
    radius(&[x[0] - 0.1, x[1] + 0.05]) - 0.6
}

fn velocity_x(x: &[f64]) -> f64 {
    1.0 + 3.0 * x[0].max(0.0)
}

struct Patch {
    grid: Grid,
    phi: Field,
    owned: Field,
}

/// Patches `[-1, 1/16]` and `[-1/16, 1]` in x, each 34 cells of width 1/32,
/// owning the cells left and right of `x = 0` respectively.
fn patches() -> Vec<Patch> {
    [(-1.0, 0.0625, true), (-0.0625, 1.0, false)]
        .into_iter()
        .map(|(lo, hi, left)| {
            let grid =
                Grid::with_cell_counts(2, &[34, 64], &[lo, -1.0], &[hi, 1.0], ACCURACY).unwrap();
            let phi = Field::from_fn(&grid, level_set);
            let owned = Field::from_fn(&grid, |x| {
                if (x[0] < 0.0) == left {
                    1.0
                } else {
                    0.0
                }
            });
            Patch { grid, phi, owned }
        })
        .collect()
}

#[test]
fn test_patch_sums_match_single_grid() {
    let full = centered_grid(2, 64, ACCURACY);
    let phi = Field::from_fn(&full, level_set);
    let area = enclosed_volume(&full, &phi, None).unwrap();
    let perimeter = interface_measure(&full, &phi, None).unwrap();

    let mut area_sum = 0.0;
    let mut perimeter_sum = 0.0;
    for patch in patches() {
        let cv = ControlVolume::positive(patch.owned.view("control_volume"));
        area_sum += enclosed_volume(&patch.grid, &patch.phi, Some(&cv)).unwrap();
        perimeter_sum += interface_measure(&patch.grid, &patch.phi, Some(&cv)).unwrap();
    }
    assert_relative_eq!(area_sum, area, max_relative = 1e-10);
    assert_relative_eq!(perimeter_sum, perimeter, max_relative = 1e-10);

    // without masks the overlap is counted twice
    let unmasked: f64 = patches()
        .iter()
        .map(|p| enclosed_volume(&p.grid, &p.phi, None).unwrap())
        .sum();
    assert!(unmasked > area * (1.0 + 1e-3));
}

#[test]
fn test_patch_timestep_minimum_matches_single_grid() {
    let full = centered_grid(2, 64, ACCURACY);
    let vx = Field::from_fn(&full, velocity_x);
    let vy = Field::filled(&full, -0.5);
    let dt_full = advection_stable_dt(
        &[vx.view("vel_x"), vy.view("vel_y")],
        &full.fill_box(),
        full.dx(),
        0.5,
        None,
    )
    .unwrap();

    let dt_patches = patches()
        .iter()
        .map(|patch| {
            let vx = Field::from_fn(&patch.grid, velocity_x);
            let vy = Field::filled(&patch.grid, -0.5);
            let cv = ControlVolume::positive(patch.owned.view("control_volume"));
            advection_stable_dt(
                &[vx.view("vel_x"), vy.view("vel_y")],
                &patch.grid.fill_box(),
                patch.grid.dx(),
                0.5,
                Some(&cv),
            )
            .unwrap()
        })
        .fold(f64::INFINITY, f64::min);
    assert_eq!(dt_patches, dt_full);
}

#[test]
fn test_opposite_signs_split_one_grid() {
    let grid = centered_grid(2, 48, ACCURACY);
    let phi = Field::from_fn(&grid, level_set);
    let shifted = Field::from_fn(&grid, |x| level_set(x) + 0.1 * x[0]);
    let weights = Field::from_fn(&grid, |x| if x[1] < 0.25 { 1.0 } else { -1.0 });

    let positive = ControlVolume::positive(weights.view("control_volume"));
    let negative = ControlVolume::new(weights.view("control_volume"), ControlVolumeSign::Negative);

    let whole = enclosed_volume(&grid, &phi, None).unwrap();
    let split = enclosed_volume(&grid, &phi, Some(&positive)).unwrap()
        + enclosed_volume(&grid, &phi, Some(&negative)).unwrap();
    assert_relative_eq!(split, whole, max_relative = 1e-10);

    let fill = grid.fill_box();
    let a = phi.view("a");
    let b = shifted.view("b");
    let max_whole = max_norm_diff(&a, &b, &fill, None).unwrap();
    let max_split = max_norm_diff(&a, &b, &fill, Some(&positive))
        .unwrap()
        .max(max_norm_diff(&a, &b, &fill, Some(&negative)).unwrap());
    assert_eq!(max_split, max_whole);
}
