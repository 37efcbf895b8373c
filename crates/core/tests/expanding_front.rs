//! Interface motion driven through `LevelSetSimulation`

mod common;

use common::centered_grid;
use lsm_core::{
    ExpandingSphere, Field, Grid, LevelSetModule, LevelSetSimulation, Options, Result,
    SpatialDerivativeAccuracy, VelocityField,
};
use std::f64::consts::PI;

#[test]
fn test_sphere_radius_tracks_exact_solution() {
    let module = ExpandingSphere {
        center: [0.0; 3],
        radius: 0.3,
        speed: 1.0,
    };
    let options = Options {
        accuracy: SpatialDerivativeAccuracy::Medium,
        reinit_interval: 5,
        ..Options::default()
    };
    let mut sim = LevelSetSimulation::new(
        centered_grid(3, 24, SpatialDerivativeAccuracy::Medium),
        options,
        module,
    )
    .unwrap();

    let mut previous = 0.0;
    for t in [0.1, 0.2] {
        sim.advance_to(t).unwrap();
        let volume = sim.enclosed_volume().unwrap();
        let radius = (volume * 3.0 / (4.0 * PI)).cbrt();
        assert!(radius > previous);
        assert!(
            (radius - module.exact_radius(t)).abs() < 0.05,
            "t = {t}: radius {radius}, exact {}",
            module.exact_radius(t)
        );
        previous = radius;
    }
    assert_eq!(sim.time(), 0.2);
    assert!(sim.reinit_count() >= 1);
}

/// Same motion as [`ExpandingSphere`], but with the speed given per cell.
struct FieldSpeed(ExpandingSphere);

impl LevelSetModule for FieldSpeed {
    fn initialize(&self, grid: &Grid) -> Result<Field> {
        self.0.initialize(grid)
    }

    fn velocity(&self, grid: &Grid, _time: f64) -> Result<VelocityField> {
        Ok(VelocityField::Normal(Field::filled(grid, self.0.speed)))
    }
}

#[test]
fn test_uniform_speed_field_matches_constant_speed() {
    let sphere = ExpandingSphere {
        center: [0.1, -0.1, 0.0],
        radius: 0.4,
        speed: -0.5,
    };
    let options = Options {
        accuracy: SpatialDerivativeAccuracy::High,
        ..Options::default()
    };
    let grid = centered_grid(2, 32, SpatialDerivativeAccuracy::High);
    let mut constant = LevelSetSimulation::new(grid.clone(), options.clone(), sphere).unwrap();
    let mut per_cell = LevelSetSimulation::new(grid, options, FieldSpeed(sphere)).unwrap();

    let a = constant.advance_to(0.2).unwrap();
    let b = per_cell.advance_to(0.2).unwrap();
    assert_eq!(a, b);
    assert_eq!(constant.phi(), per_cell.phi());

    // a shrinking circle loses area
    let area = constant.enclosed_volume().unwrap();
    let exact = PI * sphere.exact_radius(0.2).powi(2);
    assert!((area - exact).abs() / exact < 0.05, "area {area}, exact {exact}");
}
