//! Problem definition hooks for the stepping loop
//!
//! A [`LevelSetModule`] supplies everything problem-specific: the initial
//! level set function, ghost-cell boundary conditions and the velocity that
//! moves the interface. The stepping loop calls these hooks and owns all the
//! numerics.

use crate::error::Result;
use crate::field::Field;
use crate::grid::Grid;
use crate::solver::boundary::{fill_ghost_cells, ExtrapolationKind};

/// Velocity driving the interface for one step.
#[derive(Debug, Clone, PartialEq)]
pub enum VelocityField {
    /// External velocity, one component per axis
    External(Vec<Field>),
    /// Speed normal to the interface at every cell
    Normal(Field),
    /// Uniform speed normal to the interface
    ConstNormal(f64),
}

/// Capability interface injected into [`LevelSetSimulation`](super::LevelSetSimulation).
pub trait LevelSetModule {
    /// Level set function at time zero over the grid's ghost box.
    ///
    /// # Errors
    /// Implementations may fail when the grid does not suit the problem
    fn initialize(&self, grid: &Grid) -> Result<Field>;

    /// Refresh the ghost cells of `phi` at `time`.
    ///
    /// Defaults to signed linear extrapolation on every face.
    fn boundary_condition(&self, grid: &Grid, phi: &mut Field, _time: f64) -> Result<()> {
        fill_ghost_cells(grid, phi, ExtrapolationKind::SignedLinear)
    }

    /// Velocity at `time`.
    fn velocity(&self, grid: &Grid, time: f64) -> Result<VelocityField>;

    /// Control-volume weights for this patch, if it shares cells with others.
    fn control_volume(&self, _grid: &Grid) -> Option<Field> {
        None
    }
}

/// Sphere (circle in 2-D) moving outward at a constant normal speed.
///
/// The exact radius at time `t` is `radius + speed * t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandingSphere {
    pub center: [f64; 3],
    pub radius: f64,
    pub speed: f64,
}

impl ExpandingSphere {
    #[must_use]
    pub fn exact_radius(&self, time: f64) -> f64 {
        self.radius + self.speed * time
    }

    fn distance(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(self.center)
            .map(|(xi, ci)| (xi - ci).powi(2))
            .sum::<f64>()
            .sqrt()
            - self.radius
    }
}

impl LevelSetModule for ExpandingSphere {
    fn initialize(&self, grid: &Grid) -> Result<Field> {
        Ok(Field::from_fn(grid, |x| self.distance(x)))
    }

    fn velocity(&self, _grid: &Grid, _time: f64) -> Result<VelocityField> {
        Ok(VelocityField::ConstNormal(self.speed))
    }
}

/// Sphere carried by a uniform external velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatingSphere {
    pub center: [f64; 3],
    pub radius: f64,
    pub velocity: [f64; 3],
}

impl TranslatingSphere {
    /// Center position at `time`.
    #[must_use]
    pub fn center_at(&self, time: f64) -> [f64; 3] {
        let mut c = self.center;
        for (ci, vi) in c.iter_mut().zip(self.velocity) {
            *ci += vi * time;
        }
        c
    }
}

impl LevelSetModule for TranslatingSphere {
    fn initialize(&self, grid: &Grid) -> Result<Field> {
        Ok(Field::from_fn(grid, |x| {
            x.iter()
                .zip(self.center)
                .map(|(xi, ci)| (xi - ci).powi(2))
                .sum::<f64>()
                .sqrt()
                - self.radius
        }))
    }

    fn velocity(&self, grid: &Grid, _time: f64) -> Result<VelocityField> {
        Ok(VelocityField::External(
            self.velocity[..grid.num_dims()]
                .iter()
                .map(|&v| Field::filled(grid, v))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SpatialDerivativeAccuracy;

    #[test]
    fn test_expanding_sphere_initial_field() {
        let grid = Grid::with_cell_counts(
            2,
            &[10, 10],
            &[-1.0, -1.0],
            &[1.0, 1.0],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap();
        let module = ExpandingSphere {
            center: [0.0; 3],
            radius: 0.5,
            speed: 1.0,
        };
        let phi = module.initialize(&grid).unwrap();
        assert_eq!(phi.ghost_box(), grid.ghost_box());
        let gw = grid.ghost_width() as i32;
        // cell (5, 5) is centered at (0.1, 0.1)
        let expected = (0.02_f64).sqrt() - 0.5;
        assert!((phi.get([gw + 5, gw + 5, 0]) - expected).abs() < 1e-12);
        assert_eq!(module.exact_radius(0.25), 0.75);
        assert!(module.control_volume(&grid).is_none());
    }

    #[test]
    fn test_translating_sphere_velocity_components() {
        let grid = Grid::with_cell_counts(
            3,
            &[4, 4, 4],
            &[0.0; 3],
            &[1.0; 3],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap();
        let module = TranslatingSphere {
            center: [0.5; 3],
            radius: 0.25,
            velocity: [1.0, 0.0, -1.0],
        };
        match module.velocity(&grid, 0.0).unwrap() {
            VelocityField::External(v) => {
                assert_eq!(v.len(), 3);
                assert!(v[2].as_slice().iter().all(|&x| x == -1.0));
            }
            other => panic!("unexpected velocity {other:?}"),
        }
        assert_eq!(module.center_at(0.5), [1.0, 0.5, 0.0]);
    }
}
