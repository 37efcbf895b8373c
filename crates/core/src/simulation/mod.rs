//! Level set time stepping
//!
//! `LevelSetSimulation` owns φ on one grid and advances it with the kernels in
//! [`crate::solver`]. Problem-specific pieces (initial data, boundary
//! conditions, velocity, ownership mask) come from a [`LevelSetModule`].
//!
//! Each step:
//! 1. evaluate the velocity at the current time
//! 2. compute φ⁺/φ⁻ and the stable time step (masked by the control volume
//!    when enabled), clipped to the requested maximum
//! 3. advance with TVD Runge-Kutta, refreshing ghost cells through the
//!    module's boundary hook before every right-hand-side evaluation
//! 4. reinitialize every `reinit_interval` steps

pub mod module;

pub use module::{ExpandingSphere, LevelSetModule, TranslatingSphere, VelocityField};

use crate::error::{LsmError, Result};
use crate::field::Field;
use crate::grid::Grid;
use crate::options::Options;
use crate::solver::cfl::{
    advection_stable_dt, const_normal_velocity_stable_dt, normal_velocity_stable_dt,
    UNCONSTRAINED_DT,
};
use crate::solver::control_volume::ControlVolume;
use crate::solver::integrals::{enclosed_volume, interface_measure};
use crate::solver::level_set::{
    add_advection_term, add_const_normal_velocity_term, add_normal_velocity_term, zero_rhs,
};
use crate::solver::reinitialization::reinitialize;
use crate::solver::spatial_derivatives::{upwind_gradient, OneSidedGradient};
use crate::solver::tvd_runge_kutta::advance;
use tracing::{debug, info, warn};

/// Level set evolution on a single grid.
pub struct LevelSetSimulation<M: LevelSetModule> {
    grid: Grid,
    options: Options,
    module: M,
    phi: Field,
    control_volume: Option<Field>,

    // Scratch reused across steps
    gradient: OneSidedGradient,
    upwind: Vec<Field>,

    time: f64,
    step_count: usize,
    reinit_count: usize,
}

impl<M: LevelSetModule> LevelSetSimulation<M> {
    /// Set up a run: validate `options` against `grid`, sample the initial
    /// field and apply the boundary condition at time zero.
    ///
    /// # Errors
    ///
    /// - [`LsmError::InvalidOption`] if the options are out of range or ask
    ///   for a scheme wider than the grid's ghost layer
    /// - [`LsmError::BoxNotContained`] if the module returns fields that do
    ///   not cover the grid's ghost box
    pub fn new(grid: Grid, options: Options, module: M) -> Result<Self> {
        options.validate()?;
        if options.accuracy.ghost_width() > grid.ghost_width() {
            return Err(LsmError::InvalidOption {
                name: "accuracy",
                detail: format!(
                    "{} needs {} ghost cells, grid has {}",
                    options.accuracy.scheme(),
                    options.accuracy.ghost_width(),
                    grid.ghost_width()
                ),
            });
        }

        let mut phi = module.initialize(&grid)?;
        check_covers_grid("phi", &phi, &grid)?;
        module.boundary_condition(&grid, &mut phi, 0.0)?;

        let control_volume = if options.use_control_volume {
            let cv = module.control_volume(&grid);
            if let Some(cv) = &cv {
                check_covers_grid("control_volume", cv, &grid)?;
            }
            cv
        } else {
            None
        };

        info!(
            "Level set simulation: {}-D, {} cells, {} / RK{}, CFL {}",
            grid.num_dims(),
            grid.fill_box().num_points(),
            options.accuracy.scheme(),
            options.rk_order.stages(),
            options.cfl_number
        );

        let gradient = OneSidedGradient::new(&grid);
        let upwind = (0..grid.num_dims()).map(|_| Field::new(&grid)).collect();
        Ok(Self {
            grid,
            options,
            module,
            phi,
            control_volume,
            gradient,
            upwind,
            time: 0.0,
            step_count: 0,
            reinit_count: 0,
        })
    }

    /// Take one step no longer than `max_dt`. Returns the step size used.
    ///
    /// # Errors
    ///
    /// Fails if `max_dt` is not positive, if nothing bounds the step (zero
    /// velocity everywhere and an infinite `max_dt`), or on any kernel error.
    /// φ is left unchanged on error.
    pub fn step(&mut self, max_dt: f64) -> Result<f64> {
        if max_dt.is_nan() || max_dt <= 0.0 {
            return Err(LsmError::InvalidOption {
                name: "max_dt",
                detail: format!("must be positive, got {max_dt}"),
            });
        }

        let velocity = self.module.velocity(&self.grid, self.time)?;
        let scheme = self.options.accuracy.scheme();
        self.gradient.compute(&self.grid, &self.phi, scheme)?;

        let stable_dt = self.stable_dt(&velocity)?;
        let dt = if stable_dt == UNCONSTRAINED_DT {
            if !max_dt.is_finite() {
                return Err(LsmError::InvalidOption {
                    name: "max_dt",
                    detail: "velocity vanishes everywhere, a finite step bound is required"
                        .to_string(),
                });
            }
            warn!(
                "No cell constrains the time step at t={:.4e}; using {:.3e}",
                self.time, max_dt
            );
            max_dt
        } else {
            stable_dt.min(max_dt)
        };

        let time = self.time;
        let grid = &self.grid;
        let module = &self.module;
        let gradient = &mut self.gradient;
        let upwind = &mut self.upwind;
        let mut next = self.phi.clone();
        advance(self.options.rk_order, grid, &mut next, dt, |state, rhs| {
            module.boundary_condition(grid, state, time)?;
            gradient.compute(grid, state, scheme)?;
            assemble_rhs(grid, &velocity, gradient, upwind, rhs)
        })?;
        self.module
            .boundary_condition(&self.grid, &mut next, time + dt)?;
        self.phi = next;

        self.time += dt;
        self.step_count += 1;
        debug!(
            "Step {}: t={:.4e}, dt={:.3e}",
            self.step_count, self.time, dt
        );

        let interval = self.options.reinit_interval;
        if interval > 0 && self.step_count % interval == 0 {
            self.reinitialize()?;
        }
        Ok(dt)
    }

    /// Step until `t_end`, landing on it exactly. Returns the number of steps
    /// taken.
    pub fn advance_to(&mut self, t_end: f64) -> Result<usize> {
        let start = self.step_count;
        while self.time < t_end {
            let remaining = t_end - self.time;
            let dt = self.step(remaining)?;
            if dt >= remaining {
                self.time = t_end;
            }
        }
        Ok(self.step_count - start)
    }

    /// Reinitialize φ toward a signed distance function now.
    pub fn reinitialize(&mut self) -> Result<usize> {
        let params = self.options.reinitialization_params(&self.grid);
        let steps = reinitialize(&self.grid, &mut self.phi, &params, None)?;
        self.module
            .boundary_condition(&self.grid, &mut self.phi, self.time)?;
        self.reinit_count += 1;
        Ok(steps)
    }

    fn control_volume_view(&self) -> Option<ControlVolume<'_>> {
        self.control_volume
            .as_ref()
            .map(|cv| ControlVolume::positive(cv.view("control_volume")))
    }

    fn stable_dt(&self, velocity: &VelocityField) -> Result<f64> {
        let fill_box = self.grid.fill_box();
        let dx = self.grid.dx();
        let cfl = self.options.cfl_number;
        let cv = self.control_volume_view();
        let plus = self.gradient.plus_views();
        let minus = self.gradient.minus_views();
        match velocity {
            VelocityField::External(components) => {
                let views: Vec<_> = components.iter().map(|v| v.view("velocity")).collect();
                advection_stable_dt(&views, &fill_box, dx, cfl, cv.as_ref())
            }
            VelocityField::Normal(vn) => normal_velocity_stable_dt(
                &vn.view("normal_velocity"),
                &plus,
                &minus,
                &fill_box,
                dx,
                cfl,
                cv.as_ref(),
            ),
            VelocityField::ConstNormal(vn) => {
                const_normal_velocity_stable_dt(*vn, &plus, &minus, &fill_box, dx, cfl, cv.as_ref())
            }
        }
    }

    /// Smoothed measure of `{φ < 0}`, restricted to the control volume when
    /// one is in use.
    pub fn enclosed_volume(&self) -> Result<f64> {
        enclosed_volume(&self.grid, &self.phi, self.control_volume_view().as_ref())
    }

    /// Smoothed measure of `{φ = 0}`, restricted to the control volume when
    /// one is in use.
    pub fn interface_measure(&self) -> Result<f64> {
        interface_measure(&self.grid, &self.phi, self.control_volume_view().as_ref())
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn module(&self) -> &M {
        &self.module
    }

    #[must_use]
    pub fn phi(&self) -> &Field {
        &self.phi
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Number of reinitializations performed so far.
    #[must_use]
    pub fn reinit_count(&self) -> usize {
        self.reinit_count
    }
}

fn check_covers_grid(buffer: &'static str, field: &Field, grid: &Grid) -> Result<()> {
    if field.ghost_box() == grid.ghost_box() {
        Ok(())
    } else {
        Err(LsmError::BoxNotContained {
            buffer,
            required: grid.ghost_box(),
            available: field.ghost_box(),
        })
    }
}

fn assemble_rhs(
    grid: &Grid,
    velocity: &VelocityField,
    gradient: &OneSidedGradient,
    upwind: &mut [Field],
    rhs: &mut Field,
) -> Result<()> {
    let fill_box = grid.fill_box();
    let plus = gradient.plus_views();
    let minus = gradient.minus_views();
    let mut rhs = rhs.view_mut("rhs");
    zero_rhs(&mut rhs, &fill_box)?;
    match velocity {
        VelocityField::External(components) => {
            let vel: Vec<_> = components.iter().map(|v| v.view("velocity")).collect();
            {
                let mut grad: Vec<_> = upwind.iter_mut().map(|g| g.view_mut("grad_phi")).collect();
                upwind_gradient(&mut grad, &plus, &minus, &vel, &fill_box)?;
            }
            let grad: Vec<_> = upwind.iter().map(|g| g.view("grad_phi")).collect();
            add_advection_term(&mut rhs, &grad, &vel, &fill_box)
        }
        VelocityField::Normal(vn) => add_normal_velocity_term(
            &mut rhs,
            &vn.view("normal_velocity"),
            &plus,
            &minus,
            &fill_box,
        ),
        VelocityField::ConstNormal(vn) => {
            add_const_normal_velocity_term(&mut rhs, *vn, &plus, &minus, &fill_box)
        }
    }
}
