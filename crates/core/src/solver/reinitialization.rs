//! Reinitialization to a signed distance function
//!
//! Marches `∂φ/∂τ = S(φ₀)(1 - |∇φ|)` in pseudo-time τ, where `S` is the
//! smoothed sign `φ₀ / sqrt(φ₀² + Δx²)` with `Δx` the largest grid spacing.
//! Taking the sign from the initial field anchors the zero contour; the
//! iterate's own sign can be used instead via
//! [`ReinitializationParams::use_phi0_for_sign`].
//!
//! |∇φ| uses the Godunov upwind selection:
//! - `S ≥ 0`: `Σ_a max(max(φ⁻_a, 0)², min(φ⁺_a, 0)²)`
//! - `S < 0`: `Σ_a max(min(φ⁻_a, 0)², max(φ⁺_a, 0)²)`
//!
//! The march runs for a fixed pseudo-time horizon with step
//! `cfl_number · min Δx`; there is no residual-based stopping test.

use crate::error::{LsmError, Result};
use crate::field::{check_components, Field, FieldView, FieldViewMut};
use crate::grid::{Grid, IndexBox};
use crate::options::ReinitializationParams;
use crate::solver::boundary::{fill_ghost_cells, ExtrapolationKind};
use crate::solver::level_set::godunov_gradient_norm;
use crate::solver::spatial_derivatives::{check_spacing, OneSidedGradient};
use crate::solver::tvd_runge_kutta::advance;
use tracing::debug;

/// Smoothed sign function `φ / sqrt(φ² + Δx²)`.
#[inline]
#[must_use]
pub fn smoothed_sign(phi: f64, dx: f64) -> f64 {
    phi / (phi * phi + dx * dx).sqrt()
}

/// Right-hand side `S(1 - |∇φ|)` of the reinitialization equation over
/// `fill_box`.
///
/// # Arguments
///
/// * `rhs` - Output, written over `fill_box`
/// * `sign_source` - Field whose smoothed sign drives the motion (φ₀ or φ)
/// * `phi_plus` / `phi_minus` - One-sided derivatives of the current iterate
/// * `dx` - Grid spacing per axis
pub fn reinitialization_rhs(
    rhs: &mut FieldViewMut<'_>,
    sign_source: &FieldView<'_>,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
) -> Result<()> {
    let num_dims = dx.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_spacing(dx)?;
    check_components("phi_plus", phi_plus.len(), num_dims)?;
    check_components("phi_minus", phi_minus.len(), num_dims)?;
    rhs.require(fill_box)?;
    sign_source.require(fill_box)?;
    for axis in 0..num_dims {
        phi_plus[axis].require(fill_box)?;
        phi_minus[axis].require(fill_box)?;
    }

    let smoothing = dx.iter().copied().fold(0.0, f64::max);
    for p in fill_box.points() {
        let sign = smoothed_sign(sign_source.get(p), smoothing);
        let norm = godunov_gradient_norm(
            sign,
            phi_plus.iter().map(|f| f.get(p)),
            phi_minus.iter().map(|f| f.get(p)),
        );
        rhs.set(p, sign * (1.0 - norm));
    }
    Ok(())
}

/// Number of steps of size `dt` needed to cover `horizon`, treating a
/// horizon within roundoff of a whole number of steps as exact.
fn pseudo_step_count(horizon: f64, dt: f64) -> usize {
    let ratio = horizon / dt;
    let rounded = ratio.round();
    if (ratio - rounded).abs() <= 1e-9 * rounded.max(1.0) {
        rounded as usize
    } else {
        ratio.ceil() as usize
    }
}

/// Restore cells where `mask > 0` to their value in `previous`.
fn impose_freeze_mask(phi: &mut Field, previous: &Field, mask: &Field) {
    for ((value, &old), &m) in phi
        .as_mut_slice()
        .iter_mut()
        .zip(previous.as_slice())
        .zip(mask.as_slice())
    {
        *value = if m > 0.0 { old } else { *value };
    }
}

/// Reinitialize `phi` in place.
///
/// Ghost cells are refreshed with signed linear extrapolation before every
/// right-hand-side evaluation and after every pseudo-step. Cells where
/// `freeze_mask > 0` keep their value from before each pseudo-step.
///
/// Returns the number of pseudo-steps taken.
///
/// # Errors
///
/// Fails on invalid parameters, a mask that does not match the grid, or any
/// kernel contract violation (e.g. a scheme needing more ghost cells than the
/// grid carries).
pub fn reinitialize(
    grid: &Grid,
    phi: &mut Field,
    params: &ReinitializationParams,
    freeze_mask: Option<&Field>,
) -> Result<usize> {
    params.validate()?;
    if phi.ghost_box() != grid.ghost_box() {
        return Err(LsmError::BoxNotContained {
            buffer: "phi",
            required: grid.ghost_box(),
            available: phi.ghost_box(),
        });
    }
    if let Some(mask) = freeze_mask {
        if mask.ghost_box() != grid.ghost_box() {
            return Err(LsmError::BoxNotContained {
                buffer: "freeze_mask",
                required: grid.ghost_box(),
                available: mask.ghost_box(),
            });
        }
    }

    let dt = params.cfl_number * grid.min_dx();
    let scheme = params.accuracy.scheme();
    let fill_box = grid.fill_box();
    let phi0 = phi.clone();
    let mut gradient = OneSidedGradient::new(grid);

    let steps = pseudo_step_count(params.horizon, dt);
    for _ in 0..steps {
        let previous = freeze_mask.map(|_| phi.clone());
        advance(params.rk_order, grid, phi, dt, |state, rhs| {
            fill_ghost_cells(grid, state, ExtrapolationKind::SignedLinear)?;
            gradient.compute(grid, state, scheme)?;
            let sign_source = if params.use_phi0_for_sign {
                phi0.view("phi0")
            } else {
                state.view("phi")
            };
            reinitialization_rhs(
                &mut rhs.view_mut("rhs"),
                &sign_source,
                &gradient.plus_views(),
                &gradient.minus_views(),
                &fill_box,
                grid.dx(),
            )
        })?;
        fill_ghost_cells(grid, phi, ExtrapolationKind::SignedLinear)?;
        if let (Some(mask), Some(previous)) = (freeze_mask, previous.as_ref()) {
            impose_freeze_mask(phi, previous, mask);
        }
    }

    debug!(
        "Reinitialization: {} pseudo-steps of {:.3e} ({} / RK{})",
        steps,
        dt,
        scheme,
        params.rk_order.stages()
    );
    Ok(steps)
}
