//! Stable time step estimation
//!
//! Every estimator reduces a per-cell wave speed, summed axis by axis (a
//! conservative bound rather than the Euclidean norm), to its maximum over the
//! fill box and returns
//!
//! `dt = cfl_number / max_cells Σ_a speed_a / Δx_a`
//!
//! A patch with zero wave speed everywhere returns [`UNCONSTRAINED_DT`] so the
//! caller can substitute its own policy instead of dividing by zero. Each call
//! gives a per-patch result; the minimum across patches is the caller's
//! reduction.

use crate::error::{LsmError, Result};
use crate::field::{check_components, FieldView};
use crate::grid::IndexBox;
use crate::solver::control_volume::{cell_weight, ControlVolume};
use crate::solver::spatial_derivatives::check_spacing;

/// Returned when no cell constrains the time step.
pub const UNCONSTRAINED_DT: f64 = f64::INFINITY;

fn check_cfl_number(cfl_number: f64) -> Result<()> {
    if cfl_number.is_finite() && cfl_number > 0.0 {
        Ok(())
    } else {
        Err(LsmError::InvalidOption {
            name: "cfl_number",
            detail: format!("must be positive, got {cfl_number}"),
        })
    }
}

fn dt_from_speed(max_speed: f64, cfl_number: f64) -> f64 {
    if max_speed > 0.0 {
        cfl_number / max_speed
    } else {
        UNCONSTRAINED_DT
    }
}

fn max_speed(
    fill_box: &IndexBox,
    control_volume: Option<&ControlVolume<'_>>,
    speed: impl Fn([i32; 3]) -> f64,
) -> f64 {
    fill_box
        .points()
        .filter(|&p| cell_weight(control_volume, p).is_some())
        .map(speed)
        .fold(0.0, f64::max)
}

fn check_gradient(
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
    for axis in 0..num_dims {
        phi_plus[axis].require(fill_box)?;
        phi_minus[axis].require(fill_box)?;
    }
    Ok(())
}

/// Largest stable step for advection by an external velocity field.
///
/// # Arguments
///
/// * `velocity` - One component per axis
/// * `fill_box` - Cells to reduce over
/// * `dx` - Spacing per axis
/// * `cfl_number` - Safety factor
/// * `control_volume` - Optional selection of the cells this patch owns
pub fn advection_stable_dt(
    velocity: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
    cfl_number: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    let num_dims = dx.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_spacing(dx)?;
    check_cfl_number(cfl_number)?;
    check_components("velocity", velocity.len(), num_dims)?;
    for v in velocity {
        v.require(fill_box)?;
    }
    if let Some(cv) = control_volume {
        cv.require(fill_box)?;
    }

    let speed = max_speed(fill_box, control_volume, |p| {
        velocity
            .iter()
            .zip(dx)
            .map(|(v, h)| v.get(p).abs() / h)
            .sum()
    });
    Ok(dt_from_speed(speed, cfl_number))
}

/// Largest stable step for motion with a normal velocity field `vn`.
///
/// The wave speed is `|vn| · Σ_a max(|φ⁺_a|, |φ⁻_a|) / Δx_a`.
pub fn normal_velocity_stable_dt(
    normal_velocity: &FieldView<'_>,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
    cfl_number: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    normal_velocity.require(fill_box)?;
    normal_speed_dt(
        |p| normal_velocity.get(p),
        phi_plus,
        phi_minus,
        fill_box,
        dx,
        cfl_number,
        control_volume,
    )
}

/// Largest stable step for motion with a uniform normal speed.
pub fn const_normal_velocity_stable_dt(
    normal_velocity: f64,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
    cfl_number: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    normal_speed_dt(
        |_| normal_velocity,
        phi_plus,
        phi_minus,
        fill_box,
        dx,
        cfl_number,
        control_volume,
    )
}

fn normal_speed_dt(
    vn: impl Fn([i32; 3]) -> f64,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
    cfl_number: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    check_gradient(phi_plus, phi_minus, fill_box, dx)?;
    check_cfl_number(cfl_number)?;
    if let Some(cv) = control_volume {
        cv.require(fill_box)?;
    }

    let speed = max_speed(fill_box, control_volume, |p| {
        let slope: f64 = phi_plus
            .iter()
            .zip(phi_minus)
            .zip(dx)
            .map(|((plus, minus), h)| plus.get(p).abs().max(minus.get(p).abs()) / h)
            .sum();
        vn(p).abs() * slope
    });
    Ok(dt_from_speed(speed, cfl_number))
}
