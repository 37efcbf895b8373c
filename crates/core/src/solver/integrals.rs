//! Smoothed volume and surface integrals
//!
//! Integrals over `{φ < 0}`, `{φ > 0}` and `{φ = 0}` are approximated on the
//! grid with a smoothed Heaviside function of half-width ε:
//!
//! ```text
//! H_ε(φ) = 0                                   φ < -ε
//!        = ½ (1 + φ/ε + sin(πφ/ε)/π)           |φ| ≤ ε
//!        = 1                                   φ > ε
//! δ_ε(φ) = dH_ε/dφ = (1 + cos(πφ/ε)) / (2ε)    |φ| ≤ ε, 0 elsewhere
//! ```
//!
//! Surface integrals use the co-area relation `∫_{φ=0} F dA ≈ Σ F δ_ε(φ) |∇φ| dV`.
//! Results are per-patch partial sums; adding the results of several patches
//! is the caller's reduction, and control-volume weights keep cells shared by
//! overlapping patches from being counted twice.

use crate::error::{LsmError, Result};
use crate::field::{check_components, Field, FieldView};
use crate::grid::{Grid, IndexBox};
use crate::solver::control_volume::{cell_weight, ControlVolume};
use crate::solver::spatial_derivatives::{central_gradient, check_spacing};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Smoothing half-width as a multiple of the largest grid spacing.
pub const DEFAULT_SMOOTHING_CELLS: f64 = 1.5;

/// Smoothed Heaviside function.
#[must_use]
pub fn heaviside(phi: f64, epsilon: f64) -> f64 {
    if phi < -epsilon {
        0.0
    } else if phi > epsilon {
        1.0
    } else {
        0.5 * (1.0 + phi / epsilon + (PI * phi / epsilon).sin() / PI)
    }
}

/// Smoothed delta function, the derivative of [`heaviside`].
#[must_use]
pub fn delta(phi: f64, epsilon: f64) -> f64 {
    if phi.abs() > epsilon {
        0.0
    } else {
        0.5 * (1.0 + (PI * phi / epsilon).cos()) / epsilon
    }
}

/// Default smoothing half-width for `grid`: 1.5 x the largest spacing.
#[must_use]
pub fn default_smoothing_width(grid: &Grid) -> f64 {
    DEFAULT_SMOOTHING_CELLS * grid.max_dx()
}

/// Side of the interface to integrate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// `{φ < 0}`
    Inside,
    /// `{φ > 0}`
    Outside,
}

fn check_common(
    phi: &FieldView<'_>,
    integrand: Option<&FieldView<'_>>,
    fill_box: &IndexBox,
    dx: &[f64],
    epsilon: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<()> {
    if !(2..=3).contains(&dx.len()) {
        return Err(LsmError::UnsupportedDimension { found: dx.len() });
    }
    check_spacing(dx)?;
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(LsmError::InvalidOption {
            name: "epsilon",
            detail: format!("smoothing width must be positive, got {epsilon}"),
        });
    }
    phi.require(fill_box)?;
    if let Some(f) = integrand {
        f.require(fill_box)?;
    }
    if let Some(cv) = control_volume {
        cv.require(fill_box)?;
    }
    Ok(())
}

/// `Σ F · H_ε(∓φ) · dV` over `fill_box`. A missing integrand means `F = 1`.
///
/// # Arguments
///
/// * `region` - [`Region::Inside`] for `{φ < 0}`, [`Region::Outside`] for `{φ > 0}`
/// * `integrand` - Optional field `F`
/// * `phi` - Level set function
/// * `fill_box` - Cells to sum over
/// * `dx` - Spacing per axis
/// * `epsilon` - Smoothing half-width
/// * `control_volume` - Optional selection of the cells this patch owns
pub fn volume_integral(
    region: Region,
    integrand: Option<&FieldView<'_>>,
    phi: &FieldView<'_>,
    fill_box: &IndexBox,
    dx: &[f64],
    epsilon: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    check_common(phi, integrand, fill_box, dx, epsilon, control_volume)?;
    let orientation = match region {
        Region::Inside => -1.0,
        Region::Outside => 1.0,
    };
    let cell_volume: f64 = dx.iter().product();
    let sum: f64 = fill_box
        .points()
        .filter_map(|p| {
            let w = cell_weight(control_volume, p)?;
            let f = integrand.map_or(1.0, |f| f.get(p));
            Some(w * f * heaviside(orientation * phi.get(p), epsilon))
        })
        .sum();
    Ok(sum * cell_volume)
}

/// `Σ F · δ_ε(φ) · |∇φ| · dV` over `fill_box`, with `grad_phi` one component
/// per axis.
pub fn surface_integral(
    integrand: Option<&FieldView<'_>>,
    phi: &FieldView<'_>,
    grad_phi: &[FieldView<'_>],
    fill_box: &IndexBox,
    dx: &[f64],
    epsilon: f64,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    check_common(phi, integrand, fill_box, dx, epsilon, control_volume)?;
    check_components("grad_phi", grad_phi.len(), dx.len())?;
    for g in grad_phi {
        g.require(fill_box)?;
    }
    let cell_volume: f64 = dx.iter().product();
    let sum: f64 = fill_box
        .points()
        .filter_map(|p| {
            let w = cell_weight(control_volume, p)?;
            let f = integrand.map_or(1.0, |f| f.get(p));
            let norm = grad_phi.iter().map(|g| g.get(p).powi(2)).sum::<f64>().sqrt();
            Some(w * f * delta(phi.get(p), epsilon) * norm)
        })
        .sum();
    Ok(sum * cell_volume)
}

/// `max |a - b|` over `fill_box` (0 for an empty selection).
pub fn max_norm_diff(
    a: &FieldView<'_>,
    b: &FieldView<'_>,
    fill_box: &IndexBox,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    a.require(fill_box)?;
    b.require(fill_box)?;
    if let Some(cv) = control_volume {
        cv.require(fill_box)?;
    }
    Ok(fill_box
        .points()
        .filter(|&p| cell_weight(control_volume, p).is_some())
        .map(|p| (a.get(p) - b.get(p)).abs())
        .fold(0.0, f64::max))
}

/// Smoothed measure of `{φ < 0}` (area in 2-D, volume in 3-D) over the grid's
/// fill box, with the default smoothing width.
pub fn enclosed_volume(
    grid: &Grid,
    phi: &Field,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    volume_integral(
        Region::Inside,
        None,
        &phi.view("phi"),
        &grid.fill_box(),
        grid.dx(),
        default_smoothing_width(grid),
        control_volume,
    )
}

/// Smoothed measure of `{φ = 0}` (perimeter in 2-D, area in 3-D) using a
/// central-difference gradient. Needs one ghost cell of valid φ.
pub fn interface_measure(
    grid: &Grid,
    phi: &Field,
    control_volume: Option<&ControlVolume<'_>>,
) -> Result<f64> {
    let mut grad: Vec<Field> = (0..grid.num_dims()).map(|_| Field::new(grid)).collect();
    {
        let mut views: Vec<_> = grad.iter_mut().map(|g| g.view_mut("grad_phi")).collect();
        central_gradient(&mut views, &phi.view("phi"), &grid.fill_box(), grid.dx())?;
    }
    let grad_views: Vec<_> = grad.iter().map(|g| g.view("grad_phi")).collect();
    surface_integral(
        None,
        &phi.view("phi"),
        &grad_views,
        &grid.fill_box(),
        grid.dx(),
        default_smoothing_width(grid),
        control_volume,
    )
}
