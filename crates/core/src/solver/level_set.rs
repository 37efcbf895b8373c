//! Level set equation right-hand side
//!
//! Assembles `L(φ)` for
//!
//! `∂φ/∂t + v·∇φ + Vn|∇φ| = 0`
//!
//! term by term: zero the buffer, then add an advection term
//! `-v·∇φ` (with ∇φ already upwinded by the velocity), a normal-velocity term
//! `-Vn|∇φ|` or a uniform normal-speed term. The result feeds the TVD
//! Runge-Kutta stages.
//!
//! |∇φ| for normal motion uses the Godunov Hamiltonian, which picks for each
//! axis the one-sided derivative carrying information toward the cell:
//!
//! - `Vn ≥ 0`: `Σ_a max(max(φ⁻_a, 0)², min(φ⁺_a, 0)²)`
//! - `Vn < 0`: `Σ_a max(min(φ⁻_a, 0)², max(φ⁺_a, 0)²)`
//!
//! # References
//!
//! - Sethian (1999) "Level Set Methods and Fast Marching Methods"
//! - Osher & Fedkiw (2003) "Level Set Methods and Dynamic Implicit Surfaces", ch. 6

use crate::error::{LsmError, Result};
use crate::field::{check_components, FieldView, FieldViewMut};
use crate::grid::IndexBox;

/// Godunov |∇φ| for a front moving with the sign of `speed`.
#[inline]
pub(crate) fn godunov_gradient_norm(
    speed: f64,
    plus: impl Iterator<Item = f64>,
    minus: impl Iterator<Item = f64>,
) -> f64 {
    let sum: f64 = plus
        .zip(minus)
        .map(|(p, m)| {
            if speed >= 0.0 {
                m.max(0.0).powi(2).max(p.min(0.0).powi(2))
            } else {
                m.min(0.0).powi(2).max(p.max(0.0).powi(2))
            }
        })
        .sum();
    sum.sqrt()
}

fn check_one_sided(
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
) -> Result<()> {
    let num_dims = phi_plus.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_components("phi_minus", phi_minus.len(), num_dims)?;
    for (plus, minus) in phi_plus.iter().zip(phi_minus) {
        plus.require(fill_box)?;
        minus.require(fill_box)?;
    }
    Ok(())
}

/// Set the right-hand side to zero over `fill_box`.
pub fn zero_rhs(rhs: &mut FieldViewMut<'_>, fill_box: &IndexBox) -> Result<()> {
    rhs.require(fill_box)?;
    for p in fill_box.points() {
        rhs.set(p, 0.0);
    }
    Ok(())
}

/// Add `-Σ_a v_a ∂φ/∂x_a`, where `grad_phi` holds the upwinded derivative
/// for each axis (see [`upwind_gradient`](super::spatial_derivatives::upwind_gradient)).
pub fn add_advection_term(
    rhs: &mut FieldViewMut<'_>,
    grad_phi: &[FieldView<'_>],
    velocity: &[FieldView<'_>],
    fill_box: &IndexBox,
) -> Result<()> {
    let num_dims = grad_phi.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_components("velocity", velocity.len(), num_dims)?;
    rhs.require(fill_box)?;
    for (g, v) in grad_phi.iter().zip(velocity) {
        g.require(fill_box)?;
        v.require(fill_box)?;
    }

    for p in fill_box.points() {
        let transport: f64 = grad_phi
            .iter()
            .zip(velocity)
            .map(|(g, v)| v.get(p) * g.get(p))
            .sum();
        rhs.set(p, rhs.get(p) - transport);
    }
    Ok(())
}

/// Add `-Vn |∇φ|` with a spatially varying normal velocity.
pub fn add_normal_velocity_term(
    rhs: &mut FieldViewMut<'_>,
    normal_velocity: &FieldView<'_>,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
) -> Result<()> {
    check_one_sided(phi_plus, phi_minus, fill_box)?;
    rhs.require(fill_box)?;
    normal_velocity.require(fill_box)?;
    add_normal_term(rhs, |p| normal_velocity.get(p), phi_plus, phi_minus, fill_box);
    Ok(())
}

/// Add `-Vn |∇φ|` with a uniform normal speed.
pub fn add_const_normal_velocity_term(
    rhs: &mut FieldViewMut<'_>,
    normal_velocity: f64,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
) -> Result<()> {
    check_one_sided(phi_plus, phi_minus, fill_box)?;
    rhs.require(fill_box)?;
    add_normal_term(rhs, |_| normal_velocity, phi_plus, phi_minus, fill_box);
    Ok(())
}

fn add_normal_term(
    rhs: &mut FieldViewMut<'_>,
    vn: impl Fn([i32; 3]) -> f64,
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    fill_box: &IndexBox,
) {
    for p in fill_box.points() {
        let speed = vn(p);
        if speed == 0.0 {
            continue;
        }
        let norm = godunov_gradient_norm(
            speed,
            phi_plus.iter().map(|f| f.get(p)),
            phi_minus.iter().map(|f| f.get(p)),
        );
        rhs.set(p, rhs.get(p) - speed * norm);
    }
}
