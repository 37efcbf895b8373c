//! One-sided spatial derivatives for Hamilton-Jacobi equations
//!
//! Given φ valid over a buffer's ghost box, these kernels write the forward
//! (φ⁺) and backward (φ⁻) biased estimates of ∂φ/∂x_a at every point of a fill
//! box.
//!
//! # Schemes
//!
//! - **HJ ENO-k** (k = 1..3): builds undivided differences
//!   `D1[i] = φ[i] - φ[i-1]`, `D2[i] = D1[i+1] - D1[i]`, `D3[i] = D2[i] - D2[i-1]`
//!   and extends the stencil one cell at a time toward the side whose next
//!   difference is smaller in magnitude, so the stencil never reaches across
//!   a kink when a smooth side is available.
//! - **HJ WENO-5**: convex combination of the three third-order ENO
//!   candidates, weighted by `d_k / (ε + S_k)²` with smoothness indicators
//!   `S_k`. A candidate whose stencil crosses a kink gets a vanishing weight.
//!
//! Only cells within the scheme's stencil reach of the fill box are read;
//! the call fails up front if the φ buffer does not cover them.
//!
//! # References
//!
//! - Osher & Fedkiw (2003) "Level Set Methods and Dynamic Implicit Surfaces", ch. 3
//! - Jiang & Peng (2000) "Weighted ENO schemes for Hamilton-Jacobi equations"

use crate::error::{LsmError, Result};
use crate::field::{check_components, Field, FieldView, FieldViewMut};
use crate::grid::{Grid, IndexBox, SpatialDerivativeScheme};
use tracing::trace;

/// Linear weights of the three WENO-5 candidate stencils.
pub const WENO5_LINEAR_WEIGHTS: [f64; 3] = [0.1, 0.6, 0.3];

/// Relative part of the WENO-5 regularization `ε = 1e-6 · max(v²) + 1e-99`.
const WENO5_EPSILON_SCALE: f64 = 1e-6;

/// `point` moved by `offset` cells along `axis`.
#[inline]
pub(crate) fn shift(point: [i32; 3], axis: usize, offset: i32) -> [i32; 3] {
    let mut p = point;
    p[axis] += offset;
    p
}

pub(crate) fn check_spacing(dx: &[f64]) -> Result<()> {
    for (axis, &value) in dx.iter().enumerate() {
        if !(value.is_finite() && value > 0.0) {
            return Err(LsmError::NonPositiveSpacing { axis, value });
        }
    }
    Ok(())
}

fn check_scheme(scheme: SpatialDerivativeScheme) -> Result<()> {
    match scheme {
        SpatialDerivativeScheme::Eno(k) if !(1..=3).contains(&k) => Err(LsmError::InvalidOption {
            name: "scheme",
            detail: format!("ENO order must be 1, 2 or 3, got {k}"),
        }),
        _ => Ok(()),
    }
}

/// Undivided difference buffers for one call, sized for the largest axis.
struct Scratch {
    d1: Vec<f64>,
    d2: Vec<f64>,
    d3: Vec<f64>,
}

impl Scratch {
    fn allocate(scheme: SpatialDerivativeScheme, len: usize) -> Result<Self> {
        let levels = match scheme {
            SpatialDerivativeScheme::Eno(k) => usize::from(k),
            SpatialDerivativeScheme::Weno5 => 1,
        };
        // Earlier buffers are dropped by `?` if a later reservation fails.
        let d1 = scratch_buffer(len)?;
        let d2 = scratch_buffer(if levels >= 2 { len } else { 0 })?;
        let d3 = scratch_buffer(if levels >= 3 { len } else { 0 })?;
        Ok(Self { d1, d2, d3 })
    }
}

fn scratch_buffer(len: usize) -> Result<Vec<f64>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| LsmError::ScratchAllocation {
            bytes: len.saturating_mul(std::mem::size_of::<f64>()),
        })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

/// Compute φ⁺ and φ⁻ along a single axis.
///
/// # Arguments
///
/// * `scheme` - ENO order or WENO-5
/// * `axis` - Differencing axis (0 = x)
/// * `phi_plus` - Output forward derivative, written over `fill_box`
/// * `phi_minus` - Output backward derivative, written over `fill_box`
/// * `phi` - Input field, read over `fill_box` grown by the stencil reach along `axis`
/// * `fill_box` - Points where derivatives are produced
/// * `dx` - Spacing along `axis`
///
/// # Errors
///
/// Fails before writing if any buffer is too small, the spacing is not
/// positive, or scratch memory cannot be reserved.
pub fn one_sided_derivatives(
    scheme: SpatialDerivativeScheme,
    axis: usize,
    phi_plus: &mut FieldViewMut<'_>,
    phi_minus: &mut FieldViewMut<'_>,
    phi: &FieldView<'_>,
    fill_box: &IndexBox,
    dx: f64,
) -> Result<()> {
    check_scheme(scheme)?;
    if axis >= 3 {
        return Err(LsmError::UnsupportedDimension { found: axis + 1 });
    }
    check_spacing(&[dx])
        .map_err(|_| LsmError::NonPositiveSpacing { axis, value: dx })?;
    let reach = scheme.stencil_reach() as i32;
    phi.require(&fill_box.grow_axis(axis, reach))?;
    phi_plus.require(fill_box)?;
    phi_minus.require(fill_box)?;
    if fill_box.is_empty() {
        return Ok(());
    }

    let mut scratch = Scratch::allocate(scheme, fill_box.grow_axis(axis, reach).num_points())?;
    compute_axis(scheme, axis, phi_plus, phi_minus, phi, fill_box, dx, &mut scratch);
    Ok(())
}

/// Compute φ⁺ and φ⁻ along every axis (`dx.len()` axes).
///
/// All buffers are validated and all scratch memory is reserved before any
/// output is written.
pub fn one_sided_gradient(
    scheme: SpatialDerivativeScheme,
    phi_plus: &mut [FieldViewMut<'_>],
    phi_minus: &mut [FieldViewMut<'_>],
    phi: &FieldView<'_>,
    fill_box: &IndexBox,
    dx: &[f64],
) -> Result<()> {
    check_scheme(scheme)?;
    let num_dims = dx.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_components("phi_plus", phi_plus.len(), num_dims)?;
    check_components("phi_minus", phi_minus.len(), num_dims)?;
    check_spacing(dx)?;

    let reach = scheme.stencil_reach() as i32;
    let mut scratch_len = 0;
    for axis in 0..num_dims {
        let stencil_box = fill_box.grow_axis(axis, reach);
        phi.require(&stencil_box)?;
        phi_plus[axis].require(fill_box)?;
        phi_minus[axis].require(fill_box)?;
        scratch_len = scratch_len.max(stencil_box.num_points());
    }
    if fill_box.is_empty() {
        return Ok(());
    }

    trace!("{} gradient over {}", scheme, fill_box);
    let mut scratch = Scratch::allocate(scheme, scratch_len)?;
    for (axis, (plus, minus)) in phi_plus.iter_mut().zip(phi_minus.iter_mut()).enumerate() {
        compute_axis(scheme, axis, plus, minus, phi, fill_box, dx[axis], &mut scratch);
    }
    Ok(())
}

fn compute_axis(
    scheme: SpatialDerivativeScheme,
    axis: usize,
    phi_plus: &mut FieldViewMut<'_>,
    phi_minus: &mut FieldViewMut<'_>,
    phi: &FieldView<'_>,
    fill_box: &IndexBox,
    dx: f64,
    scratch: &mut Scratch,
) {
    let reach = scheme.stencil_reach() as i32;
    let sbox = fill_box.grow_axis(axis, reach);
    let levels = match scheme {
        SpatialDerivativeScheme::Eno(k) => k,
        SpatialDerivativeScheme::Weno5 => 1,
    };

    // Each level is valid one cell further in from the scratch box edges.
    let mut d1_box = sbox;
    d1_box.lo[axis] += 1;
    for p in d1_box.points() {
        scratch.d1[sbox.linear_index(p)] = phi.get(p) - phi.get(shift(p, axis, -1));
    }
    if levels >= 2 {
        let mut d2_box = d1_box;
        d2_box.hi[axis] -= 1;
        for p in d2_box.points() {
            scratch.d2[sbox.linear_index(p)] =
                scratch.d1[sbox.linear_index(shift(p, axis, 1))] - scratch.d1[sbox.linear_index(p)];
        }
        if levels >= 3 {
            let mut d3_box = d2_box;
            d3_box.lo[axis] += 1;
            for p in d3_box.points() {
                scratch.d3[sbox.linear_index(p)] = scratch.d2[sbox.linear_index(p)]
                    - scratch.d2[sbox.linear_index(shift(p, axis, -1))];
            }
        }
    }

    let (d1, d2, d3) = (
        scratch.d1.as_slice(),
        scratch.d2.as_slice(),
        scratch.d3.as_slice(),
    );
    for p in fill_box.points() {
        let at = |buf: &[f64], k: i32| buf[sbox.linear_index(shift(p, axis, k))];
        let d1_at = |k| at(d1, k);
        let (plus, minus) = match scheme {
            SpatialDerivativeScheme::Eno(k) => {
                let d2_at = |k| at(d2, k);
                let d3_at = |k| at(d3, k);
                (
                    eno_forward(k, &d1_at, &d2_at, &d3_at) / dx,
                    eno_backward(k, &d1_at, &d2_at, &d3_at) / dx,
                )
            }
            SpatialDerivativeScheme::Weno5 => {
                let forward = [d1_at(3), d1_at(2), d1_at(1), d1_at(0), d1_at(-1)];
                let backward = [d1_at(-2), d1_at(-1), d1_at(0), d1_at(1), d1_at(2)];
                (
                    weno5(forward.map(|d| d / dx)),
                    weno5(backward.map(|d| d / dx)),
                )
            }
        };
        phi_plus.set(p, plus);
        phi_minus.set(p, minus);
    }
}

#[inline]
fn smaller_magnitude(a: f64, b: f64) -> f64 {
    if a.abs() <= b.abs() {
        a
    } else {
        b
    }
}

/// Undivided backward ENO estimate at offset 0 (divide by dx for the derivative).
fn eno_backward(
    order: u8,
    d1: impl Fn(i32) -> f64,
    d2: impl Fn(i32) -> f64,
    d3: impl Fn(i32) -> f64,
) -> f64 {
    let mut value = d1(0);
    if order >= 2 {
        let (left, right) = (d2(-1), d2(0));
        let take_left = left.abs() <= right.abs();
        value += 0.5 * if take_left { left } else { right };
        if order >= 3 {
            value += if take_left {
                smaller_magnitude(d3(-1), d3(0)) / 3.0
            } else {
                -smaller_magnitude(d3(0), d3(1)) / 6.0
            };
        }
    }
    value
}

/// Undivided forward ENO estimate at offset 0.
fn eno_forward(
    order: u8,
    d1: impl Fn(i32) -> f64,
    d2: impl Fn(i32) -> f64,
    d3: impl Fn(i32) -> f64,
) -> f64 {
    let mut value = d1(1);
    if order >= 2 {
        let (left, right) = (d2(0), d2(1));
        let take_left = left.abs() <= right.abs();
        value -= 0.5 * if take_left { left } else { right };
        if order >= 3 {
            value += if take_left {
                -smaller_magnitude(d3(0), d3(1)) / 6.0
            } else {
                smaller_magnitude(d3(1), d3(2)) / 3.0
            };
        }
    }
    value
}

/// Nonlinear WENO-5 weights for the five one-sided divided differences
/// `v = [v1, .., v5]` (ordered so the estimate is biased toward `v3`).
#[must_use]
pub fn weno5_weights(v: [f64; 5]) -> [f64; 3] {
    let [v1, v2, v3, v4, v5] = v;
    let s1 = 13.0 / 12.0 * (v1 - 2.0 * v2 + v3).powi(2) + 0.25 * (v1 - 4.0 * v2 + 3.0 * v3).powi(2);
    let s2 = 13.0 / 12.0 * (v2 - 2.0 * v3 + v4).powi(2) + 0.25 * (v2 - v4).powi(2);
    let s3 = 13.0 / 12.0 * (v3 - 2.0 * v4 + v5).powi(2) + 0.25 * (3.0 * v3 - 4.0 * v4 + v5).powi(2);

    let max_sq = v.iter().fold(0.0_f64, |m, x| m.max(x * x));
    let eps = WENO5_EPSILON_SCALE * max_sq + 1e-99;

    let alpha = [
        WENO5_LINEAR_WEIGHTS[0] / (s1 + eps).powi(2),
        WENO5_LINEAR_WEIGHTS[1] / (s2 + eps).powi(2),
        WENO5_LINEAR_WEIGHTS[2] / (s3 + eps).powi(2),
    ];
    let sum: f64 = alpha.iter().sum();
    alpha.map(|a| a / sum)
}

/// WENO-5 derivative estimate from five divided differences.
#[must_use]
pub fn weno5(v: [f64; 5]) -> f64 {
    let [v1, v2, v3, v4, v5] = v;
    let candidates = [
        v1 / 3.0 - 7.0 * v2 / 6.0 + 11.0 * v3 / 6.0,
        -v2 / 6.0 + 5.0 * v3 / 6.0 + v4 / 3.0,
        v3 / 3.0 + 5.0 * v4 / 6.0 - v5 / 6.0,
    ];
    let w = weno5_weights(v);
    w[0] * candidates[0] + w[1] * candidates[1] + w[2] * candidates[2]
}

/// Second-order central-difference gradient over `fill_box`.
///
/// Reads φ one cell beyond the fill box along each axis.
pub fn central_gradient(
    grad: &mut [FieldViewMut<'_>],
    phi: &FieldView<'_>,
    fill_box: &IndexBox,
    dx: &[f64],
) -> Result<()> {
    let num_dims = dx.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_components("grad_phi", grad.len(), num_dims)?;
    check_spacing(dx)?;
    for (axis, g) in grad.iter().enumerate() {
        phi.require(&fill_box.grow_axis(axis, 1))?;
        g.require(fill_box)?;
    }

    for (axis, g) in grad.iter_mut().enumerate() {
        let inv_2dx = 0.5 / dx[axis];
        for p in fill_box.points() {
            g.set(
                p,
                (phi.get(shift(p, axis, 1)) - phi.get(shift(p, axis, -1))) * inv_2dx,
            );
        }
    }
    Ok(())
}

/// Pick the upwind one-sided derivative per axis by the sign of a velocity:
/// φ⁻ where `v > 0`, φ⁺ where `v < 0`, zero where `v == 0`.
pub fn upwind_gradient(
    grad: &mut [FieldViewMut<'_>],
    phi_plus: &[FieldView<'_>],
    phi_minus: &[FieldView<'_>],
    velocity: &[FieldView<'_>],
    fill_box: &IndexBox,
) -> Result<()> {
    let num_dims = grad.len();
    if !(2..=3).contains(&num_dims) {
        return Err(LsmError::UnsupportedDimension { found: num_dims });
    }
    check_components("phi_plus", phi_plus.len(), num_dims)?;
    check_components("phi_minus", phi_minus.len(), num_dims)?;
    check_components("velocity", velocity.len(), num_dims)?;
    for axis in 0..num_dims {
        grad[axis].require(fill_box)?;
        phi_plus[axis].require(fill_box)?;
        phi_minus[axis].require(fill_box)?;
        velocity[axis].require(fill_box)?;
    }

    for (axis, g) in grad.iter_mut().enumerate() {
        for p in fill_box.points() {
            let v = velocity[axis].get(p);
            let value = if v > 0.0 {
                phi_minus[axis].get(p)
            } else if v < 0.0 {
                phi_plus[axis].get(p)
            } else {
                0.0
            };
            g.set(p, value);
        }
    }
    Ok(())
}

/// Owned φ⁺/φ⁻ buffers for every axis of a grid.
#[derive(Debug, Clone)]
pub struct OneSidedGradient {
    /// Forward-biased derivative per axis
    pub plus: Vec<Field>,
    /// Backward-biased derivative per axis
    pub minus: Vec<Field>,
}

impl OneSidedGradient {
    /// Zeroed buffers over the grid's ghost box.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let n = grid.num_dims();
        Self {
            plus: (0..n).map(|_| Field::new(grid)).collect(),
            minus: (0..n).map(|_| Field::new(grid)).collect(),
        }
    }

    /// Recompute over the grid's fill box with `scheme`.
    pub fn compute(&mut self, grid: &Grid, phi: &Field, scheme: SpatialDerivativeScheme) -> Result<()> {
        let mut plus: Vec<_> = self.plus.iter_mut().map(|f| f.view_mut("phi_plus")).collect();
        let mut minus: Vec<_> = self.minus.iter_mut().map(|f| f.view_mut("phi_minus")).collect();
        one_sided_gradient(
            scheme,
            &mut plus,
            &mut minus,
            &phi.view("phi"),
            &grid.fill_box(),
            grid.dx(),
        )
    }

    pub fn plus_views(&self) -> Vec<FieldView<'_>> {
        self.plus.iter().map(|f| f.view("phi_plus")).collect()
    }

    pub fn minus_views(&self) -> Vec<FieldView<'_>> {
        self.minus.iter().map(|f| f.view("phi_minus")).collect()
    }
}
