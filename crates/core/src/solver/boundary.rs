//! Ghost-cell filling by extrapolation
//!
//! Ghost cells are filled one axis at a time. The x sweep covers only the
//! fill-box range of the other axes; each later sweep also covers the ghost
//! range of the axes already swept, so edge and corner cells are extrapolated
//! from face values that are already in place.
//!
//! Two policies are provided:
//! - **Linear**: `φ_g = φ_b + (φ_b - φ_{b±1}) · d`, exact for linear data.
//! - **Signed linear**: `φ_g = φ_b + sign(φ_b) · |φ_b - φ_{b±1}| · d`, which
//!   never lets the extrapolated value cross zero. This keeps the slope
//!   magnitude required by the reinitialization equation without creating
//!   spurious interfaces in the ghost layer.
//!
//! Here `b` is the boundary cell of the fill box, `b±1` its interior neighbour
//! and `d` the distance of the ghost cell from `b` in cells.

use crate::error::{LsmError, Result};
use crate::field::{Field, FieldViewMut};
use crate::grid::{Grid, IndexBox};
use serde::{Deserialize, Serialize};

/// Which faces of the fill box to extrapolate across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLocation {
    /// Every face
    #[default]
    All,
    XLo,
    XHi,
    YLo,
    YHi,
    ZLo,
    ZHi,
}

impl BoundaryLocation {
    /// True if this selection includes the face on `side` of `axis`.
    #[must_use]
    pub fn includes(&self, axis: usize, side: Side) -> bool {
        match self {
            Self::All => true,
            Self::XLo => axis == 0 && side == Side::Lower,
            Self::XHi => axis == 0 && side == Side::Upper,
            Self::YLo => axis == 1 && side == Side::Lower,
            Self::YHi => axis == 1 && side == Side::Upper,
            Self::ZLo => axis == 2 && side == Side::Lower,
            Self::ZHi => axis == 2 && side == Side::Upper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Lower,
    Upper,
}

/// Extrapolation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationKind {
    Linear,
    #[default]
    SignedLinear,
}

/// Fill the ghost cells of `phi` outside `fill_box` on the selected faces.
///
/// # Errors
///
/// Fails if `phi` does not cover `fill_box`, or if the fill box is a single
/// cell thick along an axis that has ghost cells (no interior neighbour to
/// take a slope from).
pub fn extrapolate(
    kind: ExtrapolationKind,
    phi: &mut FieldViewMut<'_>,
    fill_box: &IndexBox,
    location: BoundaryLocation,
) -> Result<()> {
    phi.require(fill_box)?;
    let ghost = phi.ghost_box();
    for axis in 0..3 {
        let has_ghosts = ghost.lo[axis] < fill_box.lo[axis] || ghost.hi[axis] > fill_box.hi[axis];
        if has_ghosts && fill_box.extent(axis) < 2 {
            return Err(LsmError::InvalidGridParameter {
                name: "fill_box",
                detail: format!("axis {axis} needs at least two interior cells to extrapolate"),
            });
        }
    }

    for axis in 0..3 {
        // Axes swept earlier contribute their ghost range.
        let mut region = *fill_box;
        for b in 0..axis {
            region.lo[b] = ghost.lo[b];
            region.hi[b] = ghost.hi[b];
        }
        for side in [Side::Lower, Side::Upper] {
            if !location.includes(axis, side) {
                continue;
            }
            let mut layer = region;
            let (boundary, inner) = match side {
                Side::Lower => {
                    layer.lo[axis] = ghost.lo[axis];
                    layer.hi[axis] = fill_box.lo[axis] - 1;
                    (fill_box.lo[axis], fill_box.lo[axis] + 1)
                }
                Side::Upper => {
                    layer.lo[axis] = fill_box.hi[axis] + 1;
                    layer.hi[axis] = ghost.hi[axis];
                    (fill_box.hi[axis], fill_box.hi[axis] - 1)
                }
            };
            for p in layer.points() {
                let mut pb = p;
                pb[axis] = boundary;
                let mut pn = p;
                pn[axis] = inner;
                let phi_b = phi.get(pb);
                let slope = phi_b - phi.get(pn);
                let dist = f64::from((p[axis] - boundary).abs());
                let value = match kind {
                    ExtrapolationKind::Linear => phi_b + slope * dist,
                    ExtrapolationKind::SignedLinear => {
                        let sign = if phi_b < 0.0 { -1.0 } else { 1.0 };
                        phi_b + sign * slope.abs() * dist
                    }
                };
                phi.set(p, value);
            }
        }
    }
    Ok(())
}

/// Plain linear extrapolation on the selected faces.
pub fn linear_extrapolation(
    phi: &mut FieldViewMut<'_>,
    fill_box: &IndexBox,
    location: BoundaryLocation,
) -> Result<()> {
    extrapolate(ExtrapolationKind::Linear, phi, fill_box, location)
}

/// Sign-preserving linear extrapolation on the selected faces.
pub fn signed_linear_extrapolation(
    phi: &mut FieldViewMut<'_>,
    fill_box: &IndexBox,
    location: BoundaryLocation,
) -> Result<()> {
    extrapolate(ExtrapolationKind::SignedLinear, phi, fill_box, location)
}

/// Fill every ghost cell of a grid-sized field.
pub fn fill_ghost_cells(grid: &Grid, phi: &mut Field, kind: ExtrapolationKind) -> Result<()> {
    extrapolate(
        kind,
        &mut phi.view_mut("phi"),
        &grid.fill_box(),
        BoundaryLocation::All,
    )
}
