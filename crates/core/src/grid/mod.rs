//! Structured grid descriptor shared by every field buffer of a computation
//!
//! A [`Grid`] records the geometry (physical bounds, spacing) and the index
//! space (ghost box, fill box and the eroded fill boxes of the undivided
//! difference scratch buffers) for one block of cells. Values are stored at
//! cell centers; the ghost-box bounds `x_lo_ghostbox` / `x_hi_ghostbox` are the
//! centers of the outermost ghost cells, so along each axis
//!
//! `x_hi_ghostbox - x_lo_ghostbox == dx * (grid_dims_ghostbox - 1)`.
//!
//! Index space starts at 0 at the lower ghost cell. The fill box is the
//! interior `[gw, gw + grid_dims - 1]` where `gw` is the ghost width implied
//! by the accuracy level.

pub mod accuracy;
pub mod index_box;
pub mod persistence;

pub use accuracy::{SpatialDerivativeAccuracy, SpatialDerivativeScheme};
pub use index_box::{BoxPoints, IndexBox};

use crate::error::{LsmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Relative tolerance used when deciding whether a domain length is already
/// an integer multiple of the requested spacing.
const CELL_COUNT_TOLERANCE: f64 = 1e-9;

/// Geometry and index-space descriptor for one block of cells.
///
/// Immutable once built; `clone()` gives a deep, independent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    num_dims: usize,
    accuracy: SpatialDerivativeAccuracy,
    x_lo: [f64; 3],
    x_hi: [f64; 3],
    x_lo_ghostbox: [f64; 3],
    x_hi_ghostbox: [f64; 3],
    grid_dims: [usize; 3],
    grid_dims_ghostbox: [usize; 3],
    dx: [f64; 3],
    num_gridpts: usize,
    ghost_box: IndexBox,
    fill_box: IndexBox,
    d1_fill_box: IndexBox,
    d2_fill_box: IndexBox,
    d3_fill_box: IndexBox,
}

impl Grid {
    /// Build a grid from a uniform spacing.
    ///
    /// The number of cells along each axis is `ceil((x_hi - x_lo) / dx)`, and
    /// `x_hi` is moved up so the interior length is an exact multiple of `dx`.
    /// The returned grid's `x_hi()` may therefore differ from the request.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported dimension, mismatched slice lengths, empty
    /// bounds, or a non-positive spacing.
    pub fn with_spacing(
        num_dims: usize,
        dx: f64,
        x_lo: &[f64],
        x_hi: &[f64],
        accuracy: SpatialDerivativeAccuracy,
    ) -> Result<Self> {
        check_dimension(num_dims)?;
        let (lo, hi) = bounds_arrays(num_dims, x_lo, x_hi)?;
        if !(dx.is_finite() && dx > 0.0) {
            return Err(LsmError::NonPositiveSpacing { axis: 0, value: dx });
        }

        let mut grid_dims = [1_usize; 3];
        let mut spacing = [0.0; 3];
        let mut widened_hi = [0.0; 3];
        for axis in 0..num_dims {
            let cells = (hi[axis] - lo[axis]) / dx;
            let rounded = cells.round();
            let count = if (cells - rounded).abs() <= CELL_COUNT_TOLERANCE * rounded.max(1.0) {
                rounded
            } else {
                cells.ceil()
            };
            grid_dims[axis] = (count as usize).max(1);
            spacing[axis] = dx;
            widened_hi[axis] = lo[axis] + grid_dims[axis] as f64 * dx;
            if (widened_hi[axis] - hi[axis]).abs() > CELL_COUNT_TOLERANCE * dx {
                debug!(
                    "Grid axis {} upper bound widened from {} to {} to fit spacing {}",
                    axis, hi[axis], widened_hi[axis], dx
                );
            } else {
                widened_hi[axis] = hi[axis];
            }
        }

        Self::build(num_dims, grid_dims, lo, widened_hi, spacing, accuracy)
    }

    /// Build a grid from interior cell counts; spacing is derived exactly as
    /// `(x_hi - x_lo) / grid_dims`.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported dimension, mismatched slice lengths, empty
    /// bounds, or a zero cell count.
    pub fn with_cell_counts(
        num_dims: usize,
        grid_dims: &[usize],
        x_lo: &[f64],
        x_hi: &[f64],
        accuracy: SpatialDerivativeAccuracy,
    ) -> Result<Self> {
        check_dimension(num_dims)?;
        let (lo, hi) = bounds_arrays(num_dims, x_lo, x_hi)?;
        if grid_dims.len() != num_dims {
            return Err(LsmError::InvalidGridParameter {
                name: "grid_dims",
                detail: format!("expected {num_dims} entries, got {}", grid_dims.len()),
            });
        }

        let mut dims = [1_usize; 3];
        let mut spacing = [0.0; 3];
        for axis in 0..num_dims {
            if grid_dims[axis] == 0 {
                return Err(LsmError::InvalidGridParameter {
                    name: "grid_dims",
                    detail: format!("axis {axis} has zero cells"),
                });
            }
            dims[axis] = grid_dims[axis];
            spacing[axis] = (hi[axis] - lo[axis]) / grid_dims[axis] as f64;
            if !(spacing[axis].is_finite() && spacing[axis] > 0.0) {
                return Err(LsmError::NonPositiveSpacing {
                    axis,
                    value: spacing[axis],
                });
            }
        }

        Self::build(num_dims, dims, lo, hi, spacing, accuracy)
    }

    /// Derive ghost-extended geometry and all index ranges.
    fn build(
        num_dims: usize,
        grid_dims: [usize; 3],
        x_lo: [f64; 3],
        x_hi: [f64; 3],
        dx: [f64; 3],
        accuracy: SpatialDerivativeAccuracy,
    ) -> Result<Self> {
        let gw = accuracy.ghost_width();
        let gw_i = gw as i32;
        let num_gridpts = check_cell_counts(num_dims, &grid_dims, gw)?;

        let mut x_lo_ghostbox = [0.0; 3];
        let mut x_hi_ghostbox = [0.0; 3];
        let mut grid_dims_ghostbox = [1_usize; 3];
        let mut ghost_box = IndexBox::new([0; 3], [0; 3]);
        let mut fill_box = ghost_box;
        for axis in 0..num_dims {
            let offset = (gw as f64 - 0.5) * dx[axis];
            x_lo_ghostbox[axis] = x_lo[axis] - offset;
            x_hi_ghostbox[axis] = x_hi[axis] + offset;
            grid_dims_ghostbox[axis] = grid_dims[axis] + 2 * gw;

            ghost_box.hi[axis] = grid_dims_ghostbox[axis] as i32 - 1;
            fill_box.lo[axis] = gw_i;
            fill_box.hi[axis] = gw_i + grid_dims[axis] as i32 - 1;
        }

        // Each differencing stage loses one cell of validity:
        // D1[i] = phi[i] - phi[i-1], D2[i] = D1[i+1] - D1[i], D3[i] = D2[i] - D2[i-1].
        let mut d1_fill_box = ghost_box;
        let mut d2_fill_box = ghost_box;
        let mut d3_fill_box = ghost_box;
        for axis in 0..num_dims {
            d1_fill_box.lo[axis] += 1;
            d2_fill_box.lo[axis] += 1;
            d2_fill_box.hi[axis] -= 1;
            d3_fill_box.lo[axis] += 2;
            d3_fill_box.hi[axis] -= 1;
        }

        Ok(Self {
            num_dims,
            accuracy,
            x_lo,
            x_hi,
            x_lo_ghostbox,
            x_hi_ghostbox,
            grid_dims,
            grid_dims_ghostbox,
            dx,
            num_gridpts,
            ghost_box,
            fill_box,
            d1_fill_box,
            d2_fill_box,
            d3_fill_box,
        })
    }

    /// Check that every field is consistent with the grid's defining
    /// parameters. Used after deserialization to reject corrupt records.
    ///
    /// # Errors
    ///
    /// Returns [`LsmError::MalformedGridFile`] describing the first
    /// inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let malformed = |detail: String| Err(LsmError::MalformedGridFile { detail });

        if !(2..=3).contains(&self.num_dims) {
            return malformed(format!("num_dims = {}", self.num_dims));
        }
        for axis in 0..3 {
            let active = axis < self.num_dims;
            if active {
                if !(self.dx[axis].is_finite() && self.dx[axis] > 0.0) {
                    return malformed(format!("dx[{axis}] = {}", self.dx[axis]));
                }
                if self.grid_dims[axis] == 0 {
                    return malformed(format!("grid_dims[{axis}] = 0"));
                }
                let length = self.x_hi[axis] - self.x_lo[axis];
                let expected = self.grid_dims[axis] as f64 * self.dx[axis];
                if !length.is_finite() || (length - expected).abs() > 1e-9 * expected {
                    return malformed(format!(
                        "axis {axis}: x_hi - x_lo = {length} but grid_dims * dx = {expected}"
                    ));
                }
            } else {
                let degenerate = self.grid_dims[axis] == 1
                    && [
                        self.dx[axis],
                        self.x_lo[axis],
                        self.x_hi[axis],
                        self.x_lo_ghostbox[axis],
                        self.x_hi_ghostbox[axis],
                    ]
                    .iter()
                    .all(|&v| v == 0.0);
                if !degenerate {
                    return malformed(format!("inactive axis {axis} is not degenerate"));
                }
            }
        }

        let expected = Self::build(
            self.num_dims,
            self.grid_dims,
            self.x_lo,
            self.x_hi,
            self.dx,
            self.accuracy,
        )
        .map_err(|e| LsmError::MalformedGridFile {
            detail: e.to_string(),
        })?;
        let index_fields_match = expected.grid_dims_ghostbox == self.grid_dims_ghostbox
            && expected.num_gridpts == self.num_gridpts
            && expected.ghost_box == self.ghost_box
            && expected.fill_box == self.fill_box
            && expected.d1_fill_box == self.d1_fill_box
            && expected.d2_fill_box == self.d2_fill_box
            && expected.d3_fill_box == self.d3_fill_box;
        if !index_fields_match {
            return malformed("index space does not match grid dimensions and accuracy".into());
        }
        for axis in 0..self.num_dims {
            let tol = 1e-9 * self.dx[axis];
            if (expected.x_lo_ghostbox[axis] - self.x_lo_ghostbox[axis]).abs() > tol
                || (expected.x_hi_ghostbox[axis] - self.x_hi_ghostbox[axis]).abs() > tol
            {
                return malformed(format!("axis {axis}: ghost box bounds inconsistent"));
            }
        }
        if !self.ghost_box.contains_box(&self.fill_box) {
            return malformed("fill box is not inside the ghost box".into());
        }
        Ok(())
    }

    /// Spatial dimension (2 or 3).
    #[must_use]
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// Accuracy level the grid was built for.
    #[must_use]
    pub fn accuracy(&self) -> SpatialDerivativeAccuracy {
        self.accuracy
    }

    /// Ghost cells on each side of the fill box.
    #[must_use]
    pub fn ghost_width(&self) -> usize {
        self.accuracy.ghost_width()
    }

    /// Lower physical corner of the interior.
    #[must_use]
    pub fn x_lo(&self) -> &[f64] {
        &self.x_lo[..self.num_dims]
    }

    /// Upper physical corner of the interior.
    #[must_use]
    pub fn x_hi(&self) -> &[f64] {
        &self.x_hi[..self.num_dims]
    }

    /// Center of the lowest ghost cell along each axis.
    #[must_use]
    pub fn x_lo_ghostbox(&self) -> &[f64] {
        &self.x_lo_ghostbox[..self.num_dims]
    }

    /// Center of the highest ghost cell along each axis.
    #[must_use]
    pub fn x_hi_ghostbox(&self) -> &[f64] {
        &self.x_hi_ghostbox[..self.num_dims]
    }

    /// Interior cell counts.
    #[must_use]
    pub fn grid_dims(&self) -> &[usize] {
        &self.grid_dims[..self.num_dims]
    }

    /// Cell counts including ghost cells.
    #[must_use]
    pub fn grid_dims_ghostbox(&self) -> &[usize] {
        &self.grid_dims_ghostbox[..self.num_dims]
    }

    /// Spacing along each axis.
    #[must_use]
    pub fn dx(&self) -> &[f64] {
        &self.dx[..self.num_dims]
    }

    /// Smallest spacing over the active axes.
    #[must_use]
    pub fn min_dx(&self) -> f64 {
        self.dx().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest spacing over the active axes.
    #[must_use]
    pub fn max_dx(&self) -> f64 {
        self.dx().iter().copied().fold(0.0, f64::max)
    }

    /// Volume (area in 2-D) of one cell.
    #[must_use]
    pub fn cell_volume(&self) -> f64 {
        self.dx().iter().product()
    }

    /// Total number of points in the ghost box.
    #[must_use]
    pub fn num_gridpts(&self) -> usize {
        self.num_gridpts
    }

    /// Index range of every field buffer allocated for this grid.
    #[must_use]
    pub fn ghost_box(&self) -> IndexBox {
        self.ghost_box
    }

    /// Interior index range: where kernels write output.
    #[must_use]
    pub fn fill_box(&self) -> IndexBox {
        self.fill_box
    }

    /// Valid range of the `order`-th undivided difference scratch buffer, or
    /// `None` for orders other than 1, 2 and 3.
    #[must_use]
    pub fn undivided_difference_fill_box(&self, order: usize) -> Option<IndexBox> {
        match order {
            1 => Some(self.d1_fill_box),
            2 => Some(self.d2_fill_box),
            3 => Some(self.d3_fill_box),
            _ => None,
        }
    }

    /// Physical coordinates of the center of cell `point`.
    #[must_use]
    pub fn cell_center(&self, point: [i32; 3]) -> [f64; 3] {
        let mut x = [0.0; 3];
        for axis in 0..self.num_dims {
            x[axis] = self.x_lo_ghostbox[axis]
                + f64::from(point[axis] - self.ghost_box.lo[axis]) * self.dx[axis];
        }
        x
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.num_dims;
        writeln!(f, "Grid ({}-D, accuracy {}, {})", n, self.accuracy, self.accuracy.scheme())?;
        writeln!(f, "  x_lo:               {:?}", self.x_lo())?;
        writeln!(f, "  x_hi:               {:?}", self.x_hi())?;
        writeln!(f, "  x_lo_ghostbox:      {:?}", self.x_lo_ghostbox())?;
        writeln!(f, "  x_hi_ghostbox:      {:?}", self.x_hi_ghostbox())?;
        writeln!(f, "  grid_dims:          {:?}", self.grid_dims())?;
        writeln!(f, "  grid_dims_ghostbox: {:?}", self.grid_dims_ghostbox())?;
        writeln!(f, "  dx:                 {:?}", self.dx())?;
        writeln!(f, "  num_gridpts:        {}", self.num_gridpts)?;
        writeln!(f, "  ghost box:          {}", self.ghost_box)?;
        writeln!(f, "  fill box:           {}", self.fill_box)?;
        writeln!(f, "  D1 fill box:        {}", self.d1_fill_box)?;
        writeln!(f, "  D2 fill box:        {}", self.d2_fill_box)?;
        write!(f, "  D3 fill box:        {}", self.d3_fill_box)
    }
}

fn check_dimension(num_dims: usize) -> Result<()> {
    if (2..=3).contains(&num_dims) {
        Ok(())
    } else {
        Err(LsmError::UnsupportedDimension { found: num_dims })
    }
}

/// Reject cell counts whose ghost-extended index range does not fit `i32`
/// or whose total point count overflows `usize`. Returns the point count.
fn check_cell_counts(num_dims: usize, grid_dims: &[usize; 3], ghost_width: usize) -> Result<usize> {
    let max_extent = i32::MAX as usize;
    let mut total: usize = 1;
    for (axis, &cells) in grid_dims.iter().enumerate() {
        let padding = if axis < num_dims { 2 * ghost_width } else { 0 };
        let extent = cells
            .checked_add(padding)
            .filter(|&n| n <= max_extent)
            .ok_or_else(|| LsmError::InvalidGridParameter {
                name: "grid_dims",
                detail: format!("axis {axis}: {cells} cells exceed the index range"),
            })?;
        total = total
            .checked_mul(extent)
            .ok_or_else(|| LsmError::InvalidGridParameter {
                name: "grid_dims",
                detail: format!("{grid_dims:?} cells overflow the point count"),
            })?;
    }
    Ok(total)
}

fn bounds_arrays(num_dims: usize, x_lo: &[f64], x_hi: &[f64]) -> Result<([f64; 3], [f64; 3])> {
    for (name, v) in [("x_lo", x_lo), ("x_hi", x_hi)] {
        if v.len() != num_dims {
            return Err(LsmError::InvalidGridParameter {
                name,
                detail: format!("expected {num_dims} entries, got {}", v.len()),
            });
        }
    }
    let mut lo = [0.0; 3];
    let mut hi = [0.0; 3];
    for axis in 0..num_dims {
        if !(x_lo[axis].is_finite() && x_hi[axis].is_finite() && x_hi[axis] > x_lo[axis]) {
            return Err(LsmError::InvalidGridParameter {
                name: "x_hi",
                detail: format!(
                    "axis {axis}: need finite x_lo < x_hi, got [{}, {}]",
                    x_lo[axis], x_hi[axis]
                ),
            });
        }
        lo[axis] = x_lo[axis];
        hi[axis] = x_hi[axis];
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_counts_give_exact_spacing() {
        let grid = Grid::with_cell_counts(
            2,
            &[50, 25],
            &[-1.0, 0.0],
            &[1.0, 0.5],
            SpatialDerivativeAccuracy::Medium,
        )
        .unwrap();
        assert_eq!(grid.dx(), &[0.04, 0.02]);
        assert_eq!(grid.grid_dims_ghostbox(), &[54, 29]);
        assert_eq!(grid.num_gridpts(), 54 * 29);
        assert_eq!(grid.fill_box(), IndexBox::new_2d(2, 51, 2, 26));
        assert_eq!(grid.ghost_box(), IndexBox::new_2d(0, 53, 0, 28));
    }

    #[test]
    fn test_ghost_extent_matches_spacing() {
        for accuracy in SpatialDerivativeAccuracy::ALL {
            let grid =
                Grid::with_spacing(3, 0.1, &[0.0, -1.0, 2.0], &[1.0, 1.0, 2.35], accuracy).unwrap();
            for axis in 0..3 {
                let extent = grid.x_hi_ghostbox()[axis] - grid.x_lo_ghostbox()[axis];
                let expected = grid.dx()[axis] * (grid.grid_dims_ghostbox()[axis] - 1) as f64;
                assert_relative_eq!(extent, expected, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_with_spacing_widens_upper_bound() {
        let grid = Grid::with_spacing(2, 0.3, &[0.0, 0.0], &[1.0, 0.9], SpatialDerivativeAccuracy::Low)
            .unwrap();
        // 1.0 / 0.3 is not an integer: 4 cells, x_hi moves to 1.2
        assert_eq!(grid.grid_dims(), &[4, 3]);
        assert_relative_eq!(grid.x_hi()[0], 1.2, max_relative = 1e-12);
        // 0.9 / 0.3 is an integer up to rounding: bound kept as given
        assert_eq!(grid.x_hi()[1], 0.9);
    }

    #[test]
    fn test_ghost_width_follows_accuracy() {
        for (accuracy, gw) in [
            (SpatialDerivativeAccuracy::Low, 1),
            (SpatialDerivativeAccuracy::Medium, 2),
            (SpatialDerivativeAccuracy::High, 3),
            (SpatialDerivativeAccuracy::VeryHigh, 3),
        ] {
            let grid = Grid::with_cell_counts(2, &[10, 10], &[0.0, 0.0], &[1.0, 1.0], accuracy)
                .unwrap();
            assert_eq!(grid.ghost_width(), gw);
            assert_eq!(grid.fill_box().lo, [gw as i32, gw as i32, 0]);
            assert!(grid.ghost_box().contains_box(&grid.fill_box()));
        }
    }

    #[test]
    fn test_difference_boxes_erode() {
        let grid = Grid::with_cell_counts(
            2,
            &[8, 8],
            &[0.0, 0.0],
            &[1.0, 1.0],
            SpatialDerivativeAccuracy::High,
        )
        .unwrap();
        let d1 = grid.undivided_difference_fill_box(1).unwrap();
        let d2 = grid.undivided_difference_fill_box(2).unwrap();
        let d3 = grid.undivided_difference_fill_box(3).unwrap();
        assert_eq!(grid.undivided_difference_fill_box(0), None);
        assert_eq!(grid.undivided_difference_fill_box(4), None);
        assert_eq!(d1, IndexBox::new_2d(1, 13, 1, 13));
        assert_eq!(d2, IndexBox::new_2d(1, 12, 1, 12));
        assert_eq!(d3, IndexBox::new_2d(2, 12, 2, 12));
        assert!(grid.ghost_box().contains_box(&d1));
        assert!(d1.contains_box(&d2));
        assert!(d2.contains_box(&d3));
        assert!(d3.contains_box(&grid.fill_box()));
    }

    #[test]
    fn test_cell_centers() {
        let grid = Grid::with_cell_counts(
            2,
            &[10, 4],
            &[0.0, -2.0],
            &[1.0, 2.0],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap();
        let first = grid.cell_center([1, 1, 0]);
        assert_relative_eq!(first[0], 0.05, max_relative = 1e-12);
        assert_relative_eq!(first[1], -1.5, max_relative = 1e-12);
        let ghost = grid.cell_center([0, 0, 0]);
        assert_relative_eq!(ghost[0], -0.05, max_relative = 1e-12);
        assert_eq!(ghost[2], 0.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let acc = SpatialDerivativeAccuracy::Low;
        assert!(matches!(
            Grid::with_spacing(4, 0.1, &[0.0; 4], &[1.0; 4], acc),
            Err(LsmError::UnsupportedDimension { found: 4 })
        ));
        assert!(matches!(
            Grid::with_spacing(2, 0.0, &[0.0, 0.0], &[1.0, 1.0], acc),
            Err(LsmError::NonPositiveSpacing { .. })
        ));
        assert!(matches!(
            Grid::with_spacing(2, 0.1, &[0.0, 0.0], &[1.0], acc),
            Err(LsmError::InvalidGridParameter { name: "x_hi", .. })
        ));
        assert!(matches!(
            Grid::with_cell_counts(2, &[10, 0], &[0.0, 0.0], &[1.0, 1.0], acc),
            Err(LsmError::InvalidGridParameter { name: "grid_dims", .. })
        ));
        assert!(matches!(
            Grid::with_cell_counts(2, &[10, 10], &[0.0, 1.0], &[1.0, 1.0], acc),
            Err(LsmError::InvalidGridParameter { .. })
        ));
    }

    #[test]
    fn test_rejects_counts_outside_index_range() {
        let acc = SpatialDerivativeAccuracy::Medium;
        // ghost cells push the extent past i32::MAX
        assert!(matches!(
            Grid::with_cell_counts(2, &[i32::MAX as usize - 1, 4], &[0.0, 0.0], &[1.0, 1.0], acc),
            Err(LsmError::InvalidGridParameter { name: "grid_dims", .. })
        ));
        assert!(matches!(
            Grid::with_cell_counts(2, &[1 << 62, 4], &[0.0, 0.0], &[1.0, 1.0], acc),
            Err(LsmError::InvalidGridParameter { name: "grid_dims", .. })
        ));
        // each axis fits, the point count does not
        let n = 1 << 30;
        assert!(matches!(
            Grid::with_cell_counts(3, &[n, n, n], &[0.0; 3], &[1.0; 3], acc),
            Err(LsmError::InvalidGridParameter { name: "grid_dims", .. })
        ));
        assert!(matches!(
            Grid::with_spacing(2, 1e-300, &[0.0, 0.0], &[1.0, 1.0], acc),
            Err(LsmError::InvalidGridParameter { name: "grid_dims", .. })
        ));
    }

    #[test]
    fn test_clone_is_independent_and_valid() {
        let grid = Grid::with_spacing(
            3,
            0.25,
            &[0.0, 0.0, 0.0],
            &[1.0, 2.0, 0.5],
            SpatialDerivativeAccuracy::VeryHigh,
        )
        .unwrap();
        let copy = grid.clone();
        assert_eq!(copy, grid);
        assert!(copy.validate().is_ok());
        assert!(grid.to_string().contains("WENO5"));
    }
}
