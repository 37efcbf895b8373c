//! Field buffers over a grid's ghost box
//!
//! Kernels never own field memory. They operate on [`FieldView`] and
//! [`FieldViewMut`], which borrow a flat `f64` slice and pair it with the
//! [`IndexBox`] it is laid out over. Storage order is fixed: x varies fastest,
//! so the value at `(i, j, k)` lives at
//!
//! `(i - lo0) + n0 * ((j - lo1) + n1 * (k - lo2))`
//!
//! where `lo` and `n` are the lower corner and extents of the buffer's ghost
//! box. A caller holding data in a transposed layout must permute it before
//! building a view.
//!
//! [`Field`] is an owned buffer for callers that do not manage their own
//! memory (tests, demos and the stepping loop).

use crate::error::{LsmError, Result};
use crate::grid::{Grid, IndexBox};

/// Read-only view of a field buffer.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    name: &'static str,
    data: &'a [f64],
    ghost_box: IndexBox,
}

impl<'a> FieldView<'a> {
    /// Wrap `data` laid out over `ghost_box`. `name` identifies the buffer in
    /// error reports.
    ///
    /// # Errors
    ///
    /// [`LsmError::ExtentMismatch`] if the slice length differs from the
    /// number of points in the box.
    pub fn new(name: &'static str, data: &'a [f64], ghost_box: IndexBox) -> Result<Self> {
        check_extent(name, data.len(), &ghost_box)?;
        Ok(Self {
            name,
            data,
            ghost_box,
        })
    }

    /// Buffer role used in error reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Index range the buffer covers.
    #[must_use]
    pub fn ghost_box(&self) -> IndexBox {
        self.ghost_box
    }

    /// Underlying flat storage.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Value at `point`.
    ///
    /// # Panics
    ///
    /// Panics if `point` lies outside the buffer.
    #[must_use]
    pub fn get(&self, point: [i32; 3]) -> f64 {
        self.data[self.ghost_box.linear_index(point)]
    }

    /// Fail unless every point of `required` lies in the buffer.
    pub fn require(&self, required: &IndexBox) -> Result<()> {
        require_box(self.name, &self.ghost_box, required)
    }
}

/// Mutable view of a field buffer.
#[derive(Debug)]
pub struct FieldViewMut<'a> {
    name: &'static str,
    data: &'a mut [f64],
    ghost_box: IndexBox,
}

impl<'a> FieldViewMut<'a> {
    /// Wrap `data` laid out over `ghost_box`.
    ///
    /// # Errors
    ///
    /// [`LsmError::ExtentMismatch`] if the slice length differs from the
    /// number of points in the box.
    pub fn new(name: &'static str, data: &'a mut [f64], ghost_box: IndexBox) -> Result<Self> {
        check_extent(name, data.len(), &ghost_box)?;
        Ok(Self {
            name,
            data,
            ghost_box,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn ghost_box(&self) -> IndexBox {
        self.ghost_box
    }

    /// Reborrow as a read-only view.
    #[must_use]
    pub fn as_view(&self) -> FieldView<'_> {
        FieldView {
            name: self.name,
            data: &*self.data,
            ghost_box: self.ghost_box,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut *self.data
    }

    #[must_use]
    pub fn get(&self, point: [i32; 3]) -> f64 {
        self.data[self.ghost_box.linear_index(point)]
    }

    /// Store `value` at `point`.
    ///
    /// # Panics
    ///
    /// Panics if `point` lies outside the buffer.
    pub fn set(&mut self, point: [i32; 3], value: f64) {
        let idx = self.ghost_box.linear_index(point);
        self.data[idx] = value;
    }

    pub fn require(&self, required: &IndexBox) -> Result<()> {
        require_box(self.name, &self.ghost_box, required)
    }
}

/// Owned field buffer covering a grid's ghost box.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    data: Vec<f64>,
    ghost_box: IndexBox,
}

impl Field {
    /// Zero-initialized field over the grid's ghost box.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self::filled(grid, 0.0)
    }

    /// Field over the grid's ghost box with every value set to `value`.
    #[must_use]
    pub fn filled(grid: &Grid, value: f64) -> Self {
        Self {
            data: vec![value; grid.num_gridpts()],
            ghost_box: grid.ghost_box(),
        }
    }

    /// Sample `f` at the center of every ghost-box cell. `f` receives the
    /// active coordinates (`[x, y]` or `[x, y, z]`).
    pub fn from_fn<F>(grid: &Grid, f: F) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = grid.num_dims();
        let data = grid
            .ghost_box()
            .points()
            .map(|p| f(&grid.cell_center(p)[..n]))
            .collect();
        Self {
            data,
            ghost_box: grid.ghost_box(),
        }
    }

    /// Take ownership of `data` laid out over `ghost_box`.
    ///
    /// # Errors
    ///
    /// [`LsmError::ExtentMismatch`] on a length mismatch.
    pub fn from_vec(data: Vec<f64>, ghost_box: IndexBox) -> Result<Self> {
        check_extent("field", data.len(), &ghost_box)?;
        Ok(Self { data, ghost_box })
    }

    #[must_use]
    pub fn ghost_box(&self) -> IndexBox {
        self.ghost_box
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[must_use]
    pub fn get(&self, point: [i32; 3]) -> f64 {
        self.data[self.ghost_box.linear_index(point)]
    }

    pub fn set(&mut self, point: [i32; 3], value: f64) {
        let idx = self.ghost_box.linear_index(point);
        self.data[idx] = value;
    }

    /// Set every value, ghosts included.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Read-only view tagged with `name`.
    #[must_use]
    pub fn view(&self, name: &'static str) -> FieldView<'_> {
        FieldView {
            name,
            data: &self.data,
            ghost_box: self.ghost_box,
        }
    }

    /// Mutable view tagged with `name`.
    pub fn view_mut(&mut self, name: &'static str) -> FieldViewMut<'_> {
        FieldViewMut {
            name,
            data: &mut self.data,
            ghost_box: self.ghost_box,
        }
    }
}

fn check_extent(name: &'static str, len: usize, ghost_box: &IndexBox) -> Result<()> {
    let expected = ghost_box.num_points();
    if len == expected {
        Ok(())
    } else {
        Err(LsmError::ExtentMismatch {
            buffer: name,
            expected,
            found: len,
        })
    }
}

fn require_box(name: &'static str, available: &IndexBox, required: &IndexBox) -> Result<()> {
    if available.contains_box(required) {
        Ok(())
    } else {
        Err(LsmError::BoxNotContained {
            buffer: name,
            required: *required,
            available: *available,
        })
    }
}

/// Fail unless a per-axis buffer set has exactly `expected` components.
pub(crate) fn check_components(name: &'static str, found: usize, expected: usize) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(LsmError::ComponentCount {
            buffer: name,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SpatialDerivativeAccuracy;

    fn grid() -> Grid {
        Grid::with_cell_counts(
            2,
            &[4, 3],
            &[0.0, 0.0],
            &[4.0, 3.0],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap()
    }

    #[test]
    fn test_view_rejects_wrong_length() {
        let data = vec![0.0; 10];
        let err = FieldView::new("phi", &data, IndexBox::new_2d(0, 3, 0, 3)).unwrap_err();
        assert!(matches!(
            err,
            LsmError::ExtentMismatch {
                buffer: "phi",
                expected: 16,
                found: 10
            }
        ));
    }

    #[test]
    fn test_x_varies_fastest() {
        let g = grid();
        let field = Field::from_fn(&g, |x| x[0] + 100.0 * x[1]);
        let s = field.as_slice();
        // ghost box is 6 x 5; neighbours in x are adjacent in memory
        assert!((s[1] - s[0] - 1.0).abs() < 1e-12);
        assert!((s[6] - s[0] - 100.0).abs() < 1e-12);
        assert!((field.get([2, 1, 0]) - (1.5 + 50.0)).abs() < 1e-12);
    }

    #[test]
    fn test_view_mut_round_trip() {
        let g = grid();
        let mut field = Field::new(&g);
        {
            let mut v = field.view_mut("rhs");
            v.set([3, 2, 0], 7.5);
            assert_eq!(v.as_view().get([3, 2, 0]), 7.5);
        }
        assert_eq!(field.get([3, 2, 0]), 7.5);
        assert_eq!(field.as_slice().iter().filter(|&&x| x != 0.0).count(), 1);
    }

    #[test]
    fn test_from_vec_wraps_caller_data() {
        let g = grid();
        let data: Vec<f64> = (0..g.num_gridpts()).map(|i| i as f64).collect();
        let field = Field::from_vec(data.clone(), g.ghost_box()).unwrap();
        // ghost box is 6 x 5, index space starts at 0
        assert_eq!(field.get([1, 2, 0]), 13.0);
        assert_eq!(field.into_vec(), data);

        assert!(matches!(
            Field::from_vec(vec![0.0; 29], g.ghost_box()),
            Err(LsmError::ExtentMismatch {
                buffer: "field",
                expected: 30,
                found: 29
            })
        ));
    }

    #[test]
    fn test_require_reports_box() {
        let g = grid();
        let field = Field::new(&g);
        let view = field.view("phi");
        assert!(view.require(&g.fill_box().grow(2, 1)).is_ok());
        assert!(matches!(
            view.require(&g.fill_box().grow(2, 2)),
            Err(LsmError::BoxNotContained { buffer: "phi", .. })
        ));
    }
}
