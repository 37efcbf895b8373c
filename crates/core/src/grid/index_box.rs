//! Inclusive index-space boxes.
//!
//! Axis order is fixed: index 0 is x, 1 is y, 2 is z. Two-dimensional boxes
//! keep `lo[2] == hi[2] == 0`, so every box is addressed with three indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of cell indices `[lo, hi]` along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexBox {
    /// Lower corner (inclusive)
    pub lo: [i32; 3],
    /// Upper corner (inclusive)
    pub hi: [i32; 3],
}

impl IndexBox {
    /// Create a box from inclusive corners.
    #[must_use]
    pub const fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Two-dimensional box over `[ilo, ihi] x [jlo, jhi]`.
    #[must_use]
    pub const fn new_2d(ilo: i32, ihi: i32, jlo: i32, jhi: i32) -> Self {
        Self {
            lo: [ilo, jlo, 0],
            hi: [ihi, jhi, 0],
        }
    }

    /// True if the box holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|a| self.hi[a] < self.lo[a])
    }

    /// Number of points along `axis`.
    #[must_use]
    pub fn extent(&self, axis: usize) -> usize {
        if self.hi[axis] < self.lo[axis] {
            0
        } else {
            (self.hi[axis] - self.lo[axis] + 1) as usize
        }
    }

    /// Total number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.extent(0) * self.extent(1) * self.extent(2)
    }

    /// True if `point` lies inside the box.
    #[must_use]
    pub fn contains(&self, point: [i32; 3]) -> bool {
        (0..3).all(|a| self.lo[a] <= point[a] && point[a] <= self.hi[a])
    }

    /// True if every point of `other` lies inside `self`. Empty boxes are
    /// contained in everything.
    #[must_use]
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty() || (0..3).all(|a| self.lo[a] <= other.lo[a] && other.hi[a] <= self.hi[a])
    }

    /// Box grown by `width` cells on both sides of `axis` (negative erodes).
    #[must_use]
    pub fn grow_axis(&self, axis: usize, width: i32) -> Self {
        let mut grown = *self;
        grown.lo[axis] -= width;
        grown.hi[axis] += width;
        grown
    }

    /// Box grown by `width` cells along each of the first `num_dims` axes.
    #[must_use]
    pub fn grow(&self, num_dims: usize, width: i32) -> Self {
        (0..num_dims).fold(*self, |b, axis| b.grow_axis(axis, width))
    }

    /// Intersection of two boxes (possibly empty).
    #[must_use]
    pub fn intersect(&self, other: &IndexBox) -> Self {
        let mut out = *self;
        for a in 0..3 {
            out.lo[a] = self.lo[a].max(other.lo[a]);
            out.hi[a] = self.hi[a].min(other.hi[a]);
        }
        out
    }

    /// Flat-storage strides `[1, n0, n0 * n1]` for a buffer laid out over this box.
    #[must_use]
    pub fn strides(&self) -> [usize; 3] {
        let n0 = self.extent(0);
        [1, n0, n0 * self.extent(1)]
    }

    /// Position of `point` in a buffer laid out over this box:
    /// `(i - lo0) + n0 * ((j - lo1) + n1 * (k - lo2))`.
    ///
    /// The point is assumed to be inside the box.
    #[must_use]
    pub fn linear_index(&self, point: [i32; 3]) -> usize {
        let s = self.strides();
        (0..3)
            .map(|a| (point[a] - self.lo[a]) as usize * s[a])
            .sum()
    }

    /// Iterate over all points, x fastest.
    pub fn points(&self) -> BoxPoints {
        BoxPoints {
            bx: *self,
            next: if self.is_empty() { None } else { Some(self.lo) },
        }
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({}, {}, {}) .. ({}, {}, {})]",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )
    }
}

/// Iterator over the points of an [`IndexBox`] in storage order.
#[derive(Debug, Clone)]
pub struct BoxPoints {
    bx: IndexBox,
    next: Option<[i32; 3]>,
}

impl Iterator for BoxPoints {
    type Item = [i32; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut p = current;
        p[0] += 1;
        if p[0] > self.bx.hi[0] {
            p[0] = self.bx.lo[0];
            p[1] += 1;
            if p[1] > self.bx.hi[1] {
                p[1] = self.bx.lo[1];
                p[2] += 1;
            }
        }
        self.next = if p[2] > self.bx.hi[2] { None } else { Some(p) };
        Some(current)
    }
}
