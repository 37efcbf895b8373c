//! Control-volume masks for reductions over overlapping patches
//!
//! When a physical cell is covered by several patches, only one of them may
//! count it in a global sum or minimum. A control-volume weight field marks
//! which cells a patch owns; reductions include a cell only when
//! `weight * sign > 0`, and sums scale the cell's contribution by `|weight|`.

use crate::error::Result;
use crate::field::FieldView;
use crate::grid::IndexBox;
use serde::{Deserialize, Serialize};

/// Which sign of the weight field selects a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlVolumeSign {
    #[default]
    Positive,
    Negative,
}

impl ControlVolumeSign {
    #[must_use]
    pub const fn value(&self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Weight field plus selector.
#[derive(Debug, Clone, Copy)]
pub struct ControlVolume<'a> {
    pub weights: FieldView<'a>,
    pub sign: ControlVolumeSign,
}

impl<'a> ControlVolume<'a> {
    #[must_use]
    pub fn new(weights: FieldView<'a>, sign: ControlVolumeSign) -> Self {
        Self { weights, sign }
    }

    /// Selects cells with positive weight.
    #[must_use]
    pub fn positive(weights: FieldView<'a>) -> Self {
        Self::new(weights, ControlVolumeSign::Positive)
    }

    pub(crate) fn require(&self, fill_box: &IndexBox) -> Result<()> {
        self.weights.require(fill_box)
    }

    /// `|w|` if the cell at `point` is selected.
    #[inline]
    #[must_use]
    pub fn weight(&self, point: [i32; 3]) -> Option<f64> {
        let w = self.weights.get(point);
        (w * self.sign.value() > 0.0).then_some(w.abs())
    }
}

/// Weight of `point` under an optional control volume (1 without one).
#[inline]
pub(crate) fn cell_weight(control_volume: Option<&ControlVolume<'_>>, point: [i32; 3]) -> Option<f64> {
    match control_volume {
        Some(cv) => cv.weight(point),
        None => Some(1.0),
    }
}
