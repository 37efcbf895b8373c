//! Spatial derivative accuracy levels
//!
//! Each level fixes both the upwind scheme used for one-sided derivatives and
//! the number of ghost cells the grid must carry for that scheme's stencil.
//!
//! | level       | scheme | ghost width |
//! |-------------|--------|-------------|
//! | `Low`       | ENO1   | 1           |
//! | `Medium`    | ENO2   | 2           |
//! | `High`      | ENO3   | 3           |
//! | `VeryHigh`  | WENO5  | 3           |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy level for spatial derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialDerivativeAccuracy {
    /// First-order HJ ENO
    Low,
    /// Second-order HJ ENO
    Medium,
    /// Third-order HJ ENO
    High,
    /// Fifth-order HJ WENO
    #[default]
    VeryHigh,
}

/// Upwind differencing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialDerivativeScheme {
    /// HJ ENO of the given order (1..=3)
    Eno(u8),
    /// Fifth-order HJ WENO
    Weno5,
}

impl SpatialDerivativeAccuracy {
    /// All levels, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Scheme used at this accuracy level.
    #[must_use]
    pub const fn scheme(&self) -> SpatialDerivativeScheme {
        match self {
            Self::Low => SpatialDerivativeScheme::Eno(1),
            Self::Medium => SpatialDerivativeScheme::Eno(2),
            Self::High => SpatialDerivativeScheme::Eno(3),
            Self::VeryHigh => SpatialDerivativeScheme::Weno5,
        }
    }

    /// Ghost cells required on each side of the fill box.
    #[must_use]
    pub const fn ghost_width(&self) -> usize {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High | Self::VeryHigh => 3,
        }
    }

    /// Nominal order of accuracy of the scheme on smooth data.
    #[must_use]
    pub const fn order(&self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 5,
        }
    }
}

impl SpatialDerivativeScheme {
    /// Cells read on each side of a point along the differencing axis.
    #[must_use]
    pub const fn stencil_reach(&self) -> usize {
        match self {
            Self::Eno(k) => *k as usize,
            Self::Weno5 => 3,
        }
    }
}

impl fmt::Display for SpatialDerivativeAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SpatialDerivativeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eno(k) => write!(f, "ENO{k}"),
            Self::Weno5 => f.write_str("WENO5"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_table() {
        let table: Vec<_> = SpatialDerivativeAccuracy::ALL
            .iter()
            .map(|a| (a.scheme(), a.ghost_width()))
            .collect();
        assert_eq!(
            table,
            vec![
                (SpatialDerivativeScheme::Eno(1), 1),
                (SpatialDerivativeScheme::Eno(2), 2),
                (SpatialDerivativeScheme::Eno(3), 3),
                (SpatialDerivativeScheme::Weno5, 3),
            ]
        );
    }

    #[test]
    fn test_stencil_fits_ghost_width() {
        for accuracy in SpatialDerivativeAccuracy::ALL {
            assert_eq!(accuracy.scheme().stencil_reach(), accuracy.ghost_width());
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SpatialDerivativeAccuracy::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
        let parsed: SpatialDerivativeAccuracy = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, SpatialDerivativeAccuracy::Medium);
    }
}
