//! Run options for level set computations
//!
//! [`Options`] is the immutable parameter bundle for one run. It can be built
//! in code, or loaded from a JSON file; missing keys fall back to the defaults
//! (WENO5, TVD-RK3, CFL 0.5, no periodic reinitialization, no control volume).
//!
//! ```json
//! { "accuracy": "high", "rk_order": 2, "reinit_interval": 10 }
//! ```

use crate::error::{LsmError, Result};
use crate::grid::{Grid, SpatialDerivativeAccuracy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Order of the TVD Runge-Kutta time integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RungeKuttaOrder {
    /// Forward Euler
    First,
    /// Two-stage SSP
    Second,
    /// Three-stage SSP
    #[default]
    Third,
}

impl RungeKuttaOrder {
    /// Number of right-hand-side evaluations per step.
    #[must_use]
    pub const fn stages(&self) -> usize {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl TryFrom<u8> for RungeKuttaOrder {
    type Error = LsmError;

    fn try_from(order: u8) -> Result<Self> {
        match order {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            _ => Err(LsmError::InvalidOption {
                name: "rk_order",
                detail: format!("expected 1, 2 or 3, got {order}"),
            }),
        }
    }
}

impl From<RungeKuttaOrder> for u8 {
    fn from(order: RungeKuttaOrder) -> Self {
        order.stages() as u8
    }
}

/// Parameter bundle for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Spatial derivative accuracy (also fixes the grid's ghost width)
    pub accuracy: SpatialDerivativeAccuracy,
    /// Fraction of the stability limit used for each time step
    pub cfl_number: f64,
    /// TVD Runge-Kutta order
    pub rk_order: RungeKuttaOrder,
    /// Pseudo-time horizon for reinitialization; `None` means 10 x min spacing
    pub reinit_horizon: Option<f64>,
    /// Reinitialize every this many steps (0 disables)
    pub reinit_interval: usize,
    /// Restrict CFL and integral reductions to the control volume
    pub use_control_volume: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            accuracy: SpatialDerivativeAccuracy::VeryHigh,
            cfl_number: 0.5,
            rk_order: RungeKuttaOrder::Third,
            reinit_horizon: None,
            reinit_interval: 0,
            use_control_volume: false,
        }
    }
}

impl Options {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`LsmError::InvalidOption`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        check_cfl(self.cfl_number)?;
        if let Some(h) = self.reinit_horizon {
            if !(h.is_finite() && h > 0.0) {
                return Err(LsmError::InvalidOption {
                    name: "reinit_horizon",
                    detail: format!("must be positive, got {h}"),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| LsmError::InvalidOption {
            name: "options",
            detail: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reinitialization parameters for `grid` implied by these options.
    #[must_use]
    pub fn reinitialization_params(&self, grid: &Grid) -> ReinitializationParams {
        let mut params = ReinitializationParams::for_grid(grid);
        params.accuracy = self.accuracy;
        params.rk_order = self.rk_order;
        if let Some(h) = self.reinit_horizon {
            params.horizon = h;
        }
        params
    }
}

/// Parameters of the reinitialization pseudo-time march.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReinitializationParams {
    /// Spatial scheme for the gradient
    pub accuracy: SpatialDerivativeAccuracy,
    /// Time integrator order
    pub rk_order: RungeKuttaOrder,
    /// Pseudo-time step is `cfl_number * min spacing`
    pub cfl_number: f64,
    /// Total pseudo-time to march
    pub horizon: f64,
    /// Take the sign from the initial field rather than the current iterate
    pub use_phi0_for_sign: bool,
}

impl ReinitializationParams {
    /// Defaults for `grid`: its accuracy, TVD-RK3, CFL 0.5, horizon of ten
    /// cells, sign frozen from the initial field.
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            accuracy: grid.accuracy(),
            rk_order: RungeKuttaOrder::Third,
            cfl_number: 0.5,
            horizon: 10.0 * grid.min_dx(),
            use_phi0_for_sign: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_cfl(self.cfl_number)?;
        if !(self.horizon.is_finite() && self.horizon >= 0.0) {
            return Err(LsmError::InvalidOption {
                name: "horizon",
                detail: format!("must be non-negative, got {}", self.horizon),
            });
        }
        Ok(())
    }
}

fn check_cfl(cfl: f64) -> Result<()> {
    if cfl.is_finite() && cfl > 0.0 && cfl <= 1.0 {
        Ok(())
    } else {
        Err(LsmError::InvalidOption {
            name: "cfl_number",
            detail: format!("must lie in (0, 1], got {cfl}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.accuracy, SpatialDerivativeAccuracy::VeryHigh);
        assert_eq!(options.rk_order, RungeKuttaOrder::Third);
        assert_eq!(options.cfl_number, 0.5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options =
            Options::from_json_str(r#"{ "accuracy": "high", "rk_order": 2, "reinit_interval": 10 }"#)
                .unwrap();
        assert_eq!(options.accuracy, SpatialDerivativeAccuracy::High);
        assert_eq!(options.rk_order, RungeKuttaOrder::Second);
        assert_eq!(options.reinit_interval, 10);
        assert_eq!(options.cfl_number, 0.5);
        assert!(!options.use_control_volume);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Options::from_json_str(r#"{ "rk_order": 4 }"#).is_err());
        assert!(Options::from_json_str(r#"{ "cfl_number": 0.0 }"#).is_err());
        assert!(Options::from_json_str(r#"{ "cfl_number": 1.5 }"#).is_err());
        assert!(Options::from_json_str(r#"{ "reinit_horizon": -1.0 }"#).is_err());
        assert!(matches!(
            Options::from_json_str(r#"{ "cfl": 0.4 }"#),
            Err(LsmError::InvalidOption { name: "options", .. })
        ));
    }

    #[test]
    fn test_serialized_order_is_numeric() {
        let json = serde_json::to_string(&Options::default()).unwrap();
        assert!(json.contains("\"rk_order\":3"));
        let back = Options::from_json_str(&json).unwrap();
        assert_eq!(back, Options::default());
    }

    #[test]
    fn test_reinit_params_follow_grid() {
        let grid = Grid::with_cell_counts(
            2,
            &[20, 40],
            &[0.0, 0.0],
            &[1.0, 1.0],
            SpatialDerivativeAccuracy::Medium,
        )
        .unwrap();
        let params = ReinitializationParams::for_grid(&grid);
        assert_eq!(params.accuracy, SpatialDerivativeAccuracy::Medium);
        assert!((params.horizon - 0.25).abs() < 1e-12);
        assert!(params.use_phi0_for_sign);

        let options = Options {
            reinit_horizon: Some(0.1),
            rk_order: RungeKuttaOrder::First,
            ..Options::default()
        };
        let params = options.reinitialization_params(&grid);
        assert_eq!(params.horizon, 0.1);
        assert_eq!(params.rk_order, RungeKuttaOrder::First);
        assert_eq!(params.accuracy, SpatialDerivativeAccuracy::VeryHigh);
    }
}
