//! Level Set Method Core Library
//!
//! Grid-local kernels for evolving an implicitly represented interface
//! `{x : φ(x) = 0}` on uniform Cartesian patches in 2-D and 3-D.
//!
//! ## Overview
//!
//! - **Grid**: cell-centered geometry with a ghost layer sized by the spatial
//!   scheme, plus text and binary persistence
//! - **Spatial derivatives**: ENO1-3 and WENO5 one-sided derivatives, central
//!   and upwind gradient selection
//! - **Time integration**: TVD Runge-Kutta of order 1-3
//! - **Boundary conditions**: linear and sign-preserving linear extrapolation
//! - **Reinitialization** to a signed distance function
//! - **CFL** time step estimates and smoothed **volume/surface integrals**,
//!   optionally restricted to a control volume
//! - **Simulation**: a stepping loop driven by a problem-defining
//!   [`LevelSetModule`]
//!
//! Kernels take caller-owned flat buffers through [`FieldView`] /
//! [`FieldViewMut`], validate their contract before writing, and report
//! failures through [`LsmError`].

// Errors and configuration
pub mod error;
pub mod options;

// Geometry and storage
pub mod field;
pub mod grid;

// Numerical kernels
pub mod solver;

// Time stepping
pub mod simulation;

// Re-export core types
pub use error::{LsmError, Result};
pub use field::{Field, FieldView, FieldViewMut};
pub use grid::{Grid, IndexBox, SpatialDerivativeAccuracy, SpatialDerivativeScheme};
pub use options::{Options, ReinitializationParams, RungeKuttaOrder};

// Re-export simulation types
pub use simulation::{
    ExpandingSphere, LevelSetModule, LevelSetSimulation, TranslatingSphere, VelocityField,
};
