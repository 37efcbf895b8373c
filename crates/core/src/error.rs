//! Error types for grid construction, kernel contracts and grid persistence.
//!
//! Every variant is fatal to the call that produced it: kernels validate their
//! inputs before writing anything, so an `Err` never comes with a partially
//! written output buffer.

use std::fmt;
use std::io;

use crate::grid::IndexBox;

/// Errors reported by grid construction, the numerical kernels and grid I/O.
#[derive(Debug)]
pub enum LsmError {
    /// Only 2-D and 3-D grids are supported.
    UnsupportedDimension {
        /// The requested number of dimensions.
        found: usize,
    },
    /// A grid construction parameter is out of range.
    InvalidGridParameter {
        /// Parameter name (e.g. `"x_hi"`, `"grid_dims"`).
        name: &'static str,
        /// Description of the violated constraint.
        detail: String,
    },
    /// Grid spacing along an axis is zero, negative or not finite.
    NonPositiveSpacing {
        /// Axis index (0 = x).
        axis: usize,
        /// The offending spacing.
        value: f64,
    },
    /// A buffer's length does not match the number of points in its ghost box.
    ExtentMismatch {
        /// Role of the buffer (e.g. `"phi"`, `"rhs"`).
        buffer: &'static str,
        /// Points in the declared ghost box.
        expected: usize,
        /// Actual slice length.
        found: usize,
    },
    /// A kernel needs values over `required`, but the buffer only covers `available`.
    ///
    /// This is how an insufficient ghost width surfaces: the fill box grown by
    /// the stencil reach of the active scheme does not fit in the ghost box.
    BoxNotContained {
        /// Role of the buffer.
        buffer: &'static str,
        /// Index range the kernel must read or write.
        required: IndexBox,
        /// Ghost box of the buffer.
        available: IndexBox,
    },
    /// A kernel was handed the wrong number of per-axis buffers.
    ComponentCount {
        /// Role of the buffer set (e.g. `"phi_plus"`, `"velocity"`).
        buffer: &'static str,
        /// Number of components the kernel needs.
        expected: usize,
        /// Number of components received.
        found: usize,
    },
    /// Scratch memory for undivided differences could not be reserved.
    ScratchAllocation {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
    /// A persisted grid file was not produced by the matching writer or is corrupt.
    MalformedGridFile {
        /// What was wrong with the file.
        detail: String,
    },
    /// An option value is out of range.
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// Description of the violated constraint.
        detail: String,
    },
    /// An I/O error occurred while reading or writing a grid or options file.
    Io(io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LsmError>;

impl fmt::Display for LsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDimension { found } => {
                write!(f, "unsupported dimension {found} (expected 2 or 3)")
            }
            Self::InvalidGridParameter { name, detail } => {
                write!(f, "invalid grid parameter {name}: {detail}")
            }
            Self::NonPositiveSpacing { axis, value } => {
                write!(f, "grid spacing along axis {axis} must be positive, got {value}")
            }
            Self::ExtentMismatch {
                buffer,
                expected,
                found,
            } => write!(
                f,
                "buffer '{buffer}' has {found} values but its ghost box holds {expected}"
            ),
            Self::BoxNotContained {
                buffer,
                required,
                available,
            } => write!(
                f,
                "buffer '{buffer}' covers {available} but {required} is required"
            ),
            Self::ComponentCount {
                buffer,
                expected,
                found,
            } => write!(
                f,
                "'{buffer}' needs {expected} components, got {found}"
            ),
            Self::ScratchAllocation { bytes } => {
                write!(f, "unable to allocate {bytes} bytes of scratch memory")
            }
            Self::MalformedGridFile { detail } => write!(f, "malformed grid file: {detail}"),
            Self::InvalidOption { name, detail } => write!(f, "invalid option {name}: {detail}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for LsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LsmError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LsmError::UnsupportedDimension { found: 4 };
        assert_eq!(err.to_string(), "unsupported dimension 4 (expected 2 or 3)");

        let err = LsmError::ExtentMismatch {
            buffer: "phi",
            expected: 100,
            found: 99,
        };
        assert!(err.to_string().contains("'phi'"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err: LsmError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(err.source().is_some());
        assert!(LsmError::ScratchAllocation { bytes: 8 }.source().is_none());
    }
}
