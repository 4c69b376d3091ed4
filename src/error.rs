// SPDX: CC0-1.0

use crate::Number;
use core::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Geometry that cannot be mapped or scanned without dividing by zero.
///
/// These are rejected at the boundary; callers keep their previous state.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    #[error("{axis} range [{min}, {max}] is empty or not finite")]
    DegenerateBounds {
        axis: Axis,
        min: Number,
        max: Number,
    },

    #[error("canvas of {width}x{height} pixels has no area")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("sample count must be nonzero")]
    ZeroSamples,

    #[error("cannot space ticks over a range of {range} with {target} ticks")]
    InvalidTickRange { range: Number, target: Number },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EquationError {
    #[error("an equation with id '{0}' already exists")]
    DuplicateId(String),

    #[error("no equation with id '{0}'")]
    UnknownId(String),

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}
