// SPDX: CC0-1.0

pub mod analysis;
pub mod config;
pub mod equation;
pub mod error;
pub mod eval;
pub mod evaluator;
pub mod extrema;
pub mod gesture;
pub mod gnuplot;
pub mod graph;
pub mod hit;
pub mod intersect;
pub mod lex;
pub mod parse;
pub mod sample;
pub mod scene;
pub mod shell;
pub mod stdlib;
pub mod ticks;
pub mod viewport;
pub mod worker;

use core::fmt;

pub type Number = f64;

/// A coordinate pair. Data space unless documented as screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point<T = Number> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: fmt::Display> fmt::Display for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
