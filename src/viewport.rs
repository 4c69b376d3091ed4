// SPDX: CC0-1.0

//! Mapping between data space and screen space.
//!
//! Screen rows grow downward while data `y` grows upward, so the `y` mapping
//! is inverted. Nothing here is cached across a bounds change: a [`Viewport`]
//! is cheap to rebuild and every [`ScreenPoint`] is derived from one.

use crate::{
    error::{Axis, GeometryError},
    Number, Point,
};
use serde::Deserialize;

/// A non-empty, finite interval along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    min: Number,
    max: Number,
}

impl Domain {
    pub fn new(min: Number, max: Number) -> Result<Self, GeometryError> {
        Self::on_axis(Axis::X, min, max)
    }

    fn on_axis(axis: Axis, min: Number, max: Number) -> Result<Self, GeometryError> {
        if min.is_finite() && max.is_finite() && min < max {
            Ok(Self { min, max })
        } else {
            Err(GeometryError::DegenerateBounds { axis, min, max })
        }
    }

    pub const fn min(&self) -> Number {
        self.min
    }

    pub const fn max(&self) -> Number {
        self.max
    }

    pub fn span(&self) -> Number {
        self.max - self.min
    }

    /// `n + 1` evenly spaced positions from `min` to `max` inclusive.
    ///
    /// Positions are computed from their index so no error accumulates, and
    /// the last one is exactly `max`.
    pub fn grid(&self, n: usize) -> impl Iterator<Item = Number> + '_ {
        (0..=n).map(move |i| self.position(i, n))
    }

    /// Position `i` of the `n`-interval grid, see [`Domain::grid`].
    pub fn position(&self, i: usize, n: usize) -> Number {
        if i >= n {
            self.max
        } else {
            self.min + self.span() / n as Number * i as Number
        }
    }
}

/// The visible region of data space.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct GraphBounds {
    pub x_min: Number,
    pub x_max: Number,
    pub y_min: Number,
    pub y_max: Number,
}

impl Default for GraphBounds {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
        }
    }
}

impl GraphBounds {
    pub fn new(
        x_min: Number,
        x_max: Number,
        y_min: Number,
        y_max: Number,
    ) -> Result<Self, GeometryError> {
        let bounds = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        self.x_domain()?;
        self.y_domain()?;
        Ok(())
    }

    pub fn x_domain(&self) -> Result<Domain, GeometryError> {
        Domain::on_axis(Axis::X, self.x_min, self.x_max)
    }

    pub fn y_domain(&self) -> Result<Domain, GeometryError> {
        Domain::on_axis(Axis::Y, self.y_min, self.y_max)
    }

    pub fn x_range(&self) -> Number {
        self.x_max - self.x_min
    }

    pub fn y_range(&self) -> Number {
        self.y_max - self.y_min
    }

    pub fn translate(&self, dx: Number, dy: Number) -> Self {
        Self {
            x_min: self.x_min + dx,
            x_max: self.x_max + dx,
            y_min: self.y_min + dy,
            y_max: self.y_max + dy,
        }
    }
}

/// A data point together with where it currently lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub data: Point,
    pub sx: Number,
    pub sy: Number,
}

impl ScreenPoint {
    pub fn distance_sq(&self, sx: Number, sy: Number) -> Number {
        let dx = self.sx - sx;
        let dy = self.sy - sy;
        dx * dx + dy * dy
    }
}

/// Validated bounds plus the pixel size of the surface they are drawn on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    bounds: GraphBounds,
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(bounds: GraphBounds, width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyCanvas { width, height });
        }
        bounds.validate()?;
        Ok(Self {
            bounds,
            width,
            height,
        })
    }

    pub const fn bounds(&self) -> &GraphBounds {
        &self.bounds
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Same canvas, different bounds.
    pub fn with_bounds(&self, bounds: GraphBounds) -> Result<Self, GeometryError> {
        Self::new(bounds, self.width, self.height)
    }

    pub fn to_screen_x(&self, x: Number) -> Number {
        (x - self.bounds.x_min) / self.bounds.x_range() * Number::from(self.width)
    }

    pub fn to_screen_y(&self, y: Number) -> Number {
        let h = Number::from(self.height);
        h - (y - self.bounds.y_min) / self.bounds.y_range() * h
    }

    pub fn to_data_x(&self, sx: Number) -> Number {
        self.bounds.x_min + sx / Number::from(self.width) * self.bounds.x_range()
    }

    pub fn to_data_y(&self, sy: Number) -> Number {
        self.bounds.y_max - sy / Number::from(self.height) * self.bounds.y_range()
    }

    pub fn project(&self, data: Point) -> ScreenPoint {
        ScreenPoint {
            data,
            sx: self.to_screen_x(data.x),
            sy: self.to_screen_y(data.y),
        }
    }

    pub fn unproject(&self, sx: Number, sy: Number) -> Point {
        Point::new(self.to_data_x(sx), self.to_data_y(sy))
    }

    /// Data units covered by one horizontal pixel.
    pub fn x_per_pixel(&self) -> Number {
        self.bounds.x_range() / Number::from(self.width)
    }

    /// Data units covered by one vertical pixel.
    pub fn y_per_pixel(&self) -> Number {
        self.bounds.y_range() / Number::from(self.height)
    }
}
