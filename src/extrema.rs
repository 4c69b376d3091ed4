// SPDX: CC0-1.0

use crate::{error::GeometryError, viewport::Domain, Number, Point};
use core::fmt;

pub const DEFAULT_SAMPLES: usize = 1000;
pub const DEFAULT_REFINE_STEP: Number = 1e-2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtremumKind {
    Max,
    Min,
}

impl fmt::Display for ExtremumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => f.write_str("max"),
            Self::Min => f.write_str("min"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extremum {
    pub x: Number,
    pub y: Number,
    pub kind: ExtremumKind,
}

impl Extremum {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Local extrema by strict comparison with both neighbours on a grid of
/// `sample_count + 1` positions. Undefined samples are dropped first, so
/// neighbours are the nearest defined samples. Plateaus are never reported.
pub fn find_extrema<F>(f: F, domain: Domain, sample_count: usize) -> Result<Vec<Extremum>, GeometryError>
where
    F: Fn(Number) -> Option<Number>,
{
    if sample_count == 0 {
        return Err(GeometryError::ZeroSamples);
    }
    let points: Vec<Point> = domain
        .grid(sample_count)
        .filter_map(|x| f(x).filter(|y| y.is_finite()).map(|y| Point::new(x, y)))
        .collect();

    Ok(points
        .windows(3)
        .filter_map(|w| {
            let [prev, cur, next] = [w[0], w[1], w[2]];
            let kind = if cur.y > prev.y && cur.y > next.y {
                ExtremumKind::Max
            } else if cur.y < prev.y && cur.y < next.y {
                ExtremumKind::Min
            } else {
                return None;
            };
            Some(Extremum {
                x: cur.x,
                y: cur.y,
                kind,
            })
        })
        .collect())
}

/// Move a grid extremum to the vertex of the parabola through
/// `ext.x - h`, `ext.x`, `ext.x + h`.
///
/// Keeps `ext.x` when a neighbour is undefined or the fit is degenerate, and
/// keeps `ext.y` when `f` is undefined at the refined position.
pub fn refine<F>(f: &F, ext: Extremum, h: Number) -> Extremum
where
    F: Fn(Number) -> Option<Number>,
{
    let (x0, x1, x2) = (ext.x - h, ext.x, ext.x + h);
    let y1 = ext.y;
    let x = match (f(x0), f(x2)) {
        (Some(y0), Some(y2)) => {
            let spread = (x0 - x1) * (x0 - x2) * (x1 - x2);
            let den = 2.0 * (y0 * (x1 - x2) + y1 * (x2 - x0) + y2 * (x0 - x1));
            if spread.abs() <= Number::MIN_POSITIVE || den == 0.0 {
                ext.x
            } else {
                let num = y0 * (x1 * x1 - x2 * x2)
                    + y1 * (x2 * x2 - x0 * x0)
                    + y2 * (x0 * x0 - x1 * x1);
                Some(num / den).filter(|v| v.is_finite()).unwrap_or(ext.x)
            }
        }
        _ => ext.x,
    };
    let y = f(x).filter(|y| y.is_finite()).unwrap_or(ext.y);
    Extremum { x, y, kind: ext.kind }
}

/// Grid scan followed by parabolic refinement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtremumScan {
    pub sample_count: usize,
    pub refine_step: Number,
}

impl Default for ExtremumScan {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLES,
            refine_step: DEFAULT_REFINE_STEP,
        }
    }
}

impl ExtremumScan {
    pub fn run<F>(&self, f: F, domain: Domain) -> Result<Vec<Extremum>, GeometryError>
    where
        F: Fn(Number) -> Option<Number>,
    {
        let raw = find_extrema(&f, domain, self.sample_count)?;
        Ok(raw
            .into_iter()
            .map(|ext| refine(&f, ext, self.refine_step))
            .collect())
    }
}
