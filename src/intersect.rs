// SPDX: CC0-1.0

use crate::{error::GeometryError, viewport::Domain, Number, Point};

pub const DEFAULT_SAMPLES: usize = 200;
pub const DEFAULT_BISECTION_STEPS: usize = 10;

/// Sign-change scan for crossings of two curves.
///
/// Only strict sign changes of `f1 - f2` count, so curves that touch without
/// crossing produce nothing. Samples where the difference is exactly zero are
/// stepped over, however many there are in a row: a crossing that lands on a
/// grid position is still bracketed by its nonzero neighbours. Curves that
/// coincide over an interval produce nothing if they leave it on the side they
/// came from, and one point inside the interval if they leave on the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntersectionScan {
    pub sample_count: usize,
    pub bisection_steps: usize,
}

impl Default for IntersectionScan {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLES,
            bisection_steps: DEFAULT_BISECTION_STEPS,
        }
    }
}

impl IntersectionScan {
    /// Crossings in order of increasing `x`.
    pub fn run<F1, F2>(&self, f1: F1, f2: F2, domain: Domain) -> Result<Vec<Point>, GeometryError>
    where
        F1: Fn(Number) -> Option<Number>,
        F2: Fn(Number) -> Option<Number>,
    {
        if self.sample_count == 0 {
            return Err(GeometryError::ZeroSamples);
        }
        let diff = |x: Number| Some(f1(x)? - f2(x)?).filter(|d| d.is_finite());

        let mut found = Vec::new();
        // last sample with a defined, nonzero difference; undefined samples reset it
        let mut last: Option<(Number, Number)> = None;
        for x in domain.grid(self.sample_count) {
            match diff(x) {
                None => last = None,
                Some(d) if d == 0.0 => {}
                Some(d) => {
                    if let Some((prev_x, prev_d)) = last {
                        if prev_d * d < 0.0 {
                            let root = self.bisect(&diff, prev_x, x, prev_d);
                            match f1(root) {
                                Some(y) if y.is_finite() => found.push(Point::new(root, y)),
                                _ => {}
                            }
                        }
                    }
                    last = Some((x, d));
                }
            }
        }
        Ok(found)
    }

    /// Halve `[a, b]` a fixed number of times, keeping the end whose
    /// difference has the same sign as `left` on the left, and return the
    /// midpoint of what remains.
    fn bisect<D>(&self, diff: &D, mut a: Number, mut b: Number, left: Number) -> Number
    where
        D: Fn(Number) -> Option<Number>,
    {
        for _ in 0..self.bisection_steps {
            let mid = (a + b) / 2.0;
            match diff(mid) {
                Some(d) if d * left < 0.0 => b = mid,
                _ => a = mid,
            }
        }
        (a + b) / 2.0
    }
}

/// [`IntersectionScan`] with the default bisection depth.
pub fn find_intersections<F1, F2>(
    f1: F1,
    f2: F2,
    domain: Domain,
    sample_count: usize,
) -> Result<Vec<Point>, GeometryError>
where
    F1: Fn(Number) -> Option<Number>,
    F2: Fn(Number) -> Option<Number>,
{
    IntersectionScan {
        sample_count,
        ..Default::default()
    }
    .run(f1, f2, domain)
}
