// SPDX: CC0-1.0

use crate::{
    error::GeometryError,
    evaluator::{self, Evaluator},
    viewport::Domain,
    Number, Point,
};
use core::iter::FusedIterator;

/// A run of consecutive defined samples. Never connect across two of these.
pub type Segment = Vec<Point>;

/// Lazily walks a domain left to right at one sample per pixel column,
/// yielding a new [`Segment`] every time the function becomes defined again.
#[derive(Clone, Debug)]
pub struct Segments<F> {
    f: F,
    domain: Domain,
    columns: usize,
    next: usize,
}

impl<F> Iterator for Segments<F>
where
    F: Fn(Number) -> Option<Number>,
{
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let mut segment = Segment::new();
        while self.next <= self.columns {
            let x = self.domain.position(self.next, self.columns);
            self.next += 1;
            match (self.f)(x) {
                Some(y) => segment.push(Point::new(x, y)),
                None if segment.is_empty() => {}
                None => return Some(segment),
            }
        }
        (!segment.is_empty()).then_some(segment)
    }
}

impl<F> FusedIterator for Segments<F> where F: Fn(Number) -> Option<Number> {}

/// Sample `f` over `domain` with `pixel_width` steps (`pixel_width + 1`
/// samples, both ends included).
pub fn sample<F>(f: F, domain: Domain, pixel_width: usize) -> Result<Segments<F>, GeometryError>
where
    F: Fn(Number) -> Option<Number>,
{
    if pixel_width == 0 {
        return Err(GeometryError::ZeroSamples);
    }
    Ok(Segments {
        f,
        domain,
        columns: pixel_width,
        next: 0,
    })
}

pub fn sample_expr<'a, E: Evaluator + ?Sized>(
    evaluator: &'a E,
    expr: &'a str,
    domain: Domain,
    pixel_width: usize,
) -> Result<Segments<impl Fn(Number) -> Option<Number> + 'a>, GeometryError> {
    sample(evaluator::function(evaluator, expr), domain, pixel_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::StackEvaluator;

    #[test]
    fn identity_is_one_unbroken_segment() {
        let ev = StackEvaluator::default();
        let domain = Domain::new(-10.0, 10.0).unwrap();
        let segments: Vec<Segment> = sample_expr(&ev, "x", domain, 20).unwrap().collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 21);
        for p in &segments[0] {
            assert_eq!(p.y, p.x);
        }
        assert_eq!(segments[0][0].x, -10.0);
        assert_eq!(segments[0][20].x, 10.0);
    }

    #[test]
    fn reciprocal_breaks_at_zero() {
        let ev = StackEvaluator::default();
        let domain = Domain::new(-1.0, 1.0).unwrap();
        let segments: Vec<Segment> = sample_expr(&ev, "1/x", domain, 20).unwrap().collect();
        assert!(segments.len() >= 2);
        assert!(segments[0].iter().all(|p| p.x < 0.0));
        assert!(segments[1].iter().all(|p| p.x > 0.0));
        let total: usize = segments.iter().map(Vec::len).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn leading_and_trailing_gaps_produce_no_empty_segments() {
        let domain = Domain::new(0.0, 10.0).unwrap();
        let f = |x: Number| (3.0..=6.0).contains(&x).then_some(x);
        let segments: Vec<Segment> = sample(f, domain, 10).unwrap().collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 4);
    }

    #[test]
    fn nowhere_defined_yields_nothing() {
        let ev = StackEvaluator::default();
        let domain = Domain::new(-1.0, 1.0).unwrap();
        assert_eq!(sample_expr(&ev, "sqrt(-1)", domain, 50).unwrap().count(), 0);
        assert_eq!(sample_expr(&ev, "nonsense(", domain, 50).unwrap().count(), 0);
    }

    #[test]
    fn zero_width_is_rejected() {
        let domain = Domain::new(-1.0, 1.0).unwrap();
        assert!(sample(|x| Some(x), domain, 0).is_err());
    }
}
