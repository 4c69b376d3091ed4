// SPDX: CC0-1.0

use crate::{error::GeometryError, Number};

/// Never emit more grid lines than this for one axis, whatever the step.
const MAX_TICKS: u64 = 10_000;

/// Pick a step from `{1, 2, 5} × 10^k` that splits `range` into roughly
/// `target` intervals.
pub fn nice_step(range: Number, target: Number) -> Result<Number, GeometryError> {
    if !(range.is_finite() && range > 0.0 && target.is_finite() && target > 0.0) {
        return Err(GeometryError::InvalidTickRange { range, target });
    }
    let rough = range / target;
    let magnitude = (10.0 as Number).powi(rough.log10().floor() as i32);
    let msd = rough / magnitude;
    let multiplier = if msd > 5.0 {
        5.0
    } else if msd > 2.0 {
        2.0
    } else {
        1.0
    };
    Ok(magnitude * multiplier)
}

/// Multiples of `step` inside `[min, max]`, in increasing order.
#[derive(Clone, Debug)]
pub struct Ticks {
    step: Number,
    next: i64,
    last: i64,
}

impl Iterator for Ticks {
    type Item = Number;

    fn next(&mut self) -> Option<Number> {
        if self.next > self.last {
            return None;
        }
        let value = self.next as Number * self.step;
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.last - self.next + 1).unwrap_or(0);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ticks {}

pub fn ticks(min: Number, max: Number, step: Number) -> Ticks {
    let empty = Ticks {
        step,
        next: 1,
        last: 0,
    };
    if !(step > 0.0 && min.is_finite() && max.is_finite() && min <= max) {
        return empty;
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !(first.is_finite() && last.is_finite()) || last - first >= MAX_TICKS as Number {
        return empty;
    }
    Ticks {
        step,
        next: first as i64,
        last: last as i64,
    }
}

/// Axis label: two decimals, with a whole-number `.00` dropped.
pub fn tick_label(value: Number) -> String {
    let s = format!("{value:.2}");
    match s.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => s,
    }
}

/// Coordinate readout: integers as-is, otherwise at most five decimals with
/// trailing zeros removed.
pub fn format_coord(value: Number) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        // `+ 0.0` turns -0 into 0
        return format!("{}", value + 0.0);
    }
    let s = format!("{value:.5}");
    if !s.contains('.') {
        return s;
    }
    match s.trim_end_matches('0').trim_end_matches('.') {
        "-0" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_nice(step: Number) -> bool {
        // nudge so an exact power of ten never lands just below its exponent
        let k = (step.log10() + 1e-9).floor() as i32;
        let msd = step / (10.0 as Number).powi(k);
        [1.0, 2.0, 5.0].iter().any(|m| (msd - m).abs() < 1e-9)
    }

    #[test]
    fn hundred_over_ten_is_ten() {
        assert_eq!(nice_step(100.0, 10.0), Ok(10.0));
    }

    #[test]
    fn steps_are_one_two_or_five() {
        for range in [0.003, 0.7, 1.0, 3.0, 17.0, 20.0, 45.5, 99.0, 360.0, 1e6, 7.3e-4] {
            for target in [3.0, 5.0, 10.0, 12.0] {
                let step = nice_step(range, target).unwrap();
                assert!(is_nice(step), "range {range} target {target} gave {step}");
            }
        }
    }

    #[test]
    fn doubling_range_never_shrinks_step() {
        let mut range = 0.01;
        while range < 1e7 {
            let a = nice_step(range, 10.0).unwrap();
            let b = nice_step(range * 2.0, 10.0).unwrap();
            assert!(b >= a, "range {range}: {a} then {b}");
            range *= 1.37;
        }
    }

    #[test]
    fn non_positive_ranges_are_rejected() {
        assert!(nice_step(0.0, 10.0).is_err());
        assert!(nice_step(-5.0, 10.0).is_err());
        assert!(nice_step(5.0, 0.0).is_err());
        assert!(nice_step(Number::NAN, 10.0).is_err());
    }

    #[test]
    fn ticks_cover_the_range() {
        let t: Vec<Number> = ticks(-10.0, 10.0, 5.0).collect();
        assert_eq!(t, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        let t: Vec<Number> = ticks(-0.3, 1.1, 0.5).collect();
        assert_eq!(t, vec![0.0, 0.5, 1.0]);
        assert_eq!(ticks(0.0, 1.0, 0.0).count(), 0);
        assert_eq!(ticks(0.0, 1e12, 1.0).count(), 0);
    }

    #[test]
    fn labels() {
        assert_eq!(tick_label(2.0), "2");
        assert_eq!(tick_label(-0.5), "-0.50");
        assert_eq!(tick_label(0.25), "0.25");
        assert_eq!(format_coord(1.0), "1");
        assert_eq!(format_coord(-3.0), "-3");
        assert_eq!(format_coord(1.5), "1.5");
        assert_eq!(format_coord(0.333333333), "0.33333");
        assert_eq!(format_coord(1.0000001), "1");
        assert_eq!(format_coord(-0.0), "0");
        assert_eq!(format_coord(-1e-9), "0");
    }
}
