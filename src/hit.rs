// SPDX: CC0-1.0

//! Click resolution against markers and curves.

use crate::{
    config::HitConfig,
    equation::{EquationId, EquationList},
    evaluator::{self, Evaluator},
    extrema::Extremum,
    viewport::Viewport,
    Number, Point,
};

/// What a click landed on, in priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
    /// Index into the selected equation's extrema.
    Extremum(usize),
    /// Index into the current intersections.
    Intersection(usize),
    /// A point on a visible curve near the click.
    Curve { id: EquationId, point: Point },
    Nothing,
}

/// Everything a click can land on.
pub struct HitTargets<'a, E: ?Sized> {
    pub extrema: &'a [Extremum],
    /// `None` when intersections are not shown.
    pub intersections: Option<&'a [Point]>,
    pub equations: &'a EquationList,
    pub evaluator: &'a E,
}

fn nearest_within<I>(viewport: &Viewport, pos: Point, points: I, radius: Number) -> Option<usize>
where
    I: IntoIterator<Item = Point>,
{
    let r2 = radius * radius;
    points
        .into_iter()
        .position(|p| viewport.project(p).distance_sq(pos.x, pos.y) < r2)
}

/// First curve point within the box around `pos`, probing every
/// `curve_scan_stride`th pixel column of each visible curve in list order.
fn curve_at<E: Evaluator + ?Sized>(
    viewport: &Viewport,
    pos: Point,
    equations: &EquationList,
    ev: &E,
    config: &HitConfig,
) -> Option<(EquationId, Point)> {
    let stride = usize::try_from(config.curve_scan_stride).ok()?.max(1);
    let half = config.curve_box;
    for eq in equations.visible() {
        let columns = (0..viewport.width())
            .step_by(stride)
            .map(Number::from)
            .filter(|px| (px - pos.x).abs() < half);
        for px in columns {
            let x = viewport.to_data_x(px);
            let Some(y) = evaluator::evaluate(ev, &eq.expression, x) else {
                continue;
            };
            if (viewport.to_screen_y(y) - pos.y).abs() < half {
                return Some((eq.id.clone(), Point::new(x, y)));
            }
        }
    }
    None
}

/// Resolve a click at screen position `pos`.
///
/// Extremum markers win over intersection markers, which win over curves.
/// Marker tests use a strict radius; the first marker in list order within it
/// is taken, not the closest.
pub fn resolve_click<E: Evaluator + ?Sized>(
    viewport: &Viewport,
    pos: Point,
    targets: &HitTargets<'_, E>,
    config: &HitConfig,
) -> Hit {
    let extrema = targets.extrema.iter().map(Extremum::point);
    if let Some(i) = nearest_within(viewport, pos, extrema, config.extremum_radius) {
        return Hit::Extremum(i);
    }
    if let Some(intersections) = targets.intersections {
        let points = intersections.iter().copied();
        if let Some(i) = nearest_within(viewport, pos, points, config.intersection_radius) {
            return Hit::Intersection(i);
        }
    }
    match curve_at(viewport, pos, targets.equations, targets.evaluator, config) {
        Some((id, point)) => Hit::Curve { id, point },
        None => Hit::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        equation::Equation, evaluator::StackEvaluator, extrema::ExtremumKind,
        viewport::GraphBounds,
    };

    fn viewport() -> Viewport {
        Viewport::new(GraphBounds::default(), 800, 600).unwrap()
    }

    fn equations(exprs: &[(&str, &str)]) -> EquationList {
        let mut list = EquationList::new();
        for (id, expr) in exprs {
            list.add(Equation::explicit(*id, *expr)).unwrap();
        }
        list
    }

    #[test]
    fn extremum_beats_intersection_and_curve() {
        let v = viewport();
        let ev = StackEvaluator::default();
        let list = equations(&[("a", "0")]);
        let extrema = [Extremum {
            x: 0.0,
            y: 0.0,
            kind: ExtremumKind::Max,
        }];
        let intersections = [Point::new(0.0, 0.0)];
        let targets = HitTargets {
            extrema: &extrema,
            intersections: Some(&intersections),
            equations: &list,
            evaluator: &ev,
        };
        let config = HitConfig::default();
        // origin is at (400, 300)
        assert_eq!(
            resolve_click(&v, Point::new(403.0, 303.0), &targets, &config),
            Hit::Extremum(0)
        );
        // 7.5 px away: outside the extremum radius, inside the intersection one
        assert_eq!(
            resolve_click(&v, Point::new(407.5, 300.0), &targets, &config),
            Hit::Intersection(0)
        );
    }

    #[test]
    fn hidden_intersections_are_skipped() {
        let v = viewport();
        let ev = StackEvaluator::default();
        let list = EquationList::new();
        let intersections = [Point::new(0.0, 0.0)];
        let targets = HitTargets {
            extrema: &[],
            intersections: None,
            equations: &list,
            evaluator: &ev,
        };
        assert_eq!(
            resolve_click(&v, Point::new(400.0, 300.0), &targets, &HitConfig::default()),
            Hit::Nothing
        );
        let targets = HitTargets {
            intersections: Some(&intersections),
            ..targets
        };
        assert_eq!(
            resolve_click(&v, Point::new(400.0, 300.0), &targets, &HitConfig::default()),
            Hit::Intersection(0)
        );
    }

    #[test]
    fn curves_are_scanned_in_list_order() {
        let v = viewport();
        let ev = StackEvaluator::default();
        // both pass through the origin
        let list = equations(&[("line", "x"), ("flat", "0")]);
        let targets = HitTargets {
            extrema: &[],
            intersections: None,
            equations: &list,
            evaluator: &ev,
        };
        match resolve_click(&v, Point::new(401.0, 301.0), &targets, &HitConfig::default()) {
            Hit::Curve { id, point } => {
                assert_eq!(id.as_str(), "line");
                assert_eq!(point.y, point.x);
            }
            other => panic!("expected a curve hit, got {other:?}"),
        }
    }

    #[test]
    fn far_from_everything_is_nothing() {
        let v = viewport();
        let ev = StackEvaluator::default();
        let list = equations(&[("a", "0")]);
        let targets = HitTargets {
            extrema: &[],
            intersections: None,
            equations: &list,
            evaluator: &ev,
        };
        assert_eq!(
            resolve_click(&v, Point::new(400.0, 100.0), &targets, &HitConfig::default()),
            Hit::Nothing
        );
    }
}
