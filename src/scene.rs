// SPDX: CC0-1.0

//! Drawing instructions for one frame.
//!
//! A [`Scene`] is everything a rendering surface needs, already projected to
//! screen space. Building one does no sampling or analysis.

use crate::{
    equation::{Color, EquationId, Style},
    error::GeometryError,
    extrema::{Extremum, ExtremumKind},
    sample::Segment,
    ticks::{self, format_coord, tick_label},
    viewport::{GraphBounds, ScreenPoint, Viewport},
    Number, Point,
};

pub const GRID_COLOR: Color = Color::LIGHT_GREY;
pub const AXIS_COLOR: Color = Color::GREY;
pub const INTERSECTION_COLOR: Color = Color::BLACK;
pub const EXTREMUM_COLOR: Color = Color::GREY;
pub const INTERSECTION_RADIUS: Number = 5.0;
pub const EXTREMUM_RADIUS: Number = 4.0;

/// Tick labels closer to zero than this are left out so the origin stays clear.
const ORIGIN_EPSILON: Number = 1e-8;
/// Gap between an axis and its tick labels, in pixels.
const LABEL_GAP: Number = 7.0;
/// Offset of the selected point's readout from the point, in pixels.
const READOUT_OFFSET: Point = Point::new(10.0, -10.0);

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub text: String,
    /// Screen position of the anchor.
    pub at: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridLine {
    pub value: Number,
    /// Screen coordinate across the line's axis: `sx` for vertical lines,
    /// `sy` for horizontal ones.
    pub screen: Number,
    pub label: Option<Text>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub x_step: Number,
    pub y_step: Number,
    pub vertical: Vec<GridLine>,
    pub horizontal: Vec<GridLine>,
}

/// Screen positions of the coordinate axes, present only when zero lies
/// strictly inside the bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Axes {
    /// `sx` of the line `x = 0`.
    pub y_axis: Option<Number>,
    /// `sy` of the line `y = 0`.
    pub x_axis: Option<Number>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurvePath {
    pub id: EquationId,
    pub style: Style,
    pub segments: Vec<Vec<ScreenPoint>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    Intersection,
    Extremum(ExtremumKind),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub at: ScreenPoint,
    pub radius: Number,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub bounds: GraphBounds,
    pub grid: Grid,
    pub axes: Axes,
    pub curves: Vec<CurvePath>,
    pub markers: Vec<Marker>,
    pub readout: Option<Text>,
}

pub fn grid(viewport: &Viewport, target: Number) -> Result<Grid, GeometryError> {
    let b = viewport.bounds();
    let x_step = ticks::nice_step(b.x_range(), target)?;
    let y_step = ticks::nice_step(b.y_range(), target)?;
    // labels hug the axes even when those are off screen
    let label_y = viewport.to_screen_y(0.0) + LABEL_GAP;
    let label_x = viewport.to_screen_x(0.0) - LABEL_GAP;
    let labelled = |value: Number, at: Point| {
        (value.abs() > ORIGIN_EPSILON).then(|| Text {
            text: tick_label(value),
            at,
        })
    };

    let vertical = ticks::ticks(b.x_min, b.x_max, x_step)
        .map(|x| {
            let sx = viewport.to_screen_x(x);
            GridLine {
                value: x,
                screen: sx,
                label: labelled(x, Point::new(sx, label_y)),
            }
        })
        .collect();
    let horizontal = ticks::ticks(b.y_min, b.y_max, y_step)
        .map(|y| {
            let sy = viewport.to_screen_y(y);
            GridLine {
                value: y,
                screen: sy,
                label: labelled(y, Point::new(label_x, sy)),
            }
        })
        .collect();

    Ok(Grid {
        x_step,
        y_step,
        vertical,
        horizontal,
    })
}

pub fn axes(viewport: &Viewport) -> Axes {
    let b = viewport.bounds();
    Axes {
        y_axis: (b.x_min < 0.0 && b.x_max > 0.0).then(|| viewport.to_screen_x(0.0)),
        x_axis: (b.y_min < 0.0 && b.y_max > 0.0).then(|| viewport.to_screen_y(0.0)),
    }
}

pub fn curve_path(viewport: &Viewport, id: EquationId, style: Style, segments: &[Segment]) -> CurvePath {
    CurvePath {
        id,
        style,
        segments: segments
            .iter()
            .map(|seg| seg.iter().map(|&p| viewport.project(p)).collect())
            .collect(),
    }
}

pub fn intersection_marker(viewport: &Viewport, p: Point) -> Marker {
    Marker {
        kind: MarkerKind::Intersection,
        at: viewport.project(p),
        radius: INTERSECTION_RADIUS,
        color: INTERSECTION_COLOR,
    }
}

pub fn extremum_marker(viewport: &Viewport, ext: &Extremum) -> Marker {
    Marker {
        kind: MarkerKind::Extremum(ext.kind),
        at: viewport.project(ext.point()),
        radius: EXTREMUM_RADIUS,
        color: EXTREMUM_COLOR,
    }
}

/// `(x, y)` readout placed up and to the right of `p`.
pub fn readout(viewport: &Viewport, p: Point) -> Text {
    let sp = viewport.project(p);
    Text {
        text: format!("({}, {})", format_coord(p.x), format_coord(p.y)),
        at: Point::new(sp.sx + READOUT_OFFSET.x, sp.sy + READOUT_OFFSET.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(bounds: GraphBounds) -> Viewport {
        Viewport::new(bounds, 800, 600).unwrap()
    }

    #[test]
    fn default_grid_skips_origin_labels() {
        let v = viewport(GraphBounds::default());
        let g = grid(&v, 10.0).unwrap();
        // a rough step of exactly 2 rounds down to 1
        assert_eq!(g.x_step, 1.0);
        assert_eq!(g.vertical.len(), 21);
        assert_eq!(g.vertical[0].value, -10.0);
        assert_eq!(g.vertical[0].screen, 0.0);
        let zero = &g.vertical[10];
        assert_eq!(zero.value, 0.0);
        assert!(zero.label.is_none());
        let label = g.vertical[12].label.as_ref().unwrap();
        assert_eq!(label.text, "2");
        assert_eq!(label.at, Point::new(480.0, 307.0));
    }

    #[test]
    fn fractional_labels_keep_two_decimals() {
        let v = viewport(GraphBounds::new(0.1, 1.1, 0.1, 1.1).unwrap());
        let g = grid(&v, 10.0).unwrap();
        assert_eq!(g.x_step, 0.1);
        let first = g.vertical[0].label.as_ref().unwrap();
        assert_eq!(first.text, "0.10");
    }

    #[test]
    fn axes_only_when_zero_is_inside() {
        let a = axes(&viewport(GraphBounds::default()));
        assert_eq!(a.y_axis, Some(400.0));
        assert_eq!(a.x_axis, Some(300.0));

        let a = axes(&viewport(GraphBounds::new(0.0, 5.0, -1.0, 1.0).unwrap()));
        assert_eq!(a.y_axis, None);
        assert_eq!(a.x_axis, Some(300.0));
    }

    #[test]
    fn markers_and_readout() {
        let v = viewport(GraphBounds::default());
        let m = intersection_marker(&v, Point::new(0.0, 0.0));
        assert_eq!((m.at.sx, m.at.sy), (400.0, 300.0));
        assert_eq!(m.radius, 5.0);
        assert_eq!(m.color, Color::BLACK);

        let ext = Extremum {
            x: 1.0,
            y: 1.5,
            kind: ExtremumKind::Min,
        };
        let m = extremum_marker(&v, &ext);
        assert_eq!(m.kind, MarkerKind::Extremum(ExtremumKind::Min));
        assert_eq!(m.radius, 4.0);

        let r = readout(&v, Point::new(0.0, 0.0));
        assert_eq!(r.text, "(0, 0)");
        assert_eq!(r.at, Point::new(410.0, 290.0));
    }
}
