// SPDX: CC0-1.0

use core::f64::consts::{FRAC_PI_2, PI};
use grapher::{
    config::{GraphConfig, ZoomConfig},
    equation::{Equation, EquationList},
    evaluator::{function, StackEvaluator},
    extrema::{ExtremumKind, ExtremumScan},
    gesture::{GestureController, GestureEvent},
    graph::Graph,
    intersect::IntersectionScan,
    sample,
    ticks::nice_step,
    viewport::{Domain, GraphBounds, Viewport},
    Number, Point,
};

fn close(a: Number, b: Number, tol: Number) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn nice_steps() {
    assert_eq!(nice_step(100.0, 10.0), Ok(10.0));
    let mut range = 1e-3;
    let mut prev = 0.0;
    while range < 1e6 {
        let step = nice_step(range, 10.0).unwrap();
        let k = (step.log10() + 1e-9).floor() as i32;
        let msd = step / (10.0 as Number).powi(k);
        assert!(
            [1.0, 2.0, 5.0].iter().any(|m| close(msd, *m, 1e-9)),
            "range {range} gave {step}"
        );
        assert!(nice_step(range * 2.0, 10.0).unwrap() >= step);
        assert!(step >= prev);
        prev = step;
        range *= 1.5;
    }
}

#[test]
fn viewport_round_trips() {
    let bounds = GraphBounds::new(-3.5, 12.25, -100.0, 0.5).unwrap();
    let v = Viewport::new(bounds, 1024, 333).unwrap();
    for i in 0..=100 {
        let t = i as Number / 100.0;
        let x = bounds.x_min + t * bounds.x_range();
        let y = bounds.y_min + t * bounds.y_range();
        assert!(close(v.to_data_x(v.to_screen_x(x)), x, 1e-9), "x = {x}");
        assert!(close(v.to_data_y(v.to_screen_y(y)), y, 1e-9), "y = {y}");
    }
}

#[test]
fn identity_samples_as_one_segment() {
    let ev = StackEvaluator::default();
    let domain = Domain::new(-10.0, 10.0).unwrap();
    let segments: Vec<_> = sample::sample_expr(&ev, "x", domain, 20).unwrap().collect();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].len(), 21);
    for p in &segments[0] {
        assert_eq!(p.x, p.y);
    }
    assert_eq!(segments[0][0].x, -10.0);
    assert_eq!(segments[0][20].x, 10.0);
}

#[test]
fn reciprocal_breaks_at_zero() {
    let ev = StackEvaluator::default();
    let domain = Domain::new(-1.0, 1.0).unwrap();
    let segments: Vec<_> = sample::sample_expr(&ev, "1/x", domain, 20).unwrap().collect();
    assert!(segments.len() >= 2);
    assert!(segments[0].iter().all(|p| p.x < 0.0));
    assert!(segments[segments.len() - 1].iter().all(|p| p.x > 0.0));
}

#[test]
fn crossing_lines_meet_once() {
    let ev = StackEvaluator::default();
    let found = IntersectionScan::default()
        .run(
            function(&ev, "x"),
            function(&ev, "2-x"),
            Domain::new(0.0, 4.0).unwrap(),
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(close(found[0].x, 1.0, 1e-3));
    assert!(close(found[0].y, 1.0, 1e-3));
}

#[test]
fn identical_curves_never_intersect() {
    let ev = StackEvaluator::default();
    let found = IntersectionScan::default()
        .run(
            function(&ev, "sin(x)"),
            function(&ev, "sin(x)"),
            Domain::new(-20.0, 20.0).unwrap(),
        )
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn downward_parabola_has_one_max() {
    let ev = StackEvaluator::default();
    let found = ExtremumScan::default()
        .run(function(&ev, "-(x^2)"), Domain::new(-20.0, 20.0).unwrap())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ExtremumKind::Max);
    assert!(close(found[0].x, 0.0, 1e-6));
    assert!(close(found[0].y, 0.0, 1e-6));
}

#[test]
fn sine_extrema_alternate() {
    let ev = StackEvaluator::default();
    let found = ExtremumScan::default()
        .run(function(&ev, "sin(x)"), Domain::new(-20.0, 20.0).unwrap())
        .unwrap();
    // pi/2 + k pi for k in -6..=5
    assert_eq!(found.len(), 12);
    for pair in found.windows(2) {
        assert_ne!(pair[0].kind, pair[1].kind);
        assert!(pair[0].x < pair[1].x);
    }
    for ext in &found {
        let k = ((ext.x - FRAC_PI_2) / PI).round();
        assert!(close(ext.x, FRAC_PI_2 + k * PI, 1e-3), "{ext:?}");
        let expected = match ext.kind {
            ExtremumKind::Max => 1.0,
            ExtremumKind::Min => -1.0,
        };
        assert!(close(ext.y, expected, 1e-3), "{ext:?}");
    }
}

fn assert_bounds_close(a: &GraphBounds, b: &GraphBounds) {
    let tol = 1e-6 * b.x_range().max(b.y_range());
    for (l, r) in [
        (a.x_min, b.x_min),
        (a.x_max, b.x_max),
        (a.y_min, b.y_min),
        (a.y_max, b.y_max),
    ] {
        assert!(close(l, r, tol), "{a:?} vs {b:?}");
    }
}

#[test]
fn wheel_in_then_out_restores_bounds() {
    let mut gestures = GestureController::new(ZoomConfig {
        out_factor: 1.1,
        in_factor: 1.1_f64.recip(),
    });
    let start = Viewport::new(GraphBounds::default(), 800, 600).unwrap();
    let pos = Point::new(213.0, 471.0);

    let zoomed_in = gestures
        .handle(GestureEvent::Wheel { pos, delta_y: -3.0 }, &start)
        .bounds
        .unwrap();
    assert!(zoomed_in.x_range() < start.bounds().x_range());
    let v = start.with_bounds(zoomed_in).unwrap();
    let back = gestures
        .handle(GestureEvent::Wheel { pos, delta_y: 3.0 }, &v)
        .bounds
        .unwrap();
    assert_bounds_close(&back, start.bounds());
}

#[test]
fn pinch_and_its_inverse_restore_bounds() {
    let mut gestures = GestureController::new(ZoomConfig::default());
    let start = Viewport::new(GraphBounds::new(-7.0, 3.0, 0.0, 50.0).unwrap(), 640, 480).unwrap();
    let pos = Point::new(100.0, 400.0);

    let pinched = gestures
        .handle(GestureEvent::Pinch { pos, scale: 2.0 }, &start)
        .bounds
        .unwrap();
    assert!(close(pinched.x_range(), 5.0, 1e-12));
    let v = start.with_bounds(pinched).unwrap();
    let back = gestures
        .handle(GestureEvent::Pinch { pos, scale: 0.5 }, &v)
        .bounds
        .unwrap();
    assert_bounds_close(&back, start.bounds());
}

#[test]
fn drag_then_reverse_drag_restores_bounds() {
    let mut gestures = GestureController::new(ZoomConfig::default());
    let start = Viewport::new(GraphBounds::default(), 800, 600).unwrap();
    let mut v = start;

    let path = [
        GestureEvent::PointerDown {
            pos: Point::new(100.0, 100.0),
        },
        GestureEvent::PointerMove {
            pos: Point::new(140.0, 70.0),
        },
        GestureEvent::PointerMove {
            pos: Point::new(100.0, 100.0),
        },
        GestureEvent::PointerUp {
            pos: Point::new(100.0, 100.0),
        },
    ];
    let mut moved = None;
    for event in path {
        let outcome = gestures.handle(event, &v);
        assert!(outcome.click.is_none());
        if let Some(bounds) = outcome.bounds {
            v = v.with_bounds(bounds).unwrap();
            moved.get_or_insert(bounds);
        }
    }
    let moved = moved.unwrap();
    assert_eq!((moved.x_min, moved.x_max), (-11.0, 9.0));
    assert_eq!((moved.y_min, moved.y_max), (-11.0, 9.0));
    assert_eq!(v.bounds(), start.bounds());
    assert!(!gestures.is_dragging());
}

#[test]
fn clicking_a_curve_then_its_extremum() {
    let config = GraphConfig::default();
    let viewport = config.viewport().unwrap();
    let mut graph = Graph::new(StackEvaluator::default(), config).unwrap();
    let mut list = EquationList::new();
    list.add(Equation::explicit("p", "x^2")).unwrap();
    graph.equations_changed(&list);

    // (3, 9) on screen
    let on_curve = Point::new(520.0, 30.0);
    for event in [
        GestureEvent::PointerDown { pos: on_curve },
        GestureEvent::PointerUp { pos: on_curve },
    ] {
        assert_eq!(graph.handle(event, &list, &viewport).unwrap(), None);
    }
    assert_eq!(graph.selected_equation().map(|id| id.as_str()), Some("p"));
    assert_eq!(graph.extrema().len(), 1);
    assert_eq!(graph.extrema()[0].kind, ExtremumKind::Min);

    // the minimum sits at the screen centre
    let near_min = Point::new(403.0, 300.0);
    for event in [
        GestureEvent::PointerDown { pos: near_min },
        GestureEvent::PointerUp { pos: near_min },
    ] {
        graph.handle(event, &list, &viewport).unwrap();
    }
    let p = graph.selected_point().unwrap();
    assert!(close(p.x, 0.0, 1e-6) && close(p.y, 0.0, 1e-6));
    let scene = graph.scene(&list, &viewport).unwrap();
    assert_eq!(scene.readout.map(|r| r.text).as_deref(), Some("(0, 0)"));

    // empty space clears everything
    let empty = Point::new(700.0, 550.0);
    for event in [
        GestureEvent::PointerDown { pos: empty },
        GestureEvent::PointerUp { pos: empty },
    ] {
        graph.handle(event, &list, &viewport).unwrap();
    }
    assert!(graph.selected_equation().is_none());
    assert!(graph.selected_point().is_none());
    assert!(graph.extrema().is_empty());
}
