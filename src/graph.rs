// SPDX: CC0-1.0

//! One interactive graph: selection state plus the products derived from the
//! equation list and the viewport.
//!
//! Products are recomputed lazily and only when one of their inputs was
//! reported as changed:
//!
//! | product       | recomputed after                                      |
//! |---------------|-------------------------------------------------------|
//! | curves        | [`Graph::equations_changed`], [`Graph::bounds_changed`] |
//! | intersections | the above, or [`Graph::set_show_intersections`]       |
//! | extrema       | [`Graph::select_equation`], or an edit of the selected expression |

use crate::{
    analysis::{AnalysisParams, ExtremaCache},
    config::{ConfigError, GraphConfig},
    equation::{EquationId, EquationList, Style},
    error::GeometryError,
    evaluator::{self, Evaluator},
    extrema::Extremum,
    gesture::{GestureController, GestureEvent},
    hit::{self, Hit, HitTargets},
    intersect::IntersectionScan,
    sample::{self, Segment},
    scene::{self, Scene},
    viewport::{GraphBounds, Viewport},
    Point,
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Dirty {
    curves: bool,
    intersections: bool,
    extrema: bool,
}

impl Dirty {
    const ALL: Self = Self {
        curves: true,
        intersections: true,
        extrema: true,
    };
}

#[derive(Clone, Debug)]
struct SampledCurve {
    id: EquationId,
    style: Style,
    segments: Vec<Segment>,
}

pub struct Graph<E> {
    evaluator: E,
    config: GraphConfig,
    analysis: AnalysisParams,
    intersection_scan: IntersectionScan,
    gestures: GestureController,
    cache: ExtremaCache,

    show_intersections: bool,
    selected: Option<EquationId>,
    selected_point: Option<Point>,

    curves: Vec<SampledCurve>,
    intersections: Vec<Point>,
    extrema: Arc<[Extremum]>,
    dirty: Dirty,
}

impl<E: Evaluator> Graph<E> {
    pub fn new(evaluator: E, config: GraphConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let analysis = config
            .analysis_params()
            .map_err(|source| ConfigError::Invalid {
                key: "analysis",
                source,
            })?;
        Ok(Self {
            evaluator,
            analysis,
            intersection_scan: config.intersection_scan(),
            gestures: GestureController::new(config.zoom),
            cache: ExtremaCache::new(),
            show_intersections: config.intersections.enabled,
            selected: None,
            selected_point: None,
            curves: Vec::new(),
            intersections: Vec::new(),
            extrema: Arc::from([]),
            dirty: Dirty::ALL,
            config,
        })
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn show_intersections(&self) -> bool {
        self.show_intersections
    }

    pub fn selected_equation(&self) -> Option<&EquationId> {
        self.selected.as_ref()
    }

    pub fn selected_point(&self) -> Option<Point> {
        self.selected_point
    }

    /// Extrema of the selected equation as of the last refresh.
    pub fn extrema(&self) -> &[Extremum] {
        &self.extrema
    }

    /// Intersections as of the last refresh; empty while they are hidden.
    pub fn intersections(&self) -> &[Point] {
        &self.intersections
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    /// The equation list was edited: something added, removed, restyled,
    /// shown, hidden or given a new expression.
    pub fn equations_changed(&mut self, equations: &EquationList) {
        self.dirty.curves = true;
        self.dirty.intersections = true;
        let removed = self
            .selected
            .as_ref()
            .filter(|id| equations.get(id).is_none())
            .cloned();
        if let Some(id) = removed {
            debug!(%id, "selected equation was removed");
            self.cache.invalidate(&id);
            self.select_equation(None);
        } else if self.selected.is_some() {
            // the cache decides whether the expression actually changed
            self.dirty.extrema = true;
        }
    }

    pub fn bounds_changed(&mut self) {
        self.dirty.curves = true;
        self.dirty.intersections = true;
    }

    pub fn set_show_intersections(&mut self, show: bool) {
        if self.show_intersections != show {
            self.show_intersections = show;
            self.dirty.intersections = true;
        }
    }

    /// Change the equation whose extrema are shown. Any selected point is
    /// dropped along with the old markers.
    pub fn select_equation(&mut self, id: Option<EquationId>) {
        if self.selected != id {
            self.selected = id;
            self.selected_point = None;
            self.dirty.extrema = true;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_point = None;
    }

    /// Extrema already known for `expression`, without scanning.
    pub fn cached_extrema(&self, id: &EquationId, expression: &str) -> Option<Arc<[Extremum]>> {
        self.cache.get(id, expression)
    }

    /// Store extrema computed elsewhere, such as on a [`Worker`], so that
    /// selecting the equation later does not scan again.
    ///
    /// [`Worker`]: crate::worker::Worker
    pub fn remember_extrema(&mut self, id: EquationId, expression: String, extrema: Arc<[Extremum]>) {
        self.cache.insert(id, expression, extrema);
    }

    /// Feed one pointer event through the gesture controller.
    ///
    /// Returns bounds to commit; call [`Graph::bounds_changed`] after doing so.
    /// Clicks are resolved against `viewport` and update the selection.
    pub fn handle(
        &mut self,
        event: GestureEvent,
        equations: &EquationList,
        viewport: &Viewport,
    ) -> Result<Option<GraphBounds>, GeometryError> {
        let outcome = self.gestures.handle(event, viewport);
        if outcome.clear_selection {
            self.clear_selection();
        }
        if let Some(pos) = outcome.click {
            self.click(pos, equations, viewport)?;
        }
        Ok(outcome.bounds)
    }

    /// Resolve a click at screen position `pos` and apply it to the selection.
    pub fn click(
        &mut self,
        pos: Point,
        equations: &EquationList,
        viewport: &Viewport,
    ) -> Result<Hit, GeometryError> {
        self.refresh(equations, viewport)?;
        let targets = HitTargets {
            extrema: &self.extrema,
            intersections: self.show_intersections.then_some(&self.intersections[..]),
            equations,
            evaluator: &self.evaluator,
        };
        let hit = hit::resolve_click(viewport, pos, &targets, &self.config.hit);
        debug!(?hit, x = pos.x, y = pos.y, "click");

        match &hit {
            Hit::Extremum(i) => self.selected_point = self.extrema.get(*i).map(Extremum::point),
            Hit::Intersection(i) => self.selected_point = self.intersections.get(*i).copied(),
            Hit::Curve { id, .. } => {
                self.select_equation(Some(id.clone()));
                self.selected_point = None;
                self.refresh_extrema(equations);
            }
            Hit::Nothing => {
                self.select_equation(None);
                self.selected_point = None;
                self.refresh_extrema(equations);
            }
        }
        Ok(hit)
    }

    /// Recompute whatever is out of date.
    pub fn refresh(&mut self, equations: &EquationList, viewport: &Viewport) -> Result<(), GeometryError> {
        if self.dirty.curves {
            self.refresh_curves(equations, viewport)?;
        }
        if self.dirty.intersections {
            self.refresh_intersections(equations, viewport)?;
        }
        if self.dirty.extrema {
            self.refresh_extrema(equations);
        }
        Ok(())
    }

    fn refresh_curves(&mut self, equations: &EquationList, viewport: &Viewport) -> Result<(), GeometryError> {
        let domain = viewport.bounds().x_domain()?;
        let columns = viewport.width() as usize;
        self.curves = equations
            .visible()
            .map(|eq| {
                let segments = sample::sample_expr(&self.evaluator, &eq.expression, domain, columns)?;
                Ok(SampledCurve {
                    id: eq.id.clone(),
                    style: eq.style,
                    segments: segments.collect(),
                })
            })
            .collect::<Result<_, GeometryError>>()?;
        debug!(curves = self.curves.len(), "sampled curves");
        self.dirty.curves = false;
        Ok(())
    }

    fn refresh_intersections(&mut self, equations: &EquationList, viewport: &Viewport) -> Result<(), GeometryError> {
        self.intersections.clear();
        if self.show_intersections {
            let domain = viewport.bounds().x_domain()?;
            let visible: Vec<_> = equations.visible().collect();
            for (i, a) in visible.iter().enumerate() {
                for b in &visible[i + 1..] {
                    let found = self.intersection_scan.run(
                        evaluator::function(&self.evaluator, &a.expression),
                        evaluator::function(&self.evaluator, &b.expression),
                        domain,
                    )?;
                    self.intersections.extend(found);
                }
            }
            debug!(count = self.intersections.len(), "found intersections");
        }
        self.dirty.intersections = false;
        Ok(())
    }

    fn refresh_extrema(&mut self, equations: &EquationList) {
        self.dirty.extrema = false;
        let Some(eq) = self.selected.as_ref().and_then(|id| equations.get(id)) else {
            self.extrema = Arc::from([]);
            return;
        };
        let scan = self.analysis.extrema;
        let domain = self.analysis.domain;
        let ev = &self.evaluator;
        self.extrema = self.cache.get_or_insert_with(&eq.id, &eq.expression, || {
            scan.run(evaluator::function(ev, &eq.expression), domain)
                .unwrap_or_else(|err| {
                    warn!(%err, "extremum scan rejected");
                    Vec::new()
                })
        });
    }

    /// Refresh and assemble the drawing instructions for `viewport`.
    pub fn scene(&mut self, equations: &EquationList, viewport: &Viewport) -> Result<Scene, GeometryError> {
        self.refresh(equations, viewport)?;

        let curves = self
            .curves
            .iter()
            .map(|c| scene::curve_path(viewport, c.id.clone(), c.style, &c.segments))
            .collect();
        let markers = self
            .intersections
            .iter()
            .map(|&p| scene::intersection_marker(viewport, p))
            .chain(self.extrema.iter().map(|e| scene::extremum_marker(viewport, e)))
            .collect();

        Ok(Scene {
            width: viewport.width(),
            height: viewport.height(),
            bounds: *viewport.bounds(),
            grid: scene::grid(viewport, self.config.tick_target.0)?,
            axes: scene::axes(viewport),
            curves,
            markers,
            readout: self.selected_point.map(|p| scene::readout(viewport, p)),
        })
    }
}
