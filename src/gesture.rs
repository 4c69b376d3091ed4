// SPDX: CC0-1.0

//! Pointer gestures to viewport changes.
//!
//! The controller never commits bounds itself. It proposes new [`GraphBounds`]
//! computed from the viewport it is handed, and whoever owns the bounds decides
//! whether to apply them.

use crate::{config::ZoomConfig, viewport::GraphBounds, viewport::Viewport, Number, Point};
use tracing::{debug, trace};

/// Pointer input at a screen position in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    PointerDown { pos: Point },
    PointerMove { pos: Point },
    PointerUp { pos: Point },
    PointerLeave,
    /// Positive `delta_y` zooms out, anything else zooms in.
    Wheel { pos: Point, delta_y: Number },
    /// `scale > 1` zooms in by dividing both ranges by `scale`.
    Pinch { pos: Point, scale: Number },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        anchor: Point,
        moved: bool,
    },
}

/// What the owner of the viewport should do in response to one event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureOutcome {
    /// New bounds to commit. Always valid when present.
    pub bounds: Option<GraphBounds>,
    /// Drop the selected point (not the selected equation).
    pub clear_selection: bool,
    /// A press and release without movement, at this screen position.
    pub click: Option<Point>,
}

#[derive(Clone, Debug, Default)]
pub struct GestureController {
    state: GestureState,
    zoom: ZoomConfig,
}

impl GestureController {
    pub fn new(zoom: ZoomConfig) -> Self {
        Self {
            state: GestureState::Idle,
            zoom,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn handle(&mut self, event: GestureEvent, viewport: &Viewport) -> GestureOutcome {
        let mut outcome = GestureOutcome::default();
        match event {
            GestureEvent::PointerDown { pos } => {
                self.state = GestureState::Dragging {
                    anchor: pos,
                    moved: false,
                };
                outcome.clear_selection = true;
            }

            GestureEvent::PointerMove { pos } => {
                if let GestureState::Dragging { anchor, .. } = self.state {
                    let dx = pos.x - anchor.x;
                    let dy = pos.y - anchor.y;
                    if dx != 0.0 || dy != 0.0 {
                        outcome.bounds = checked(drag(viewport, dx, dy));
                        self.state = GestureState::Dragging {
                            anchor: pos,
                            moved: true,
                        };
                    }
                }
            }

            GestureEvent::PointerUp { pos } => {
                if let GestureState::Dragging { moved: false, .. } = self.state {
                    outcome.click = Some(pos);
                }
                self.state = GestureState::Idle;
            }

            GestureEvent::PointerLeave => self.state = GestureState::Idle,

            GestureEvent::Wheel { pos, delta_y } => {
                let factor = if delta_y > 0.0 {
                    self.zoom.out_factor
                } else {
                    self.zoom.in_factor
                };
                outcome.bounds = checked(zoom_at(viewport, pos, factor));
            }

            GestureEvent::Pinch { pos, scale } => {
                if scale.is_finite() && scale > 0.0 {
                    outcome.bounds = checked(zoom_at(viewport, pos, scale.recip()));
                } else {
                    trace!(scale, "ignoring pinch with unusable scale");
                }
            }
        }
        outcome
    }
}

fn checked(bounds: GraphBounds) -> Option<GraphBounds> {
    match bounds.validate() {
        Ok(()) => Some(bounds),
        Err(err) => {
            debug!(%err, "dropping degenerate viewport proposal");
            None
        }
    }
}

/// Shift the bounds so the data under the pointer follows a drag of
/// `(dx, dy)` pixels.
pub fn drag(viewport: &Viewport, dx: Number, dy: Number) -> GraphBounds {
    let dx_data = -dx * viewport.x_per_pixel();
    let dy_data = dy * viewport.y_per_pixel();
    viewport.bounds().translate(dx_data, dy_data)
}

/// Scale both ranges by `factor` while keeping the data point under `pos`
/// at the same screen position.
pub fn zoom_at(viewport: &Viewport, pos: Point, factor: Number) -> GraphBounds {
    let bounds = viewport.bounds();
    let anchor = viewport.unproject(pos.x, pos.y);
    let fx = pos.x / Number::from(viewport.width());
    let fy = pos.y / Number::from(viewport.height());

    let x_range = bounds.x_range() * factor;
    let y_range = bounds.y_range() * factor;
    let x_min = anchor.x - fx * x_range;
    let y_max = anchor.y + fy * y_range;
    GraphBounds {
        x_min,
        x_max: x_min + x_range,
        y_min: y_max - y_range,
        y_max,
    }
}
