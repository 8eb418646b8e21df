//! # Gesture Engine
//!
//! Turns drag, pinch, and wheel input into [`Transform`] updates.
//!
//! Two layers live here:
//!
//! - a pure reducer ([`GestureEngine::apply`]) over already-accumulated
//!   [`GestureEvent`] values, and
//! - a pointer recognizer ([`GestureEngine::pointer`]) that tracks raw pointers
//!   and derives those accumulated values.
//!
//! ```text
//! PointerEvent ──▶ recognizer ──▶ GestureEvent ──▶ reducer ──▶ TransformStore
//! WheelEvent   ─────────────────────────────────────────▲
//! ```
//!
//! Drag writes the offsets, pinch writes scale and rotation, wheel nudges
//! scale. Drag and pinch touch disjoint fields; wheel and pinch both write
//! scale and the most recently processed event wins.

use crate::event::{GestureEvent, InputEvent, PointerEvent, PointerPhase, WheelEvent};
use crate::transform::{Transform, TransformStore, TransformUpdate};

/// Scale change applied per wheel tick.
pub const WHEEL_STEP: f64 = 0.1;

/// Pinches that start with fingers closer than this keep their baseline scale.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    id: u32,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy)]
enum Tracking {
    Idle,
    Drag {
        id: u32,
        start: (f64, f64),
        base: (f64, f64),
    },
    Pinch {
        base_scale: f64,
        base_rotation: f64,
        start_distance: f64,
        last_angle: f64,
        turned_degrees: f64,
    },
}

/// Gesture engine owning the overlay's [`TransformStore`].
#[derive(Debug)]
pub struct GestureEngine {
    store: TransformStore,
    pointers: Vec<TrackedPointer>,
    tracking: Tracking,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    /// Create an engine starting from the identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(Transform::IDENTITY)
    }

    /// Create an engine starting from `initial` (scale is clamped).
    #[must_use]
    pub fn with_initial(initial: Transform) -> Self {
        Self {
            store: TransformStore::with_initial(initial),
            pointers: Vec::with_capacity(2),
            tracking: Tracking::Idle,
        }
    }

    /// The current transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.store.get()
    }

    /// Number of pointers currently down.
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Reduce one accumulated gesture value into the transform.
    pub fn apply(&mut self, gesture: GestureEvent) -> Transform {
        match gesture {
            GestureEvent::Drag { x, y } => self.store.apply(TransformUpdate::offset(x, y)),
            GestureEvent::Pinch { scale, rotation } => {
                self.store.apply(TransformUpdate::scale_rotation(scale, rotation))
            }
            GestureEvent::Wheel { delta_y } => {
                let step = if delta_y < 0.0 {
                    WHEEL_STEP
                } else if delta_y > 0.0 {
                    -WHEEL_STEP
                } else {
                    return self.store.get();
                };
                let current = self.store.get().scale;
                self.store.apply(TransformUpdate::scale(current + step))
            }
        }
    }

    /// Handle a wheel event.
    pub fn wheel(&mut self, event: WheelEvent) -> Transform {
        self.apply(GestureEvent::Wheel {
            delta_y: event.delta_y,
        })
    }

    /// Handle any input event.
    pub fn handle(&mut self, event: InputEvent) -> Transform {
        match event {
            InputEvent::Pointer(pointer) => {
                self.pointer(pointer);
                self.store.get()
            }
            InputEvent::Wheel(wheel) => self.wheel(wheel),
            InputEvent::Gesture(gesture) => self.apply(gesture),
        }
    }

    /// Set scale directly, as a slider control does.
    pub fn set_scale(&mut self, scale: f64) -> Transform {
        self.store.apply(TransformUpdate::scale(scale))
    }

    /// Restore the identity transform and clear gesture baselines.
    ///
    /// Pointers still down stay tracked, but their gestures restart from the
    /// current pointer positions with identity baselines, so the next report
    /// starts from zero instead of stale accumulated state.
    pub fn reset(&mut self) -> Transform {
        let transform = self.store.reset();
        self.retrack();
        tracing::debug!(pointers = self.pointers.len(), "Gesture state reset");
        transform
    }

    /// Handle a raw pointer event.
    ///
    /// Returns the gesture value derived from this event, if any, after it
    /// has been applied to the transform. Down and move events with
    /// non-finite coordinates are ignored; up and cancel still release the
    /// pointer.
    pub fn pointer(&mut self, event: PointerEvent) -> Option<GestureEvent> {
        let finite = event.x.is_finite() && event.y.is_finite();
        if !finite && matches!(event.phase, PointerPhase::Down | PointerPhase::Move) {
            tracing::trace!(id = event.id, "Ignoring pointer at non-finite position");
            return None;
        }

        match event.phase {
            PointerPhase::Down => {
                if let Some(p) = self.pointers.iter_mut().find(|p| p.id == event.id) {
                    p.x = event.x;
                    p.y = event.y;
                } else {
                    self.pointers.push(TrackedPointer {
                        id: event.id,
                        x: event.x,
                        y: event.y,
                    });
                }
                self.retrack();
                None
            }
            PointerPhase::Move => {
                let p = self.pointers.iter_mut().find(|p| p.id == event.id)?;
                p.x = event.x;
                p.y = event.y;
                let gesture = self.derive(event.id)?;
                self.apply(gesture);
                tracing::trace!(?gesture, "Gesture update");
                Some(gesture)
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let before = self.pointers.len();
                self.pointers.retain(|p| p.id != event.id);
                if self.pointers.len() != before {
                    self.retrack();
                }
                None
            }
        }
    }

    /// Compute the accumulated gesture value after pointer `moved` changed.
    fn derive(&mut self, moved: u32) -> Option<GestureEvent> {
        match &mut self.tracking {
            Tracking::Idle => None,
            Tracking::Drag { id, start, base } => {
                if *id != moved {
                    return None;
                }
                let p = self.pointers.iter().find(|p| p.id == moved)?;
                Some(GestureEvent::Drag {
                    x: base.0 + (p.x - start.0),
                    y: base.1 + (p.y - start.1),
                })
            }
            Tracking::Pinch {
                base_scale,
                base_rotation,
                start_distance,
                last_angle,
                turned_degrees,
            } => {
                let (a, b) = (self.pointers.first()?, self.pointers.get(1)?);
                if moved != a.id && moved != b.id {
                    return None;
                }
                let (distance, angle) = span(a, b);
                *turned_degrees += unwrap_angle(angle - *last_angle).to_degrees();
                *last_angle = angle;

                let scale = if *start_distance > MIN_PINCH_DISTANCE {
                    *base_scale * distance / *start_distance
                } else {
                    *base_scale
                };
                Some(GestureEvent::Pinch {
                    scale,
                    rotation: *base_rotation + *turned_degrees,
                })
            }
        }
    }

    /// Start a fresh gesture from the current pointers and stored transform.
    fn retrack(&mut self) {
        let current = self.store.get();
        self.tracking = match self.pointers.as_slice() {
            [] => Tracking::Idle,
            [p] => Tracking::Drag {
                id: p.id,
                start: (p.x, p.y),
                base: (current.offset_x, current.offset_y),
            },
            [a, b, ..] => {
                let (distance, angle) = span(a, b);
                Tracking::Pinch {
                    base_scale: current.scale,
                    base_rotation: current.rotation,
                    start_distance: distance,
                    last_angle: angle,
                    turned_degrees: 0.0,
                }
            }
        };
    }
}

/// Distance and angle (radians) of the segment from `a` to `b`.
fn span(a: &TrackedPointer, b: &TrackedPointer) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx.hypot(dy), dy.atan2(dx))
}

/// Map an angle difference into `(-PI, PI]` so crossing the atan2 seam
/// does not register as a full turn.
fn unwrap_angle(delta: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut d = delta % TAU;
    if d > PI {
        d -= TAU;
    } else if d <= -PI {
        d += TAU;
    }
    d
}
