//! Scripted gestures for headless runs.
//!
//! A [`GestureScript`] is replayed as raw pointer and wheel events, so it
//! exercises the same recognizer a touch screen would.

use lightbox_core::{MediaDevices, PointerEvent, Transform, WheelEvent};

use crate::session::OverlaySession;

/// Half the finger spacing used for synthetic pinches, in pixels.
const PINCH_RADIUS: f64 = 100.0;

/// Largest rotation applied in one synthetic move, in degrees. Smaller than
/// a half turn so every step has an unambiguous direction.
const PINCH_STEP_DEGREES: f64 = 30.0;

/// Gestures to replay, in order: drag, then pinch, then wheel notches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureScript {
    /// One-finger drag distance.
    pub drag: Option<(f64, f64)>,
    /// Two-finger pinch factor and twist in degrees.
    pub pinch: Option<(f64, f64)>,
    /// Wheel notch deltas.
    pub wheel: Vec<f64>,
}

impl GestureScript {
    /// Whether the script does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drag.is_none() && self.pinch.is_none() && self.wheel.is_empty()
    }

    /// Replay the script against `session` around the point `(cx, cy)`.
    pub fn replay<D: MediaDevices>(
        &self,
        session: &mut OverlaySession<D>,
        (cx, cy): (f64, f64),
    ) -> Transform {
        if let Some((dx, dy)) = self.drag {
            session.pointer(PointerEvent::down(1, cx, cy));
            session.pointer(PointerEvent::moved(1, cx + dx, cy + dy));
            session.pointer(PointerEvent::up(1, cx + dx, cy + dy));
            tracing::debug!(dx, dy, "Replayed drag");
        }

        if let Some((factor, degrees)) = self.pinch {
            let anchor = (cx - PINCH_RADIUS, cy);
            session.pointer(PointerEvent::down(1, anchor.0, anchor.1));
            session.pointer(PointerEvent::down(2, cx + PINCH_RADIUS, cy));

            let steps = pinch_steps(degrees);
            let mut last = (cx + PINCH_RADIUS, cy);
            for i in 1..=steps {
                let t = f64::from(i) / f64::from(steps);
                let span = 2.0 * PINCH_RADIUS * (1.0 + (factor - 1.0) * t);
                let angle = (degrees * t).to_radians();
                last = (anchor.0 + span * angle.cos(), anchor.1 + span * angle.sin());
                session.pointer(PointerEvent::moved(2, last.0, last.1));
            }

            session.pointer(PointerEvent::up(2, last.0, last.1));
            session.pointer(PointerEvent::up(1, anchor.0, anchor.1));
            tracing::debug!(factor, degrees, steps, "Replayed pinch");
        }

        for &delta_y in &self.wheel {
            session.wheel(WheelEvent { delta_y });
        }

        session.transform()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pinch_steps(degrees: f64) -> u32 {
    let steps = (degrees.abs() / PINCH_STEP_DEGREES).ceil();
    if steps.is_finite() {
        (steps as u32).max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_stay_under_half_turn() {
        assert_eq!(pinch_steps(0.0), 1);
        assert_eq!(pinch_steps(30.0), 1);
        assert_eq!(pinch_steps(-200.0), 7);
        assert_eq!(pinch_steps(f64::NAN), 1);
    }

    #[test]
    fn test_empty_script() {
        assert!(GestureScript::default().is_empty());
        assert!(!GestureScript {
            wheel: vec![-1.0],
            ..GestureScript::default()
        }
        .is_empty());
    }
}
