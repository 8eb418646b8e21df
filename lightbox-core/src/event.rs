//! Input events for overlay manipulation.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer went down (finger touch or mouse press).
    Down,
    /// Pointer moved while down.
    Move,
    /// Pointer released.
    Up,
    /// Pointer cancelled by the platform (e.g., palm rejection).
    Cancel,
}

/// A raw pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer identifier (stable for one finger or one mouse).
    pub id: u32,
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in surface pixels.
    pub x: f64,
    /// Y position in surface pixels.
    pub y: f64,
}

impl PointerEvent {
    /// Pointer down at `(x, y)`.
    #[must_use]
    pub fn down(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            phase: PointerPhase::Down,
            x,
            y,
        }
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    /// Pointer released at `(x, y)`.
    #[must_use]
    pub fn up(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            phase: PointerPhase::Up,
            x,
            y,
        }
    }
}

/// A mouse wheel or trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Vertical scroll delta. Only its sign is used.
    pub delta_y: f64,
}

/// An accumulated gesture value, ready to be reduced into the transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "lowercase")]
pub enum GestureEvent {
    /// Absolute offset accumulated by a single-pointer drag.
    Drag {
        /// Accumulated X offset.
        x: f64,
        /// Accumulated Y offset.
        y: f64,
    },
    /// Scale and rotation accumulated by a two-pointer pinch.
    Pinch {
        /// Accumulated scale (clamped when applied).
        scale: f64,
        /// Accumulated rotation in degrees.
        rotation: f64,
    },
    /// One wheel tick.
    Wheel {
        /// Vertical delta; negative zooms in.
        delta_y: f64,
    },
}

/// All input the gesture engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Raw pointer input.
    Pointer(PointerEvent),
    /// Raw wheel input.
    Wheel(WheelEvent),
    /// Pre-recognized gesture value.
    Gesture(GestureEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_serde_tags() {
        let event = InputEvent::Gesture(GestureEvent::Drag { x: 1.0, y: 2.0 });
        let json = serde_json::to_value(event).expect("serialize");
        assert_eq!(json["type"], "Gesture");
        assert_eq!(json["data"]["gesture"], "drag");

        let back: InputEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn test_pointer_phase_lowercase() {
        let json = serde_json::to_string(&PointerPhase::Cancel).expect("serialize");
        assert_eq!(json, "\"cancel\"");
    }
}
