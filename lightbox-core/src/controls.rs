//! The per-frame controls snapshot read by the render loop.

use serde::{Deserialize, Serialize};

use crate::transform::{clamp_scale, Transform};

/// Opacity the overlay starts at and returns to on reset.
pub const DEFAULT_OPACITY: f64 = 0.5;

/// Transform plus overlay opacity.
///
/// This is the single snapshot the render loop reads each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsState {
    /// Glyph placement.
    #[serde(flatten)]
    pub transform: Transform,
    /// Overlay opacity in `[0, 1]`.
    pub opacity: f64,
}

impl ControlsState {
    /// Create a controls state, clamping both opacity and scale.
    #[must_use]
    pub fn new(transform: Transform, opacity: f64) -> Self {
        let mut state = Self {
            transform,
            opacity: DEFAULT_OPACITY,
        };
        state.transform.scale = if transform.scale.is_finite() {
            clamp_scale(transform.scale)
        } else {
            Transform::IDENTITY.scale
        };
        state.set_opacity(opacity);
        state
    }

    /// Set opacity from a UI control. Values are clamped into `[0, 1]`,
    /// non-finite values are ignored.
    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Replace the transform part, keeping opacity.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Opacity as a percentage, rounded, for display next to a slider.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn opacity_percent(&self) -> i64 {
        (self.opacity * 100.0).round() as i64
    }
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            opacity: DEFAULT_OPACITY,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controls() {
        let controls = ControlsState::default();
        assert_eq!(controls.opacity, 0.5);
        assert_eq!(controls.transform, Transform::IDENTITY);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut controls = ControlsState::default();
        controls.set_opacity(1.7);
        assert_eq!(controls.opacity, 1.0);
        controls.set_opacity(-0.2);
        assert_eq!(controls.opacity, 0.0);
        controls.set_opacity(f64::NAN);
        assert_eq!(controls.opacity, 0.0);
    }

    #[test]
    fn test_new_clamps_scale() {
        let controls = ControlsState::new(
            Transform {
                scale: 0.1,
                ..Transform::IDENTITY
            },
            0.75,
        );
        assert_eq!(controls.transform.scale, 0.5);
        assert_eq!(controls.opacity_percent(), 75);
    }

    #[test]
    fn test_serializes_flat() {
        let json = serde_json::to_value(ControlsState::default()).expect("serialize");
        assert_eq!(json["opacity"], 0.5);
        assert_eq!(json["rotation"], 0.0);
    }
}
