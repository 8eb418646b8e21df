//! Overlay transform state and its mutation rules.

use serde::{Deserialize, Serialize};

/// Smallest scale the overlay may be shrunk to.
pub const SCALE_MIN: f64 = 0.5;
/// Largest scale the overlay may be grown to.
pub const SCALE_MAX: f64 = 3.0;

/// Clamp a proposed scale into `[SCALE_MIN, SCALE_MAX]`.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(SCALE_MIN, SCALE_MAX)
}

/// 2-D placement of the reference glyph over the video feed.
///
/// Offsets are in surface pixels relative to the surface center,
/// rotation is in degrees and unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Horizontal offset from the surface center.
    pub offset_x: f64,
    /// Vertical offset from the surface center.
    pub offset_y: f64,
    /// Uniform scale, always within `[SCALE_MIN, SCALE_MAX]`.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Transform {
    /// The identity transform `{0, 0, 1, 0}`.
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A partial transform update. Fields left as `None` keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformUpdate {
    /// New horizontal offset.
    pub offset_x: Option<f64>,
    /// New vertical offset.
    pub offset_y: Option<f64>,
    /// New scale (clamped on apply).
    pub scale: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
}

impl TransformUpdate {
    /// Update that sets both offsets.
    #[must_use]
    pub fn offset(x: f64, y: f64) -> Self {
        Self {
            offset_x: Some(x),
            offset_y: Some(y),
            ..Self::default()
        }
    }

    /// Update that sets only the scale.
    #[must_use]
    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    /// Update that sets scale and rotation together.
    #[must_use]
    pub fn scale_rotation(scale: f64, rotation: f64) -> Self {
        Self {
            scale: Some(scale),
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// Whether this update touches no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset_x.is_none()
            && self.offset_y.is_none()
            && self.scale.is_none()
            && self.rotation.is_none()
    }
}

/// Holds the current [`Transform`] and enforces its invariants.
#[derive(Debug, Clone, Default)]
pub struct TransformStore {
    current: Transform,
}

impl TransformStore {
    /// Create a store holding the identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an initial transform, clamping its scale.
    #[must_use]
    pub fn with_initial(initial: Transform) -> Self {
        let mut store = Self::new();
        store.apply(TransformUpdate {
            offset_x: Some(initial.offset_x),
            offset_y: Some(initial.offset_y),
            scale: Some(initial.scale),
            rotation: Some(initial.rotation),
        });
        store
    }

    /// The current transform.
    #[must_use]
    pub fn get(&self) -> Transform {
        self.current
    }

    /// Merge `update` into the current transform.
    ///
    /// The merge is computed on a copy and committed in one assignment, so a
    /// reader never sees a half-applied update. Non-finite values are dropped.
    pub fn apply(&mut self, update: TransformUpdate) -> Transform {
        let mut next = self.current;
        if let Some(x) = update.offset_x.filter(|v| v.is_finite()) {
            next.offset_x = x;
        }
        if let Some(y) = update.offset_y.filter(|v| v.is_finite()) {
            next.offset_y = y;
        }
        if let Some(scale) = update.scale.filter(|v| v.is_finite()) {
            next.scale = clamp_scale(scale);
        }
        if let Some(rotation) = update.rotation.filter(|v| v.is_finite()) {
            next.rotation = rotation;
        }
        self.current = next;
        next
    }

    /// Restore the identity transform.
    pub fn reset(&mut self) -> Transform {
        self.current = Transform::IDENTITY;
        self.current
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut store = TransformStore::new();
        store.apply(TransformUpdate::offset(10.0, 20.0));
        let t = store.apply(TransformUpdate::scale(2.0));

        assert_eq!(t.offset_x, 10.0);
        assert_eq!(t.offset_y, 20.0);
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_scale_is_clamped_not_rejected() {
        let mut store = TransformStore::new();
        assert_eq!(store.apply(TransformUpdate::scale(10.0)).scale, SCALE_MAX);
        assert_eq!(store.apply(TransformUpdate::scale(0.01)).scale, SCALE_MIN);
        assert_eq!(store.apply(TransformUpdate::scale(-4.0)).scale, SCALE_MIN);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut store = TransformStore::new();
        store.apply(TransformUpdate::offset(5.0, 5.0));
        let t = store.apply(TransformUpdate {
            offset_x: Some(f64::NAN),
            scale: Some(f64::INFINITY),
            rotation: Some(f64::NEG_INFINITY),
            ..TransformUpdate::default()
        });

        assert_eq!(t.offset_x, 5.0);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_rotation_is_unbounded() {
        let mut store = TransformStore::new();
        let t = store.apply(TransformUpdate::scale_rotation(1.0, 725.0));
        assert_eq!(t.rotation, 725.0);
    }

    #[test]
    fn test_reset_yields_identity() {
        let mut store = TransformStore::with_initial(Transform {
            offset_x: -3.0,
            offset_y: 99.0,
            scale: 2.5,
            rotation: 45.0,
        });
        assert_eq!(store.reset(), Transform::IDENTITY);
        assert_eq!(store.get(), Transform::IDENTITY);
    }

    #[test]
    fn test_with_initial_clamps() {
        let store = TransformStore::with_initial(Transform {
            scale: 7.0,
            ..Transform::IDENTITY
        });
        assert_eq!(store.get().scale, SCALE_MAX);
    }

    #[test]
    fn test_transform_serializes_camel_case() {
        let json = serde_json::to_value(Transform::IDENTITY).expect("serialize");
        assert_eq!(json["offsetX"], 0.0);
        assert_eq!(json["scale"], 1.0);
    }

    #[test]
    fn test_empty_update() {
        assert!(TransformUpdate::default().is_empty());
        assert!(!TransformUpdate::scale(1.0).is_empty());
    }
}
