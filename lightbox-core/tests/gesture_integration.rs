//! Gesture Engine Integration Tests
//!
//! Tests the overlay manipulation flow including:
//! - Drag, pinch, and wheel reduction
//! - Scale clamping under arbitrary input
//! - Reset semantics, including mid-gesture

use lightbox_core::{
    GestureEngine, GestureEvent, InputEvent, PointerEvent, Transform, WheelEvent, SCALE_MAX,
    SCALE_MIN,
};
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Drive a one-finger drag from `from` to `to`.
fn drag(engine: &mut GestureEngine, from: (f64, f64), to: (f64, f64)) {
    engine.pointer(PointerEvent::down(1, from.0, from.1));
    engine.pointer(PointerEvent::moved(1, to.0, to.1));
    engine.pointer(PointerEvent::up(1, to.0, to.1));
}

// ============================================================================
// Reducer Tests
// ============================================================================

#[test]
fn test_drag_sets_offsets_directly() {
    let mut engine = GestureEngine::new();
    engine.apply(GestureEvent::Drag { x: 15.0, y: 15.0 });
    let t = engine.apply(GestureEvent::Drag { x: 120.0, y: -40.0 });

    assert!(close(t.offset_x, 120.0));
    assert!(close(t.offset_y, -40.0));
}

#[test]
fn test_out_of_order_drag_reports_converge() {
    let mut engine = GestureEngine::new();
    engine.apply(GestureEvent::Drag { x: 30.0, y: 30.0 });
    engine.apply(GestureEvent::Drag { x: 10.0, y: 10.0 });
    let t = engine.apply(GestureEvent::Drag { x: 30.0, y: 30.0 });

    assert!(close(t.offset_x, 30.0));
    assert!(close(t.offset_y, 30.0));
}

#[test]
fn test_negative_wheel_grows_by_step() {
    let mut engine = GestureEngine::new();
    let t = engine.wheel(WheelEvent { delta_y: -1.0 });
    assert!(close(t.scale, 1.1));
}

#[test]
fn test_wheel_clamps_at_max() {
    let mut engine = GestureEngine::new();
    engine.set_scale(2.95);
    let t = engine.wheel(WheelEvent { delta_y: -120.0 });
    assert_eq!(t.scale, 3.0);
}

#[test]
fn test_wheel_clamps_at_min() {
    let mut engine = GestureEngine::new();
    for _ in 0..20 {
        engine.wheel(WheelEvent { delta_y: 1.0 });
    }
    assert_eq!(engine.transform().scale, SCALE_MIN);
}

#[test]
fn test_pinch_then_wheel_last_write_wins() {
    let mut engine = GestureEngine::new();
    engine.apply(GestureEvent::Pinch {
        scale: 2.0,
        rotation: 30.0,
    });
    let t = engine.handle(InputEvent::Wheel(WheelEvent { delta_y: 1.0 }));

    assert!(close(t.scale, 1.9));
    assert!(close(t.rotation, 30.0));
}

#[test]
fn test_pinch_rotation_not_clamped() {
    let mut engine = GestureEngine::new();
    let t = engine.apply(GestureEvent::Pinch {
        scale: 1.0,
        rotation: -1080.0,
    });
    assert!(close(t.rotation, -1080.0));
}

#[test]
fn test_drag_and_pinch_write_disjoint_fields() {
    let mut engine = GestureEngine::new();
    engine.apply(GestureEvent::Drag { x: 5.0, y: 6.0 });
    let t = engine.apply(GestureEvent::Pinch {
        scale: 1.5,
        rotation: 10.0,
    });

    assert!(close(t.offset_x, 5.0));
    assert!(close(t.offset_y, 6.0));
    assert!(close(t.scale, 1.5));
}

// ============================================================================
// Reset Tests
// ============================================================================

#[test]
fn test_reset_restores_identity_from_any_state() {
    let mut engine = GestureEngine::new();
    drag(&mut engine, (0.0, 0.0), (300.0, -12.0));
    engine.apply(GestureEvent::Pinch {
        scale: 2.7,
        rotation: 200.0,
    });

    assert_eq!(engine.reset(), Transform::IDENTITY);
}

#[test]
fn test_drag_after_reset_starts_from_zero() {
    let mut engine = GestureEngine::new();
    drag(&mut engine, (0.0, 0.0), (80.0, 80.0));
    engine.reset();

    drag(&mut engine, (10.0, 10.0), (15.0, 12.0));
    let t = engine.transform();
    assert!(close(t.offset_x, 5.0));
    assert!(close(t.offset_y, 2.0));
}

#[test]
fn test_reset_mid_drag_rebases_gesture() {
    let mut engine = GestureEngine::new();
    engine.pointer(PointerEvent::down(1, 0.0, 0.0));
    engine.pointer(PointerEvent::moved(1, 100.0, 0.0));
    engine.reset();

    // The finger is still down at x=100; moving one more pixel is one pixel.
    engine.pointer(PointerEvent::moved(1, 101.0, 0.0));
    assert!(close(engine.transform().offset_x, 1.0));
}

#[test]
fn test_reset_mid_pinch_rebases_to_unit_scale() {
    let mut engine = GestureEngine::new();
    engine.pointer(PointerEvent::down(1, 0.0, 0.0));
    engine.pointer(PointerEvent::down(2, 100.0, 0.0));
    engine.pointer(PointerEvent::moved(2, 250.0, 0.0));
    engine.reset();

    engine.pointer(PointerEvent::moved(2, 250.0, 0.0));
    assert!(close(engine.transform().scale, 1.0));
}

// ============================================================================
// Clamping Law
// ============================================================================

proptest! {
    #[test]
    fn prop_scale_stays_in_bounds(
        pinches in prop::collection::vec(-1.0e6f64..1.0e6, 0..20),
        wheels in prop::collection::vec(-10.0f64..10.0, 0..40),
        slider in -100.0f64..100.0,
    ) {
        let mut engine = GestureEngine::new();
        for scale in pinches {
            let t = engine.apply(GestureEvent::Pinch { scale, rotation: 0.0 });
            prop_assert!((SCALE_MIN..=SCALE_MAX).contains(&t.scale));
        }
        for delta_y in wheels {
            let t = engine.wheel(WheelEvent { delta_y });
            prop_assert!((SCALE_MIN..=SCALE_MAX).contains(&t.scale));
        }
        let t = engine.set_scale(slider);
        prop_assert!((SCALE_MIN..=SCALE_MAX).contains(&t.scale));
    }

    #[test]
    fn prop_reset_is_identity(x in -1.0e4f64..1.0e4, y in -1.0e4f64..1.0e4, s in 0.0f64..10.0) {
        let mut engine = GestureEngine::new();
        engine.apply(GestureEvent::Drag { x, y });
        engine.apply(GestureEvent::Pinch { scale: s, rotation: x });
        prop_assert_eq!(engine.reset(), Transform::IDENTITY);
    }
}
