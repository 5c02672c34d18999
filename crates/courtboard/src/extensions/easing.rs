// extensions/easing.rs
//
// Easing curves and interpolation for ball flights.
// Pure math, no scene access.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing function applied to normalized flight progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end. The default for passes.
    #[default]
    QuadInOut,
    /// Stronger slow start and end.
    CubicInOut,
    /// Sine wave easing (smooth).
    SineInOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t` in [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linearly interpolate between two points.
#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Height factor of a parabolic arc at progress `t`: 0 at both ends, 1 at the midpoint.
#[inline]
pub fn arc_lift(t: f32) -> f32 {
    -4.0 * (t - 0.5) * (t - 0.5) + 1.0
}

/// Point along an arced path from `from` to `to` at eased progress `t`.
/// Y grows downward on the court, so the arc is subtracted to make the ball rise.
#[inline]
pub fn arc_point(from: Vec2, to: Vec2, t: f32, arc_height: f32) -> Vec2 {
    Vec2::new(
        lerp(from.x, to.x, t),
        lerp(from.y, to.y, t) - arc_height * arc_lift(t),
    )
}
