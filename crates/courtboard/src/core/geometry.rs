//! Surface coordinate mapping.
//!
//! Everything inside the engine lives in percentage-of-surface space:
//! `(0, 0)` is the top-left corner of the court and `(100, 100)` the
//! bottom-right. Host pointer events arrive in device pixels and are mapped
//! through the surface's bounding rectangle.

use glam::Vec2;

/// Bounding rectangle of the drawing surface in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }
}

/// Host capability: look up the surface's current bounding box.
/// Returns `None` while the surface is not mounted.
pub trait SurfaceProvider {
    fn surface_rect(&self) -> Option<SurfaceRect>;
}

/// A surface with a fixed rectangle (headless hosts and tests).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSurface(pub Option<SurfaceRect>);

impl FixedSurface {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self(Some(SurfaceRect::new(left, top, width, height)))
    }

    /// A surface whose pixel space equals percentage space.
    pub fn unit() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    pub fn unmounted() -> Self {
        Self(None)
    }
}

impl SurfaceProvider for FixedSurface {
    fn surface_rect(&self) -> Option<SurfaceRect> {
        self.0
    }
}

/// Map client pixels to surface percent.
///
/// Returns `Vec2::ZERO` when the surface is unmounted. A zero-sized surface
/// produces non-finite values; callers check [`is_valid_point`] and abort
/// the gesture.
pub fn to_surface_percent(client: Vec2, surface: Option<SurfaceRect>) -> Vec2 {
    let Some(rect) = surface else {
        return Vec2::ZERO;
    };
    Vec2::new(
        (client.x - rect.left) / rect.width * 100.0,
        (client.y - rect.top) / rect.height * 100.0,
    )
}

/// Euclidean distance in percentage space.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Both components are finite numbers.
#[inline]
pub fn is_valid_point(p: Vec2) -> bool {
    p.is_finite()
}
