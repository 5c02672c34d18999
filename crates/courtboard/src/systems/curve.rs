//! Cardinal spline curves through smoothed line points.
//!
//! Committed lines are stored as polylines. Hosts that want round strokes
//! ask for the cubic segments, or (with the `vectors` feature) a lyon
//! [`Path`](lyon::path::Path) they can stroke or flatten themselves.

use glam::Vec2;

/// One cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub from: Vec2,
    pub ctrl1: Vec2,
    pub ctrl2: Vec2,
    pub to: Vec2,
}

impl CubicSegment {
    /// Point on the segment at parameter `t` in [0, 1].
    pub fn sample(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.from * (u * u * u)
            + self.ctrl1 * (3.0 * u * u * t)
            + self.ctrl2 * (3.0 * u * t * t)
            + self.to * (t * t * t)
    }
}

/// Build one cubic segment per consecutive pair of points.
///
/// Control points are `p1 + (p2 - p0) * tension` and `p2 - (p3 - p1) * tension`,
/// with missing neighbours clamped to the ends. Two points give a single
/// straight segment; fewer give nothing.
pub fn cardinal_segments(points: &[Vec2], tension: f32) -> Vec<CubicSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    if n == 2 {
        return vec![CubicSegment {
            from: points[0],
            ctrl1: points[0],
            ctrl2: points[1],
            to: points[1],
        }];
    }

    let mut segments = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        segments.push(CubicSegment {
            from: p1,
            ctrl1: p1 + (p2 - p0) * tension,
            ctrl2: p2 - (p3 - p1) * tension,
            to: p2,
        });
    }
    segments
}

/// Build a lyon path through `points`.
#[cfg(feature = "vectors")]
pub fn build_path(points: &[Vec2], tension: f32) -> Option<lyon::path::Path> {
    use lyon::math::point;

    let segments = cardinal_segments(points, tension);
    let first = segments.first()?;

    let mut builder = lyon::path::Path::builder();
    builder.begin(point(first.from.x, first.from.y));
    for seg in &segments {
        builder.cubic_bezier_to(
            point(seg.ctrl1.x, seg.ctrl1.y),
            point(seg.ctrl2.x, seg.ctrl2.y),
            point(seg.to.x, seg.to.y),
        );
    }
    builder.end(false);
    Some(builder.build())
}

/// Smallest flattening tolerance handed to lyon.
#[cfg(feature = "vectors")]
pub const MIN_FLATTEN_TOLERANCE: f32 = 0.001;

/// Flatten a curve through `points` back into a dense polyline.
///
/// A tolerance that is not a positive finite number yields the input points
/// unchanged; tiny tolerances are raised to [`MIN_FLATTEN_TOLERANCE`].
#[cfg(feature = "vectors")]
pub fn flatten(points: &[Vec2], tension: f32, tolerance: f32) -> Vec<Vec2> {
    use lyon::path::iterator::PathIterator;
    use lyon::path::PathEvent;

    if !(tolerance.is_finite() && tolerance > 0.0) {
        log::warn!("flatten tolerance {tolerance} rejected, returning raw points");
        return points.to_vec();
    }
    let tolerance = tolerance.max(MIN_FLATTEN_TOLERANCE);
    let Some(path) = build_path(points, tension) else {
        return points.to_vec();
    };

    let mut out = Vec::with_capacity(points.len() * 4);
    for event in path.iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => out.push(Vec2::new(at.x, at.y)),
            PathEvent::Line { to, .. } => out.push(Vec2::new(to.x, to.y)),
            _ => {}
        }
    }
    out
}
