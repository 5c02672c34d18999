//! Freehand stroke capture and smoothing.
//!
//! A stroke is captured as a throttled stream of raw points ([`RawStroke`]).
//! When the gesture ends, [`smooth`] thins the path with slope-based
//! decimation and rounds it with one pass of corner cutting. The result is
//! a plain polyline; turning it into curves is the renderer's job (see
//! `systems::curve`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Capture and smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Minimum time between two sample attempts.
    pub min_sample_interval_ms: f64,
    /// A sample must be farther than this from the last kept point.
    pub min_sample_distance: f32,
    /// Slope change above which an interior point survives decimation.
    pub slope_threshold: f32,
    /// Every n-th interior point survives decimation regardless of slope.
    pub keep_every: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_sample_interval_ms: 16.0,
            min_sample_distance: 0.5,
            slope_threshold: 0.2,
            keep_every: 3,
        }
    }
}

/// Outcome of offering a point to a [`RawStroke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleResult {
    /// Point appended to the stroke.
    Kept,
    /// Too soon after the previous attempt.
    Throttled,
    /// Too close to the last kept point.
    TooClose,
}

/// Raw points captured during one draw gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStroke {
    points: Vec<Vec2>,
    last_attempt_ms: f64,
    config: SmoothingConfig,
}

impl RawStroke {
    pub fn begin(start: Vec2, now_ms: f64, config: SmoothingConfig) -> Self {
        let mut points = Vec::with_capacity(128);
        points.push(start);
        Self {
            points,
            last_attempt_ms: now_ms,
            config,
        }
    }

    /// Offer a new pointer position.
    pub fn sample(&mut self, p: Vec2, now_ms: f64) -> SampleResult {
        if now_ms - self.last_attempt_ms < self.config.min_sample_interval_ms {
            return SampleResult::Throttled;
        }
        self.last_attempt_ms = now_ms;

        let last = self.points[self.points.len() - 1];
        if last.distance(p) <= self.config.min_sample_distance {
            return SampleResult::TooClose;
        }
        self.points.push(p);
        SampleResult::Kept
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smooth the captured path. `None` when fewer than two points were
    /// captured, which is not a line.
    pub fn finish(&self) -> Option<Vec<Vec2>> {
        if self.points.len() < 2 {
            return None;
        }
        Some(smooth(&self.points, &self.config))
    }
}

/// Decimate then corner-cut. Inputs of two points or fewer pass through.
pub fn smooth(points: &[Vec2], config: &SmoothingConfig) -> Vec<Vec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let kept = decimate(points, config.slope_threshold, config.keep_every);
    corner_cut(&kept)
}

/// Keep interior points where the slope turns by more than `threshold`, or
/// whose index is a multiple of `keep_every`. First and last always stay.
pub fn decimate(points: &[Vec2], threshold: f32, keep_every: usize) -> Vec<Vec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let keep_every = keep_every.max(1);
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);

    let mut prev = points[0];
    for i in 1..points.len() - 1 {
        let p = points[i];
        let next = points[i + 1];
        let turn = (slope(prev, p) - slope(p, next)).abs();
        if turn > threshold || i % keep_every == 0 {
            out.push(p);
            prev = p;
        }
    }

    out.push(points[points.len() - 1]);
    out
}

/// One pass of corner cutting: every segment contributes its 1/4 and 3/4
/// points; the original endpoints are kept.
pub fn corner_cut(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);
    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        out.push(p0 * 0.75 + p1 * 0.25);
        out.push(p0 * 0.25 + p1 * 0.75);
    }
    out.push(points[points.len() - 1]);
    out
}

#[inline]
fn slope(a: Vec2, b: Vec2) -> f32 {
    let dx = b.x - a.x;
    let dx = if dx == 0.0 { 0.001 } else { dx };
    (b.y - a.y) / dx
}
