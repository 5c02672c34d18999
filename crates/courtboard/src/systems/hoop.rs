use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::HoopSide;

/// Hoop placement and dunk debounce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopConfig {
    pub left: Vec2,
    pub right: Vec2,
    /// A loose ball strictly closer than this to a hoop counts as a dunk.
    pub radius: f32,
    /// Dunks closer together than this are reported once.
    pub debounce_ms: f64,
}

impl Default for HoopConfig {
    fn default() -> Self {
        Self {
            left: Vec2::new(10.0, 50.0),
            right: Vec2::new(86.0, 50.0),
            radius: 7.0,
            debounce_ms: 1000.0,
        }
    }
}

/// Watches the loose ball for passes over a hoop.
#[derive(Debug, Clone)]
pub struct HoopDetector {
    config: HoopConfig,
    last_dunk_ms: Option<f64>,
}

impl HoopDetector {
    pub fn new(config: HoopConfig) -> Self {
        Self {
            config,
            last_dunk_ms: None,
        }
    }

    /// Check a loose ball position. Returns the hoop it is over, unless a
    /// dunk was already reported within the debounce window. The left hoop
    /// wins when both are in range.
    pub fn check(&mut self, ball: Vec2, now_ms: f64) -> Option<HoopSide> {
        let side = if ball.distance(self.config.left) < self.config.radius {
            HoopSide::Left
        } else if ball.distance(self.config.right) < self.config.radius {
            HoopSide::Right
        } else {
            return None;
        };

        if let Some(last) = self.last_dunk_ms {
            if now_ms - last < self.config.debounce_ms {
                return None;
            }
        }
        self.last_dunk_ms = Some(now_ms);
        log::debug!("dunk on {side:?} hoop");
        Some(side)
    }

    pub fn config(&self) -> &HoopConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.last_dunk_ms = None;
    }
}
