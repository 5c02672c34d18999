use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::LineId;

/// A freehand tactical line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    /// Ordered points in surface percent.
    pub path: Vec<Vec2>,
    /// Sealed lines are immutable except for deletion.
    pub finalized: bool,
}

impl Line {
    /// Start an in-progress line at `start`.
    pub fn begin(id: LineId, start: Vec2) -> Self {
        Self {
            id,
            path: vec![start],
            finalized: false,
        }
    }

    /// Seal a line with its final (smoothed) path.
    pub fn sealed(id: LineId, path: Vec<Vec2>) -> Self {
        Self {
            id,
            path,
            finalized: true,
        }
    }

    /// Append a captured point. Ignored once the line is sealed.
    pub fn push(&mut self, p: Vec2) {
        if !self.finalized {
            self.path.push(p);
        }
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}
