use crate::api::types::LineId;

/// Detects a double tap on a committed line.
#[derive(Debug, Clone)]
pub struct LineTapDetector {
    window_ms: f64,
    last: Option<(LineId, f64)>,
}

impl LineTapDetector {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// Register a tap. Returns true when it completes a double tap on the
    /// same line; the detector then starts over.
    pub fn tap(&mut self, line: LineId, now_ms: f64) -> bool {
        if let Some((prev, at)) = self.last {
            if prev == line && now_ms - at < self.window_ms {
                self.last = None;
                return true;
            }
        }
        self.last = Some((line, now_ms));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for LineTapDetector {
    fn default() -> Self {
        Self::new(500.0)
    }
}
