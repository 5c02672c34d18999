use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::BoardError;
use crate::extensions::easing::Easing;
use crate::systems::hoop::HoopConfig;
use crate::systems::roster::RosterLayout;
use crate::systems::smoothing::SmoothingConfig;

/// Device class the board runs on. Selects flight timing and touch radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceProfile {
    /// Mouse or trackpad, fast renderer.
    #[default]
    Desktop,
    /// Touch-first mobile device: slower, flatter passes and a larger ball hit area.
    Touch,
}

/// Flight timing and hit-test values derived from a [`DeviceProfile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTuning {
    /// Shortest flight duration in milliseconds.
    pub min_duration_ms: f64,
    /// Longest flight duration in milliseconds.
    pub max_duration_ms: f64,
    /// Peak height of the pass arc in surface percent.
    pub arc_height: f32,
    /// Radius around the ball that counts as touching it.
    pub ball_hit_radius: f32,
}

impl DeviceProfile {
    pub fn flight_tuning(self) -> FlightTuning {
        match self {
            DeviceProfile::Desktop => FlightTuning {
                min_duration_ms: 600.0,
                max_duration_ms: 1200.0,
                arc_height: 8.0,
                ball_hit_radius: 4.0,
            },
            DeviceProfile::Touch => FlightTuning {
                min_duration_ms: 800.0,
                max_duration_ms: 1500.0,
                arc_height: 4.0,
                ball_hit_radius: 6.0,
            },
        }
    }
}

/// Board configuration. Every field has a default, so a host may pass `{}`
/// or override only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Device class (flight duration bounds, arc height, ball hit radius).
    pub profile: DeviceProfile,
    /// Easing applied to flight progress.
    pub flight_easing: Easing,
    /// Flight milliseconds per unit of distance before clamping.
    pub flight_ms_per_unit: f64,
    /// Extra time past the flight duration before the watchdog lands the ball.
    pub watchdog_grace_ms: f64,
    /// Where the ball sits relative to its holder.
    pub ball_offset: Vec2,
    /// Radius around a release point in which a token can receive a pass.
    pub pass_capture_radius: f32,
    /// Freehand stroke capture and smoothing parameters.
    pub smoothing: SmoothingConfig,
    /// Cardinal spline tension used when turning lines into curves.
    pub curve_tension: f32,
    /// Hoop positions and dunk detection.
    pub hoops: HoopConfig,
    /// Maximum number of undo entries kept.
    pub max_history: usize,
    /// Two taps on the same line within this window delete it.
    pub double_tap_ms: f64,
    /// Canonical token positions.
    pub layout: RosterLayout,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            profile: DeviceProfile::Desktop,
            flight_easing: Easing::QuadInOut,
            flight_ms_per_unit: 20.0,
            watchdog_grace_ms: 1000.0,
            ball_offset: Vec2::new(0.0, 2.0),
            pass_capture_radius: 7.0,
            smoothing: SmoothingConfig::default(),
            curve_tension: 0.2,
            hoops: HoopConfig::default(),
            max_history: 100,
            double_tap_ms: 500.0,
            layout: RosterLayout::default(),
        }
    }
}

impl BoardConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let config: BoardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn flight_tuning(&self) -> FlightTuning {
        self.profile.flight_tuning()
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.pass_capture_radius <= 0.0 {
            return Err(BoardError::Config("pass_capture_radius must be positive".into()));
        }
        if !(self.flight_ms_per_unit.is_finite() && self.flight_ms_per_unit > 0.0) {
            return Err(BoardError::Config("flight_ms_per_unit must be a positive number".into()));
        }
        if !(self.watchdog_grace_ms.is_finite() && self.watchdog_grace_ms >= 0.0) {
            return Err(BoardError::Config("watchdog_grace_ms must be a non-negative number".into()));
        }
        if self.smoothing.keep_every == 0 {
            return Err(BoardError::Config("smoothing.keep_every must be at least 1".into()));
        }
        if self.max_history == 0 {
            return Err(BoardError::Config("max_history must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = BoardConfig::from_json("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.flight_easing, Easing::QuadInOut);
    }

    #[test]
    fn partial_override() {
        let json = r#"{ "profile": "Touch", "max_history": 8 }"#;
        let config = BoardConfig::from_json(json).unwrap();
        assert_eq!(config.profile, DeviceProfile::Touch);
        assert_eq!(config.max_history, 8);
        assert_eq!(config.pass_capture_radius, 7.0);
        let tuning = config.flight_tuning();
        assert_eq!(tuning.min_duration_ms, 800.0);
        assert_eq!(tuning.arc_height, 4.0);
    }

    #[test]
    fn rejects_zero_history() {
        let err = BoardConfig::from_json(r#"{ "max_history": 0 }"#).unwrap_err();
        assert!(matches!(err, BoardError::Config(_)));
    }

    #[test]
    fn rejects_bad_flight_timing() {
        for json in [
            r#"{ "flight_ms_per_unit": -20.0 }"#,
            r#"{ "flight_ms_per_unit": 0.0 }"#,
            r#"{ "watchdog_grace_ms": -1.0 }"#,
        ] {
            let err = BoardConfig::from_json(json).unwrap_err();
            assert!(matches!(err, BoardError::Config(_)), "{json} accepted");
        }
        let config = BoardConfig::from_json(r#"{ "watchdog_grace_ms": 0.0 }"#).unwrap();
        assert_eq!(config.watchdog_grace_ms, 0.0);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = BoardConfig::from_json("{ profile: ").unwrap_err();
        assert!(matches!(err, BoardError::Config(_)));
    }
}
