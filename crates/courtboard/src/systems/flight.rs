// systems/flight.rs
//
// Ball flight animator: one arced pass at a time.
//
// The host owns the clock. `step` is the per-frame callback and
// `poll_watchdog` the timeout callback; both are armed at `start` and
// disarmed on landing, cancel and teardown, so a flight lands exactly once.
//
// Usage:
//   let mut flight = BallFlight::new(FlightParams::from_config(&config));
//   flight.start(&mut scene, Some(passer), receiver, now)?;
//   flight.step(&mut scene, now);           // every animation frame
//   flight.poll_watchdog(&mut scene, now);  // on every timer tick

use glam::Vec2;

use crate::api::config::{BoardConfig, FlightTuning};
use crate::api::error::BoardError;
use crate::api::types::TokenId;
use crate::core::scene::SceneState;
use crate::extensions::easing::{arc_point, Easing};

/// Timing and shape of every flight, fixed per board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightParams {
    pub easing: Easing,
    pub ms_per_unit: f64,
    pub grace_ms: f64,
    pub tuning: FlightTuning,
}

impl FlightParams {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            easing: config.flight_easing,
            ms_per_unit: config.flight_ms_per_unit,
            grace_ms: config.watchdog_grace_ms,
            tuning: config.flight_tuning(),
        }
    }

    /// Flight time for a pass of the given length.
    pub fn duration_for(&self, distance: f32) -> f64 {
        (distance as f64 * self.ms_per_unit)
            .clamp(self.tuning.min_duration_ms, self.tuning.max_duration_ms)
    }
}

impl Default for FlightParams {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

/// A pass in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    /// Passer. `None` when a loose ball was thrown.
    pub origin: Option<TokenId>,
    pub target: TokenId,
    pub start: Vec2,
    pub end: Vec2,
    pub start_time_ms: f64,
    pub duration_ms: f64,
}

impl Flight {
    /// Normalized progress [0, 1] at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_time_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// What a callback did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightOutcome {
    /// Nothing was scheduled.
    Idle,
    /// Ball moved along the arc.
    InFlight { pos: Vec2 },
    /// Ball reached its target. `forced` when the watchdog or a manual
    /// completion landed it.
    Landed { target: TokenId, forced: bool },
}

/// Owns the ball for the duration of a pass.
#[derive(Debug, Clone)]
pub struct BallFlight {
    params: FlightParams,
    active: Option<Flight>,
    frame_requested: bool,
    watchdog_deadline_ms: Option<f64>,
}

impl BallFlight {
    pub fn new(params: FlightParams) -> Self {
        Self {
            params,
            active: None,
            frame_requested: false,
            watchdog_deadline_ms: None,
        }
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Flight> {
        self.active.as_ref()
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn watchdog_deadline(&self) -> Option<f64> {
        self.watchdog_deadline_ms
    }

    /// Launch a pass from `origin` (or the loose ball) to `target`.
    pub fn start(
        &mut self,
        scene: &mut SceneState,
        origin: Option<TokenId>,
        target: TokenId,
        now_ms: f64,
    ) -> Result<Flight, BoardError> {
        if self.active.is_some() {
            return Err(BoardError::AlreadyInFlight);
        }
        if origin == Some(target) {
            return Err(BoardError::InvalidFlight);
        }
        let target_pos = scene.get(target).ok_or(BoardError::InvalidFlight)?.pos;
        if scene.ball().holder != origin {
            return Err(BoardError::InvalidFlight);
        }

        let offset = scene.ball_offset();
        let start = match origin {
            Some(id) => scene.get(id).ok_or(BoardError::InvalidFlight)?.pos + offset,
            None => scene.ball().pos,
        };
        let end = target_pos + offset;
        let duration_ms = self.params.duration_for(start.distance(end));

        let flight = Flight {
            origin,
            target,
            start,
            end,
            start_time_ms: now_ms,
            duration_ms,
        };

        scene.release_ball();
        scene.place_ball(start);
        self.active = Some(flight);
        self.frame_requested = true;
        self.watchdog_deadline_ms = Some(now_ms + duration_ms + self.params.grace_ms);

        log::debug!("flight {origin:?} -> {target:?} over {duration_ms:.0}ms");
        Ok(flight)
    }

    /// Frame callback: advance the ball along the arc, landing it at the end.
    pub fn step(&mut self, scene: &mut SceneState, now_ms: f64) -> FlightOutcome {
        if !self.frame_requested {
            return FlightOutcome::Idle;
        }
        let Some(flight) = self.active else {
            self.frame_requested = false;
            return FlightOutcome::Idle;
        };

        let p = flight.progress(now_ms);
        if p >= 1.0 {
            return self.land(scene, false);
        }

        let e = self.params.easing.apply(p);
        let pos = arc_point(flight.start, flight.end, e, self.params.tuning.arc_height);
        scene.place_ball(pos);
        FlightOutcome::InFlight { pos }
    }

    /// Timeout callback: land a flight whose frames stopped arriving.
    pub fn poll_watchdog(&mut self, scene: &mut SceneState, now_ms: f64) -> FlightOutcome {
        match self.watchdog_deadline_ms {
            Some(deadline) if now_ms >= deadline && self.active.is_some() => {
                log::info!("flight watchdog fired, landing ball");
                self.land(scene, true)
            }
            _ => FlightOutcome::Idle,
        }
    }

    /// Land the current flight right away. No-op when idle.
    pub fn force_complete(&mut self, scene: &mut SceneState) -> FlightOutcome {
        if self.active.is_none() {
            return FlightOutcome::Idle;
        }
        log::info!("forcing stuck flight to land");
        self.land(scene, true)
    }

    /// Abort the flight and give the ball back to the passer. Returns false
    /// when there was nothing to cancel.
    pub fn cancel(&mut self, scene: &mut SceneState) -> bool {
        let Some(flight) = self.active.take() else {
            return false;
        };
        self.disarm();

        let returned = flight.origin.is_some_and(|id| scene.give_ball(id));
        if !returned {
            scene.release_ball();
            scene.place_ball(flight.start);
        }
        log::debug!("flight to {:?} cancelled", flight.target);
        true
    }

    /// Drop the flight and its callbacks without touching the scene.
    pub fn teardown(&mut self) {
        self.active = None;
        self.disarm();
    }

    fn land(&mut self, scene: &mut SceneState, forced: bool) -> FlightOutcome {
        let Some(flight) = self.active.take() else {
            return FlightOutcome::Idle;
        };
        self.disarm();

        // The receiver may have been dragged mid-flight; the ball follows it.
        if !scene.give_ball(flight.target) {
            scene.place_ball(flight.end);
        }
        log::debug!("flight landed on {:?} (forced: {forced})", flight.target);
        FlightOutcome::Landed {
            target: flight.target,
            forced,
        }
    }

    fn disarm(&mut self) {
        self.frame_requested = false;
        self.watchdog_deadline_ms = None;
    }
}

impl Default for BallFlight {
    fn default() -> Self {
        Self::new(FlightParams::default())
    }
}
