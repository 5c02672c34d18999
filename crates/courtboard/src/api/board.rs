use glam::Vec2;

use crate::api::config::BoardConfig;
use crate::api::error::BoardError;
use crate::api::types::{BoardEvent, GestureKind, HitTarget, LineId, PointerId, Slot, Team, TokenId};
use crate::components::token::Token;
use crate::core::geometry::{to_surface_percent, FixedSurface, SurfaceProvider};
use crate::core::scene::SceneState;
use crate::input::queue::{BoardCommand, InputEvent, InputQueue};
use crate::input::router::{PointerRouter, RouterConfig, RouterContext};
use crate::input::tap::LineTapDetector;
use crate::systems::curve::{cardinal_segments, CubicSegment};
use crate::systems::flight::{BallFlight, FlightOutcome, FlightParams};
use crate::systems::history::{HistoryStack, Snapshot};
use crate::systems::hoop::HoopDetector;
use crate::systems::roster::{Roster, FIRST_FREE_ID};

/// A pointer sample as the host reports it, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub client: Vec2,
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, client: Vec2, time_ms: f64) -> Self {
        Self { pointer, client, time_ms }
    }
}

/// The whiteboard: owns the scene and every system that edits it.
///
/// All mutation goes through this type. Each successful mutation pushes
/// [`BoardEvent`]s that the host collects with [`Whiteboard::drain_events`].
/// A refused operation returns an error and leaves the board untouched.
pub struct Whiteboard {
    config: BoardConfig,
    surface: Box<dyn SurfaceProvider>,
    scene: SceneState,
    roster: Roster,
    flight: BallFlight,
    history: HistoryStack,
    router: PointerRouter,
    hoops: HoopDetector,
    line_taps: LineTapDetector,
    events: Vec<BoardEvent>,
    next_token_id: u32,
}

impl Whiteboard {
    /// Create a board with the initial roster, reading pointer positions
    /// through `surface`.
    pub fn new(config: BoardConfig, surface: impl SurfaceProvider + 'static) -> Self {
        let mut scene = SceneState::new(config.ball_offset);
        let mut roster = Roster::new(config.layout);
        roster.spawn_initial(&mut scene);

        log::info!("board ready: {} tokens, profile {:?}", scene.len(), config.profile);

        Self {
            surface: Box::new(surface),
            roster,
            flight: BallFlight::new(FlightParams::from_config(&config)),
            history: HistoryStack::new(config.max_history),
            router: PointerRouter::new(RouterConfig::from_config(&config)),
            hoops: HoopDetector::new(config.hoops),
            line_taps: LineTapDetector::new(config.double_tap_ms),
            events: Vec::with_capacity(32),
            next_token_id: FIRST_FREE_ID,
            scene,
            config,
        }
    }

    /// A board whose client pixels are already surface percent.
    pub fn headless(config: BoardConfig) -> Self {
        Self::new(config, FixedSurface::unit())
    }

    pub fn set_surface(&mut self, surface: impl SurfaceProvider + 'static) {
        self.surface = Box::new(surface);
    }

    // -- Read access --

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_active()
    }

    pub fn flight(&self) -> &BallFlight {
        &self.flight
    }

    pub fn current_gesture(&self) -> Option<GestureKind> {
        self.router.current_gesture()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn line_path(&self, id: LineId) -> Option<&[Vec2]> {
        self.scene.line(id).map(|l| l.path.as_slice())
    }

    /// Cubic segments for drawing a committed line as a curve.
    pub fn line_segments(&self, id: LineId) -> Option<Vec<CubicSegment>> {
        self.line_path(id)
            .map(|path| cardinal_segments(path, self.config.curve_tension))
    }

    /// A committed line's curve flattened to a dense polyline.
    #[cfg(feature = "vectors")]
    pub fn line_outline(&self, id: LineId, tolerance: f32) -> Option<Vec<Vec2>> {
        self.line_path(id)
            .map(|path| crate::systems::curve::flatten(path, self.config.curve_tension, tolerance))
    }

    // -- Pointer input --

    /// Client pixels to surface percent. `None` while the surface is not
    /// mounted; the gesture cannot be placed and is aborted.
    fn to_surface(&self, client: Vec2) -> Option<Vec2> {
        let rect = self.surface.surface_rect();
        if rect.is_none() {
            log::debug!("pointer event with no mounted surface");
        }
        rect.map(|rect| to_surface_percent(client, Some(rect)))
    }

    fn split(&mut self) -> (&mut PointerRouter, RouterContext<'_>) {
        (
            &mut self.router,
            RouterContext {
                scene: &mut self.scene,
                history: &mut self.history,
                flight: &mut self.flight,
                events: &mut self.events,
            },
        )
    }

    pub fn handle_pointer_down(
        &mut self,
        event: PointerEvent,
        hit: HitTarget,
    ) -> Result<Option<GestureKind>, BoardError> {
        let pos = self
            .to_surface(event.client)
            .ok_or(BoardError::InvalidPointerCoordinates)?;
        let (router, mut ctx) = self.split();
        router.on_pointer_down(&mut ctx, event.pointer, pos, hit, event.time_ms)
    }

    pub fn handle_pointer_move(&mut self, event: PointerEvent) {
        let pos = self.to_surface(event.client);
        let (router, mut ctx) = self.split();
        match pos {
            Some(pos) => router.on_pointer_move(&mut ctx, event.pointer, pos, event.time_ms),
            None => router.abort_pointer(&mut ctx, event.pointer, event.time_ms),
        }
    }

    pub fn handle_pointer_up(&mut self, event: PointerEvent) {
        let pos = self.to_surface(event.client);
        let (router, mut ctx) = self.split();
        match pos {
            Some(pos) => router.on_pointer_up(&mut ctx, event.pointer, pos, event.time_ms),
            None => router.abort_pointer(&mut ctx, event.pointer, event.time_ms),
        }
    }

    pub fn handle_pointer_cancel(&mut self, pointer: PointerId, time_ms: f64) {
        let (router, mut ctx) = self.split();
        router.on_pointer_cancel(&mut ctx, pointer, time_ms);
    }

    // -- Commands --

    fn record(&mut self, snapshot: Snapshot) {
        self.history.record(snapshot);
        self.emit_history();
    }

    fn emit_history(&mut self) {
        self.events.push(BoardEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn ensure_idle(&self) -> Result<(), BoardError> {
        if self.flight.is_active() {
            return Err(BoardError::AlreadyInFlight);
        }
        Ok(())
    }

    /// Add a free token for `team` at the team's spawn point.
    pub fn add_token(&mut self, team: Team) -> Result<TokenId, BoardError> {
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;

        self.record(Snapshot::new().with_tokens(&self.scene).with_ball(&self.scene));
        let token = Token::new(id, team)
            .with_pos(self.roster.layout().free_spawn(team))
            .with_number(self.scene.next_number(team));
        log::debug!("added {id:?} #{} for team {team:?}", token.number);
        self.scene.spawn(token);
        self.events.push(BoardEvent::TokensChanged);
        Ok(id)
    }

    /// Remove a token. A ball carrier hands the ball on first, or the removal
    /// is refused.
    pub fn remove_token(&mut self, id: TokenId) -> Result<(), BoardError> {
        self.ensure_idle()?;
        if !self.scene.contains(id) {
            return Err(BoardError::UnknownToken(id));
        }
        let recipient = if self.scene.ball().holder == Some(id) {
            Some(
                self.roster
                    .find_recipient(&self.scene, id)
                    .ok_or(BoardError::NoBallRecipient)?,
            )
        } else {
            None
        };

        self.record(Snapshot::new().with_tokens(&self.scene).with_ball(&self.scene));
        if let Some(recipient) = recipient {
            self.scene.give_ball(recipient);
            self.events.push(BoardEvent::BallChanged);
        }
        self.scene.despawn(id);
        self.events.push(BoardEvent::TokensChanged);
        Ok(())
    }

    /// Put the roster back in its canonical layout, ball to team A's point
    /// guard, and wipe every line.
    pub fn reset_to_initial_layout(&mut self) -> Result<(), BoardError> {
        self.ensure_idle()?;
        self.record(
            Snapshot::new()
                .with_tokens(&self.scene)
                .with_ball(&self.scene)
                .with_lines(&self.scene),
        );
        self.roster.restore_defaults(&mut self.scene);
        self.scene.clear_lines();
        self.line_taps.reset();
        log::info!("board reset to initial layout");
        self.events.extend([
            BoardEvent::TokensChanged,
            BoardEvent::BallChanged,
            BoardEvent::LinesChanged,
        ]);
        Ok(())
    }

    /// Switch a roster slot on or off. Returns the slot's new state.
    pub fn toggle_slot(&mut self, team: Team, slot: Slot) -> Result<bool, BoardError> {
        self.ensure_idle()?;
        let snapshot = Snapshot::new()
            .with_tokens(&self.scene)
            .with_ball(&self.scene)
            .with_enabled(&self.scene);
        let enabled = self
            .roster
            .toggle_slot(&mut self.scene, team, slot)
            .inspect_err(|err| log::warn!("toggle {team:?} {slot:?} refused: {err}"))?;

        self.record(snapshot);
        self.events.extend([
            BoardEvent::SlotsChanged,
            BoardEvent::TokensChanged,
            BoardEvent::BallChanged,
        ]);
        Ok(enabled)
    }

    pub fn undo(&mut self) -> Result<bool, BoardError> {
        self.ensure_idle()?;
        if !self.history.undo(&mut self.scene, false) {
            return Ok(false);
        }
        self.after_history_step();
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, BoardError> {
        self.ensure_idle()?;
        if !self.history.redo(&mut self.scene, false) {
            return Ok(false);
        }
        self.after_history_step();
        Ok(true)
    }

    fn after_history_step(&mut self) {
        self.roster.reconcile(&self.scene);
        self.events.extend([
            BoardEvent::TokensChanged,
            BoardEvent::BallChanged,
            BoardEvent::LinesChanged,
            BoardEvent::SlotsChanged,
        ]);
        self.emit_history();
    }

    /// Remove every committed line. Returns false when there were none.
    pub fn clear_all_lines(&mut self) -> bool {
        if self.scene.lines().is_empty() {
            return false;
        }
        self.record(Snapshot::new().with_lines(&self.scene));
        self.scene.clear_lines();
        self.events.push(BoardEvent::LinesChanged);
        true
    }

    pub fn delete_line(&mut self, id: LineId) -> Result<(), BoardError> {
        if self.scene.line(id).is_none() {
            return Err(BoardError::UnknownLine(id));
        }
        self.record(Snapshot::new().with_lines(&self.scene));
        self.scene.delete_line(id);
        self.events.push(BoardEvent::LinesChanged);
        Ok(())
    }

    /// A tap on a committed line. The second tap within the double-tap
    /// window deletes it; returns whether it did.
    pub fn tap_line(&mut self, id: LineId, now_ms: f64) -> Result<bool, BoardError> {
        if self.scene.line(id).is_none() {
            return Err(BoardError::UnknownLine(id));
        }
        if !self.line_taps.tap(id, now_ms) {
            return Ok(false);
        }
        self.delete_line(id)?;
        Ok(true)
    }

    /// Land a flight that stopped animating. No-op when idle.
    pub fn cancel_stuck_flight(&mut self) -> bool {
        let outcome = self.flight.force_complete(&mut self.scene);
        self.emit_flight(outcome)
    }

    // -- Host callbacks --

    /// Animation frame callback.
    pub fn frame(&mut self, now_ms: f64) -> FlightOutcome {
        let outcome = self.flight.step(&mut self.scene, now_ms);
        if let FlightOutcome::InFlight { pos } = outcome {
            if !self.scene.ball().is_held() {
                if let Some(side) = self.hoops.check(pos, now_ms) {
                    self.events.push(BoardEvent::Dunk { side });
                }
            }
        }
        self.emit_flight(outcome);
        outcome
    }

    /// Timer callback: fires the flight watchdog when it is due.
    pub fn poll_timers(&mut self, now_ms: f64) -> FlightOutcome {
        let outcome = self.flight.poll_watchdog(&mut self.scene, now_ms);
        self.emit_flight(outcome);
        outcome
    }

    fn emit_flight(&mut self, outcome: FlightOutcome) -> bool {
        match outcome {
            FlightOutcome::Idle => false,
            FlightOutcome::InFlight { .. } => {
                self.events.push(BoardEvent::BallChanged);
                true
            }
            FlightOutcome::Landed { target, forced } => {
                self.events.extend([
                    BoardEvent::FlightLanded { target, forced },
                    BoardEvent::BallChanged,
                    BoardEvent::TokensChanged,
                ]);
                true
            }
        }
    }

    /// Abort every gesture and disarm the flight callbacks.
    pub fn teardown(&mut self) {
        let (router, mut ctx) = self.split();
        router.abort_all(&mut ctx);
        self.flight.teardown();
        log::debug!("board torn down");
    }

    // -- Queued input --

    /// Apply every queued event in arrival order. Refusals are logged.
    pub fn process(&mut self, queue: &mut InputQueue) {
        for event in queue.drain() {
            if let Err(err) = self.dispatch(event) {
                log::warn!("input {event:?} refused: {err}");
            }
        }
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Result<(), BoardError> {
        match event {
            InputEvent::PointerDown { pointer, client, hit, time_ms } => {
                self.handle_pointer_down(PointerEvent::new(pointer, client, time_ms), hit)?;
            }
            InputEvent::PointerMove { pointer, client, time_ms } => {
                self.handle_pointer_move(PointerEvent::new(pointer, client, time_ms));
            }
            InputEvent::PointerUp { pointer, client, time_ms } => {
                self.handle_pointer_up(PointerEvent::new(pointer, client, time_ms));
            }
            InputEvent::PointerCancel { pointer, time_ms } => {
                self.handle_pointer_cancel(pointer, time_ms);
            }
            InputEvent::Command(command) => self.command(command)?,
        }
        Ok(())
    }

    pub fn command(&mut self, command: BoardCommand) -> Result<(), BoardError> {
        match command {
            BoardCommand::AddToken { team } => {
                self.add_token(team)?;
            }
            BoardCommand::RemoveToken { token } => self.remove_token(token)?,
            BoardCommand::Reset => self.reset_to_initial_layout()?,
            BoardCommand::ToggleSlot { team, slot } => {
                self.toggle_slot(team, slot)?;
            }
            BoardCommand::Undo => {
                self.undo()?;
            }
            BoardCommand::Redo => {
                self.redo()?;
            }
            BoardCommand::ClearLines => {
                self.clear_all_lines();
            }
            BoardCommand::DeleteLine { line } => self.delete_line(line)?,
            BoardCommand::CancelStuckFlight => {
                self.cancel_stuck_flight();
            }
            BoardCommand::TapLine { line, time_ms } => {
                self.tap_line(line, time_ms)?;
            }
        }
        Ok(())
    }
}
