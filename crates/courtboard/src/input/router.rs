//! Multi-pointer gesture routing.
//!
//! Every live pointer id owns one [`Gesture`], chosen at pointer-down from
//! what the pointer landed on:
//!
//! - a token holding the ball, or the ball itself: aim a pass
//! - any other token: drag it
//! - empty court: draw a freehand line
//!
//! Several pointers can be live at once (one finger dragging a player while
//! another draws), but only one pointer may aim the ball, only one may
//! draw, and a token follows at most one pointer. Conflicting downs are
//! ignored.
//!
//! History snapshots are taken at gesture start, before the first mutation.

use std::collections::HashMap;

use glam::Vec2;

use crate::api::config::BoardConfig;
use crate::api::error::BoardError;
use crate::api::types::{BoardEvent, GestureKind, HitTarget, LineId, PointerId, TokenId};
use crate::components::line::Line;
use crate::components::token::PassLine;
use crate::core::geometry::{distance, is_valid_point};
use crate::core::scene::SceneState;
use crate::systems::flight::BallFlight;
use crate::systems::history::{HistoryStack, Snapshot};
use crate::systems::smoothing::{RawStroke, SampleResult, SmoothingConfig};

/// Mutable access to everything a gesture can touch.
pub struct RouterContext<'a> {
    pub scene: &'a mut SceneState,
    pub history: &'a mut HistoryStack,
    pub flight: &'a mut BallFlight,
    pub events: &'a mut Vec<BoardEvent>,
}

impl RouterContext<'_> {
    fn emit(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    fn record(&mut self, snapshot: Snapshot) {
        self.history.record(snapshot);
        self.emit(BoardEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}

/// Hit-test and capture parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    pub pass_capture_radius: f32,
    pub ball_hit_radius: f32,
    pub smoothing: SmoothingConfig,
}

impl RouterConfig {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            pass_capture_radius: config.pass_capture_radius,
            ball_hit_radius: config.flight_tuning().ball_hit_radius,
            smoothing: config.smoothing,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

/// What one pointer is doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    DraggingToken { token: TokenId },
    /// Aiming a pass. `origin` is `None` for a loose ball.
    DraggingBall { origin: Option<TokenId> },
    Drawing { stroke: RawStroke },
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::DraggingToken { .. } => GestureKind::DragToken,
            Gesture::DraggingBall { .. } => GestureKind::DragBall,
            Gesture::Drawing { .. } => GestureKind::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivePointer {
    pub gesture: Gesture,
    pub start: Vec2,
    pub last: Vec2,
}

pub struct PointerRouter {
    config: RouterConfig,
    pointers: HashMap<PointerId, ActivePointer>,
    observed: Option<GestureKind>,
    next_line_id: u32,
}

impl PointerRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            pointers: HashMap::new(),
            observed: None,
            next_line_id: 1,
        }
    }

    /// Kind of the most recently started gesture, `None` once every pointer
    /// is released.
    pub fn current_gesture(&self) -> Option<GestureKind> {
        self.observed
    }

    pub fn pointer(&self, id: PointerId) -> Option<&ActivePointer> {
        self.pointers.get(&id)
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    fn ball_taken(&self) -> bool {
        self.pointers
            .values()
            .any(|p| matches!(p.gesture, Gesture::DraggingBall { .. }))
    }

    fn drawing(&self) -> bool {
        self.pointers
            .values()
            .any(|p| matches!(p.gesture, Gesture::Drawing { .. }))
    }

    fn token_taken(&self, token: TokenId) -> bool {
        self.pointers
            .values()
            .any(|p| p.gesture == Gesture::DraggingToken { token })
    }

    /// Start a gesture. Returns the gesture kind, or `None` when the down
    /// was ignored.
    pub fn on_pointer_down(
        &mut self,
        ctx: &mut RouterContext<'_>,
        id: PointerId,
        pos: Vec2,
        hit: HitTarget,
        now_ms: f64,
    ) -> Result<Option<GestureKind>, BoardError> {
        if ctx.flight.is_active() {
            log::debug!("pointer {id:?} down ignored during flight");
            return Ok(None);
        }
        if !is_valid_point(pos) {
            log::warn!("pointer {id:?} down at invalid coordinates {pos:?}");
            return Err(BoardError::InvalidPointerCoordinates);
        }
        if let Some(existing) = self.pointers.get_mut(&id) {
            existing.last = pos;
            return Ok(None);
        }

        let hit = self.resolve_hit(ctx.scene, pos, hit);
        let gesture = match hit {
            HitTarget::Token(token) if ctx.scene.ball().holder == Some(token) => {
                if self.ball_taken() {
                    return Ok(None);
                }
                Gesture::DraggingBall { origin: Some(token) }
            }
            HitTarget::Token(token) => {
                if self.token_taken(token) {
                    return Ok(None);
                }
                let snapshot = Snapshot::new().with_tokens(ctx.scene).with_ball(ctx.scene);
                ctx.record(snapshot);
                Gesture::DraggingToken { token }
            }
            HitTarget::Ball => {
                if self.ball_taken() {
                    return Ok(None);
                }
                Gesture::DraggingBall { origin: ctx.scene.ball().holder }
            }
            HitTarget::Surface => {
                if self.drawing() {
                    return Ok(None);
                }
                let snapshot = Snapshot::new().with_lines(ctx.scene);
                ctx.record(snapshot);
                let line_id = LineId(self.next_line_id);
                self.next_line_id += 1;
                ctx.scene.begin_line(Line::begin(line_id, pos));
                ctx.emit(BoardEvent::LinesChanged);
                Gesture::Drawing {
                    stroke: RawStroke::begin(pos, now_ms, self.config.smoothing),
                }
            }
        };

        let kind = gesture.kind();
        log::debug!("pointer {id:?} starts {kind:?}");
        self.pointers.insert(
            id,
            ActivePointer {
                gesture,
                start: pos,
                last: pos,
            },
        );
        self.observed = Some(kind);
        ctx.emit(BoardEvent::GestureChanged { kind: Some(kind) });
        Ok(Some(kind))
    }

    /// Missing tokens fall through to the surface; surface hits near the
    /// ball count as the ball.
    fn resolve_hit(&self, scene: &SceneState, pos: Vec2, hit: HitTarget) -> HitTarget {
        match hit {
            HitTarget::Token(token) if !scene.contains(token) => {
                self.resolve_hit(scene, pos, HitTarget::Surface)
            }
            HitTarget::Surface if distance(pos, scene.ball().pos) <= self.config.ball_hit_radius => {
                HitTarget::Ball
            }
            other => other,
        }
    }

    pub fn on_pointer_move(
        &mut self,
        ctx: &mut RouterContext<'_>,
        id: PointerId,
        pos: Vec2,
        now_ms: f64,
    ) {
        if !self.pointers.contains_key(&id) {
            return;
        }
        if !is_valid_point(pos) {
            log::warn!("pointer {id:?} moved to invalid coordinates, aborting gesture");
            self.abort_pointer(ctx, id, now_ms);
            return;
        }
        let Some(pointer) = self.pointers.get_mut(&id) else {
            return;
        };
        pointer.last = pos;

        match &mut pointer.gesture {
            Gesture::DraggingToken { token } => {
                if ctx.scene.move_token(*token, pos) {
                    ctx.emit(BoardEvent::TokensChanged);
                    if ctx.scene.ball().holder == Some(*token) {
                        ctx.emit(BoardEvent::BallChanged);
                    }
                }
            }
            Gesture::DraggingBall { .. } => {
                let from = ctx.scene.ball().pos;
                ctx.scene.set_pass_line(Some(PassLine { from, to: pos }));
                ctx.emit(BoardEvent::PassLineChanged);
            }
            Gesture::Drawing { stroke } => {
                if stroke.sample(pos, now_ms) == SampleResult::Kept {
                    if let Some(line) = ctx.scene.current_line_mut() {
                        line.push(pos);
                    }
                    ctx.emit(BoardEvent::LinesChanged);
                }
            }
        }
    }

    /// Finish a gesture at `pos`. Non-finite coordinates abort it instead.
    pub fn on_pointer_up(
        &mut self,
        ctx: &mut RouterContext<'_>,
        id: PointerId,
        pos: Vec2,
        now_ms: f64,
    ) {
        let Some(pointer) = self.pointers.remove(&id) else {
            return;
        };
        let release = if is_valid_point(pos) {
            Some(pos)
        } else {
            log::warn!("pointer {id:?} released at invalid coordinates, aborting gesture");
            None
        };
        self.complete(ctx, pointer, release, now_ms);
        self.settle(ctx);
    }

    /// End one pointer's gesture without a usable position: the ball snaps
    /// back, a stroke commits what was captured, a token stays where it is.
    /// Other pointers are untouched.
    pub fn abort_pointer(&mut self, ctx: &mut RouterContext<'_>, id: PointerId, now_ms: f64) {
        let Some(pointer) = self.pointers.remove(&id) else {
            return;
        };
        self.complete(ctx, pointer, None, now_ms);
        self.settle(ctx);
    }

    /// The host lost the pointer. Finishes at the last known position.
    pub fn on_pointer_cancel(&mut self, ctx: &mut RouterContext<'_>, id: PointerId, now_ms: f64) {
        let Some(last) = self.pointers.get(&id).map(|p| p.last) else {
            return;
        };
        self.on_pointer_up(ctx, id, last, now_ms);
    }

    /// Tear down every gesture: ball snaps back, drafts are discarded.
    pub fn abort_all(&mut self, ctx: &mut RouterContext<'_>) {
        if self.pointers.is_empty() {
            return;
        }
        for (_, pointer) in self.pointers.drain() {
            match pointer.gesture {
                Gesture::DraggingToken { .. } => {}
                Gesture::DraggingBall { origin } => {
                    Self::snap_back(ctx, origin);
                }
                Gesture::Drawing { .. } => {
                    ctx.scene.take_current_line();
                    ctx.emit(BoardEvent::LinesChanged);
                }
            }
        }
        self.settle(ctx);
    }

    fn complete(
        &mut self,
        ctx: &mut RouterContext<'_>,
        pointer: ActivePointer,
        release: Option<Vec2>,
        now_ms: f64,
    ) {
        match pointer.gesture {
            Gesture::DraggingToken { token } => {
                if let Some(pos) = release {
                    if ctx.scene.move_token(token, pos) {
                        ctx.emit(BoardEvent::TokensChanged);
                    }
                }
            }
            Gesture::DraggingBall { origin } => match release {
                Some(pos) => self.release_ball(ctx, origin, pos, now_ms),
                None => Self::snap_back(ctx, origin),
            },
            Gesture::Drawing { stroke } => {
                let draft = ctx.scene.take_current_line();
                match (draft, stroke.finish()) {
                    (Some(draft), Some(path)) => {
                        log::debug!("line {:?} committed with {} points", draft.id, path.len());
                        ctx.scene.commit_line(Line::sealed(draft.id, path));
                    }
                    _ => log::debug!("stroke too short, discarded"),
                }
                ctx.emit(BoardEvent::LinesChanged);
            }
        }
    }

    /// Pass to the nearest token strictly inside the capture radius, or put
    /// the ball back.
    fn release_ball(
        &mut self,
        ctx: &mut RouterContext<'_>,
        origin: Option<TokenId>,
        pos: Vec2,
        now_ms: f64,
    ) {
        let radius = self.config.pass_capture_radius;
        let target = ctx
            .scene
            .iter()
            .filter(|t| Some(t.id) != origin)
            .map(|t| (t.id, distance(t.pos, pos)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        let Some(target) = target else {
            Self::snap_back(ctx, origin);
            return;
        };

        match ctx.flight.start(ctx.scene, origin, target, now_ms) {
            Ok(flight) => {
                if ctx.scene.set_pass_line(None) {
                    ctx.emit(BoardEvent::PassLineChanged);
                }
                ctx.emit(BoardEvent::FlightStarted {
                    target,
                    duration_ms: flight.duration_ms,
                });
                ctx.emit(BoardEvent::TokensChanged);
                ctx.emit(BoardEvent::BallChanged);
            }
            Err(err) => {
                log::warn!("pass to {target:?} refused: {err}");
                Self::snap_back(ctx, origin);
            }
        }
    }

    fn snap_back(ctx: &mut RouterContext<'_>, origin: Option<TokenId>) {
        if ctx.scene.set_pass_line(None) {
            ctx.emit(BoardEvent::PassLineChanged);
        }
        if let Some(origin) = origin {
            if ctx.scene.ball().holder == Some(origin) && ctx.scene.give_ball(origin) {
                ctx.emit(BoardEvent::BallChanged);
            }
        }
    }

    fn settle(&mut self, ctx: &mut RouterContext<'_>) {
        if self.pointers.is_empty() && self.observed.is_some() {
            self.observed = None;
            ctx.emit(BoardEvent::GestureChanged { kind: None });
        }
    }
}

impl Default for PointerRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Slot, Team};
    use crate::components::token::Token;

    struct Fixture {
        scene: SceneState,
        history: HistoryStack,
        flight: BallFlight,
        events: Vec<BoardEvent>,
        router: PointerRouter,
    }

    const P1: PointerId = PointerId(1);
    const P2: PointerId = PointerId(2);

    impl Fixture {
        fn new() -> Self {
            let mut scene = SceneState::default();
            scene.spawn(Token::roster(TokenId(1), Team::A, Slot::PG).with_pos(Vec2::new(25.0, 20.0)));
            scene.spawn(Token::roster(TokenId(2), Team::A, Slot::SG).with_pos(Vec2::new(75.0, 20.0)));
            scene.spawn(Token::roster(TokenId(3), Team::B, Slot::PG).with_pos(Vec2::new(50.0, 80.0)));
            scene.give_ball(TokenId(1));
            Self {
                scene,
                history: HistoryStack::default(),
                flight: BallFlight::default(),
                events: Vec::new(),
                router: PointerRouter::default(),
            }
        }

        fn ctx(&mut self) -> (&mut PointerRouter, RouterContext<'_>) {
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

        fn down(&mut self, id: PointerId, x: f32, y: f32, hit: HitTarget, t: f64) -> Option<GestureKind> {
            let (router, mut ctx) = self.ctx();
            router.on_pointer_down(&mut ctx, id, Vec2::new(x, y), hit, t).unwrap()
        }

        fn mv(&mut self, id: PointerId, x: f32, y: f32, t: f64) {
            let (router, mut ctx) = self.ctx();
            router.on_pointer_move(&mut ctx, id, Vec2::new(x, y), t);
        }

        fn up(&mut self, id: PointerId, x: f32, y: f32, t: f64) {
            let (router, mut ctx) = self.ctx();
            router.on_pointer_up(&mut ctx, id, Vec2::new(x, y), t);
        }
    }

    #[test]
    fn token_drag_snapshots_then_moves() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 50.0, 80.0, HitTarget::Token(TokenId(3)), 0.0), Some(GestureKind::DragToken));
        assert!(fx.history.can_undo());
        fx.mv(P1, 60.0, 70.0, 16.0);
        fx.up(P1, 62.0, 71.0, 32.0);
        assert_eq!(fx.scene.get(TokenId(3)).unwrap().pos, Vec2::new(62.0, 71.0));
        assert_eq!(fx.router.current_gesture(), None);
    }

    #[test]
    fn holder_hit_aims_a_pass() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 25.0, 20.0, HitTarget::Token(TokenId(1)), 0.0), Some(GestureKind::DragBall));
        assert!(!fx.history.can_undo());
        fx.mv(P1, 60.0, 20.0, 16.0);
        assert!(fx.scene.pass_line().is_some());
        fx.up(P1, 73.0, 21.0, 32.0);
        assert!(fx.flight.is_active());
        assert_eq!(fx.scene.ball().holder, None);
        assert!(fx.scene.pass_line().is_none());
        assert!(fx.events.iter().any(|e| matches!(e, BoardEvent::FlightStarted { target: TokenId(2), .. })));
    }

    #[test]
    fn release_outside_capture_radius_snaps_back() {
        let mut fx = Fixture::new();
        fx.down(P1, 25.0, 20.0, HitTarget::Token(TokenId(1)), 0.0);
        fx.up(P1, 75.0, 27.0, 16.0);
        assert!(!fx.flight.is_active());
        assert_eq!(fx.scene.ball().holder, Some(TokenId(1)));
        assert_eq!(fx.scene.ball().pos, Vec2::new(25.0, 22.0));
    }

    #[test]
    fn surface_near_ball_counts_as_ball() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 26.0, 23.0, HitTarget::Surface, 0.0), Some(GestureKind::DragBall));
    }

    #[test]
    fn surface_draws_and_commits() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0), Some(GestureKind::Draw));
        assert!(fx.scene.current_line().is_some());
        fx.mv(P1, 15.0, 62.0, 20.0);
        fx.mv(P1, 20.0, 66.0, 40.0);
        fx.up(P1, 20.0, 66.0, 60.0);
        assert!(fx.scene.current_line().is_none());
        assert_eq!(fx.scene.lines().len(), 1);
        assert!(fx.scene.lines()[0].finalized);
    }

    #[test]
    fn single_point_stroke_is_discarded() {
        let mut fx = Fixture::new();
        fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0);
        fx.up(P1, 10.0, 60.0, 5.0);
        assert!(fx.scene.lines().is_empty());
        assert!(fx.scene.current_line().is_none());
    }

    #[test]
    fn conflicting_downs_are_ignored() {
        let mut fx = Fixture::new();
        fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0);
        assert_eq!(fx.down(P2, 90.0, 60.0, HitTarget::Surface, 0.0), None);
        fx.down(P1, 0.0, 0.0, HitTarget::Token(TokenId(3)), 0.0);
        assert_eq!(fx.router.active_pointers(), 1);

        let p3 = PointerId(3);
        assert_eq!(fx.down(p3, 50.0, 80.0, HitTarget::Token(TokenId(3)), 0.0), Some(GestureKind::DragToken));
        assert_eq!(fx.down(PointerId(4), 50.0, 80.0, HitTarget::Token(TokenId(3)), 0.0), None);
    }

    #[test]
    fn downs_during_flight_are_ignored() {
        let mut fx = Fixture::new();
        fx.down(P1, 25.0, 20.0, HitTarget::Token(TokenId(1)), 0.0);
        fx.up(P1, 75.0, 20.0, 10.0);
        assert!(fx.flight.is_active());
        assert_eq!(fx.down(P2, 50.0, 80.0, HitTarget::Token(TokenId(3)), 20.0), None);
    }

    #[test]
    fn invalid_down_is_refused() {
        let mut fx = Fixture::new();
        let (router, mut ctx) = fx.ctx();
        let err = router.on_pointer_down(&mut ctx, P1, Vec2::new(f32::NAN, 1.0), HitTarget::Surface, 0.0);
        assert_eq!(err, Err(BoardError::InvalidPointerCoordinates));
        assert_eq!(router.active_pointers(), 0);
    }

    #[test]
    fn invalid_release_keeps_captured_stroke() {
        let mut fx = Fixture::new();
        fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0);
        fx.mv(P1, 20.0, 60.0, 20.0);
        fx.up(P1, f32::NAN, f32::NAN, 40.0);
        assert_eq!(fx.scene.lines().len(), 1);
        assert_eq!(fx.scene.lines()[0].path, vec![Vec2::new(10.0, 60.0), Vec2::new(20.0, 60.0)]);
    }

    #[test]
    fn invalid_move_aborts_only_that_pointer() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0), Some(GestureKind::Draw));
        assert_eq!(fx.down(P2, 50.0, 80.0, HitTarget::Token(TokenId(3)), 0.0), Some(GestureKind::DragToken));
        fx.mv(P1, 20.0, 60.0, 20.0);
        fx.mv(P2, 55.0, 70.0, 20.0);

        fx.mv(P1, f32::NAN, 60.0, 40.0);
        assert!(fx.router.pointer(P1).is_none());
        assert!(fx.router.pointer(P2).is_some());
        assert_eq!(fx.router.current_gesture(), Some(GestureKind::DragToken));
        assert_eq!(fx.scene.lines().len(), 1);
        assert!(fx.scene.current_line().is_none());

        fx.mv(P2, 60.0, 65.0, 60.0);
        fx.up(P2, 61.0, 64.0, 80.0);
        assert_eq!(fx.scene.get(TokenId(3)).unwrap().pos, Vec2::new(61.0, 64.0));
        assert_eq!(fx.router.active_pointers(), 0);
        assert_eq!(fx.router.current_gesture(), None);
    }

    #[test]
    fn cancel_uses_last_position() {
        let mut fx = Fixture::new();
        fx.down(P1, 50.0, 80.0, HitTarget::Token(TokenId(3)), 0.0);
        fx.mv(P1, 40.0, 40.0, 16.0);
        let (router, mut ctx) = fx.ctx();
        router.on_pointer_cancel(&mut ctx, P1, 32.0);
        assert_eq!(fx.scene.get(TokenId(3)).unwrap().pos, Vec2::new(40.0, 40.0));
        assert_eq!(fx.router.active_pointers(), 0);
    }

    #[test]
    fn missing_token_falls_through_to_surface() {
        let mut fx = Fixture::new();
        assert_eq!(fx.down(P1, 90.0, 10.0, HitTarget::Token(TokenId(42)), 0.0), Some(GestureKind::Draw));
    }

    #[test]
    fn abort_all_discards_drafts() {
        let mut fx = Fixture::new();
        fx.down(P1, 10.0, 60.0, HitTarget::Surface, 0.0);
        fx.mv(P1, 20.0, 60.0, 20.0);
        fx.down(P2, 25.0, 20.0, HitTarget::Ball, 0.0);
        let (router, mut ctx) = fx.ctx();
        router.abort_all(&mut ctx);
        assert!(fx.scene.current_line().is_none());
        assert!(fx.scene.lines().is_empty());
        assert_eq!(fx.scene.ball().holder, Some(TokenId(1)));
        assert_eq!(fx.router.current_gesture(), None);
    }
}
