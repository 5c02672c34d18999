use courtboard::bridge::protocol::{
    HEADER_ANIMATING, HEADER_BALL_HOLDER, HEADER_EVENT_COUNT, HEADER_TOKEN_COUNT, NONE,
};
use courtboard::systems::smoothing::{decimate, smooth};
use courtboard::{
    BoardCommand, BoardConfig, BoardError, BoardEvent, FlightOutcome, FrameBuffer, GestureKind,
    HitTarget, InputEvent, InputQueue, PointerEvent, PointerId, ProtocolLayout, RosterLayout,
    SmoothingConfig, Slot, Team, TokenId, Whiteboard,
};
use glam::Vec2;

const P1: PointerId = PointerId(1);
const P2: PointerId = PointerId(2);

fn board() -> Whiteboard {
    Whiteboard::headless(BoardConfig::default())
}

fn at(pointer: PointerId, x: f32, y: f32, t: f64) -> PointerEvent {
    PointerEvent::new(pointer, Vec2::new(x, y), t)
}

fn assert_single_holder(board: &Whiteboard) {
    let scene = board.scene();
    assert!(!board.is_animating());
    assert!(scene.holder_count() <= 1, "more than one holder");
    if let Some(holder) = scene.holder() {
        assert!(holder.holds_ball);
        assert!(scene.is_active(holder), "holder {:?} is not on an enabled slot", holder.id);
        assert_eq!(scene.ball().pos, holder.pos + scene.ball_offset());
    } else {
        assert_eq!(scene.holder_count(), 0);
    }
}

/// Point guard at (25,20), opposing point guard at (75,20), ball centred on its holder.
fn wide_pass_board() -> Whiteboard {
    let mut layout = RosterLayout::default();
    layout.team_a[Slot::PG.index()] = Vec2::new(25.0, 20.0);
    let config = BoardConfig {
        layout,
        ball_offset: Vec2::ZERO,
        ..BoardConfig::default()
    };
    Whiteboard::headless(config)
}

fn throw(board: &mut Whiteboard, to: Vec2, t: f64) {
    let from = board.scene().ball().pos;
    let kind = board
        .handle_pointer_down(at(P1, from.x, from.y, t), HitTarget::Ball)
        .unwrap();
    assert_eq!(kind, Some(GestureKind::DragBall));
    board.handle_pointer_move(at(P1, to.x, to.y, t + 16.0));
    board.handle_pointer_up(at(P1, to.x, to.y, t + 32.0));
}

#[test]
fn single_holder_holds_across_a_session() {
    let mut b = board();
    assert_single_holder(&b);
    assert_eq!(b.scene().ball().holder, Some(TokenId(1)));

    b.add_token(Team::B).unwrap();
    assert_single_holder(&b);

    // Pass from A PG to B PG and let it land.
    throw(&mut b, Vec2::new(58.0, 50.0), 0.0);
    assert!(b.is_animating());
    assert_eq!(b.scene().holder_count(), 0);
    let landed = b.frame(5_000.0);
    assert_eq!(landed, FlightOutcome::Landed { target: TokenId(6), forced: false });
    assert_single_holder(&b);

    b.toggle_slot(Team::B, Slot::PG).unwrap();
    assert_single_holder(&b);
    assert_eq!(b.scene().ball().holder, Some(TokenId(7)));

    b.remove_token(TokenId(7)).unwrap();
    assert_single_holder(&b);

    b.undo().unwrap();
    assert_single_holder(&b);
    b.undo().unwrap();
    assert_single_holder(&b);
    b.reset_to_initial_layout().unwrap();
    assert_single_holder(&b);
    assert_eq!(b.scene().ball().holder, Some(TokenId(1)));
}

#[test]
fn undoing_an_added_receiver_returns_the_ball() {
    let mut b = board();
    let added = b.add_token(Team::A).unwrap();
    assert_eq!(added, TokenId(11));

    throw(&mut b, Vec2::new(25.0, 50.0), 0.0);
    assert_eq!(
        b.frame(5_000.0),
        FlightOutcome::Landed { target: added, forced: false }
    );
    assert_eq!(b.scene().ball().holder, Some(added));

    assert_eq!(b.undo(), Ok(true));
    assert!(!b.scene().contains(added));
    assert_eq!(b.scene().ball().holder, Some(TokenId(1)));
    assert_single_holder(&b);

    // The restored holder can pass again.
    throw(&mut b, Vec2::new(34.0, 22.0), 6_000.0);
    assert!(b.is_animating());
    assert_eq!(b.flight().active().map(|f| f.target), Some(TokenId(2)));
}

#[test]
fn undo_then_redo_restores_exact_state() {
    let mut b = board();
    b.handle_pointer_down(at(P1, 34.0, 22.0, 0.0), HitTarget::Token(TokenId(2)))
        .unwrap();
    b.handle_pointer_move(at(P1, 40.0, 30.0, 16.0));
    b.handle_pointer_up(at(P1, 41.0, 31.0, 32.0));
    b.add_token(Team::A).unwrap();
    b.toggle_slot(Team::B, Slot::C).unwrap();

    let before = b.scene().clone();
    assert!(b.undo().unwrap());
    assert_ne!(b.scene(), &before);
    assert!(b.redo().unwrap());
    assert_eq!(b.scene(), &before);
}

#[test]
fn cancel_stuck_flight_is_idempotent() {
    let mut b = board();
    let before = b.scene().clone();
    b.drain_events();
    assert!(!b.cancel_stuck_flight());
    assert!(!b.cancel_stuck_flight());
    assert_eq!(b.scene(), &before);
    assert!(b.drain_events().is_empty());

    throw(&mut b, Vec2::new(58.0, 50.0), 0.0);
    assert!(b.cancel_stuck_flight());
    assert!(!b.cancel_stuck_flight());
    assert_eq!(b.scene().ball().holder, Some(TokenId(6)));
}

#[test]
fn last_ball_carrier_cannot_be_benched() {
    let mut b = board();
    for slot in [Slot::SG, Slot::SF, Slot::PF, Slot::C] {
        assert_eq!(b.toggle_slot(Team::A, slot), Ok(false));
    }
    for slot in Slot::ALL {
        assert_eq!(b.toggle_slot(Team::B, slot), Ok(false));
    }
    let enabled = *b.scene().enabled();
    let holder = b.scene().ball().holder;
    assert_eq!(holder, Some(TokenId(1)));

    assert_eq!(b.toggle_slot(Team::A, Slot::PG), Err(BoardError::NoBallRecipient));
    assert_eq!(b.scene().enabled(), &enabled);
    assert_eq!(b.scene().ball().holder, holder);
    assert_eq!(b.scene().len(), 1);
}

#[test]
fn pass_arcs_above_the_straight_line() {
    let mut b = wide_pass_board();
    assert_eq!(b.scene().ball().pos, Vec2::new(25.0, 20.0));

    throw(&mut b, Vec2::new(75.0, 20.0), 0.0);
    let flight = *b.flight().active().unwrap();
    assert_eq!(flight.target, TokenId(6));
    assert_eq!(flight.end, Vec2::new(75.0, 20.0));
    assert_eq!(flight.duration_ms, 1000.0);

    let mid = flight.start_time_ms + flight.duration_ms / 2.0;
    match b.frame(mid) {
        FlightOutcome::InFlight { pos } => {
            assert!((pos.x - 50.0).abs() < 1e-3);
            assert!(pos.y < 20.0, "ball did not rise: {pos:?}");
        }
        other => panic!("expected the ball in the air, got {other:?}"),
    }
}

#[test]
fn decimation_keeps_stroke_endpoints() {
    let raw = [
        Vec2::new(10.0, 10.0),
        Vec2::new(10.6, 10.1),
        Vec2::new(12.0, 11.0),
        Vec2::new(20.0, 20.0),
    ];
    let config = SmoothingConfig::default();
    let kept = decimate(&raw, config.slope_threshold, config.keep_every);
    assert_eq!(kept.first(), Some(&raw[0]));
    assert_eq!(kept.last(), Some(&raw[3]));

    let smoothed = smooth(&raw, &config);
    assert!(smoothed.len() >= 2);
    assert_eq!(smoothed.first(), Some(&raw[0]));
    assert_eq!(smoothed.last(), Some(&raw[3]));
}

#[test]
fn concurrent_drag_and_draw_do_not_interfere() {
    let mut b = board();
    assert_eq!(
        b.handle_pointer_down(at(P1, 34.0, 78.0, 0.0), HitTarget::Token(TokenId(3))),
        Ok(Some(GestureKind::DragToken))
    );
    assert_eq!(
        b.handle_pointer_down(at(P2, 60.0, 90.0, 0.0), HitTarget::Surface),
        Ok(Some(GestureKind::Draw))
    );

    let stroke = [
        Vec2::new(60.0, 90.0),
        Vec2::new(64.0, 88.0),
        Vec2::new(70.0, 87.0),
        Vec2::new(75.0, 83.0),
        Vec2::new(80.0, 82.0),
    ];
    for (i, p) in stroke.iter().enumerate().skip(1) {
        let t = i as f64 * 20.0;
        b.handle_pointer_move(at(P1, 34.0 + i as f32, 78.0 - i as f32, t));
        b.handle_pointer_move(at(P2, p.x, p.y, t));
    }
    b.handle_pointer_up(at(P1, 40.0, 70.0, 120.0));
    assert_eq!(b.current_gesture(), Some(GestureKind::Draw));
    b.handle_pointer_up(at(P2, 80.0, 82.0, 120.0));
    assert_eq!(b.current_gesture(), None);

    assert_eq!(b.scene().get(TokenId(3)).unwrap().pos, Vec2::new(40.0, 70.0));
    let lines = b.scene().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].path, smooth(&stroke, &SmoothingConfig::default()));
    assert!(b.scene().current_line().is_none());
}

#[test]
fn watchdog_lands_a_flight_without_frames() {
    let mut b = board();
    throw(&mut b, Vec2::new(58.0, 50.0), 100.0);
    let flight = *b.flight().active().unwrap();
    let deadline = flight.start_time_ms + flight.duration_ms + 1000.0;
    assert_eq!(b.flight().watchdog_deadline(), Some(deadline));

    assert_eq!(b.poll_timers(deadline - 1.0), FlightOutcome::Idle);
    assert_eq!(
        b.poll_timers(deadline),
        FlightOutcome::Landed { target: TokenId(6), forced: true }
    );
    assert_eq!(b.scene().ball().pos, flight.end);
    assert_eq!(b.scene().ball().holder, Some(TokenId(6)));
    assert!(!b.is_animating());
    assert_eq!(b.poll_timers(deadline + 500.0), FlightOutcome::Idle);
}

#[test]
fn history_is_locked_while_the_ball_flies() {
    let mut b = board();
    b.add_token(Team::A).unwrap();
    throw(&mut b, Vec2::new(58.0, 50.0), 0.0);

    assert_eq!(b.undo(), Err(BoardError::AlreadyInFlight));
    assert_eq!(b.toggle_slot(Team::A, Slot::C), Err(BoardError::AlreadyInFlight));
    assert_eq!(b.reset_to_initial_layout(), Err(BoardError::AlreadyInFlight));
    assert!(b.add_token(Team::B).is_ok());

    b.frame(10_000.0);
    assert_eq!(b.undo(), Ok(true));
}

#[test]
fn double_tap_deletes_a_line() {
    let mut b = board();
    b.handle_pointer_down(at(P1, 60.0, 90.0, 0.0), HitTarget::Surface).unwrap();
    b.handle_pointer_move(at(P1, 70.0, 85.0, 20.0));
    b.handle_pointer_up(at(P1, 80.0, 80.0, 40.0));
    let id = b.scene().lines()[0].id;

    assert_eq!(b.tap_line(id, 1_000.0), Ok(false));
    assert_eq!(b.tap_line(id, 1_300.0), Ok(true));
    assert!(b.scene().lines().is_empty());
    assert!(b.tap_line(id, 1_400.0).is_err());

    b.undo().unwrap();
    assert_eq!(b.scene().lines().len(), 1);
}

#[test]
fn queued_input_drives_the_frame_buffer() {
    let mut b = board();
    let mut queue = InputQueue::new();
    queue.push(InputEvent::Command(BoardCommand::AddToken { team: Team::A }));
    queue.push(InputEvent::PointerDown {
        pointer: P1,
        client: Vec2::new(42.0, 52.0),
        hit: HitTarget::Ball,
        time_ms: 0.0,
    });
    queue.push(InputEvent::PointerUp {
        pointer: P1,
        client: Vec2::new(34.0, 23.0),
        time_ms: 16.0,
    });
    b.process(&mut queue);
    assert!(queue.is_empty());
    assert!(b.is_animating());

    let events = b.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, BoardEvent::FlightStarted { target: TokenId(2), .. })));

    let mut frame = FrameBuffer::new(ProtocolLayout::default());
    frame.rebuild(&b, &events);
    let header = frame.header();
    assert_eq!(header[HEADER_TOKEN_COUNT], 11.0);
    assert_eq!(header[HEADER_ANIMATING], 1.0);
    assert_eq!(header[HEADER_BALL_HOLDER], NONE);
    assert_eq!(header[HEADER_EVENT_COUNT] as usize, events.len().min(frame.layout().max_events));
}
