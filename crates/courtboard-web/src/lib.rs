pub mod dom;
pub mod runner;

use std::cell::RefCell;

use courtboard::{BoardCommand, HitTarget, InputEvent, LineId, PointerId, Slot, Team, TokenId};
use glam::Vec2;
use wasm_bindgen::prelude::*;

pub use dom::DomSurface;
pub use runner::BoardRunner;

thread_local! {
    static RUNNER: RefCell<Option<BoardRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the board. Calls made before `board_init` are logged
/// and dropped.
fn with_runner<R>(f: impl FnOnce(&mut BoardRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("board not initialized, call board_init() first");
                None
            }
        }
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

fn command(command: BoardCommand) {
    with_runner(|r| r.push_command(command));
}

fn team(code: u32) -> Option<Team> {
    let team = Team::from_code(code);
    if team.is_none() {
        log::warn!("unknown team code {code}");
    }
    team
}

/// Hit kinds on the wire: 0 = surface, 1 = ball, 2 = token (`token` carries its id).
fn hit_target(kind: u32, token: u32) -> HitTarget {
    match kind {
        1 => HitTarget::Ball,
        2 => HitTarget::Token(TokenId(token)),
        _ => HitTarget::Surface,
    }
}

/// Create the board. `config_json` may be empty for defaults; `surface_id`
/// is the id of the court element. Returns false if the config is invalid.
#[wasm_bindgen]
pub fn board_init(config_json: &str, surface_id: &str) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    match BoardRunner::from_json(config_json, DomSurface::new(surface_id)) {
        Ok(runner) => {
            RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
            log::info!("courtboard: initialized on #{surface_id}");
            true
        }
        Err(err) => {
            log::warn!("courtboard: {err}");
            false
        }
    }
}

#[wasm_bindgen]
pub fn board_tick(now_ms: f64) {
    with_runner(|r| r.tick(now_ms));
}

#[wasm_bindgen]
pub fn board_teardown() {
    with_runner(|r| r.teardown());
    RUNNER.with(|cell| *cell.borrow_mut() = None);
}

// ---- Pointer input ----

#[wasm_bindgen]
pub fn board_pointer_down(pointer: i32, x: f32, y: f32, hit_kind: u32, hit_token: u32, time_ms: f64) {
    push(InputEvent::PointerDown {
        pointer: PointerId(pointer),
        client: Vec2::new(x, y),
        hit: hit_target(hit_kind, hit_token),
        time_ms,
    });
}

#[wasm_bindgen]
pub fn board_pointer_move(pointer: i32, x: f32, y: f32, time_ms: f64) {
    push(InputEvent::PointerMove {
        pointer: PointerId(pointer),
        client: Vec2::new(x, y),
        time_ms,
    });
}

#[wasm_bindgen]
pub fn board_pointer_up(pointer: i32, x: f32, y: f32, time_ms: f64) {
    push(InputEvent::PointerUp {
        pointer: PointerId(pointer),
        client: Vec2::new(x, y),
        time_ms,
    });
}

#[wasm_bindgen]
pub fn board_pointer_cancel(pointer: i32, time_ms: f64) {
    push(InputEvent::PointerCancel {
        pointer: PointerId(pointer),
        time_ms,
    });
}

// ---- Commands ----

#[wasm_bindgen]
pub fn board_add_token(team_code: u32) {
    if let Some(team) = team(team_code) {
        command(BoardCommand::AddToken { team });
    }
}

#[wasm_bindgen]
pub fn board_remove_token(token: u32) {
    command(BoardCommand::RemoveToken { token: TokenId(token) });
}

#[wasm_bindgen]
pub fn board_reset() {
    command(BoardCommand::Reset);
}

#[wasm_bindgen]
pub fn board_toggle_slot(team_code: u32, slot_index: u32) {
    let Some(team) = team(team_code) else {
        return;
    };
    match Slot::from_index(slot_index as usize) {
        Some(slot) => command(BoardCommand::ToggleSlot { team, slot }),
        None => log::warn!("unknown slot index {slot_index}"),
    }
}

#[wasm_bindgen]
pub fn board_undo() {
    command(BoardCommand::Undo);
}

#[wasm_bindgen]
pub fn board_redo() {
    command(BoardCommand::Redo);
}

#[wasm_bindgen]
pub fn board_clear_lines() {
    command(BoardCommand::ClearLines);
}

#[wasm_bindgen]
pub fn board_delete_line(line: u32) {
    command(BoardCommand::DeleteLine { line: LineId(line) });
}

#[wasm_bindgen]
pub fn board_cancel_stuck_flight() {
    command(BoardCommand::CancelStuckFlight);
}

/// A tap on a committed line. Uses the wall clock when the host passes no time.
#[wasm_bindgen]
pub fn board_tap_line(line: u32, time_ms: Option<f64>) {
    let time_ms = time_ms.unwrap_or_else(js_sys::Date::now);
    command(BoardCommand::TapLine { line: LineId(line), time_ms });
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_tokens() -> u32 {
    with_runner(|r| r.max_tokens()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_runner(|r| r.max_events()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_ball_x() -> f32 {
    with_runner(|r| r.board().scene().ball().pos.x).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_ball_y() -> f32 {
    with_runner(|r| r.board().scene().ball().pos.y).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_lines_json() -> String {
    with_runner(|r| r.lines_json().to_owned()).unwrap_or_else(|| String::from("{}"))
}

#[wasm_bindgen]
pub fn get_tokens_json() -> String {
    with_runner(|r| r.tokens_json()).unwrap_or_else(|| String::from("[]"))
}

#[wasm_bindgen]
pub fn get_line_segments_json(line: u32) -> Option<String> {
    with_runner(|r| r.line_segments_json(LineId(line))).flatten()
}

#[cfg(feature = "vectors")]
#[wasm_bindgen]
pub fn get_line_outline_json(line: u32, tolerance: f32) -> Option<String> {
    with_runner(|r| r.line_outline_json(LineId(line), tolerance)).flatten()
}
