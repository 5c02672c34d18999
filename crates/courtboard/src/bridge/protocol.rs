//! Flat frame buffer read by the JavaScript host.
//! Must stay in sync with the host's `protocol.ts`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Tokens: max_tokens × 8 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Capacities are written into the header every frame.
//! The host reads them from the header to compute offsets.

use bytemuck::{Pod, Zeroable};

use crate::api::board::Whiteboard;
use crate::api::types::{BoardEvent, GestureKind, HoopSide};
use crate::components::token::Token;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_TOKENS: usize = 2;
pub const HEADER_TOKEN_COUNT: usize = 3;
pub const HEADER_MAX_EVENTS: usize = 4;
pub const HEADER_EVENT_COUNT: usize = 5;
pub const HEADER_BALL_X: usize = 6;
pub const HEADER_BALL_Y: usize = 7;
pub const HEADER_BALL_HOLDER: usize = 8;
pub const HEADER_ANIMATING: usize = 9;
pub const HEADER_GESTURE: usize = 10;
pub const HEADER_CAN_UNDO: usize = 11;
pub const HEADER_CAN_REDO: usize = 12;
pub const HEADER_LINE_COUNT: usize = 13;
pub const HEADER_PASS_LINE: usize = 14;
pub const HEADER_DROPPED_EVENTS: usize = 15;

pub const PROTOCOL_VERSION: f32 = 1.0;

/// Marker for "none" in id fields.
pub const NONE: f32 = -1.0;

/// One token on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TokenInstance {
    pub id: f32,
    pub x: f32,
    pub y: f32,
    /// Team code (A = 0, B = 1).
    pub team: f32,
    /// Slot index, or -1 for a free token.
    pub slot: f32,
    pub number: f32,
    /// 1.0 when this token carries the ball.
    pub holds_ball: f32,
    pub _pad: f32,
}

impl TokenInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

impl From<&Token> for TokenInstance {
    fn from(t: &Token) -> Self {
        Self {
            id: t.id.0 as f32,
            x: t.pos.x,
            y: t.pos.y,
            team: t.team.code() as f32,
            slot: t.slot.map_or(NONE, |s| s.index() as f32),
            number: t.number as f32,
            holds_ball: if t.holds_ball { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

/// One board event on the wire: kind plus three payload values.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EventRecord {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EventRecord {
    pub const FLOATS: usize = 4;
}

/// Wire codes for [`EventRecord::kind`].
pub mod event_kind {
    pub const TOKENS_CHANGED: f32 = 1.0;
    pub const BALL_CHANGED: f32 = 2.0;
    pub const LINES_CHANGED: f32 = 3.0;
    pub const SLOTS_CHANGED: f32 = 4.0;
    pub const PASS_LINE_CHANGED: f32 = 5.0;
    pub const FLIGHT_STARTED: f32 = 6.0;
    pub const FLIGHT_LANDED: f32 = 7.0;
    pub const DUNK: f32 = 8.0;
    pub const HISTORY_CHANGED: f32 = 9.0;
    pub const GESTURE_CHANGED: f32 = 10.0;
}

fn gesture_code(kind: Option<GestureKind>) -> f32 {
    match kind {
        None => NONE,
        Some(GestureKind::DragToken) => 0.0,
        Some(GestureKind::DragBall) => 1.0,
        Some(GestureKind::Draw) => 2.0,
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl From<&BoardEvent> for EventRecord {
    fn from(event: &BoardEvent) -> Self {
        use event_kind::*;
        let (kind, a, b) = match *event {
            BoardEvent::TokensChanged => (TOKENS_CHANGED, 0.0, 0.0),
            BoardEvent::BallChanged => (BALL_CHANGED, 0.0, 0.0),
            BoardEvent::LinesChanged => (LINES_CHANGED, 0.0, 0.0),
            BoardEvent::SlotsChanged => (SLOTS_CHANGED, 0.0, 0.0),
            BoardEvent::PassLineChanged => (PASS_LINE_CHANGED, 0.0, 0.0),
            BoardEvent::FlightStarted { target, duration_ms } => {
                (FLIGHT_STARTED, target.0 as f32, duration_ms as f32)
            }
            BoardEvent::FlightLanded { target, forced } => {
                (FLIGHT_LANDED, target.0 as f32, flag(forced))
            }
            BoardEvent::Dunk { side } => {
                let side = match side {
                    HoopSide::Left => 0.0,
                    HoopSide::Right => 1.0,
                };
                (DUNK, side, 0.0)
            }
            BoardEvent::HistoryChanged { can_undo, can_redo } => {
                (HISTORY_CHANGED, flag(can_undo), flag(can_redo))
            }
            BoardEvent::GestureChanged { kind } => (GESTURE_CHANGED, gesture_code(kind), 0.0),
        };
        Self { kind, a, b, c: 0.0 }
    }
}

/// Buffer layout for given capacities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolLayout {
    pub max_tokens: usize,
    pub max_events: usize,
    pub token_data_offset: usize,
    pub event_data_offset: usize,
    pub buffer_total_floats: usize,
}

impl ProtocolLayout {
    pub fn new(max_tokens: usize, max_events: usize) -> Self {
        let token_data_offset = HEADER_FLOATS;
        let event_data_offset = token_data_offset + max_tokens * TokenInstance::FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EventRecord::FLOATS;
        Self {
            max_tokens,
            max_events,
            token_data_offset,
            event_data_offset,
            buffer_total_floats,
        }
    }

    pub fn buffer_total_bytes(&self) -> usize {
        self.buffer_total_floats * 4
    }
}

impl Default for ProtocolLayout {
    fn default() -> Self {
        Self::new(64, 64)
    }
}

/// The per-frame snapshot handed to the host.
pub struct FrameBuffer {
    layout: ProtocolLayout,
    data: Vec<f32>,
    frame: u32,
}

impl FrameBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let mut data = vec![0.0; layout.buffer_total_floats];
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        data[HEADER_MAX_TOKENS] = layout.max_tokens as f32;
        data[HEADER_MAX_EVENTS] = layout.max_events as f32;
        Self {
            layout,
            data,
            frame: 0,
        }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    /// Rewrite the buffer from the board and this frame's events. Tokens or
    /// events past capacity are dropped; the header records dropped events.
    pub fn rebuild(&mut self, board: &Whiteboard, events: &[BoardEvent]) {
        let scene = board.scene();
        let layout = self.layout;
        self.frame = self.frame.wrapping_add(1);

        let tokens: Vec<TokenInstance> = scene
            .iter()
            .take(layout.max_tokens)
            .map(TokenInstance::from)
            .collect();
        let records: Vec<EventRecord> = events
            .iter()
            .take(layout.max_events)
            .map(EventRecord::from)
            .collect();

        let token_floats: &[f32] = bytemuck::cast_slice(&tokens);
        let start = layout.token_data_offset;
        self.data[start..start + token_floats.len()].copy_from_slice(token_floats);

        let event_floats: &[f32] = bytemuck::cast_slice(&records);
        let start = layout.event_data_offset;
        self.data[start..start + event_floats.len()].copy_from_slice(event_floats);

        let ball = scene.ball();
        let header = &mut self.data[..HEADER_FLOATS];
        header[HEADER_FRAME_COUNTER] = self.frame as f32;
        header[HEADER_TOKEN_COUNT] = tokens.len() as f32;
        header[HEADER_EVENT_COUNT] = records.len() as f32;
        header[HEADER_BALL_X] = ball.pos.x;
        header[HEADER_BALL_Y] = ball.pos.y;
        header[HEADER_BALL_HOLDER] = ball.holder.map_or(NONE, |id| id.0 as f32);
        header[HEADER_ANIMATING] = flag(board.is_animating());
        header[HEADER_GESTURE] = gesture_code(board.current_gesture());
        header[HEADER_CAN_UNDO] = flag(board.can_undo());
        header[HEADER_CAN_REDO] = flag(board.can_redo());
        header[HEADER_LINE_COUNT] = scene.lines().len() as f32;
        header[HEADER_PASS_LINE] = flag(scene.pass_line().is_some());
        header[HEADER_DROPPED_EVENTS] = events.len().saturating_sub(records.len()) as f32;
    }

    pub fn header(&self) -> &[f32] {
        &self.data[..HEADER_FLOATS]
    }

    pub fn token(&self, index: usize) -> Option<TokenInstance> {
        let count = self.data[HEADER_TOKEN_COUNT] as usize;
        if index >= count {
            return None;
        }
        let start = self.layout.token_data_offset + index * TokenInstance::FLOATS;
        let floats = &self.data[start..start + TokenInstance::FLOATS];
        Some(bytemuck::cast_slice::<f32, TokenInstance>(floats)[0])
    }

    pub fn event(&self, index: usize) -> Option<EventRecord> {
        let count = self.data[HEADER_EVENT_COUNT] as usize;
        if index >= count {
            return None;
        }
        let start = self.layout.event_data_offset + index * EventRecord::FLOATS;
        let floats = &self.data[start..start + EventRecord::FLOATS];
        Some(bytemuck::cast_slice::<f32, EventRecord>(floats)[0])
    }

    /// Raw pointer for reads from wasm memory.
    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(ProtocolLayout::default())
    }
}
