use glam::Vec2;

use crate::api::types::{HitTarget, LineId, PointerId, Slot, Team, TokenId};

/// Board commands issued by host UI (menus, buttons, keyboard shortcuts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardCommand {
    AddToken { team: Team },
    RemoveToken { token: TokenId },
    Reset,
    ToggleSlot { team: Team, slot: Slot },
    Undo,
    Redo,
    ClearLines,
    DeleteLine { line: LineId },
    CancelStuckFlight,
    TapLine { line: LineId, time_ms: f64 },
}

/// Host input, buffered until the next frame.
/// `client` coordinates are device pixels; the board maps them onto the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pointer: PointerId,
        client: Vec2,
        hit: HitTarget,
        time_ms: f64,
    },
    PointerMove {
        pointer: PointerId,
        client: Vec2,
        time_ms: f64,
    },
    PointerUp {
        pointer: PointerId,
        client: Vec2,
        time_ms: f64,
    },
    PointerCancel {
        pointer: PointerId,
        time_ms: f64,
    },
    Command(BoardCommand),
}

/// A queue of input events.
/// JS pushes events as they arrive; the board drains them once per frame, in order.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_keeps_arrival_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown {
            pointer: PointerId(1),
            client: Vec2::new(10.0, 20.0),
            hit: HitTarget::Surface,
            time_ms: 0.0,
        });
        q.push(InputEvent::Command(BoardCommand::Undo));
        assert_eq!(q.len(), 2);

        let events = q.drain();
        assert!(q.is_empty());
        assert!(matches!(events[0], InputEvent::PointerDown { .. }));
        assert_eq!(events[1], InputEvent::Command(BoardCommand::Undo));
    }

    #[test]
    fn command_payload() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Command(BoardCommand::ToggleSlot { team: Team::B, slot: Slot::PF }));
        match q.drain()[0] {
            InputEvent::Command(BoardCommand::ToggleSlot { team, slot }) => {
                assert_eq!(team, Team::B);
                assert_eq!(slot, Slot::PF);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
