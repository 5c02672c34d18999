use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{Slot, Team, TokenId};

/// A draggable player marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Unique identifier.
    pub id: TokenId,
    /// Position in surface percent.
    pub pos: Vec2,
    pub team: Team,
    /// Roster slot. `None` for free tokens added on top of the roster.
    pub slot: Option<Slot>,
    /// Jersey label.
    pub number: u8,
    /// Whether this token currently holds the ball.
    pub holds_ball: bool,
}

impl Token {
    /// Create a free token at the origin.
    pub fn new(id: TokenId, team: Team) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            team,
            slot: None,
            number: 0,
            holds_ball: false,
        }
    }

    /// Create the roster token for a slot. Its number follows the slot.
    pub fn roster(id: TokenId, team: Team, slot: Slot) -> Self {
        Self::new(id, team).with_slot(slot).with_number(slot.number())
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_number(mut self, number: u8) -> Self {
        self.number = number;
        self
    }

    pub fn with_ball(mut self) -> Self {
        self.holds_ball = true;
        self
    }

    /// Whether this token sits in the given roster slot.
    pub fn occupies(&self, team: Team, slot: Slot) -> bool {
        self.team == team && self.slot == Some(slot)
    }
}

/// The single ball on the court.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Position in surface percent.
    pub pos: Vec2,
    /// Token carrying the ball. `None` while in flight or loose.
    pub holder: Option<TokenId>,
}

impl Ball {
    pub fn loose(pos: Vec2) -> Self {
        Self { pos, holder: None }
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::loose(Vec2::new(50.0, 50.0))
    }
}

/// Straight provisional indicator drawn while a pass is being aimed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassLine {
    pub from: Vec2,
    pub to: Vec2,
}
