use serde::{Deserialize, Serialize};

/// Unique identifier for a player token on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u32);

/// Identifier of a drawn line. Allocated in increasing order when a stroke starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub u32);

/// Host-supplied pointer identifier (the DOM `pointerId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub i32);

/// One of the two teams on the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    /// The other team.
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Numeric code used on the host wire (A = 0, B = 1).
    pub fn code(self) -> u32 {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Team> {
        match code {
            0 => Some(Team::A),
            1 => Some(Team::B),
            _ => None,
        }
    }
}

/// A roster position within a team. Declaration order is roster order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::PG, Slot::SG, Slot::SF, Slot::PF, Slot::C];

    /// Zero-based roster index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Jersey number shown on the roster token for this slot (1-5).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: usize) -> Option<Slot> {
        Slot::ALL.get(index).copied()
    }
}

/// What a pointer-down landed on, as resolved by the host's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A player token.
    Token(TokenId),
    /// The ball itself.
    Ball,
    /// Empty court surface.
    Surface,
}

/// The kind of gesture a pointer is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    DragToken,
    DragBall,
    Draw,
}

/// Side of the court a hoop sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoopSide {
    Left,
    Right,
}

/// State-change notification emitted synchronously after each mutation.
/// The host drains these once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    TokensChanged,
    BallChanged,
    LinesChanged,
    SlotsChanged,
    PassLineChanged,
    FlightStarted { target: TokenId, duration_ms: f64 },
    FlightLanded { target: TokenId, forced: bool },
    Dunk { side: HoopSide },
    HistoryChanged { can_undo: bool, can_redo: bool },
    GestureChanged { kind: Option<GestureKind> },
}
