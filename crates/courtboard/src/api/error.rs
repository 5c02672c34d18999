use crate::api::types::{LineId, TokenId};

/// Every way a board operation can be refused.
/// A refused operation never changes board state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoardError {
    #[error("pointer coordinates are not finite")]
    InvalidPointerCoordinates,

    #[error("a ball flight is already in progress")]
    AlreadyInFlight,

    #[error("flight origin does not hold the ball or target is invalid")]
    InvalidFlight,

    #[error("no enabled token can take the ball")]
    NoBallRecipient,

    #[error("unknown token {0:?}")]
    UnknownToken(TokenId),

    #[error("unknown line {0:?}")]
    UnknownLine(LineId),

    #[error("invalid board config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Config(err.to_string())
    }
}
