//! Error types for position setup and engine control.

use thiserror::Error;

/// Errors returned to the caller for malformed input or misuse of the
/// controller. Game outcomes (mate, stalemate, draws) are never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid square: '{0}'")]
    InvalidSquare(String),

    #[error("Invalid move text: '{0}'")]
    InvalidMoveText(String),

    #[error("Illegal move in this position: {0}")]
    IllegalMove(String),

    #[error("No position has been set")]
    NoPosition,

    #[error("A search is already running")]
    SearchRunning,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChessError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        ChessError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ChessResult<T> = Result<T, ChessError>;
