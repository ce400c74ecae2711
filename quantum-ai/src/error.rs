//! 走法选择错误类型

use chess_core::ChessError;
use thiserror::Error;

/// 采样后端错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend '{name}' is not available")]
    Unavailable { name: String },

    #[error("Invalid state vector: {reason}")]
    InvalidState { reason: String },

    #[error("Shot count must be positive")]
    InvalidShots,

    #[error("Malformed measurement outcome: {outcome}")]
    MalformedOutcome { outcome: String },

    #[error("Sampling failed: {0}")]
    Sampling(String),
}

/// 走法选择错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error(transparent)]
    Chess(#[from] ChessError),

    #[error("Sampling backend failure: {0}")]
    Backend(#[from] BackendError),

    #[error("Sampling produced no usable outcome")]
    EmptySample,

    #[error("Future graph exceeded {limit} nodes")]
    GraphTooLarge { limit: usize },

    #[error("Unknown scoring method: {0}")]
    UnknownMethod(String),

    #[error("Score vector has {actual} entries, expected {expected}")]
    ScoreMismatch { expected: usize, actual: usize },

    #[error("Score for move #{index} is not finite")]
    NonFiniteScore { index: usize },
}

impl BackendError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        BackendError::InvalidState {
            reason: reason.into(),
        }
    }
}
