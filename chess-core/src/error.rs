//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的局面（FEN 格式错误或局面本身不合法）
    #[error("Invalid position: {reason}")]
    InvalidPosition { reason: String },

    /// 走法在当前局面下不合法
    #[error("Illegal move: {uci}")]
    IllegalMove { uci: String },

    /// 无法解析的走法记号
    #[error("Invalid move notation: {notation}")]
    InvalidNotation { notation: String },
}

impl ChessError {
    /// 创建无效局面错误
    pub fn invalid_position(reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            reason: reason.into(),
        }
    }
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
