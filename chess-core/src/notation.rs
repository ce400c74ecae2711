//! 走法记号
//!
//! - UCI：紧凑的规范编码（如 `e2e4`、`e7e8q`），用于图的边和概率表的键
//! - SAN：标准代数记谱（如 `Nf3`、`O-O`、`Qxf7#`），仅用于显示

use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Move};

use crate::error::ChessError;
use crate::position::Position;

/// 记号转换
pub struct Notation;

impl Notation {
    /// 走法的 UCI 编码
    pub fn uci(mv: Move) -> String {
        mv.to_uci(CastlingMode::Standard).to_string()
    }

    /// 走法在给定局面下的 SAN 记号（含将军/将死后缀）
    pub fn san(position: &Position, mv: Move) -> String {
        SanPlus::from_move(position.chess().clone(), mv).to_string()
    }

    /// 解析 UCI 走法
    pub fn parse_uci(position: &Position, text: &str) -> Result<Move, ChessError> {
        let uci: UciMove = text.trim().parse().map_err(|_| ChessError::InvalidNotation {
            notation: text.to_string(),
        })?;

        uci.to_move(position.chess())
            .map_err(|_| ChessError::IllegalMove {
                uci: text.trim().to_string(),
            })
    }

    /// 解析 SAN 走法
    pub fn parse_san(position: &Position, text: &str) -> Result<Move, ChessError> {
        let san: SanPlus = text.trim().parse().map_err(|_| ChessError::InvalidNotation {
            notation: text.to_string(),
        })?;

        san.san
            .to_move(position.chess())
            .map_err(|_| ChessError::IllegalMove {
                uci: text.trim().to_string(),
            })
    }

    /// 依次尝试 UCI 和 SAN
    pub fn parse(position: &Position, text: &str) -> Result<Move, ChessError> {
        Self::parse_uci(position, text).or_else(|_| Self::parse_san(position, text))
    }
}
