//! FEN 格式解析
//!
//! 标准 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵格> <半回合计数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use shakmaty::fen::Fen as RawFen;
use shakmaty::{CastlingMode, Chess};

use crate::error::ChessError;
use crate::position::Position;

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为局面
    pub fn parse(fen: &str) -> Result<Position, ChessError> {
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(ChessError::invalid_position("Empty FEN string"));
        }

        let raw: RawFen = fen
            .parse()
            .map_err(|e| ChessError::invalid_position(format!("{}: {}", e, fen)))?;

        let chess: Chess = raw
            .into_position(CastlingMode::Standard)
            .map_err(|e| ChessError::invalid_position(format!("{}: {}", e, fen)))?;

        Ok(Position::from_chess(chess))
    }
}
