//! 国际象棋规则适配层
//!
//! 包含:
//! - 不可变局面快照和终局判定
//! - 走法生成与应用
//! - FEN 解析
//! - 走法记号（UCI / SAN）
//!
//! 底层规则由 `shakmaty` 提供，这里只暴露走法选择引擎需要的接口。

mod constants;
mod error;
mod fen;
mod moves;
mod notation;
mod position;

pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use moves::MoveGenerator;
pub use notation::Notation;
pub use position::{GameStatus, Position, PositionInfo};

pub use shakmaty::{Board, Color, Move, Piece, Role, Square};
