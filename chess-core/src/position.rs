//! 局面状态

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen as RawFen;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{Board, Chess, Color, EnPassantMode, Position as _};

use crate::constants::{MOVE_LIMIT_HALFMOVES, REPETITION_LIMIT};

/// 对局状态（终局判定结果）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// 对局进行中
    Ongoing,
    /// 走子方被将死
    Checkmate,
    /// 逼和
    Stalemate,
    /// 双方子力不足
    InsufficientMaterial,
    /// 五次重复局面
    Repetition,
    /// 七十五回合规则
    MoveLimit,
}

impl GameStatus {
    /// 是否已结束
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }

    /// 是否为和棋
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::InsufficientMaterial
                | GameStatus::Repetition
                | GameStatus::MoveLimit
        )
    }
}

/// 局面信息（用于显示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub turn: String,
    pub castling_rights: String,
    pub en_passant: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub legal_moves_count: usize,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_insufficient_material: bool,
    pub status: GameStatus,
}

/// 完整的局面快照
///
/// 创建后不可变：新局面只能通过 [`crate::MoveGenerator::apply`] 或
/// [`crate::Fen::parse`] 得到。两个局面相等当且仅当它们的 FEN 相同。
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
    /// 自上一次不可逆走法以来的历史局面哈希（用于重复局面判定）
    history: Vec<u64>,
}

impl Position {
    /// 创建初始局面
    pub fn initial() -> Self {
        Self::from_chess(Chess::default())
    }

    pub(crate) fn from_chess(chess: Chess) -> Self {
        Self {
            chess,
            history: Vec::new(),
        }
    }

    /// 走子后的新局面，吃子或兵的走法会清空重复历史
    pub(crate) fn successor(&self, chess: Chess, zeroing: bool) -> Self {
        let history = if zeroing {
            Vec::new()
        } else {
            let mut history = Vec::with_capacity(self.history.len() + 1);
            history.extend_from_slice(&self.history);
            history.push(self.zobrist());
            history
        };
        Self { chess, history }
    }

    /// 底层规则库局面
    pub fn chess(&self) -> &Chess {
        &self.chess
    }

    /// 棋盘
    pub fn board(&self) -> &Board {
        self.chess.board()
    }

    /// 当前走子方
    pub fn turn(&self) -> Color {
        self.chess.turn()
    }

    /// 半回合计数（自上次吃子或走兵）
    pub fn halfmoves(&self) -> u32 {
        self.chess.halfmoves()
    }

    /// 完整回合数
    pub fn fullmoves(&self) -> u32 {
        self.chess.fullmoves().get()
    }

    /// 规范编码（完整 FEN），用作局面身份
    pub fn key(&self) -> String {
        RawFen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    /// Zobrist 哈希（不含回合计数）
    pub fn zobrist(&self) -> u64 {
        self.chess
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .into()
    }

    /// 走子方是否被将军
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    /// 合法走法数
    pub fn legal_move_count(&self) -> usize {
        self.chess.legal_moves().len()
    }

    /// 当前局面（含本身）出现的次数
    pub fn repetition_count(&self) -> usize {
        let current = self.zobrist();
        1 + self.history.iter().filter(|&&h| h == current).count()
    }

    /// 终局判定
    pub fn status(&self) -> GameStatus {
        if self.chess.legal_moves().is_empty() {
            if self.chess.is_check() {
                return GameStatus::Checkmate;
            }
            return GameStatus::Stalemate;
        }
        if self.chess.is_insufficient_material() {
            return GameStatus::InsufficientMaterial;
        }
        if self.repetition_count() >= REPETITION_LIMIT {
            return GameStatus::Repetition;
        }
        if self.halfmoves() >= MOVE_LIMIT_HALFMOVES {
            return GameStatus::MoveLimit;
        }
        GameStatus::Ongoing
    }

    /// 汇总局面信息
    pub fn info(&self) -> PositionInfo {
        let key = self.key();
        let castling_rights = key.split_whitespace().nth(2).unwrap_or("-").to_string();
        let status = self.status();

        PositionInfo {
            turn: self.turn().fold_wb("White", "Black").to_string(),
            castling_rights,
            en_passant: self
                .chess
                .ep_square(EnPassantMode::Legal)
                .map(|sq| sq.to_string()),
            halfmove_clock: self.halfmoves(),
            fullmove_number: self.fullmoves(),
            legal_moves_count: self.legal_move_count(),
            is_check: self.is_check(),
            is_checkmate: status == GameStatus::Checkmate,
            is_stalemate: status == GameStatus::Stalemate,
            is_insufficient_material: self.chess.is_insufficient_material(),
            status,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Position {}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}
