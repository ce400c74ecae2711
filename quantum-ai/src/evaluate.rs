//! 局面评估函数
//!
//! 所有分数以"当前走子方"为视角：正值对走子方有利。
//! 需要以走法为中心比较时（例如不同深度的节点），由调用方负责取反。

use chess_core::{Color, GameStatus, Move, MoveGenerator, Position, Role, Square};

use crate::error::AiError;

/// 将死分值
pub const CHECKMATE_SCORE: f64 = 10000.0;

/// 评估器
pub struct Evaluator;

/// 棋子基础分值
mod piece_values {
    use chess_core::Role;

    /// 轻量分值（兵=1）
    pub fn light(role: Role) -> f64 {
        match role {
            Role::Pawn => 1.0,
            Role::Knight => 3.0,
            Role::Bishop => 3.0,
            Role::Rook => 5.0,
            Role::Queen => 9.0,
            Role::King => 0.0,
        }
    }

    /// 精细分值（兵=100）
    pub fn heavy(role: Role) -> f64 {
        match role {
            Role::Pawn => 100.0,
            Role::Knight => 320.0,
            Role::Bishop => 330.0,
            Role::Rook => 500.0,
            Role::Queen => 900.0,
            Role::King => 0.0,
        }
    }
}

/// 中心格
const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

impl Evaluator {
    /// 终局覆盖分：将死为 -10000（被将死一方走子），和棋为 0
    fn terminal_score(position: &Position, perspective: Color) -> Option<f64> {
        match position.status() {
            GameStatus::Ongoing => None,
            GameStatus::Checkmate => {
                if position.turn() == perspective {
                    Some(-CHECKMATE_SCORE)
                } else {
                    Some(CHECKMATE_SCORE)
                }
            }
            _ => Some(0.0),
        }
    }

    /// 子力差（轻量分值，指定视角）
    pub fn material_for(position: &Position, perspective: Color) -> f64 {
        position
            .board()
            .iter()
            .map(|(_, piece)| {
                let value = piece_values::light(piece.role);
                if piece.color == perspective {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }

    /// 轻量评估：终局覆盖 + 子力差
    pub fn evaluate(position: &Position) -> f64 {
        let perspective = position.turn();
        Self::terminal_score(position, perspective)
            .unwrap_or_else(|| Self::material_for(position, perspective))
    }

    /// 图游走使用的启发式：子力 + 0.01 × 机动性 - 0.5 × 被将军
    pub fn walk_heuristic(position: &Position) -> f64 {
        let perspective = position.turn();
        if let Some(score) = Self::terminal_score(position, perspective) {
            return score;
        }

        let mobility = position.legal_move_count() as f64;
        let in_check = if position.is_check() { 1.0 } else { 0.0 };
        Self::material_for(position, perspective) + 0.01 * mobility - 0.5 * in_check
    }

    /// 振幅衰减游走使用的局面质量：子力 + 0.1 × 机动性 - 50 × 被将军
    pub fn position_quality(position: &Position) -> f64 {
        let perspective = position.turn();
        if let Some(score) = Self::terminal_score(position, perspective) {
            return score;
        }

        let mobility = position.legal_move_count() as f64;
        let safety = if position.is_check() { -50.0 } else { 0.0 };
        Self::material_for(position, perspective) + 0.1 * mobility + safety
    }

    /// 精细评估（走子方视角）
    pub fn evaluate_heavy(position: &Position) -> f64 {
        Self::evaluate_for(position, position.turn())
    }

    /// 精细评估（指定视角）
    ///
    /// 子力 ×100，再叠加机动性、王安全、中心控制、兵推进、子力活跃度和开局出子奖励。
    /// 各项相互独立，与计算顺序无关。
    pub fn evaluate_for(position: &Position, perspective: Color) -> f64 {
        if let Some(score) = Self::terminal_score(position, perspective) {
            return score;
        }

        Self::heavy_material(position, perspective)
            + Self::mobility(position, perspective)
            + Self::king_safety(position, perspective)
            + Self::center_control(position, perspective)
            + Self::pawn_advancement(position, perspective)
            + Self::piece_activity(position, perspective)
            + Self::development(position, perspective)
    }

    fn heavy_material(position: &Position, perspective: Color) -> f64 {
        position
            .board()
            .iter()
            .map(|(_, piece)| {
                let value = piece_values::heavy(piece.role);
                if piece.color == perspective {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }

    /// 每个合法走法 10 分，对方走子时计为负
    fn mobility(position: &Position, perspective: Color) -> f64 {
        let mobility = 10.0 * position.legal_move_count() as f64;
        if position.turn() == perspective {
            mobility
        } else {
            -mobility
        }
    }

    fn king_safety(position: &Position, perspective: Color) -> f64 {
        if !position.is_check() {
            return 0.0;
        }
        if position.turn() == perspective {
            -50.0
        } else {
            50.0
        }
    }

    fn center_control(position: &Position, perspective: Color) -> f64 {
        CENTER_SQUARES
            .iter()
            .filter_map(|&sq| position.board().piece_at(sq))
            .map(|piece| if piece.color == perspective { 5.0 } else { -5.0 })
            .sum()
    }

    /// 己方兵每前进一行 10 分
    fn pawn_advancement(position: &Position, perspective: Color) -> f64 {
        position
            .board()
            .iter()
            .filter(|(_, piece)| piece.role == Role::Pawn && piece.color == perspective)
            .map(|(sq, _)| {
                let rank = sq.rank().to_u32() as f64;
                match perspective {
                    Color::White => rank * 10.0,
                    Color::Black => (7.0 - rank) * 10.0,
                }
            })
            .sum()
    }

    /// 己方棋子位于 c3-f6 区域内每个 5 分
    fn piece_activity(position: &Position, perspective: Color) -> f64 {
        position
            .board()
            .iter()
            .filter(|(sq, piece)| {
                let file = sq.file().to_u32();
                let rank = sq.rank().to_u32();
                piece.color == perspective && (2..=5).contains(&file) && (2..=5).contains(&rank)
            })
            .count() as f64
            * 5.0
    }

    /// 前 10 回合内，离开底线两行的己方马、象每个 10 分
    fn development(position: &Position, perspective: Color) -> f64 {
        if position.fullmoves() > 10 {
            return 0.0;
        }

        position
            .board()
            .iter()
            .filter(|(sq, piece)| {
                if piece.color != perspective || !matches!(piece.role, Role::Knight | Role::Bishop) {
                    return false;
                }
                let rank = sq.rank().to_u32();
                match piece.color {
                    Color::White => rank > 1,
                    Color::Black => rank < 6,
                }
            })
            .count() as f64
            * 10.0
    }

    /// 走法质量：走后子力（走子方视角）+ 将死 1000 / 将军 50 + 吃子 10
    pub fn move_quality(position: &Position, mv: Move) -> Result<f64, AiError> {
        let mover = position.turn();
        let next = MoveGenerator::apply(position, mv)?;

        let mut score = Self::material_for(&next, mover);
        if next.status() == GameStatus::Checkmate {
            score += 1000.0;
        } else if next.is_check() {
            score += 50.0;
        }
        if MoveGenerator::is_capture(mv) {
            score += 10.0;
        }

        Ok(score)
    }

    /// 走后子力差（走子方视角）
    pub fn material_after(position: &Position, mv: Move) -> Result<f64, AiError> {
        let mover = position.turn();
        let next = MoveGenerator::apply(position, mv)?;
        Ok(Self::material_for(&next, mover))
    }

    /// 走后局面的精细评估（走子方视角）
    pub fn outcome_after(position: &Position, mv: Move) -> Result<f64, AiError> {
        let mover = position.turn();
        let next = MoveGenerator::apply(position, mv)?;
        Ok(Self::evaluate_for(&next, mover))
    }
}
