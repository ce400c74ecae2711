//! 走法生成和应用

use shakmaty::{Move, Position as _};

use crate::error::ChessError;
use crate::notation::Notation;
use crate::position::Position;

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成所有合法走法（规则库的固定顺序）
    pub fn generate_legal(position: &Position) -> Vec<Move> {
        position.chess().legal_moves().into_iter().collect()
    }

    /// 应用走法，返回新局面（原局面不变）
    pub fn apply(position: &Position, mv: Move) -> Result<Position, ChessError> {
        if !position.chess().is_legal(mv) {
            return Err(ChessError::IllegalMove {
                uci: Notation::uci(mv),
            });
        }

        let mut chess = position.chess().clone();
        chess.play_unchecked(mv);
        Ok(position.successor(chess, mv.is_zeroing()))
    }

    /// 走法是否为吃子
    pub fn is_capture(mv: Move) -> bool {
        mv.is_capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    #[test]
    fn test_initial_move_count() {
        let position = Position::initial();
        let moves = MoveGenerator::generate_legal(&position);
        assert_eq!(moves.len(), 20, "初始局面应有 20 个合法走法");
    }

    #[test]
    fn test_generation_order_is_stable() {
        let position = Position::initial();
        let first = MoveGenerator::generate_legal(&position);
        let second = MoveGenerator::generate_legal(&position);
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_is_pure() {
        let position = Position::initial();
        let before = position.key();
        let mv = Notation::parse_uci(&position, "e2e4").unwrap();

        let next = MoveGenerator::apply(&position, mv).unwrap();

        assert_eq!(position.key(), before, "原局面不应被修改");
        assert_eq!(
            next.key(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_apply_illegal_move() {
        let position = Position::initial();
        let after = MoveGenerator::apply(&position, Notation::parse_uci(&position, "e2e4").unwrap()).unwrap();
        // 白方的走法在黑方走子时不合法
        let mv = Notation::parse_uci(&position, "d2d4").unwrap();
        assert!(matches!(
            MoveGenerator::apply(&after, mv),
            Err(ChessError::IllegalMove { .. })
        ));
    }

    #[test]
    fn test_single_escape() {
        // 白王被 h1 车将军，b 线被 b8 车控制，只能走 Ka2
        let position = Fen::parse("kr6/8/8/8/8/8/8/K6r w - - 0 1").unwrap();
        assert!(position.is_check());

        let moves = MoveGenerator::generate_legal(&position);
        assert_eq!(moves.len(), 1);
        assert_eq!(Notation::uci(moves[0]), "a1a2");
    }

    #[test]
    fn test_capture_detection() {
        let position = Fen::parse("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let capture = Notation::parse_uci(&position, "e4d5").unwrap();
        let push = Notation::parse_uci(&position, "e4e5").unwrap();
        assert!(MoveGenerator::is_capture(capture));
        assert!(!MoveGenerator::is_capture(push));
    }
}
