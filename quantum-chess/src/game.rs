//! 自对弈
//!
//! 从给定局面开始，每个半回合调用一次走法选择，直到达到步数或对局结束。

use anyhow::{Context, Result};
use chess_core::{GameStatus, MoveGenerator, Notation, Position};
use quantum_ai::{Method, QuantumSelector, SelectionOutcome};
use serde::Serialize;
use tracing::info;

/// 单步记录
#[derive(Debug, Clone, Serialize)]
pub struct PlyRecord {
    pub ply: usize,
    pub san: String,
    pub uci: String,
    pub outcome: SelectionOutcome,
    pub probability: f64,
}

/// 自对弈记录
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub start_fen: String,
    pub method: Method,
    pub plies: Vec<PlyRecord>,
    pub final_fen: String,
    pub status: GameStatus,
}

impl GameRecord {
    /// 带回合号的走法序列，如 `1. e4 e5 2. Nf3`
    pub fn movetext(&self, start: &Position) -> String {
        let mut parts = Vec::new();
        let mut fullmove = start.fullmoves();
        let mut white_to_move = start.turn().is_white();

        for (i, ply) in self.plies.iter().enumerate() {
            if white_to_move {
                parts.push(format!("{}.", fullmove));
            } else if i == 0 {
                parts.push(format!("{}...", fullmove));
            }
            parts.push(ply.san.clone());
            if !white_to_move {
                fullmove += 1;
            }
            white_to_move = !white_to_move;
        }

        parts.join(" ")
    }
}

/// 自对弈若干半回合
pub fn self_play(
    selector: &mut QuantumSelector,
    start: &Position,
    method: Method,
    max_plies: usize,
) -> Result<GameRecord> {
    let mut position = start.clone();
    let mut plies = Vec::new();

    for ply in 1..=max_plies {
        if position.status().is_terminal() {
            break;
        }

        let selection = selector
            .select(&position, method)
            .with_context(|| format!("第 {} 步选择失败", ply))?;

        plies.push(PlyRecord {
            ply,
            san: Notation::san(&position, selection.chosen),
            uci: selection.uci(),
            outcome: selection.outcome,
            probability: selection.probability(),
        });
        position = MoveGenerator::apply(&position, selection.chosen)?;
    }

    let status = position.status();
    info!("自对弈结束: {} 步, {:?}", plies.len(), status);

    Ok(GameRecord {
        start_fen: start.key(),
        method,
        plies,
        final_fen: position.key(),
        status,
    })
}
