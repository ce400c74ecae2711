//! 选择结果的输出格式

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chess_core::{Notation, Position};
use quantum_ai::{Selection, SelectionOutcome};
use serde::Serialize;

/// 候选走法概率
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveProbability {
    pub san: String,
    pub uci: String,
    pub probability: f64,
}

/// 一次选择的报告
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub fen: String,
    pub method: String,
    pub outcome: SelectionOutcome,
    pub chosen_san: String,
    pub chosen_uci: String,
    /// 按概率降序
    pub probabilities: Vec<MoveProbability>,
    pub counts: BTreeMap<String, u64>,
}

impl SelectionReport {
    pub fn new(position: &Position, selection: &Selection) -> Self {
        let mut probabilities: Vec<MoveProbability> = selection
            .probabilities
            .iter()
            .map(|(uci, &probability)| MoveProbability {
                san: Notation::parse_uci(position, uci)
                    .map(|mv| Notation::san(position, mv))
                    .unwrap_or_else(|_| uci.clone()),
                uci: uci.clone(),
                probability,
            })
            .collect();
        probabilities.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        Self {
            fen: position.key(),
            method: selection.method.to_string(),
            outcome: selection.outcome,
            chosen_san: Notation::san(position, selection.chosen),
            chosen_uci: selection.uci(),
            probabilities,
            counts: selection.counts.clone(),
        }
    }

    /// 文本表格
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "局面: {}", self.fen);
        let _ = writeln!(out, "方法: {} ({:?})", self.method, self.outcome);
        let _ = writeln!(out, "选择: {} ({})", self.chosen_san, self.chosen_uci);
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<8} {:<8} {:>8}", "SAN", "UCI", "概率");
        for entry in &self.probabilities {
            let _ = writeln!(
                out,
                "{:<8} {:<8} {:>8.3}",
                entry.san, entry.uci, entry.probability
            );
        }
        out
    }
}
