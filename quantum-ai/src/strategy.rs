//! 走法打分策略
//!
//! 每个策略把 (局面, 候选走法) 映射成等长的分数向量，分数越高越好，
//! 均以走法方视角计算。

use std::fmt;
use std::str::FromStr;

use chess_core::{ChessError, Move, Notation, Position};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SelectorConfig;
use crate::error::AiError;
use crate::evaluate::Evaluator;
use crate::graph::FutureGraph;
use crate::walk::{WalkAggregator, WalkPolicy};

/// 打分方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// 走后子力差
    Classical,
    /// 走法质量（子力 + 将军/将死 + 吃子）
    Grover,
    /// 连通度加权图游走
    QuantumWalk,
    /// 振幅衰减图游走
    TrueQuantumWalk,
    /// 精细评估，负分整体平移为正
    Qaoa,
}

impl Method {
    /// 最稳健的方法：不依赖图构建，只会因走法非法而失败
    pub const ROBUST: Method = Method::Grover;

    pub const ALL: [Method; 5] = [
        Method::Classical,
        Method::Grover,
        Method::QuantumWalk,
        Method::TrueQuantumWalk,
        Method::Qaoa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Classical => "classical",
            Method::Grover => "grover",
            Method::QuantumWalk => "quantum_walk",
            Method::TrueQuantumWalk => "true_quantum_walk",
            Method::Qaoa => "qaoa",
        }
    }

    /// 解析方法名，未知名称回退到最稳健的方法
    pub fn from_str_lossy(name: &str) -> Method {
        name.parse().unwrap_or_else(|_| {
            warn!("未知的打分方法 '{}', 使用 {}", name, Method::ROBUST);
            Method::ROBUST
        })
    }

    /// 为候选走法打分
    pub fn score(
        self,
        position: &Position,
        moves: &[Move],
        config: &SelectorConfig,
    ) -> Result<Vec<f64>, AiError> {
        match self {
            Method::Classical => moves
                .iter()
                .map(|&mv| Evaluator::material_after(position, mv))
                .collect(),
            Method::Grover => moves
                .iter()
                .map(|&mv| Evaluator::move_quality(position, mv))
                .collect(),
            Method::QuantumWalk => Self::walk_scores(position, moves, config, WalkPolicy::Connectivity),
            Method::TrueQuantumWalk => Self::walk_scores(
                position,
                moves,
                config,
                WalkPolicy::AmplitudeDecay {
                    decay: config.decay,
                },
            ),
            Method::Qaoa => {
                let scores = moves
                    .iter()
                    .map(|&mv| Evaluator::outcome_after(position, mv))
                    .collect::<Result<Vec<f64>, AiError>>()?;
                Ok(shift_positive(scores))
            }
        }
    }

    fn walk_scores(
        position: &Position,
        moves: &[Move],
        config: &SelectorConfig,
        policy: WalkPolicy,
    ) -> Result<Vec<f64>, AiError> {
        let graph = FutureGraph::build(position, config.depth, config.breadth, config.max_nodes)?;
        let aggregated = WalkAggregator::aggregate(&graph, policy);

        moves
            .iter()
            .map(|mv| {
                aggregated.get(mv).copied().ok_or_else(|| {
                    AiError::Chess(ChessError::IllegalMove {
                        uci: Notation::uci(*mv),
                    })
                })
            })
            .collect()
    }
}

/// 最小值为负时整体平移：s -> s - min + 1
pub fn shift_positive(scores: Vec<f64>) -> Vec<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        scores.into_iter().map(|s| s - min + 1.0).collect()
    } else {
        scores
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| AiError::UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Fen, MoveGenerator};

    #[test]
    fn test_parse_method() {
        assert_eq!("grover".parse::<Method>().unwrap(), Method::Grover);
        assert_eq!("quantum-walk".parse::<Method>().unwrap(), Method::QuantumWalk);
        assert_eq!(" QAOA ".parse::<Method>().unwrap(), Method::Qaoa);
        assert!(matches!("annealing".parse::<Method>(), Err(AiError::UnknownMethod(_))));
        assert_eq!(Method::from_str_lossy("annealing"), Method::ROBUST);
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn test_scores_match_move_count() {
        let position = Position::initial();
        let moves = MoveGenerator::generate_legal(&position);
        let config = SelectorConfig::default();

        for method in Method::ALL {
            let scores = method.score(&position, &moves, &config).unwrap();
            assert_eq!(scores.len(), moves.len(), "{}", method);
            assert!(scores.iter().all(|s| s.is_finite()), "{}", method);
        }
    }

    #[test]
    fn test_all_methods_prefer_free_queen() {
        let position = Fen::parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let moves = MoveGenerator::generate_legal(&position);
        let capture = Notation::parse_uci(&position, "e4d5").unwrap();
        let config = SelectorConfig::default();

        for method in Method::ALL {
            let scores = method.score(&position, &moves, &config).unwrap();
            let best = scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| moves[i])
                .unwrap();
            assert_eq!(best, capture, "{}", method);
        }
    }

    #[test]
    fn test_qaoa_scores_are_positive() {
        // 黑方少一个后，精细评估全为负
        let position = Fen::parse("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let moves = MoveGenerator::generate_legal(&position);
        let scores = Method::Qaoa
            .score(&position, &moves, &SelectorConfig::default())
            .unwrap();

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(min, 1.0);
    }

    #[test]
    fn test_shift_positive() {
        assert_eq!(shift_positive(vec![-2.0, 0.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert_eq!(shift_positive(vec![0.0, 3.0]), vec![0.0, 3.0]);
    }

    #[test]
    fn test_walk_rejects_foreign_move() {
        let position = Position::initial();
        let after = MoveGenerator::apply(&position, Notation::parse_uci(&position, "e2e4").unwrap()).unwrap();
        let black_move = Notation::parse_uci(&after, "e7e5").unwrap();

        let result = Method::QuantumWalk.score(&position, &[black_move], &SelectorConfig::default());
        assert!(matches!(result, Err(AiError::Chess(ChessError::IllegalMove { .. }))));
    }

    #[test]
    fn test_graph_limit_surfaces() {
        let config = SelectorConfig {
            max_nodes: 10,
            ..SelectorConfig::default()
        };
        let position = Position::initial();
        let moves = MoveGenerator::generate_legal(&position);
        assert!(matches!(
            Method::TrueQuantumWalk.score(&position, &moves, &config),
            Err(AiError::GraphTooLarge { .. })
        ));
    }
}
