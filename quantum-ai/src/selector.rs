//! 走法选择器
//!
//! 选择流程：
//! 1. 唯一合法走法直接返回
//! 2. 按方法打分（失败或分数不可用则回退）
//! 3. 不超过 2 个候选时直接取最高分
//! 4. 取前 K 个候选做振幅采样，返回概率最高者（采样失败则回退）
//! 5. 回退：在全部合法走法上取最高分，必要时用最稳健的方法重新打分
//!
//! 只要存在合法走法，调用方总能拿到一个合法走法。

use std::collections::BTreeMap;

use chess_core::{Fen, Move, MoveGenerator, Notation, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::SamplingBackend;
use crate::config::SelectorConfig;
use crate::error::AiError;
use crate::evaluate::Evaluator;
use crate::sampler::AmplitudeSampler;
use crate::strategy::Method;

/// 走法 -> 概率（以 UCI 为键）
pub type ProbabilityMap = BTreeMap<String, f64>;

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// 只有一个合法走法
    SingleMove,
    /// 候选不超过 2 个，直接取最高分
    Direct,
    /// 振幅采样
    Sampled,
    /// 打分或采样失败后的最高分回退
    Fallback,
}

/// 选择结果
#[derive(Debug, Clone)]
pub struct Selection {
    pub chosen: Move,
    /// 候选走法的概率，未被测到的候选为 0
    pub probabilities: ProbabilityMap,
    /// 原始测量计数，仅在采样成功时非空
    pub counts: BTreeMap<String, u64>,
    pub outcome: SelectionOutcome,
    pub method: Method,
}

impl Selection {
    fn certain(chosen: Move, outcome: SelectionOutcome, method: Method) -> Self {
        Self {
            chosen,
            probabilities: ProbabilityMap::from([(Notation::uci(chosen), 1.0)]),
            counts: BTreeMap::new(),
            outcome,
            method,
        }
    }

    /// 选中走法的 UCI
    pub fn uci(&self) -> String {
        Notation::uci(self.chosen)
    }

    /// 选中走法的概率
    pub fn probability(&self) -> f64 {
        self.probabilities.get(&self.uci()).copied().unwrap_or(0.0)
    }
}

/// 选择流程的状态
enum Stage {
    Score,
    Rank(Vec<f64>),
    Sample { scores: Vec<f64>, candidates: Vec<usize> },
    Fallback { scores: Option<Vec<f64>>, reason: AiError },
    Done(Selection),
}

/// 走法选择器
pub struct QuantumSelector {
    config: SelectorConfig,
    backend: Box<dyn SamplingBackend>,
}

impl QuantumSelector {
    /// 按配置创建选择器
    pub fn new(config: SelectorConfig) -> Self {
        let config = config.normalized();
        let backend = config.backend.build(config.seed);
        Self { config, backend }
    }

    /// 使用自定义采样后端
    pub fn with_backend(config: SelectorConfig, backend: Box<dyn SamplingBackend>) -> Self {
        Self {
            config: config.normalized(),
            backend,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// 对局面的全部合法走法做选择，候选数取配置值
    pub fn select(&mut self, position: &Position, method: Method) -> Result<Selection, AiError> {
        let moves = MoveGenerator::generate_legal(position);
        let top_k = self.config.top_k;
        self.select_move(position, &moves, method, top_k)
    }

    /// 从 FEN 开始选择
    pub fn select_from_fen(&mut self, fen: &str, method: Method) -> Result<Selection, AiError> {
        let position = Fen::parse(fen)?;
        self.select(&position, method)
    }

    /// 在给定走法中选择一个
    pub fn select_move(
        &mut self,
        position: &Position,
        legal_moves: &[Move],
        method: Method,
        top_k: usize,
    ) -> Result<Selection, AiError> {
        match legal_moves {
            [] => return Err(AiError::NoLegalMoves),
            [only] => {
                debug!("唯一合法走法 {}", Notation::uci(*only));
                return Ok(Selection::certain(*only, SelectionOutcome::SingleMove, method));
            }
            _ => {}
        }

        let top_k = top_k.max(1);
        let mut stage = Stage::Score;
        let selection = loop {
            stage = match stage {
                Stage::Score => match method.score(position, legal_moves, &self.config) {
                    Ok(scores) => match check_scores(&scores, legal_moves.len()) {
                        Ok(()) => Stage::Rank(scores),
                        Err(reason) => Stage::Fallback { scores: None, reason },
                    },
                    Err(reason) => Stage::Fallback { scores: None, reason },
                },

                Stage::Rank(scores) => {
                    debug!("{} 打分: {:?}", method, scores);
                    if scores.len() <= 2 {
                        let best = argmax(&scores);
                        Stage::Done(Selection::certain(
                            legal_moves[best],
                            SelectionOutcome::Direct,
                            method,
                        ))
                    } else {
                        let mut candidates: Vec<usize> = (0..scores.len()).collect();
                        candidates.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
                        candidates.truncate(top_k);
                        Stage::Sample { scores, candidates }
                    }
                }

                Stage::Sample { scores, candidates } => {
                    let candidate_scores: Vec<f64> = candidates.iter().map(|&i| scores[i]).collect();
                    match AmplitudeSampler::sample(
                        self.backend.as_mut(),
                        &candidate_scores,
                        self.config.shots,
                    ) {
                        Ok(result) => {
                            let best = result.most_likely().unwrap_or(0);
                            let probabilities = candidates
                                .iter()
                                .enumerate()
                                .map(|(slot, &i)| {
                                    let p = result.probabilities.get(&slot).copied().unwrap_or(0.0);
                                    (Notation::uci(legal_moves[i]), p)
                                })
                                .collect();
                            let counts = result
                                .counts
                                .iter()
                                .map(|(&slot, &count)| (Notation::uci(legal_moves[candidates[slot]]), count))
                                .collect();

                            Stage::Done(Selection {
                                chosen: legal_moves[candidates[best]],
                                probabilities,
                                counts,
                                outcome: SelectionOutcome::Sampled,
                                method,
                            })
                        }
                        Err(reason) => Stage::Fallback {
                            scores: Some(scores),
                            reason,
                        },
                    }
                }

                Stage::Fallback { scores, reason } => {
                    warn!("{} 选择失败: {}, 回退到最高分走法", method, reason);
                    let scores = scores.unwrap_or_else(|| robust_scores(position, legal_moves));
                    let best = argmax(&scores);
                    Stage::Done(Selection::certain(
                        legal_moves[best],
                        SelectionOutcome::Fallback,
                        method,
                    ))
                }

                Stage::Done(selection) => break selection,
            };
        };

        info!(
            "选择走法 {} ({:?}, {}, p={:.3})",
            Notation::san(position, selection.chosen),
            selection.outcome,
            method,
            selection.probability()
        );

        Ok(selection)
    }
}

/// 分数向量必须与走法一一对应且全部有限
fn check_scores(scores: &[f64], expected: usize) -> Result<(), AiError> {
    if scores.len() != expected {
        return Err(AiError::ScoreMismatch {
            expected,
            actual: scores.len(),
        });
    }
    match scores.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(AiError::NonFiniteScore { index }),
        None => Ok(()),
    }
}

/// 回退用的打分，单个走法失败时记为负无穷
fn robust_scores(position: &Position, moves: &[Move]) -> Vec<f64> {
    moves
        .iter()
        .map(|&mv| Evaluator::move_quality(position, mv).unwrap_or(f64::NEG_INFINITY))
        .collect()
}

/// 最高分下标，并列时取第一个
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if score.total_cmp(&scores[best]).is_gt() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, Counts, DisabledBackend, ExactBackend};
    use crate::error::BackendError;
    use num_complex::Complex64;

    fn seeded() -> SelectorConfig {
        SelectorConfig {
            seed: Some(42),
            ..SelectorConfig::default()
        }
    }

    /// 只返回补零位置的后端
    struct PaddingBackend;

    impl SamplingBackend for PaddingBackend {
        fn name(&self) -> &str {
            "padding"
        }

        fn run(&mut self, amplitudes: &[Complex64], shots: u32) -> Result<Counts, BackendError> {
            let last = amplitudes.len() - 1;
            Ok(Counts::from([(format!("{:b}", last), shots as u64)]))
        }
    }

    #[test]
    fn test_no_legal_moves() {
        let mut selector = QuantumSelector::new(seeded());
        let position = Position::initial();
        assert!(matches!(
            selector.select_move(&position, &[], Method::Grover, 8),
            Err(AiError::NoLegalMoves)
        ));

        let mate = Fen::parse("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(matches!(selector.select(&mate, Method::Classical), Err(AiError::NoLegalMoves)));
    }

    #[test]
    fn test_single_move() {
        let mut selector = QuantumSelector::new(seeded());
        let position = Fen::parse("kr6/8/8/8/8/8/8/K6r w - - 0 1").unwrap();

        for method in Method::ALL {
            let selection = selector.select(&position, method).unwrap();
            assert_eq!(selection.uci(), "a1a2");
            assert_eq!(selection.outcome, SelectionOutcome::SingleMove);
            assert_eq!(selection.probabilities, ProbabilityMap::from([("a1a2".to_string(), 1.0)]));
        }
    }

    #[test]
    fn test_two_moves_direct() {
        let mut selector = QuantumSelector::new(seeded());
        let position = Fen::parse("k7/8/8/8/8/8/8/K6r w - - 0 1").unwrap();
        let moves = MoveGenerator::generate_legal(&position);
        assert_eq!(moves.len(), 2);

        let selection = selector.select(&position, Method::Grover).unwrap();
        assert_eq!(selection.outcome, SelectionOutcome::Direct);
        assert!(moves.contains(&selection.chosen));
        assert_eq!(selection.probability(), 1.0);
    }

    #[test]
    fn test_initial_position_all_methods() {
        let mut selector = QuantumSelector::new(seeded());
        let position = Position::initial();
        let moves = MoveGenerator::generate_legal(&position);
        let legal: Vec<String> = moves.iter().map(|&mv| Notation::uci(mv)).collect();

        for method in Method::ALL {
            let selection = selector.select_move(&position, &moves, method, 8).unwrap();

            assert!(moves.contains(&selection.chosen), "{}", method);
            assert_eq!(selection.outcome, SelectionOutcome::Sampled, "{}", method);
            assert!(selection.probabilities.len() <= 8);
            assert!(selection.probabilities.keys().all(|k| legal.contains(k)));
            assert!(selection.probabilities.contains_key(&selection.uci()));

            let sum: f64 = selection.probabilities.values().sum();
            assert!((sum - 1.0).abs() < 1e-6, "{}: {}", method, sum);
        }
    }

    #[test]
    fn test_exact_backend_picks_best_candidate() {
        let config = SelectorConfig {
            backend: BackendKind::Exact,
            shots: 100_000,
            ..SelectorConfig::default()
        };
        let mut selector = QuantumSelector::new(config.clone());
        let position = Fen::parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();

        let selection = selector.select(&position, Method::Classical).unwrap();
        assert_eq!(selection.uci(), "e4d5");
        // 只有吃后一个走法分数为正
        assert!((selection.probability() - 1.0).abs() < 1e-9);

        let moves = MoveGenerator::generate_legal(&position);
        let scores = Method::Grover.score(&position, &moves, &config).unwrap();
        let selection = selector.select(&position, Method::Grover).unwrap();
        let positive: f64 = scores.iter().filter(|&&s| s > 0.0).sum();
        for (mv, score) in moves.iter().zip(&scores) {
            let expected = score.max(0.0) / positive;
            let actual = selection.probabilities.get(&Notation::uci(*mv)).copied().unwrap_or(0.0);
            assert!((actual - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_failing_backend_falls_back() {
        let mut selector = QuantumSelector::with_backend(seeded(), Box::new(DisabledBackend));
        let position = Fen::parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();

        let selection = selector.select(&position, Method::Grover).unwrap();
        assert_eq!(selection.outcome, SelectionOutcome::Fallback);
        assert_eq!(selection.uci(), "e4d5");
        assert_eq!(selection.probabilities, ProbabilityMap::from([("e4d5".to_string(), 1.0)]));
    }

    #[test]
    fn test_empty_sample_falls_back() {
        let mut selector = QuantumSelector::with_backend(seeded(), Box::new(PaddingBackend));
        let position = Fen::parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();

        // 5 个候选补到 8 维，测量结果全在补零位置
        let selection = selector.select(&position, Method::Classical).unwrap();
        assert_eq!(selection.outcome, SelectionOutcome::Fallback);
        assert_eq!(selection.uci(), "e4d5");
    }

    #[test]
    fn test_graph_failure_recomputes_scores() {
        let config = SelectorConfig {
            max_nodes: 5,
            ..seeded()
        };
        let mut selector = QuantumSelector::new(config);
        let position = Fen::parse("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();

        let selection = selector.select(&position, Method::QuantumWalk).unwrap();
        assert_eq!(selection.outcome, SelectionOutcome::Fallback);
        assert_eq!(selection.uci(), "e4d5");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let position = Position::initial();
        let first = QuantumSelector::new(seeded()).select(&position, Method::Grover).unwrap();
        let second = QuantumSelector::new(seeded()).select(&position, Method::Grover).unwrap();
        assert_eq!(first.chosen, second.chosen);
        assert_eq!(first.probabilities, second.probabilities);
    }

    #[test]
    fn test_select_from_fen() {
        let mut selector = QuantumSelector::with_backend(seeded(), Box::new(ExactBackend));
        assert!(selector.select_from_fen(chess_core::INITIAL_FEN, Method::Grover).is_ok());
        assert!(matches!(
            selector.select_from_fen("not a fen", Method::Grover),
            Err(AiError::Chess(chess_core::ChessError::InvalidPosition { .. }))
        ));
    }

    #[test]
    fn test_argmax_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]), 0);
    }

    #[test]
    fn test_check_scores() {
        assert!(check_scores(&[1.0, 2.0], 2).is_ok());
        assert_eq!(
            check_scores(&[1.0], 2),
            Err(AiError::ScoreMismatch { expected: 2, actual: 1 })
        );
        assert_eq!(
            check_scores(&[1.0, f64::NAN], 2),
            Err(AiError::NonFiniteScore { index: 1 })
        );
    }
}
