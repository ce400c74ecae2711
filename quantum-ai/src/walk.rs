//! 图游走聚合
//!
//! 把未来局面图上的启发式分数聚合成根节点每个走法的分数。
//! 节点启发式以节点自身走子方为视角，聚合时换算到根走子方（走法方）视角。

use std::collections::HashMap;

use chess_core::{Color, Move, Position};
use serde::{Deserialize, Serialize};

use crate::evaluate::Evaluator;
use crate::graph::{FutureGraph, NodeId};

/// 聚合策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkPolicy {
    /// 连通度加权：前沿节点按 sqrt(分支数) 加权取平均
    Connectivity,
    /// 振幅衰减：叶节点按 decay^深度 累加，再除以 sqrt(叶节点数)
    AmplitudeDecay { decay: f64 },
}

/// 游走聚合器
pub struct WalkAggregator;

impl WalkAggregator {
    /// 根节点每个走法的聚合分数
    pub fn aggregate(graph: &FutureGraph, policy: WalkPolicy) -> HashMap<Move, f64> {
        let mover = graph.root().position.turn();

        graph
            .first_moves()
            .iter()
            .map(|&(mv, child)| {
                let score = if graph.out_degree(child) == 0 {
                    // 子树为空，退化为走后局面的静态分
                    Self::heuristic(graph, child, mover, policy)
                } else {
                    match policy {
                        WalkPolicy::Connectivity => Self::connectivity(graph, child, mover),
                        WalkPolicy::AmplitudeDecay { decay } => {
                            Self::amplitude_decay(graph, mv, mover, decay)
                        }
                    }
                };
                (mv, score)
            })
            .collect()
    }

    fn heuristic(graph: &FutureGraph, id: NodeId, mover: Color, policy: WalkPolicy) -> f64 {
        let position = &graph.node(id).position;
        let score = match policy {
            WalkPolicy::Connectivity => Evaluator::walk_heuristic(position),
            WalkPolicy::AmplitudeDecay { .. } => Evaluator::position_quality(position),
        };
        Self::for_mover(position, mover, score)
    }

    fn for_mover(position: &Position, mover: Color, score: f64) -> f64 {
        if position.turn() == mover {
            score
        } else {
            -score
        }
    }

    /// 逐层推进前沿到最大深度，前沿保留重复路径
    ///
    /// 没有后继的节点（终局）原样留在前沿中，权重取节点的分支数。
    fn connectivity(graph: &FutureGraph, child: NodeId, mover: Color) -> f64 {
        let mut frontier = vec![child];
        for _ in 1..graph.max_depth() {
            let mut advanced = false;
            let mut next = Vec::with_capacity(frontier.len());
            for &id in &frontier {
                if graph.out_degree(id) == 0 {
                    next.push(id);
                } else {
                    next.extend(graph.successors(id));
                    advanced = true;
                }
            }
            if !advanced {
                break;
            }
            frontier = next;
        }

        let total: f64 = frontier
            .iter()
            .map(|&id| {
                let weight = (graph.branching(id).max(1) as f64).sqrt();
                weight * Self::heuristic(graph, id, mover, WalkPolicy::Connectivity)
            })
            .sum();

        total / frontier.len() as f64
    }

    /// 叶节点：不再展开的可达节点（到达最大深度或终局）
    fn amplitude_decay(graph: &FutureGraph, mv: Move, mover: Color, decay: f64) -> f64 {
        let leaves: Vec<NodeId> = graph
            .descendants(mv)
            .map(|reached| {
                reached
                    .iter()
                    .copied()
                    .filter(|&id| graph.out_degree(id) == 0)
                    .collect()
            })
            .unwrap_or_default();

        if leaves.is_empty() {
            return 0.0;
        }

        let policy = WalkPolicy::AmplitudeDecay { decay };
        let total: f64 = leaves
            .iter()
            .map(|&id| {
                let factor = decay.powi(graph.node(id).depth as i32);
                factor * Self::heuristic(graph, id, mover, policy)
            })
            .sum();

        total / (leaves.len() as f64).sqrt()
    }
}
