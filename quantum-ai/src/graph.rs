//! 未来局面图
//!
//! 从根局面出发逐层展开合法走法，得到一个以局面编码去重的有向图。
//! 根节点展开全部合法走法；其余节点最多展开 `breadth` 个（按规则库给出的顺序）。
//! 终局节点不再展开。
//!
//! 局面编码包含回合数和走子方，同一编码只可能出现在同一深度，
//! 因此逐层展开时节点深度即为到根的最短距离。

use std::collections::{BTreeSet, HashMap};

use chess_core::{Move, MoveGenerator, Position};
use tracing::debug;

use crate::error::AiError;

/// 节点编号（插入顺序）
pub type NodeId = usize;

/// 图节点
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub position: Position,
    /// 到根的最短半回合数
    pub depth: u8,
    /// 出边：(走法, 目标节点)
    pub children: Vec<(Move, NodeId)>,
}

/// 未来局面图
#[derive(Debug, Clone)]
pub struct FutureGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeId>,
    /// 根的每个走法可达的节点集合（含走后局面本身）
    descendants: HashMap<Move, BTreeSet<NodeId>>,
    max_depth: u8,
    breadth: Option<usize>,
}

impl FutureGraph {
    /// 根节点编号
    pub const ROOT: NodeId = 0;

    /// 构建未来局面图
    pub fn build(
        root: &Position,
        max_depth: u8,
        breadth: Option<usize>,
        max_nodes: usize,
    ) -> Result<Self, AiError> {
        let mut graph = Self {
            nodes: vec![GraphNode {
                position: root.clone(),
                depth: 0,
                children: Vec::new(),
            }],
            index: HashMap::from([(root.key(), Self::ROOT)]),
            descendants: HashMap::new(),
            max_depth,
            breadth,
        };

        let mut frontier = vec![Self::ROOT];
        for depth in 0..max_depth {
            let mut next_frontier = Vec::new();

            for id in frontier {
                let limit = if id == Self::ROOT { None } else { breadth };
                for (mv, position) in Self::expand(&graph.nodes[id].position, limit)? {
                    let key = position.key();
                    let child = match graph.index.get(&key) {
                        Some(&existing) => existing,
                        None => {
                            if graph.nodes.len() >= max_nodes {
                                return Err(AiError::GraphTooLarge { limit: max_nodes });
                            }
                            let new_id = graph.nodes.len();
                            graph.index.insert(key, new_id);
                            graph.nodes.push(GraphNode {
                                position,
                                depth: depth + 1,
                                children: Vec::new(),
                            });
                            next_frontier.push(new_id);
                            new_id
                        }
                    };
                    graph.nodes[id].children.push((mv, child));
                }
            }

            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        graph.index_descendants();
        debug!(
            "未来局面图: {} 个节点, {} 条边, 深度 {}",
            graph.len(),
            graph.edge_count(),
            max_depth
        );

        Ok(graph)
    }

    /// 单个节点的后继局面，原局面不变
    fn expand(position: &Position, limit: Option<usize>) -> Result<Vec<(Move, Position)>, AiError> {
        if position.status().is_terminal() {
            return Ok(Vec::new());
        }

        let mut moves = MoveGenerator::generate_legal(position);
        if let Some(limit) = limit {
            moves.truncate(limit);
        }

        moves
            .into_iter()
            .map(|mv| Ok((mv, MoveGenerator::apply(position, mv)?)))
            .collect()
    }

    fn index_descendants(&mut self) {
        let first_moves = self.nodes[Self::ROOT].children.clone();
        for (mv, child) in first_moves {
            let mut reached = BTreeSet::from([child]);
            let mut stack = vec![child];
            while let Some(id) = stack.pop() {
                for &(_, next) in &self.nodes[id].children {
                    if reached.insert(next) {
                        stack.push(next);
                    }
                }
            }
            self.descendants.insert(mv, reached);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.children.len()).sum()
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn root(&self) -> &GraphNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// 按局面编码查找节点
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// 出度
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.nodes[id].children.len()
    }

    /// 分支数：已展开节点取出度；最大深度上未展开的节点取合法走法数（受 `breadth` 限制），终局为 0
    pub fn branching(&self, id: NodeId) -> usize {
        let node = &self.nodes[id];
        if node.depth < self.max_depth {
            return node.children.len();
        }
        if node.position.status().is_terminal() {
            return 0;
        }

        let legal = node.position.legal_move_count();
        self.breadth.map_or(legal, |limit| legal.min(limit))
    }

    /// 后继节点
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id].children.iter().map(|&(_, child)| child)
    }

    /// 根节点的走法及其目标节点
    pub fn first_moves(&self) -> &[(Move, NodeId)] {
        &self.nodes[Self::ROOT].children
    }

    /// 根的某个走法可达的节点
    pub fn descendants(&self, mv: Move) -> Option<&BTreeSet<NodeId>> {
        self.descendants.get(&mv)
    }
}
