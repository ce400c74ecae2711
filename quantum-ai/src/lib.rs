//! 量子启发式走法选择引擎
//!
//! 包含:
//! - 局面评估函数（轻量 / 精细 / 走法质量）
//! - 未来局面图及图游走聚合
//! - 打分策略
//! - 振幅编码采样及采样后端
//! - 带回退的走法选择器

mod backend;
mod config;
mod error;
mod evaluate;
mod graph;
mod sampler;
mod selector;
mod strategy;
mod walk;

pub use backend::{
    bitstring, validate_state, BackendKind, Counts, DisabledBackend, ExactBackend, SamplingBackend,
    StatevectorSimulator,
};
pub use config::{SearchPreset, SelectorConfig};
pub use error::{AiError, BackendError};
pub use evaluate::{Evaluator, CHECKMATE_SCORE};
pub use graph::{FutureGraph, GraphNode, NodeId};
pub use sampler::{AmplitudeSampler, SampleResult};
pub use selector::{ProbabilityMap, QuantumSelector, Selection, SelectionOutcome};
pub use strategy::{shift_positive, Method};
pub use walk::{WalkAggregator, WalkPolicy};
