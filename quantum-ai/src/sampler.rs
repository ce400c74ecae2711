//! 振幅编码采样
//!
//! 分数 -> 截断负值 -> 开方 -> 归一化 -> 补零到 2 的幂 -> 后端测量 -> 经验概率。
//! 分数越高的候选被测到的概率越大（概率与截断后的分数成正比）。

use std::collections::BTreeMap;

use num_complex::Complex64;
use tracing::debug;

use crate::backend::{Counts, SamplingBackend};
use crate::error::{AiError, BackendError};

/// 采样结果（以候选下标为键）
#[derive(Debug, Clone, PartialEq)]
pub struct SampleResult {
    /// 经验概率，只含被测到的候选
    pub probabilities: BTreeMap<usize, f64>,
    /// 原始计数（已丢弃补零位置）
    pub counts: BTreeMap<usize, u64>,
}

impl SampleResult {
    /// 概率最高的候选，并列时取下标较小者
    pub fn most_likely(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (&index, &p) in &self.probabilities {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((index, p));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// 振幅采样器
pub struct AmplitudeSampler;

impl AmplitudeSampler {
    /// 分数转为实振幅：负值和非有限值截断为 0，全零时取均匀分布
    pub fn encode(scores: &[f64]) -> Vec<f64> {
        let clipped: Vec<f64> = scores
            .iter()
            .map(|&s| if s.is_finite() && s > 0.0 { s } else { 0.0 })
            .collect();

        if clipped.iter().all(|&s| s == 0.0) {
            let uniform = 1.0 / (scores.len() as f64).sqrt();
            return vec![uniform; scores.len()];
        }

        let roots: Vec<f64> = clipped.iter().map(|s| s.sqrt()).collect();
        let norm = roots.iter().map(|a| a * a).sum::<f64>().sqrt();
        roots.into_iter().map(|a| a / norm).collect()
    }

    /// 补零到 2 的幂
    pub fn pad(amplitudes: &[f64]) -> Vec<Complex64> {
        let dim = amplitudes.len().max(1).next_power_of_two();
        let mut state: Vec<Complex64> = amplitudes.iter().map(|&a| Complex64::new(a, 0.0)).collect();
        state.resize(dim, Complex64::new(0.0, 0.0));
        state
    }

    /// 对分数做振幅编码并采样
    pub fn sample(
        backend: &mut dyn SamplingBackend,
        scores: &[f64],
        shots: u32,
    ) -> Result<SampleResult, AiError> {
        if scores.is_empty() {
            return Err(AiError::EmptySample);
        }

        let state = Self::pad(&Self::encode(scores));
        let counts = backend.run(&state, shots)?;
        debug!("后端 {} 返回 {} 个测量结果", backend.name(), counts.len());

        Self::interpret(&counts, scores.len())
    }

    /// 比特串转为候选下标，丢弃补零位置并归一化
    pub fn interpret(counts: &Counts, candidates: usize) -> Result<SampleResult, AiError> {
        let mut kept = BTreeMap::new();
        for (bits, &count) in counts {
            let index = usize::from_str_radix(bits, 2).map_err(|_| BackendError::MalformedOutcome {
                outcome: bits.clone(),
            })?;
            if index < candidates && count > 0 {
                *kept.entry(index).or_insert(0) += count;
            }
        }

        let total: u64 = kept.values().sum();
        if total == 0 {
            return Err(AiError::EmptySample);
        }

        let probabilities = kept
            .iter()
            .map(|(&index, &count)| (index, count as f64 / total as f64))
            .collect();

        Ok(SampleResult {
            probabilities,
            counts: kept,
        })
    }
}
