//! 采样后端
//!
//! 后端接收一个长度为 2^n 的归一化复振幅向量，执行 `shots` 次计算基测量，
//! 返回 {比特串 -> 次数}。比特串是基态下标的标准二进制表示（高位在前），
//! 宽度为 max(n, 1)。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// 测量计数
pub type Counts = BTreeMap<String, u64>;

/// 归一化容差
pub const NORM_TOLERANCE: f64 = 1e-6;

/// 采样后端
pub trait SamplingBackend {
    /// 后端名称
    fn name(&self) -> &str;

    /// 对振幅向量执行 `shots` 次测量
    fn run(&mut self, amplitudes: &[Complex64], shots: u32) -> Result<Counts, BackendError>;
}

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 随机态矢量采样
    Simulator,
    /// 按概率四舍五入的确定性计数
    Exact,
    /// 不可用（总是失败）
    Disabled,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Simulator => "simulator",
            BackendKind::Exact => "exact",
            BackendKind::Disabled => "disabled",
        }
    }

    /// 创建后端实例
    pub fn build(self, seed: Option<u64>) -> Box<dyn SamplingBackend> {
        match self {
            BackendKind::Simulator => Box::new(StatevectorSimulator::new(seed)),
            BackendKind::Exact => Box::new(ExactBackend),
            BackendKind::Disabled => Box::new(DisabledBackend),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulator" | "statevector" => Ok(BackendKind::Simulator),
            "exact" => Ok(BackendKind::Exact),
            "disabled" | "none" => Ok(BackendKind::Disabled),
            other => Err(BackendError::Unavailable {
                name: other.to_string(),
            }),
        }
    }
}

/// 校验振幅向量，返回量子比特数
pub fn validate_state(amplitudes: &[Complex64]) -> Result<usize, BackendError> {
    let len = amplitudes.len();
    if len == 0 || !len.is_power_of_two() {
        return Err(BackendError::invalid_state(format!(
            "length {} is not a power of two",
            len
        )));
    }

    let norm: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum();
    if !norm.is_finite() || (norm - 1.0).abs() > NORM_TOLERANCE {
        return Err(BackendError::invalid_state(format!(
            "squared norm {} is not 1",
            norm
        )));
    }

    Ok(len.trailing_zeros() as usize)
}

/// 基态下标的比特串
pub fn bitstring(index: usize, qubits: usize) -> String {
    format!("{:0width$b}", index, width = qubits.max(1))
}

/// 态矢量模拟器
pub struct StatevectorSimulator {
    rng: ChaCha20Rng,
}

impl StatevectorSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }
}

impl SamplingBackend for StatevectorSimulator {
    fn name(&self) -> &str {
        "statevector_simulator"
    }

    fn run(&mut self, amplitudes: &[Complex64], shots: u32) -> Result<Counts, BackendError> {
        let qubits = validate_state(amplitudes)?;
        if shots == 0 {
            return Err(BackendError::InvalidShots);
        }

        let weights: Vec<f64> = amplitudes.iter().map(|a| a.norm_sqr()).collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| BackendError::Sampling(e.to_string()))?;

        let mut counts = Counts::new();
        for _ in 0..shots {
            let index = dist.sample(&mut self.rng);
            *counts.entry(bitstring(index, qubits)).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// 确定性后端：计数 = round(|a|² × shots)
pub struct ExactBackend;

impl SamplingBackend for ExactBackend {
    fn name(&self) -> &str {
        "exact"
    }

    fn run(&mut self, amplitudes: &[Complex64], shots: u32) -> Result<Counts, BackendError> {
        let qubits = validate_state(amplitudes)?;
        if shots == 0 {
            return Err(BackendError::InvalidShots);
        }

        Ok(amplitudes
            .iter()
            .enumerate()
            .map(|(index, a)| (index, (a.norm_sqr() * shots as f64).round() as u64))
            .filter(|&(_, count)| count > 0)
            .map(|(index, count)| (bitstring(index, qubits), count))
            .collect())
    }
}

/// 不可用的后端
pub struct DisabledBackend;

impl SamplingBackend for DisabledBackend {
    fn name(&self) -> &str {
        "disabled"
    }

    fn run(&mut self, _amplitudes: &[Complex64], _shots: u32) -> Result<Counts, BackendError> {
        Err(BackendError::Unavailable {
            name: self.name().to_string(),
        })
    }
}
