//! 走法选择配置

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;

/// 搜索预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPreset {
    Quick,
    Standard,
    Deep,
}

impl SearchPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPreset::Quick => "quick",
            SearchPreset::Standard => "standard",
            SearchPreset::Deep => "deep",
        }
    }
}

impl FromStr for SearchPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(SearchPreset::Quick),
            "standard" => Ok(SearchPreset::Standard),
            "deep" => Ok(SearchPreset::Deep),
            other => Err(format!("unknown preset '{}'", other)),
        }
    }
}

/// 走法选择配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// 未来局面图的展开深度（半回合）
    pub depth: u8,
    /// 非根节点最多展开的走法数，`None` 表示不限
    pub breadth: Option<usize>,
    /// 进入采样的候选走法数
    pub top_k: usize,
    /// 采样次数
    pub shots: u32,
    /// 振幅衰减游走的每层衰减系数
    pub decay: f64,
    /// 未来局面图的节点上限
    pub max_nodes: usize,
    /// 采样后端
    pub backend: BackendKind,
    /// 随机种子，`None` 时使用系统熵
    pub seed: Option<u64>,
}

impl SelectorConfig {
    pub fn from_preset(preset: SearchPreset) -> Self {
        let base = Self {
            depth: 2,
            breadth: Some(10),
            top_k: 8,
            shots: 512,
            decay: 0.8,
            max_nodes: 100_000,
            backend: BackendKind::Simulator,
            seed: None,
        };

        match preset {
            SearchPreset::Quick => Self {
                breadth: Some(5),
                shots: 256,
                ..base
            },
            SearchPreset::Standard => base,
            SearchPreset::Deep => Self {
                depth: 3,
                shots: 1024,
                ..base
            },
        }
    }

    /// 修正越界参数
    pub fn normalized(mut self) -> Self {
        self.depth = self.depth.max(1);
        self.top_k = self.top_k.max(1);
        self.shots = self.shots.max(1);
        self.max_nodes = self.max_nodes.max(1);
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            self.decay = 0.8;
        }
        if self.breadth == Some(0) {
            self.breadth = None;
        }
        self
    }

    /// 配置是否无需修正
    pub fn is_normalized(&self) -> bool {
        self.clone().normalized() == *self
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self::from_preset(SearchPreset::Standard)
    }
}
