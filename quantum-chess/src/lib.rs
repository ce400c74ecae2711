//! 量子走法选择命令行
//!
//! 包含:
//! - 配置加载
//! - 选择结果输出
//! - 自对弈

pub mod game;
pub mod report;
pub mod settings;

pub use game::{self_play, GameRecord, PlyRecord};
pub use report::{MoveProbability, SelectionReport};
pub use settings::{apply_overrides, load_config, save_config, Overrides};
