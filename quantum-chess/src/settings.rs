//! 配置加载
//!
//! 配置来源按优先级从低到高：预设 -> JSON 配置文件 -> 命令行参数。
//! 配置文件不存在、无法读取或格式无效时记录警告并使用预设值。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quantum_ai::{BackendKind, SearchPreset, SelectorConfig};
use serde_json::Value;
use tracing::{info, warn};

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub backend: Option<BackendKind>,
    pub depth: Option<u8>,
    pub shots: Option<u32>,
}

/// 读取配置文件，失败时回退到预设
pub fn load_config(path: Option<&Path>, preset: SearchPreset) -> SelectorConfig {
    let fallback = SelectorConfig::from_preset(preset);
    let Some(path) = path else {
        return fallback;
    };

    if !path.exists() {
        warn!("配置文件不存在: {:?}，使用 {} 预设", path, preset.as_str());
        return fallback;
    }

    match fs::read_to_string(path) {
        Ok(content) => match merge_onto(&fallback, &content) {
            Ok(config) => {
                info!("已加载配置: {:?}", path);
                if !config.is_normalized() {
                    warn!("配置参数越界，已自动修正");
                }
                config.normalized()
            }
            Err(e) => {
                warn!("配置文件格式无效: {}，使用 {} 预设", e, preset.as_str());
                fallback
            }
        },
        Err(e) => {
            warn!("无法读取配置文件: {}，使用 {} 预设", e, preset.as_str());
            fallback
        }
    }
}

/// 文件中出现的字段覆盖预设，未出现的字段保留预设值
fn merge_onto(base: &SelectorConfig, content: &str) -> serde_json::Result<SelectorConfig> {
    let mut merged = serde_json::to_value(base)?;
    let overlay: Value = serde_json::from_str(content)?;

    match (merged.as_object_mut(), overlay) {
        (Some(fields), Value::Object(overlay)) => fields.extend(overlay),
        (_, other) => merged = other,
    }

    serde_json::from_value(merged)
}

/// 应用命令行覆盖项
pub fn apply_overrides(mut config: SelectorConfig, overrides: &Overrides) -> SelectorConfig {
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(backend) = overrides.backend {
        config.backend = backend;
    }
    if let Some(depth) = overrides.depth {
        config.depth = depth;
    }
    if let Some(shots) = overrides.shots {
        config.shots = shots;
    }
    config.normalized()
}

/// 保存配置到文件
pub fn save_config(config: &SelectorConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("无法创建目录: {:?}", parent))?;
    }

    let content = serde_json::to_string_pretty(config).context("序列化配置失败")?;
    fs::write(path, content).with_context(|| format!("写入文件失败: {:?}", path))?;

    info!("配置已保存: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_uses_preset() {
        let config = load_config(None, SearchPreset::Deep);
        assert_eq!(config, SelectorConfig::from_preset(SearchPreset::Deep));
    }

    #[test]
    fn test_missing_file_uses_preset() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("absent.json")), SearchPreset::Quick);
        assert_eq!(config, SelectorConfig::from_preset(SearchPreset::Quick));
    }

    #[test]
    fn test_invalid_file_uses_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ depth: ").unwrap();

        let config = load_config(Some(&path), SearchPreset::Standard);
        assert_eq!(config, SelectorConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("selector.json");
        let config = SelectorConfig {
            depth: 3,
            seed: Some(11),
            backend: BackendKind::Exact,
            ..SelectorConfig::default()
        };

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(Some(&path), SearchPreset::Quick), config);
    }

    #[test]
    fn test_out_of_range_values_are_fixed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("selector.json");
        fs::write(&path, r#"{"depth": 0, "shots": 0}"#).unwrap();

        let config = load_config(Some(&path), SearchPreset::Standard);
        assert_eq!(config.depth, 1);
        assert_eq!(config.shots, 1);
    }

    #[test]
    fn test_file_is_layered_over_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("selector.json");
        fs::write(&path, r#"{"depth": 3}"#).unwrap();

        let config = load_config(Some(&path), SearchPreset::Quick);
        let quick = SelectorConfig::from_preset(SearchPreset::Quick);
        assert_eq!(config.depth, 3);
        assert_eq!(config.breadth, quick.breadth, "未出现的字段应保留预设值");
        assert_eq!(config.shots, quick.shots);
    }

    #[test]
    fn test_non_object_file_uses_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("selector.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let config = load_config(Some(&path), SearchPreset::Deep);
        assert_eq!(config, SelectorConfig::from_preset(SearchPreset::Deep));
    }

    #[test]
    fn test_overrides() {
        let overrides = Overrides {
            seed: Some(5),
            backend: Some(BackendKind::Disabled),
            depth: Some(3),
            shots: None,
        };
        let config = apply_overrides(SelectorConfig::default(), &overrides);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.backend, BackendKind::Disabled);
        assert_eq!(config.depth, 3);
        assert_eq!(config.shots, 512);
    }
}
