//! 自定义配置档加载器
//!
//! 从 TOML 文件读取配置档列表；文件不存在时返回空列表（不是错误）

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::profile::CustomProfile;

/// 配置档文件的顶层结构
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<CustomProfile>,
}

/// 加载全部自定义配置档
pub async fn load_profiles(path: impl AsRef<Path>) -> Result<Vec<CustomProfile>> {
    let path = path.as_ref();

    if !path.exists() {
        warn!("⚠️ 未找到自定义配置档文件: {}", path.display());
        return Ok(Vec::new());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取配置档文件失败: {}", path.display()))?;

    let file: ProfileFile = toml::from_str(&content).map_err(|e| AppError::Profile {
        name: path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!("✓ 加载了 {} 个自定义配置档", file.profiles.len());
    Ok(file.profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_file() {
        let content = r#"
[[profiles]]
name = "校内测验"
hostname = "quiz.school.edu"
question_selector = ".q-stem"
option_selector = ".q-option"
field_kind = "multiple_choice"
"#;
        let file: ProfileFile = toml::from_str(content).unwrap();
        assert_eq!(file.profiles.len(), 1);
        let p = &file.profiles[0];
        assert_eq!(p.hostname, "quiz.school.edu");
        assert_eq!(p.field_kind, Some(crate::models::FieldKind::MultipleChoice));
    }

    #[test]
    fn empty_file_yields_no_profiles() {
        let file: ProfileFile = toml::from_str("").unwrap();
        assert!(file.profiles.is_empty());
    }
}
