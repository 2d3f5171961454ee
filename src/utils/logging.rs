//! 日志工具模块
//!
//! 提供日志初始化和文本截断的辅助函数

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 读取 RUST_LOG 环境变量，缺省级别为 info；重复调用是无害的。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn truncate_cuts_long_text() {
        assert_eq!(truncate_text("abcdefgh", 4), "abcd...");
    }
}
