//! 自定义配置档
//!
//! 用户为特定站点编写的元素定位规则，替代内置平台提取逻辑

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 作答字段类型（配置档显式声明）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    TextInput,
    MultipleChoice,
    CheckboxGroup,
    SingleCheckbox,
    Dropdown,
}

/// 自定义配置档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomProfile {
    /// 配置档名称
    pub name: String,
    /// 主机名（精确匹配，或一个正则表达式）
    pub hostname: String,
    /// 题干选择器
    pub question_selector: String,
    /// 选项选择器（选择类字段）
    #[serde(default)]
    pub option_selector: Option<String>,
    /// 作答字段选择器（文本输入 / 单个复选框 / 下拉框本体）
    #[serde(default)]
    pub field_selector: Option<String>,
    /// 作答字段类型；缺省时按选择器命中情况推断
    #[serde(default)]
    pub field_kind: Option<FieldKind>,
}

impl CustomProfile {
    /// 判断配置档是否适用于给定主机名
    ///
    /// 先做精确比较，再把 hostname 当作正则尝试；非法正则视为不匹配。
    pub fn matches(&self, hostname: &str) -> bool {
        if self.hostname == hostname {
            return true;
        }
        match regex::Regex::new(&self.hostname) {
            Ok(re) => re.is_match(hostname),
            Err(e) => {
                warn!("⚠️ 配置档 {} 的主机名模式非法: {}", self.name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(hostname: &str) -> CustomProfile {
        CustomProfile {
            name: "测试".to_string(),
            hostname: hostname.to_string(),
            question_selector: ".question".to_string(),
            option_selector: None,
            field_selector: None,
            field_kind: None,
        }
    }

    #[test]
    fn exact_hostname_matches() {
        assert!(profile("quiz.example.com").matches("quiz.example.com"));
        assert!(!profile("quiz.example.com").matches("other.example.com"));
    }

    #[test]
    fn regex_hostname_matches_subdomains() {
        let p = profile(r"^.*\.example\.com$");
        assert!(p.matches("a.example.com"));
        assert!(p.matches("b.example.com"));
        assert!(!p.matches("example.org"));
    }

    #[test]
    fn invalid_regex_never_matches() {
        assert!(!profile("(unclosed").matches("unclosed.com"));
    }
}
