//! 平台分派层
//!
//! 按主机名把页面分派给内置平台适配器或用户自定义配置档。
//! 单次查找：自定义配置档优先，其次内置主机名注册表；
//! 不做按站点展开的嵌套条件分支。

pub mod custom;
pub mod google_forms;
pub mod quiz;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::infrastructure::{DomDriver, DomNode, ElementHandle};
use crate::models::{AnswerField, ChoiceOption, CustomProfile};
use crate::services::normalizer::sanitize;

/// 支持的平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    GoogleForms,
    Quizizz,
    Kahoot,
    Wordwall,
    Custom,
}

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Platform::GoogleForms => "google_forms",
            Platform::Quizizz => "quizizz",
            Platform::Kahoot => "kahoot",
            Platform::Wordwall => "wordwall",
            Platform::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 驱动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    /// 静态表单：一次枚举全部题目容器
    Static,
    /// 响应式测验：同一时刻只有一道当前题，切换由页面变化驱动
    Reactive,
}

/// "已作答"视觉标记的样式类
pub(crate) const ANSWERED_CLASS: &str = "smart-fill-answered";

/// 内置平台的主机名注册表
static PLATFORM_HOSTS: phf::Map<&'static str, Platform> = phf::phf_map! {
    "docs.google.com" => Platform::GoogleForms,
    "forms.gle" => Platform::GoogleForms,
    "quizizz.com" => Platform::Quizizz,
    "wayground.com" => Platform::Quizizz,
    "kahoot.it" => Platform::Kahoot,
    "wordwall.net" => Platform::Wordwall,
};

/// 平台适配器：平台特定的提取能力
///
/// 句柄只在一次提取的同步范围内有效，文档可能随时重渲染。
#[async_trait]
pub trait PageAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    fn drive_mode(&self) -> DriveMode;

    /// 枚举题目作用域（静态平台：每道题一个容器句柄；
    /// 响应式平台：单个 None 作用域，即"当前题"）
    async fn question_scopes(&self, driver: &dyn DomDriver) -> Result<Vec<Option<ElementHandle>>>;

    /// 提取题干原文
    ///
    /// 题目容器可能异步渲染；未就绪时返回 None，由调用方稍后重试。
    async fn extract_question(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<String>>;

    /// 检测作答字段（携带选项或输入句柄）
    ///
    /// 返回 None 表示找不到任何可作答字段。
    async fn detect_answer_field(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<AnswerField>>;

    /// 提取候选选项（选择类上下文的快捷入口）
    async fn extract_options(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ChoiceOption>> {
        match self.detect_answer_field(driver, scope).await? {
            Some(field) => Ok(field.options().to_vec()),
            None => Ok(Vec::new()),
        }
    }

    /// 为当前题目添加"已作答"视觉标记
    async fn mark_already_answered(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<()>;
}

/// 解析适配器：自定义配置档优先，其次内置主机名注册表
///
/// 返回 None 时调用方应提示"站点不受支持"。
pub fn resolve(hostname: &str, profiles: &[CustomProfile]) -> Option<Arc<dyn PageAdapter>> {
    if let Some(profile) = profiles.iter().find(|p| p.matches(hostname)) {
        return Some(Arc::new(custom::CustomProfileAdapter::new(profile.clone())));
    }

    match lookup_host(hostname)? {
        Platform::GoogleForms => Some(Arc::new(google_forms::GoogleFormsAdapter)),
        Platform::Quizizz => Some(Arc::new(quiz::QuizAdapter::quizizz())),
        Platform::Kahoot => Some(Arc::new(quiz::QuizAdapter::kahoot())),
        Platform::Wordwall => Some(Arc::new(quiz::QuizAdapter::wordwall())),
        // 注册表不会映射到 Custom
        Platform::Custom => None,
    }
}

/// 主机名查找：精确命中，或作为子域名后缀命中
fn lookup_host(hostname: &str) -> Option<Platform> {
    if let Some(platform) = PLATFORM_HOSTS.get(hostname) {
        return Some(*platform);
    }
    PLATFORM_HOSTS
        .entries()
        .find_map(|(host, platform)| hostname.ends_with(&format!(".{}", host)).then_some(*platform))
}

/// 把查询结果转成候选选项，标签统一过 sanitize
pub(crate) fn to_options(nodes: Vec<DomNode>) -> Vec<ChoiceOption> {
    nodes
        .into_iter()
        .map(|n| ChoiceOption::new(sanitize(&n.text), n.handle))
        .collect()
}
