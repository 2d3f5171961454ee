//! DOM 驱动 - 基础设施层
//!
//! 对活动文档的唯一访问通道，只暴露"查询与操作元素"的能力。
//! 真实实现由扩展宿主（内容脚本桥）提供，核心只依赖本 trait。

use anyhow::Result;
use async_trait::async_trait;

/// 元素句柄
///
/// 指向活动文档中某个元素的不透明引用，仅在一次提取的同步范围内有效。
/// AI 往返之后文档可能已经重新渲染，届时句柄可能失效（见 workflow 层）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 查询返回的 DOM 节点：句柄 + 可见文本（或可访问标签）
#[derive(Debug, Clone)]
pub struct DomNode {
    pub handle: ElementHandle,
    pub text: String,
}

impl DomNode {
    pub fn new(handle: ElementHandle, text: impl Into<String>) -> Self {
        Self {
            handle,
            text: text.into(),
        }
    }
}

/// DOM 驱动能力
///
/// 职责：
/// - 提供选择器查询与元素操作
/// - 提供页面元信息（标题 / URL / 主机名）
/// - 提供"等待页面变化"的挂起点（响应式平台）
/// - 不认识 Question / Session
#[async_trait]
pub trait DomDriver: Send + Sync {
    /// 页面主机名（用于平台分派）
    fn hostname(&self) -> String;

    /// 页面标题（用于历史记录）
    fn page_title(&self) -> String;

    /// 页面 URL（用于历史记录）
    fn page_url(&self) -> String;

    /// 在 scope 内（缺省为全文档）查询所有匹配元素
    async fn query(&self, selector: &str, scope: Option<&ElementHandle>) -> Result<Vec<DomNode>>;

    /// 点击元素
    async fn click(&self, handle: &ElementHandle) -> Result<()>;

    /// 写入文本并派发 input 事件
    async fn fill_text(&self, handle: &ElementHandle, text: &str) -> Result<()>;

    /// 设置复选框勾选状态
    async fn set_checked(&self, handle: &ElementHandle, checked: bool) -> Result<()>;

    /// 设置下拉框的值
    async fn select_value(&self, handle: &ElementHandle, value: &str) -> Result<()>;

    /// 为元素添加样式类（"已作答"视觉标记）
    async fn add_class(&self, handle: &ElementHandle, class: &str) -> Result<()>;

    /// 等待下一次页面变化（DOM mutation）
    ///
    /// 响应式平台在两道题之间挂起于此；返回 Err 表示页面已关闭。
    async fn wait_for_change(&self) -> Result<()>;
}
