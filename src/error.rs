use thiserror::Error;

/// 应用程序错误类型
///
/// 服务层与流程层统一使用 `anyhow::Result` 向上传播，这里只定义
/// 需要分类处理的错误。`Dom` 与 `Storage` 由宿主侧的
/// `DomDriver` / `FillStore` 实现构造。
#[derive(Debug, Error)]
pub enum AppError {
    /// AI 服务错误（重试耗尽后的最终错误）
    #[error("AI 服务错误: {0}")]
    Ai(String),

    /// DOM 驱动错误
    #[error("DOM 驱动错误: {0}")]
    Dom(String),

    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Storage(String),

    /// 自定义配置档错误
    #[error("自定义配置档错误 ({name}): {reason}")]
    Profile { name: String, reason: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
