//! AI 能力边界
//!
//! 提供方选择、密钥轮换、HTTP 细节都在扩展宿主侧，核心只依赖本 trait

use anyhow::Result;
use async_trait::async_trait;

/// AI 作答能力：给定提示词，最终得到回答文本或错误
///
/// 没有时延上界，调用方必须容忍任意长的等待。
/// 返回 Err 视为本次运行的终止性错误（见控制器的错误收容）。
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn request_answer(&self, prompt: &str) -> Result<String>;
}
