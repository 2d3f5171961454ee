//! AI 作答服务 - 业务能力层
//!
//! 只负责"构造提示词 + 调 AI 拿回答"，不关心流程。
//! 提示词统一用英文书写：要求 AI 原样回显选项文本，
//! 与选项本身的语言无关。
//!
//! 职责：
//! - 构造各字段类型的提示词（嵌入 sanitize 后的题干与选项）
//! - 有限次重试后仍失败则向上传播，由控制器终止本次运行
//! - 只处理单个题目，不出现 Vec<Question>，不关心流程顺序

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::AnswerProvider;
use crate::config::Config;
use crate::error::AppError;
use crate::services::normalizer::sanitize;
use crate::utils::truncate_text;

/// AI 作答服务
pub struct AnswerService {
    provider: Arc<dyn AnswerProvider>,
    retry_count: usize,
}

impl AnswerService {
    pub fn new(config: &Config, provider: Arc<dyn AnswerProvider>) -> Self {
        Self {
            provider,
            retry_count: config.ai_retry_count.max(1),
        }
    }

    /// 调用 AI 获取回答
    ///
    /// 调用可能挂起任意长时间（无时延上界）。失败时有限次重试，
    /// 全部失败后把最后一个错误向上传播。
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        debug!("提示词预览: {}", truncate_text(prompt, 120));

        let mut last_err = None;
        for attempt in 1..=self.retry_count {
            match self.provider.request_answer(prompt).await {
                Ok(answer) => {
                    debug!(
                        "✓ AI 回答（第 {} 次尝试）: {}",
                        attempt,
                        truncate_text(&answer, 80)
                    );
                    return Ok(answer);
                }
                Err(e) => {
                    warn!(
                        "⚠️ AI 调用失败（第 {}/{} 次）: {}",
                        attempt, self.retry_count, e
                    );
                    last_err = Some(e);
                }
            }
        }

        let reason = match last_err {
            Some(e) => format!("{:#}", e),
            None => "AI 调用未执行".to_string(),
        };
        Err(AppError::Ai(reason).into())
    }

    /// 构造选择类提示词：要求 AI 只返回其中一个选项的原文
    pub fn build_choice_prompt(&self, question: &str, labels: &[String]) -> String {
        let list = labels
            .iter()
            .map(|l| format!("- {}", sanitize(l)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Question: {}\n\nOptions:\n{}\n\nReply with exactly the text of ONE option above and nothing else. \
             No explanation, no numbering, no extra punctuation.",
            sanitize(question),
            list
        )
    }

    /// 构造自由文本提示词
    pub fn build_text_prompt(&self, question: &str) -> String {
        format!(
            "Question: {}\n\nReply with the answer only, no explanation.",
            sanitize(question)
        )
    }

    /// 构造是/否提示词（单个复选框）
    pub fn build_boolean_prompt(&self, question: &str) -> String {
        format!(
            "Question: {}\n\nReply with exactly \"yes\" or \"no\" and nothing else.",
            sanitize(question)
        )
    }
}
