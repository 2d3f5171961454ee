//! 题目处理上下文
//!
//! 封装"我正在处理哪个页面的第几道题"这一信息

use std::fmt::Display;

use crate::platforms::Platform;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 表单名称（页面标题）
    pub form_name: String,

    /// 表单 URL
    pub form_url: String,

    /// 平台
    pub platform: Platform,

    /// 题目序号（从 1 开始，仅用于日志显示）
    pub question_index: usize,
}

impl QuestionCtx {
    pub fn new(
        form_name: String,
        form_url: String,
        platform: Platform,
        question_index: usize,
    ) -> Self {
        Self {
            form_name,
            form_url,
            platform,
            question_index,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} 题目#{}]", self.platform, self.question_index)
    }
}
