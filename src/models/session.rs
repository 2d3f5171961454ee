//! 会话状态
//!
//! 一次智能填充运行的全部可变状态。每次运行新建，终态后随控制器
//! 一起丢弃，不跨运行复用；同一时间只有一个会话存活。

use tokio_util::sync::CancellationToken;

use crate::models::record::QuestionRecord;

/// 智能填充会话
#[derive(Debug)]
pub struct Session {
    /// 协作式取消令牌：用户动作可随时触发，核心只在明确边界检查
    pub cancel: CancellationToken,
    /// 总步数（0 表示未知，响应式平台）
    pub total_steps: usize,
    /// 已完成步数
    pub completed_steps: usize,
    /// 当前题目哈希（抑制对未变化题目的重复处理）
    pub current_hash: Option<String>,
    /// 当前历史记录（处理中，AI 往返期间挂在这里，出错时由控制器定稿）
    pub current_record: Option<QuestionRecord>,
}

impl Session {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            total_steps: 0,
            completed_steps: 0,
            current_hash: None,
            current_record: None,
        }
    }

    /// 进度比例 [0,1]；总数未知时返回 None
    pub fn progress_ratio(&self) -> Option<f64> {
        if self.total_steps == 0 {
            return None;
        }
        Some((self.completed_steps as f64 / self.total_steps as f64).min(1.0))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// 会话终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 全部题目处理完毕，没有未处理的错误
    Completed,
    /// 用户请求停止，剩余题目保持原样
    Cancelled,
    /// 未处理的错误（附原始错误信息）
    Errored(String),
    /// 当前站点没有可用处理器
    NoHandler,
}
