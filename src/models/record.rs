//! 历史记录模型
//!
//! 题目开始处理时创建记录，处理结束时定稿（状态 + 答案），
//! 定稿后写入外部历史日志，之后不可变。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 历史日志容量（条）
pub const HISTORY_CAP: usize = 40;

/// 单条记录的进度事件容量
pub const PROGRESS_EVENT_CAP: usize = 12;

/// 记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// 处理中
    Pending,
    /// 已作答（点击了匹配的选项）
    Answered,
    /// 已作答（填入了文本）
    AnsweredText,
    /// 已勾选
    Checked,
    /// 已取消勾选
    Unchecked,
    /// AI 回答无法匹配任何选项
    NoMatch,
    /// 选择类题目没有候选选项
    NoOptions,
    /// 未找到可作答字段
    NoAnswerField,
    /// 处理出错
    Error,
    /// 已跳过
    Skipped,
}

impl RecordStatus {
    pub fn name(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Answered => "answered",
            RecordStatus::AnsweredText => "answered_text",
            RecordStatus::Checked => "checked",
            RecordStatus::Unchecked => "unchecked",
            RecordStatus::NoMatch => "no_match",
            RecordStatus::NoOptions => "no_options",
            RecordStatus::NoAnswerField => "no_answer_field",
            RecordStatus::Error => "error",
            RecordStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 进度事件（label + detail + 时间戳）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub label: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// 题目历史记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 表单名称（页面标题）
    pub form_name: String,
    /// 表单 URL
    pub form_url: String,
    /// 题干原文（仅经过 sanitize）
    pub question: String,
    /// AI 选定的答案文本
    pub answer: Option<String>,
    /// 本题提供的全部选项标签
    pub choices: Vec<String>,
    /// 记录状态
    pub status: RecordStatus,
    /// 创建时间
    pub timestamp: DateTime<Utc>,
    /// 平台标签
    pub platform: String,
    /// 进度事件日志（容量 12，淘汰最旧）
    pub events: Vec<ProgressEvent>,
}

impl QuestionRecord {
    /// 创建处理中的记录
    pub fn pending(
        form_name: impl Into<String>,
        form_url: impl Into<String>,
        question: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            form_name: form_name.into(),
            form_url: form_url.into(),
            question: question.into(),
            answer: None,
            choices: Vec::new(),
            status: RecordStatus::Pending,
            timestamp: Utc::now(),
            platform: platform.into(),
            events: Vec::new(),
        }
    }

    /// 追加进度事件，超出容量时淘汰最旧的一条
    pub fn log_event(&mut self, label: &str, detail: &str) {
        self.events.push(ProgressEvent {
            label: label.to_string(),
            detail: detail.to_string(),
            timestamp: Utc::now(),
        });
        if self.events.len() > PROGRESS_EVENT_CAP {
            self.events.remove(0);
        }
    }

    /// 定稿：设置终态与答案
    pub fn finalize(&mut self, status: RecordStatus, answer: Option<String>) {
        self.status = status;
        self.answer = answer;
    }
}

/// 历史日志（容量 40，最新在前）
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    records: Vec<QuestionRecord>,
}

impl HistoryLog {
    pub fn from_records(records: Vec<QuestionRecord>) -> Self {
        Self { records }
    }

    /// 头插新记录并按容量淘汰最旧的
    pub fn push(&mut self, record: QuestionRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_CAP);
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
