//! # Smart Fill
//!
//! 浏览器表单/测验智能填充核心库
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（页面），只暴露能力
//! - `DomDriver` - 唯一的页面能力接口：查询 / 点击 / 填写 / 等待变化
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单道题目
//! - `normalizer` - 文本清洗与归一化能力
//! - `option_matcher` - 选项模糊匹配能力
//! - `question_tracker` - 题目指纹与去重能力
//! - `AnswerService` - AI 回答能力（带重试）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuestionCtx` - 上下文封装（页面 + 题目序号）
//! - `QuestionFlow` - 流程编排（提取 → 去重 → AI → 执行 → 定稿）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_controller` - 会话控制器，
//!   驱动一次运行的状态机，管理取消与错误收容
//!
//! 另有横切模块：`platforms/`（站点处理器注册与解析）、
//! `clients/`（AI 回答来源与进度通知）、`storage/`（持久化接口）。
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod platforms;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AnswerProvider, LogProgress, ProgressSink};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{DomDriver, DomNode, ElementHandle};
pub use models::{
    load_profiles, AnswerField, ChoiceOption, CustomProfile, HistoryLog, QuestionRecord,
    RecordStatus, Session, SessionOutcome,
};
pub use orchestrator::{SessionController, SessionState, SessionStats};
pub use platforms::{resolve, DriveMode, PageAdapter, Platform};
pub use services::{hash_question, match_option, normalize, AnsweredSet};
pub use storage::{FillStore, MemoryStore};
pub use workflow::{QuestionCtx, QuestionFlow, QuestionOutcome};
