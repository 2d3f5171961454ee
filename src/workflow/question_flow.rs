//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取题干 → 2. 去重检查 → 3. 会话内重复触发保护 →
//! 4. 建立历史记录 → 5. 检测作答字段 → 6. 构造提示词 →
//! 7. 调用 AI → 8. 按字段类型执行动作 → 9. 定稿并标记已作答
//!
//! 每一步都是潜在的提前返回点。"无匹配"与"无选项"同样是终态，
//! 不会重试；AI 异常向上传播，由控制器定稿为 error 并终止本次运行。

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{AnswerProvider, ProgressSink};
use crate::config::Config;
use crate::infrastructure::{DomDriver, ElementHandle};
use crate::models::{AnswerField, HistoryLog, QuestionRecord, RecordStatus, Session};
use crate::platforms::PageAdapter;
use crate::services::normalizer::{normalize, sanitize};
use crate::services::question_tracker::{hash_question, AnsweredSet};
use crate::services::{match_option, AnswerService};
use crate::storage::FillStore;
use crate::utils::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 题目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome {
    /// 已作答（点击 / 填入 / 勾选）
    Answered,
    /// AI 回答无法匹配任何选项（未触碰 DOM）
    NoMatch,
    /// 没有候选选项或可作答字段
    NoField,
    /// 此前已作答，跳过
    AlreadyAnswered,
    /// 与会话当前题目相同，忽略重复触发
    Unchanged,
    /// 题干尚未渲染，等待下次触发
    NotReady,
    /// 取消请求在 AI 往返期间到达，回答已作废
    Cancelled,
}

impl QuestionOutcome {
    /// 是否为终态（计入进度）
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            QuestionOutcome::Unchanged | QuestionOutcome::NotReady | QuestionOutcome::Cancelled
        )
    }
}

/// 题目处理流程
///
/// - 编排单道题目的完整处理
/// - 不持有任何页面资源
/// - 只依赖业务能力（services）与外部能力（clients / storage）
pub struct QuestionFlow {
    answer_service: AnswerService,
    store: Arc<dyn FillStore>,
    sink: Arc<dyn ProgressSink>,
    verbose_logging: bool,
}

impl QuestionFlow {
    pub fn new(
        config: &Config,
        provider: Arc<dyn AnswerProvider>,
        store: Arc<dyn FillStore>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            answer_service: AnswerService::new(config, provider),
            store,
            sink,
            verbose_logging: config.verbose_logging,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        driver: &dyn DomDriver,
        adapter: &dyn PageAdapter,
        scope: Option<&ElementHandle>,
        session: &mut Session,
        answered: &mut AnsweredSet,
        history: &mut HistoryLog,
        ctx: &QuestionCtx,
    ) -> Result<QuestionOutcome> {
        // ========== 步骤 1: 提取题干 ==========
        let Some(question_text) = adapter.extract_question(driver, scope).await? else {
            debug!("{} 题干尚未渲染，等待下次触发", ctx);
            return Ok(QuestionOutcome::NotReady);
        };

        if self.verbose_logging {
            info!("{} 题干: {}", ctx, truncate_text(&question_text, 80));
        }

        // ========== 步骤 2: 跨运行去重检查 ==========
        let hash = hash_question(&question_text);
        if answered.contains(&hash) {
            info!("{} ⏭️ 此前已作答，跳过", ctx);
            adapter.mark_already_answered(driver, scope).await?;
            return Ok(QuestionOutcome::AlreadyAnswered);
        }

        // ========== 步骤 3: 会话内重复触发保护 ==========
        // 页面变化风暴会对同一道题反复触发处理
        if session.current_hash.as_deref() == Some(hash.as_str()) {
            debug!("{} 题目未变化，忽略重复触发", ctx);
            return Ok(QuestionOutcome::Unchanged);
        }
        session.current_hash = Some(hash.clone());

        // ========== 步骤 4: 建立历史记录（pending） ==========
        self.sink.status("processing", &truncate_text(&question_text, 60));
        let mut record = QuestionRecord::pending(
            ctx.form_name.clone(),
            ctx.form_url.clone(),
            question_text.clone(),
            ctx.platform.name(),
        );
        record.log_event("detected", &truncate_text(&question_text, 80));

        // ========== 步骤 5: 检测作答字段 ==========
        let Some(field) = adapter.detect_answer_field(driver, scope).await? else {
            warn!("{} ⚠️ 未找到可作答字段", ctx);
            record.log_event("no_field", "未找到可作答字段");
            // 不可作答的题目也标记已作答，避免无限重试
            self.finalize(session, answered, history, record, RecordStatus::NoAnswerField, None, &hash)
                .await?;
            return Ok(QuestionOutcome::NoField);
        };

        let labels: Vec<String> = field.options().iter().map(|o| o.label.clone()).collect();
        record.choices = labels.clone();
        record.log_event("field_detected", field.kind_name());

        if field.is_choice() && labels.is_empty() {
            warn!("{} ⚠️ 选择类题目没有候选选项", ctx);
            record.log_event("no_options", "选择类题目没有候选选项");
            self.finalize(session, answered, history, record, RecordStatus::NoOptions, None, &hash)
                .await?;
            return Ok(QuestionOutcome::NoField);
        }

        // ========== 步骤 6: 构造提示词 ==========
        let prompt = match &field {
            AnswerField::TextInput(_) => self.answer_service.build_text_prompt(&question_text),
            AnswerField::SingleCheckbox(_) => self.answer_service.build_boolean_prompt(&question_text),
            _ => self.answer_service.build_choice_prompt(&question_text, &labels),
        };
        record.log_event("asking_ai", "已发送提示词");

        // ========== 步骤 7: 调用 AI ==========
        // AI 往返与 DOM 动作期间记录一直挂在会话上；
        // 异常向上传播时由控制器取出并定稿为 error
        session.current_record = Some(record);
        let raw_answer = self.answer_service.ask(&prompt).await?;
        if let Some(record) = session.current_record.as_mut() {
            record.log_event("ai_answered", &truncate_text(&raw_answer, 80));
        }

        // 取消是建议性的：进行中的 AI 调用照常完成，但其结果作废，
        // 不作用于 DOM，也不标记已作答（下次运行可重新处理本题）
        if session.is_cancelled() {
            info!("{} ⏹️ 等待 AI 期间收到停止请求，回答作废", ctx);
            let mut record = session
                .current_record
                .take()
                .context("会话中的处理记录丢失")?;
            record.log_event("cancelled", "等待 AI 期间收到停止请求");
            record.finalize(RecordStatus::Skipped, None);
            history.push(record);
            self.store
                .save_history(history.records())
                .await
                .context("历史记录写回失败")?;
            session.current_hash = None;
            return Ok(QuestionOutcome::Cancelled);
        }

        // ========== 步骤 8: 按字段类型执行动作 ==========
        // 注意：这里使用的是 AI 往返之前提取的句柄；若页面在等待期间
        // 重渲染，句柄可能已失效。沿用原始设计，待产品侧明确后再改为
        // 动作前重新提取。
        let (status, answer, outcome) = match &field {
            AnswerField::TextInput(handle) => {
                let text = raw_answer.trim().to_string();
                driver.fill_text(handle, &text).await?;
                info!("{} ✓ 已填入文本回答", ctx);
                (RecordStatus::AnsweredText, Some(text), QuestionOutcome::Answered)
            }

            AnswerField::SingleCheckbox(handle) => {
                // 大小写无关的精确 "yes" 判断
                let yes = normalize(&raw_answer) == "yes";
                driver.set_checked(handle, yes).await?;
                info!("{} ✓ 复选框已设为 {}", ctx, yes);
                let status = if yes { RecordStatus::Checked } else { RecordStatus::Unchecked };
                (status, Some(sanitize(&raw_answer)), QuestionOutcome::Answered)
            }

            AnswerField::MultipleChoice(options) | AnswerField::CheckboxGroup(options) => {
                match match_option(options, &raw_answer) {
                    Some(option) => {
                        driver.click(&option.handle).await?;
                        info!("{} ✓ 已选择: {}", ctx, truncate_text(&option.label, 60));
                        (
                            RecordStatus::Answered,
                            Some(option.label.clone()),
                            QuestionOutcome::Answered,
                        )
                    }
                    None => {
                        warn!(
                            "{} ⚠️ AI 回答未匹配任何选项: {}",
                            ctx,
                            truncate_text(&raw_answer, 60)
                        );
                        (
                            RecordStatus::NoMatch,
                            Some(sanitize(&raw_answer)),
                            QuestionOutcome::NoMatch,
                        )
                    }
                }
            }

            AnswerField::Dropdown { handle, options } => match match_option(options, &raw_answer) {
                Some(option) => {
                    driver.select_value(handle, &option.label).await?;
                    info!("{} ✓ 下拉框已选: {}", ctx, truncate_text(&option.label, 60));
                    (
                        RecordStatus::Answered,
                        Some(option.label.clone()),
                        QuestionOutcome::Answered,
                    )
                }
                None => (
                    RecordStatus::NoMatch,
                    Some(sanitize(&raw_answer)),
                    QuestionOutcome::NoMatch,
                ),
            },
        };

        // ========== 步骤 9: 定稿并标记已作答 ==========
        // DOM 动作全部成功后才把记录从会话中取回；无匹配同样是终态，不再重试
        let mut record = session
            .current_record
            .take()
            .context("会话中的处理记录丢失")?;
        record.log_event("finalized", status.name());
        self.finalize(session, answered, history, record, status, answer, &hash)
            .await?;

        Ok(outcome)
    }

    /// 定稿历史记录并标记题目已作答（所有终态的必经之路）
    ///
    /// 记录头插历史日志后整体写回外部存储，自此不可变；
    /// 哈希只在终态之后加入已作答集合，绝不提前。
    #[allow(clippy::too_many_arguments)]
    async fn finalize(
        &self,
        session: &mut Session,
        answered: &mut AnsweredSet,
        history: &mut HistoryLog,
        mut record: QuestionRecord,
        status: RecordStatus,
        answer: Option<String>,
        hash: &str,
    ) -> Result<()> {
        record.finalize(status, answer);
        self.sink.status(status.name(), record.answer.as_deref().unwrap_or(""));

        history.push(record);
        self.store
            .save_history(history.records())
            .await
            .context("历史记录写回失败")?;

        answered.mark(hash);
        self.store
            .save_answered(answered.hashes())
            .await
            .context("已作答集合写回失败")?;

        session.current_record = None;
        Ok(())
    }
}
