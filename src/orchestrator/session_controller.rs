//! 会话控制器 - 编排层
//!
//! 状态机：`Idle → Running → {Completed | Cancelled | Errored}`
//!
//! ## 核心功能
//!
//! 1. **处理器解析**：自定义配置档优先，其次内置平台注册表；
//!    无处理器时通知用户并退回 Idle
//! 2. **题目枚举**：静态平台一次枚举全部容器；响应式平台由
//!    页面变化驱动，逐题循环
//! 3. **协作式取消**：每道新题开始前检查取消标志；等待页面变化时
//!    用取消信号立即释放挂起（不强行中断进行中的 AI 调用，
//!    其结果被丢弃而不作用于 DOM）
//! 4. **错误收容**：流程异常 → 当前记录定稿为 error → 通知 →
//!    请求取消剩余工作
//! 5. **终态清理**：统一发 finished 通知并丢弃会话
//!
//! 一个控制器驱动一次调用（`run` 消费 self）；再次触发智能填充
//! 就新建控制器，上一次的会话状态随之被隐式丢弃。

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::{AnswerProvider, ProgressSink};
use crate::config::Config;
use crate::infrastructure::DomDriver;
use crate::models::{CustomProfile, HistoryLog, RecordStatus, Session, SessionOutcome};
use crate::platforms::{self, DriveMode, PageAdapter};
use crate::services::question_tracker::AnsweredSet;
use crate::storage::FillStore;
use crate::workflow::{QuestionCtx, QuestionFlow, QuestionOutcome};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Errored,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
            SessionState::Errored => "errored",
        }
    }
}

impl SessionOutcome {
    /// 终态对应的状态机落点（无处理器退回 Idle）
    pub fn state(&self) -> SessionState {
        match self {
            SessionOutcome::Completed => SessionState::Completed,
            SessionOutcome::Cancelled => SessionState::Cancelled,
            SessionOutcome::Errored(_) => SessionState::Errored,
            SessionOutcome::NoHandler => SessionState::Idle,
        }
    }
}

/// 会话统计
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub answered: usize,
    pub no_match: usize,
    pub skipped: usize,
}

/// 会话控制器
pub struct SessionController {
    config: Config,
    flow: QuestionFlow,
    store: Arc<dyn FillStore>,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
    profiles: Vec<CustomProfile>,
}

impl SessionController {
    pub fn new(
        config: Config,
        provider: Arc<dyn AnswerProvider>,
        store: Arc<dyn FillStore>,
        sink: Arc<dyn ProgressSink>,
        profiles: Vec<CustomProfile>,
    ) -> Self {
        let flow = QuestionFlow::new(&config, provider, store.clone(), sink.clone());
        Self {
            config,
            flow,
            store,
            sink,
            cancel: CancellationToken::new(),
            profiles,
        }
    }

    /// 取消句柄：UI 侧持有它即可随时请求停止（建议性，非抢占）
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 运行一次智能填充
    ///
    /// 错误在这里收容：返回值永远是一个终态，不是 Err。
    pub async fn run(self, driver: &dyn DomDriver) -> SessionOutcome {
        let hostname = driver.hostname();

        // ========== Idle → Running: 解析站点处理器 ==========
        let Some(adapter) = platforms::resolve(&hostname, &self.profiles) else {
            warn!("⚠️ 当前站点不受支持: {}", hostname);
            self.sink.status("unsupported", &hostname);
            self.sink.finished(&SessionOutcome::NoHandler);
            return SessionOutcome::NoHandler;
        };

        info!("🚀 智能填充开始 (平台: {}, 主机: {})", adapter.platform(), hostname);

        let mut session = Session::new(self.cancel.clone());
        let mut stats = SessionStats::default();

        let outcome = match self
            .drive(driver, adapter.as_ref(), &mut session, &mut stats)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                // ========== Running → Errored ==========
                error!("❌ 会话出错: {:#}", e);
                self.finalize_error(&mut session, &e).await;
                // 剩余工作协作式停止
                self.cancel.cancel();
                SessionOutcome::Errored(e.to_string())
            }
        };

        // ========== 终态清理 ==========
        log_session_end(&outcome, &stats);
        // 状态机落点先于终态通知发出，UI 据此复位触发按钮
        self.sink.status("session_state", outcome.state().name());
        self.sink.finished(&outcome);
        // 会话随控制器一起丢弃
        outcome
    }

    /// Running 状态的主循环
    async fn drive(
        &self,
        driver: &dyn DomDriver,
        adapter: &dyn PageAdapter,
        session: &mut Session,
        stats: &mut SessionStats,
    ) -> Result<SessionOutcome> {
        let mut answered = AnsweredSet::from_hashes(self.store.load_answered().await?);
        let mut history = HistoryLog::from_records(self.store.load_history().await?);

        match adapter.drive_mode() {
            DriveMode::Static => {
                self.drive_static(driver, adapter, session, stats, &mut answered, &mut history)
                    .await
            }
            DriveMode::Reactive => {
                self.drive_reactive(driver, adapter, session, stats, &mut answered, &mut history)
                    .await
            }
        }
    }

    /// 静态表单：一次枚举全部题目容器，顺序处理
    async fn drive_static(
        &self,
        driver: &dyn DomDriver,
        adapter: &dyn PageAdapter,
        session: &mut Session,
        stats: &mut SessionStats,
        answered: &mut AnsweredSet,
        history: &mut HistoryLog,
    ) -> Result<SessionOutcome> {
        let scopes = adapter.question_scopes(driver).await?;
        session.total_steps = scopes.len();

        if scopes.is_empty() {
            warn!("⚠️ 页面上没有找到题目");
        }

        for (index, scope) in scopes.iter().enumerate() {
            // 每道新题开始前的协作式取消检查；剩余题目保持原样
            if session.is_cancelled() {
                info!("⏹️ 用户请求停止，剩余 {} 道题未处理", scopes.len() - index);
                return Ok(SessionOutcome::Cancelled);
            }

            let ctx = QuestionCtx::new(
                driver.page_title(),
                driver.page_url(),
                adapter.platform(),
                index + 1,
            );
            log_question_start(&ctx, scopes.len());

            let outcome = self
                .flow
                .run(driver, adapter, scope.as_ref(), session, answered, history, &ctx)
                .await?;
            if outcome == QuestionOutcome::Cancelled {
                info!("⏹️ 用户请求停止，剩余 {} 道题未处理", scopes.len() - index - 1);
                return Ok(SessionOutcome::Cancelled);
            }
            tally(stats, outcome);

            session.completed_steps += 1;
            if let Some(ratio) = session.progress_ratio() {
                self.sink.progress(ratio);
            }

            // 题目间固定延迟，避免压垮页面或 AI 服务
            if index + 1 < scopes.len() {
                sleep(Duration::from_millis(self.config.question_delay_ms)).await;
            }
        }

        self.sink.progress(1.0);
        Ok(SessionOutcome::Completed)
    }

    /// 响应式测验：处理当前题，等待页面变化后再处理下一题
    async fn drive_reactive(
        &self,
        driver: &dyn DomDriver,
        adapter: &dyn PageAdapter,
        session: &mut Session,
        stats: &mut SessionStats,
        answered: &mut AnsweredSet,
        history: &mut HistoryLog,
    ) -> Result<SessionOutcome> {
        loop {
            if session.is_cancelled() {
                info!("⏹️ 用户请求停止");
                return Ok(SessionOutcome::Cancelled);
            }

            let ctx = QuestionCtx::new(
                driver.page_title(),
                driver.page_url(),
                adapter.platform(),
                session.completed_steps + 1,
            );

            let outcome = self
                .flow
                .run(driver, adapter, None, session, answered, history, &ctx)
                .await?;
            if outcome == QuestionOutcome::Cancelled {
                info!("⏹️ 用户请求停止");
                return Ok(SessionOutcome::Cancelled);
            }
            if outcome.is_terminal() {
                tally(stats, outcome);
                session.completed_steps += 1;
                self.sink.status("question_done", &ctx.to_string());
            }

            // 等待下一道题渲染；取消信号可立即释放这次挂起，
            // 不必等到下一次页面变化
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("⏹️ 等待页面变化期间收到停止请求");
                    return Ok(SessionOutcome::Cancelled);
                }
                changed = driver.wait_for_change() => {
                    if changed.is_err() {
                        // 页面关闭 / 退出测验是响应式运行的正常终点
                        info!("✓ 页面变化流结束，会话完成");
                        break;
                    }
                }
            }

            sleep(Duration::from_millis(self.config.question_delay_ms)).await;
        }

        self.sink.progress(1.0);
        Ok(SessionOutcome::Completed)
    }

    /// 把会话中未定稿的记录定稿为 error 并尽力持久化
    ///
    /// 用户取消不走这里：取消不是错误，进行中的记录已由流程正常定稿
    /// 或保持原样。
    async fn finalize_error(&self, session: &mut Session, err: &anyhow::Error) {
        if let Some(mut record) = session.current_record.take() {
            record.log_event("error", &err.to_string());
            record.finalize(RecordStatus::Error, None);

            let mut history = match self.store.load_history().await {
                Ok(records) => HistoryLog::from_records(records),
                Err(e) => {
                    warn!("⚠️ 历史记录读取失败，错误记录未持久化: {}", e);
                    return;
                }
            };
            history.push(record);
            if let Err(e) = self.store.save_history(history.records()).await {
                warn!("⚠️ 历史记录写回失败: {}", e);
            }
        }
    }
}

/// 按题目结果更新统计
fn tally(stats: &mut SessionStats, outcome: QuestionOutcome) {
    match outcome {
        QuestionOutcome::Answered => stats.answered += 1,
        QuestionOutcome::NoMatch => stats.no_match += 1,
        QuestionOutcome::NoField | QuestionOutcome::AlreadyAnswered => stats.skipped += 1,
        QuestionOutcome::Unchanged | QuestionOutcome::NotReady | QuestionOutcome::Cancelled => {}
    }
}

// ========== 日志辅助函数 ==========

fn log_question_start(ctx: &QuestionCtx, total: usize) {
    info!("\n{}", "─".repeat(30));
    info!("{} 处理第 {}/{} 道题目", ctx, ctx.question_index, total);
}

fn log_session_end(outcome: &SessionOutcome, stats: &SessionStats) {
    info!("{}", "=".repeat(60));
    info!(
        "📊 会话结束: 作答 {}, 无匹配 {}, 跳过 {}",
        stats.answered, stats.no_match, stats.skipped
    );
    match outcome {
        SessionOutcome::Completed => info!("✅ 全部题目处理完成"),
        SessionOutcome::Cancelled => info!("⏹️ 已按用户请求停止"),
        SessionOutcome::Errored(msg) => error!("❌ 运行终止: {}", msg),
        SessionOutcome::NoHandler => warn!("⚠️ 未找到站点处理器"),
    }
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_maps_to_state_machine_endpoint() {
        assert_eq!(SessionOutcome::Completed.state(), SessionState::Completed);
        assert_eq!(SessionOutcome::Cancelled.state(), SessionState::Cancelled);
        assert_eq!(
            SessionOutcome::Errored("x".to_string()).state(),
            SessionState::Errored
        );
        // 无处理器退回 Idle，不算一次失败的运行
        assert_eq!(SessionOutcome::NoHandler.state(), SessionState::Idle);
        assert_eq!(SessionOutcome::NoHandler.state().name(), "idle");
    }
}
