//! 进度通知能力
//!
//! 核心只产出数据（状态、进度比例、终态通知），渲染交给协作方

use tracing::{debug, error, info, warn};

use crate::models::SessionOutcome;

/// 进度通知接收端
pub trait ProgressSink: Send + Sync {
    /// 状态更新（status + detail）
    fn status(&self, status: &str, detail: &str);

    /// 进度比例，取值 [0,1]
    fn progress(&self, ratio: f64);

    /// 终态通知
    fn finished(&self, outcome: &SessionOutcome);
}

/// 默认实现：写入 tracing 日志
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn status(&self, status: &str, detail: &str) {
        info!("📣 {}: {}", status, detail);
    }

    fn progress(&self, ratio: f64) {
        debug!("进度: {:.0}%", ratio * 100.0);
    }

    fn finished(&self, outcome: &SessionOutcome) {
        match outcome {
            SessionOutcome::Completed => info!("✅ 智能填充完成"),
            SessionOutcome::Cancelled => info!("⏹️ 已停止"),
            SessionOutcome::Errored(msg) => error!("❌ 智能填充出错: {}", msg),
            SessionOutcome::NoHandler => warn!("⚠️ 当前站点不受支持"),
        }
    }
}
