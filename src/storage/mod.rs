//! 持久化能力边界
//!
//! 历史日志与已作答集合由外部键值存储持有；容量与淘汰策略在核心侧
//! 维护（`HistoryLog` / `AnsweredSet`），这里只做整体读写。
//! 单次运行内严格顺序执行，读-改-写不会竞争；跨标签页并发不在保证范围内。

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::QuestionRecord;

/// 填充状态存储能力
#[async_trait]
pub trait FillStore: Send + Sync {
    /// 读取已作答哈希集合（最新在前）
    async fn load_answered(&self) -> Result<Vec<String>>;

    /// 整体写回已作答哈希集合
    async fn save_answered(&self, hashes: &[String]) -> Result<()>;

    /// 读取历史日志（最新在前）
    async fn load_history(&self) -> Result<Vec<QuestionRecord>>;

    /// 整体写回历史日志
    async fn save_history(&self, records: &[QuestionRecord]) -> Result<()>;
}

/// 内存存储（测试与单次运行用）
#[derive(Debug, Default)]
pub struct MemoryStore {
    answered: Mutex<Vec<String>>,
    history: Mutex<Vec<QuestionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FillStore for MemoryStore {
    async fn load_answered(&self) -> Result<Vec<String>> {
        Ok(self.answered.lock().await.clone())
    }

    async fn save_answered(&self, hashes: &[String]) -> Result<()> {
        *self.answered.lock().await = hashes.to_vec();
        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<QuestionRecord>> {
        Ok(self.history.lock().await.clone())
    }

    async fn save_history(&self, records: &[QuestionRecord]) -> Result<()> {
        *self.history.lock().await = records.to_vec();
        Ok(())
    }
}
