//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层驱动一次智能填充运行的完整状态机，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::SessionController (驱动一次运行)
//!     ↓
//! workflow::QuestionFlow (处理单道题目)
//!     ↓
//! services (能力层：normalize / match / track / ask)
//!     ↓
//! infrastructure (基础设施：DomDriver)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：控制器只做调度、取消与统计，不做业务判断
//! 2. **资源隔离**：只有本层接触 DomDriver 的生命周期
//! 3. **错误收容**：流程异常在本层定稿并终止，不向外抛 panic
//! 4. **会话独占**：一次运行一个 Session，终态后一并丢弃

pub mod session_controller;

pub use session_controller::{SessionController, SessionState, SessionStats};
