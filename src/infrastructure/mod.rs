//! 基础设施层
//!
//! 持有对活动文档的唯一访问通道，只暴露能力，不认识业务类型

pub mod dom_driver;

pub use dom_driver::{DomDriver, DomNode, ElementHandle};
