//! 测验平台适配器（Quizizz / Kahoot / Wordwall）
//!
//! 响应式平台：同一时刻只渲染一道当前题，题目切换由页面变化驱动。
//! 三个平台只差选择器，共用一个适配器实现。
//! 选项永远是选择类（按钮），所以作答字段恒为单选。

use anyhow::Result;
use async_trait::async_trait;

use crate::infrastructure::{DomDriver, ElementHandle};
use crate::models::AnswerField;
use crate::services::normalizer::sanitize;

use super::{to_options, DriveMode, PageAdapter, Platform, ANSWERED_CLASS};

/// 平台选择器表
struct SelectorSet {
    question: &'static str,
    option: &'static str,
    container: &'static str,
}

const QUIZIZZ: SelectorSet = SelectorSet {
    question: "[data-testid='question-container-text']",
    option: "button.option",
    container: ".question-container",
};

const KAHOOT: SelectorSet = SelectorSet {
    question: "[data-functional-selector='block-title']",
    option: "button[data-functional-selector^='answer-']",
    container: "[data-functional-selector='question-block']",
};

const WORDWALL: SelectorSet = SelectorSet {
    question: ".question-text",
    option: ".answers .answer",
    container: ".activity-question",
};

pub struct QuizAdapter {
    platform: Platform,
    selectors: &'static SelectorSet,
}

impl QuizAdapter {
    pub fn quizizz() -> Self {
        Self {
            platform: Platform::Quizizz,
            selectors: &QUIZIZZ,
        }
    }

    pub fn kahoot() -> Self {
        Self {
            platform: Platform::Kahoot,
            selectors: &KAHOOT,
        }
    }

    pub fn wordwall() -> Self {
        Self {
            platform: Platform::Wordwall,
            selectors: &WORDWALL,
        }
    }
}

#[async_trait]
impl PageAdapter for QuizAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn drive_mode(&self) -> DriveMode {
        DriveMode::Reactive
    }

    async fn question_scopes(&self, _driver: &dyn DomDriver) -> Result<Vec<Option<ElementHandle>>> {
        // 只有一道"当前题"，作用域留空，选择器本身承担定位
        Ok(vec![None])
    }

    async fn extract_question(
        &self,
        driver: &dyn DomDriver,
        _scope: Option<&ElementHandle>,
    ) -> Result<Option<String>> {
        let nodes = driver.query(self.selectors.question, None).await?;
        Ok(nodes
            .into_iter()
            .next()
            .map(|n| sanitize(&n.text))
            .filter(|t| !t.is_empty()))
    }

    async fn detect_answer_field(
        &self,
        driver: &dyn DomDriver,
        _scope: Option<&ElementHandle>,
    ) -> Result<Option<AnswerField>> {
        // 即使选项为空也返回选择类字段，由流程层按"无选项"终态处理
        let options = driver.query(self.selectors.option, None).await?;
        Ok(Some(AnswerField::MultipleChoice(to_options(options))))
    }

    async fn mark_already_answered(
        &self,
        driver: &dyn DomDriver,
        _scope: Option<&ElementHandle>,
    ) -> Result<()> {
        if let Some(container) = driver.query(self.selectors.container, None).await?.into_iter().next() {
            driver.add_class(&container.handle, ANSWERED_CLASS).await?;
        }
        Ok(())
    }
}
