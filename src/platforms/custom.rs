//! 自定义配置档适配器
//!
//! 用用户编写的选择器替代内置提取逻辑。配置档按"整页一道题"
//! 处理（通用上下文）；字段类型显式声明时优先，缺省时按选择器
//! 命中情况推断：有选项选择器 → 单选，否则有字段选择器 → 文本输入。

use anyhow::Result;
use async_trait::async_trait;

use crate::infrastructure::{DomDriver, DomNode, ElementHandle};
use crate::models::{AnswerField, CustomProfile, FieldKind};
use crate::services::normalizer::sanitize;

use super::{to_options, DriveMode, PageAdapter, Platform, ANSWERED_CLASS};

pub struct CustomProfileAdapter {
    profile: CustomProfile,
}

impl CustomProfileAdapter {
    pub fn new(profile: CustomProfile) -> Self {
        Self { profile }
    }

    async fn query_options(&self, driver: &dyn DomDriver) -> Result<Vec<DomNode>> {
        match &self.profile.option_selector {
            Some(selector) => driver.query(selector, None).await,
            None => Ok(Vec::new()),
        }
    }

    async fn query_field(&self, driver: &dyn DomDriver) -> Result<Option<DomNode>> {
        match &self.profile.field_selector {
            Some(selector) => Ok(driver.query(selector, None).await?.into_iter().next()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PageAdapter for CustomProfileAdapter {
    fn platform(&self) -> Platform {
        Platform::Custom
    }

    fn drive_mode(&self) -> DriveMode {
        DriveMode::Static
    }

    async fn question_scopes(&self, _driver: &dyn DomDriver) -> Result<Vec<Option<ElementHandle>>> {
        // 通用上下文：整页视作一道题
        Ok(vec![None])
    }

    async fn extract_question(
        &self,
        driver: &dyn DomDriver,
        _scope: Option<&ElementHandle>,
    ) -> Result<Option<String>> {
        let nodes = driver.query(&self.profile.question_selector, None).await?;
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
        match self.profile.field_kind {
            Some(FieldKind::TextInput) => Ok(self
                .query_field(driver)
                .await?
                .map(|n| AnswerField::TextInput(n.handle))),
            Some(FieldKind::SingleCheckbox) => Ok(self
                .query_field(driver)
                .await?
                .map(|n| AnswerField::SingleCheckbox(n.handle))),
            Some(FieldKind::Dropdown) => {
                let Some(field) = self.query_field(driver).await? else {
                    return Ok(None);
                };
                let options = self.query_options(driver).await?;
                Ok(Some(AnswerField::Dropdown {
                    handle: field.handle,
                    options: to_options(options),
                }))
            }
            Some(FieldKind::MultipleChoice) => Ok(Some(AnswerField::MultipleChoice(to_options(
                self.query_options(driver).await?,
            )))),
            Some(FieldKind::CheckboxGroup) => Ok(Some(AnswerField::CheckboxGroup(to_options(
                self.query_options(driver).await?,
            )))),
            None => {
                // 未声明字段类型：按选择器命中情况推断
                let options = self.query_options(driver).await?;
                if !options.is_empty() {
                    return Ok(Some(AnswerField::MultipleChoice(to_options(options))));
                }
                Ok(self
                    .query_field(driver)
                    .await?
                    .map(|n| AnswerField::TextInput(n.handle)))
            }
        }
    }

    async fn mark_already_answered(
        &self,
        driver: &dyn DomDriver,
        _scope: Option<&ElementHandle>,
    ) -> Result<()> {
        if let Some(question) = driver
            .query(&self.profile.question_selector, None)
            .await?
            .into_iter()
            .next()
        {
            driver.add_class(&question.handle, ANSWERED_CLASS).await?;
        }
        Ok(())
    }
}
