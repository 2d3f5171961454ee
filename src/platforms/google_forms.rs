//! Google 表单适配器
//!
//! 静态表单：一次枚举所有题目容器（listitem），在容器内就地检测作答字段。
//! 检测顺序：单选 → 复选 → 下拉 → 文本输入。

use anyhow::Result;
use async_trait::async_trait;

use crate::infrastructure::{DomDriver, ElementHandle};
use crate::models::AnswerField;
use crate::services::normalizer::sanitize;

use super::{to_options, DriveMode, PageAdapter, Platform, ANSWERED_CLASS};

const ITEM_SELECTOR: &str = "div[role='listitem']";
const QUESTION_SELECTOR: &str = "div[role='heading']";
const RADIO_SELECTOR: &str = "div[role='radio']";
const CHECKBOX_SELECTOR: &str = "div[role='checkbox']";
const DROPDOWN_SELECTOR: &str = "div[role='listbox']";
const DROPDOWN_OPTION_SELECTOR: &str = "div[role='option']";
const TEXT_SELECTOR: &str = "input[type='text'], textarea";

pub struct GoogleFormsAdapter;

#[async_trait]
impl PageAdapter for GoogleFormsAdapter {
    fn platform(&self) -> Platform {
        Platform::GoogleForms
    }

    fn drive_mode(&self) -> DriveMode {
        DriveMode::Static
    }

    async fn question_scopes(&self, driver: &dyn DomDriver) -> Result<Vec<Option<ElementHandle>>> {
        let items = driver.query(ITEM_SELECTOR, None).await?;
        Ok(items.into_iter().map(|n| Some(n.handle)).collect())
    }

    async fn extract_question(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<String>> {
        let headings = driver.query(QUESTION_SELECTOR, scope).await?;
        Ok(headings
            .into_iter()
            .next()
            .map(|n| sanitize(&n.text))
            .filter(|t| !t.is_empty()))
    }

    async fn detect_answer_field(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<AnswerField>> {
        let radios = driver.query(RADIO_SELECTOR, scope).await?;
        if !radios.is_empty() {
            return Ok(Some(AnswerField::MultipleChoice(to_options(radios))));
        }

        let checkboxes = driver.query(CHECKBOX_SELECTOR, scope).await?;
        if !checkboxes.is_empty() {
            return Ok(Some(AnswerField::CheckboxGroup(to_options(checkboxes))));
        }

        if let Some(listbox) = driver.query(DROPDOWN_SELECTOR, scope).await?.into_iter().next() {
            let options = driver
                .query(DROPDOWN_OPTION_SELECTOR, Some(&listbox.handle))
                .await?;
            return Ok(Some(AnswerField::Dropdown {
                handle: listbox.handle,
                options: to_options(options),
            }));
        }

        let inputs = driver.query(TEXT_SELECTOR, scope).await?;
        if let Some(input) = inputs.into_iter().next() {
            return Ok(Some(AnswerField::TextInput(input.handle)));
        }

        Ok(None)
    }

    async fn mark_already_answered(
        &self,
        driver: &dyn DomDriver,
        scope: Option<&ElementHandle>,
    ) -> Result<()> {
        if let Some(handle) = scope {
            driver.add_class(handle, ANSWERED_CLASS).await?;
        }
        Ok(())
    }
}
