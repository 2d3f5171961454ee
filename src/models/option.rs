//! 选项与作答字段模型

use crate::infrastructure::ElementHandle;

/// 候选选项
///
/// 每道题都从活动文档新鲜提取，不跨题缓存，不持久化。
#[derive(Debug, Clone)]
pub struct ChoiceOption {
    /// 展示文本（已经过 sanitize，保留大小写与标点）
    pub label: String,
    /// 可点击/可选中控件的句柄
    pub handle: ElementHandle,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, handle: ElementHandle) -> Self {
        Self {
            label: label.into(),
            handle,
        }
    }
}

/// 作答字段
#[derive(Debug, Clone)]
pub enum AnswerField {
    /// 自由文本输入
    TextInput(ElementHandle),
    /// 单选题
    MultipleChoice(Vec<ChoiceOption>),
    /// 复选题
    CheckboxGroup(Vec<ChoiceOption>),
    /// 单个复选框（是/否）
    SingleCheckbox(ElementHandle),
    /// 下拉选择
    Dropdown {
        handle: ElementHandle,
        options: Vec<ChoiceOption>,
    },
}

impl AnswerField {
    /// 字段类型名（用于日志与历史记录）
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnswerField::TextInput(_) => "text_input",
            AnswerField::MultipleChoice(_) => "multiple_choice",
            AnswerField::CheckboxGroup(_) => "checkbox_group",
            AnswerField::SingleCheckbox(_) => "single_checkbox",
            AnswerField::Dropdown { .. } => "dropdown",
        }
    }

    /// 字段携带的候选选项（文本输入与单个复选框返回空）
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            AnswerField::MultipleChoice(options) | AnswerField::CheckboxGroup(options) => options,
            AnswerField::Dropdown { options, .. } => options,
            AnswerField::TextInput(_) | AnswerField::SingleCheckbox(_) => &[],
        }
    }

    /// 是否属于选择类字段（必须有候选选项才可作答）
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            AnswerField::MultipleChoice(_) | AnswerField::CheckboxGroup(_) | AnswerField::Dropdown { .. }
        )
    }
}
