//! 选项匹配 - 业务能力层
//!
//! 分层匹配：精确 → 包含 → 词元重叠。
//! AI 即使被明确要求只返回选项原文，也经常转述或附带说明；
//! 精确与包含优先保证准确率，词元重叠兜底保证召回率，
//! 得分为 0（完全无信号）时宁可不选。

use tracing::debug;

use crate::models::ChoiceOption;
use crate::services::normalizer::normalize;

/// 词元重叠率超过该阈值时的加分
const OVERLAP_RATIO_THRESHOLD: f64 = 0.6;
const OVERLAP_BONUS: f64 = 10.0;

/// 在候选选项中找出 AI 所指的那一个
///
/// 规则按序应用：
/// 1. 规范化后的回答为空 → 直接 None
/// 2. 精确相等 → 立即返回
/// 3. 回答整体包含在选项标签里 → 记为无穷大得分但继续扫描
///    （后面仍可能出现精确匹配；两条包含规则的不对称是有意保留的原始行为，勿"修复"）
/// 4. 选项标签整体包含在回答里 → 立即返回（AI 很可能原样引用了标签再加解释）
/// 5. 词元重叠打分，重叠率超过 0.6 时对回答侧 / 标签侧各加 10 分
///
/// 平分保留先遇到的选项（提供顺序即优先顺序）。
/// 返回 None 表示没有任何信号，调用方必须将其作为独立于"已匹配"的终态处理。
pub fn match_option<'a>(options: &'a [ChoiceOption], ai_answer: &str) -> Option<&'a ChoiceOption> {
    let answer = normalize(ai_answer);
    if answer.is_empty() {
        return None;
    }

    let answer_tokens: Vec<&str> = answer.split_whitespace().filter(|t| t.len() > 1).collect();

    let mut best: Option<&ChoiceOption> = None;
    let mut best_score = 0.0_f64;

    for option in options {
        let label = normalize(&option.label);
        if label.is_empty() {
            continue;
        }

        // 精确匹配：短路返回
        if label == answer {
            return Some(option);
        }

        // 回答包含在标签里：极高置信度，但不短路
        if label.contains(answer.as_str()) {
            if best_score < f64::INFINITY {
                best = Some(option);
                best_score = f64::INFINITY;
            }
            continue;
        }

        // 标签包含在回答里：短路返回
        if answer.contains(label.as_str()) {
            return Some(option);
        }

        // 词元重叠打分
        let label_tokens: Vec<&str> = label.split_whitespace().filter(|t| t.len() > 1).collect();
        if answer_tokens.is_empty() || label_tokens.is_empty() {
            continue;
        }

        let shared = answer_tokens
            .iter()
            .filter(|t| label_tokens.contains(*t))
            .count() as f64;

        let mut score = shared;
        if shared / answer_tokens.len() as f64 > OVERLAP_RATIO_THRESHOLD {
            score += OVERLAP_BONUS;
        }
        if shared / label_tokens.len() as f64 > OVERLAP_RATIO_THRESHOLD {
            score += OVERLAP_BONUS;
        }

        // 严格大于才替换，平分保留先遇到的
        if score > best_score {
            best = Some(option);
            best_score = score;
        }
    }

    if best_score > 0.0 {
        debug!("匹配得分: {:.1}, 选项: {:?}", best_score, best.map(|o| &o.label));
        best
    } else {
        None
    }
}
