//! 文本规范化 - 业务能力层
//!
//! 系统内所有文本比较都必须先经过 [`normalize`]；
//! 展示给用户 / 写入历史的文本只经过 [`sanitize`]（保留大小写与标点）。
//! 两个函数都是纯函数，对任何输入都不会 panic。

use unicode_normalization::UnicodeNormalization;

/// 已知的错误编码残留序列（U+200B 被按 Latin-1 误解码的产物）
const MOJIBAKE_ZWSP: &str = "\u{00E2}\u{20AC}\u{200B}";

/// 清理原始文本：去除不可见字符并压缩空白，保留大小写与标点
///
/// 处理顺序：不间断空格 → NFKC → 组合变音符（U+0300–U+036F）→
/// 双向/零宽控制字符 → 错误编码残留 → 压缩空白并去首尾
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace('\u{00A0}', " ").replace(MOJIBAKE_ZWSP, "");

    let mut cleaned = String::with_capacity(text.len());
    for ch in text.nfkc() {
        if is_combining_mark(ch) || is_invisible_control(ch) {
            continue;
        }
        cleaned.push(ch);
    }

    collapse_whitespace(&cleaned)
}

/// 规范化文本用于比较：sanitize → 小写 → 去引号 → 标点转空格 → 压缩空白
///
/// 幂等：`normalize(normalize(x)) == normalize(x)`
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let sanitized = sanitize(text);
    let mut out = String::with_capacity(sanitized.len());
    for ch in sanitized.to_lowercase().chars() {
        // 小写折叠可能重新引入组合变音符（İ → i + U+0307），需再过滤一遍
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            // 直引号与弯引号，单双都去掉
            '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => {}
            '.' | ',' | '!' | '?' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}' => out.push(' '),
            _ => out.push(ch),
        }
    }

    collapse_whitespace(&out)
}

fn is_combining_mark(ch: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&ch)
}

fn is_invisible_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
            | '\u{061C}'
    )
}

/// 把空白串压成单个空格并去首尾
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(sanitize(""), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn control_only_input_yields_empty_output() {
        let input = "\u{200B}\u{200E}\u{FEFF}\u{202A}\u{0301}";
        assert_eq!(sanitize(input), "");
        assert_eq!(normalize(input), "");
    }

    #[test]
    fn sanitize_collapses_whitespace_and_nbsp() {
        assert_eq!(sanitize("  Hello\u{00A0}\u{00A0}World \t\n!"), "Hello World !");
    }

    #[test]
    fn sanitize_preserves_case_and_punctuation() {
        assert_eq!(sanitize("What is 2+2?"), "What is 2+2?");
    }

    #[test]
    fn sanitize_strips_mojibake_artifact() {
        assert_eq!(sanitize("abc\u{00E2}\u{20AC}\u{200B}def"), "abcdef");
    }

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Paris, France!"), "paris france");
        assert_eq!(normalize("\u{201C}Blue Whale\u{201D}"), "blue whale");
        assert_eq!(normalize("4."), "4");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  The \u{2018}Quick\u{2019} Brown FOX!! (jumps)  ",
            "¿Qué? ¡Sí!",
            "already normalized",
            "4.",
            "\u{00A0}\u{200B}",
            "\u{0130}stanbul",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "输入: {:?}", s);
        }
    }

    #[test]
    fn lowercase_reintroduced_marks_are_stripped() {
        // 土耳其大写 İ 的小写形式是 i + U+0307，组合符必须在小写后也被剔除
        assert_eq!(normalize("\u{0130}"), "i");
        assert_eq!(normalize("\u{0130}stanbul"), "istanbul");
    }

    #[test]
    fn normalize_strips_bidi_controls() {
        assert_eq!(normalize("ab\u{202E}cd\u{200F}"), "abcd");
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        // 全角字符折叠为半角
        assert_eq!(normalize("Ｈｅｌｌｏ"), "hello");
    }
}
