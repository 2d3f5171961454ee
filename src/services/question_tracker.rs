//! 题目身份追踪 - 业务能力层
//!
//! 负责题目哈希与"已作答集合"的维护，实现跨运行去重

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// 已作答集合容量
pub const ANSWERED_CAP: usize = 200;

/// 计算题目哈希
///
/// 可逆编码（非加密）：题干原文的 UTF-8 字节做 URL-safe base64。
/// 唯一要求是确定性，且可以安全存入外部集合（不含分隔符）。
pub fn hash_question(question_text: &str) -> String {
    URL_SAFE_NO_PAD.encode(question_text.as_bytes())
}

/// 还原题目哈希对应的原文（调试 / 展示用）
pub fn decode_hash(hash: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(hash).ok()?;
    String::from_utf8(bytes).ok()
}

/// 已作答题目集合（容量 200，最新在前）
///
/// 不变式：处理任何题目之前必须先做成员检查；
/// 只有成功或不可重试的终态之后才加入成员，绝不提前。
#[derive(Debug, Default, Clone)]
pub struct AnsweredSet {
    hashes: Vec<String>,
}

impl AnsweredSet {
    pub fn from_hashes(hashes: Vec<String>) -> Self {
        Self { hashes }
    }

    /// 成员检查
    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.iter().any(|h| h == hash)
    }

    /// 标记已作答
    ///
    /// 幂等：已存在时整体不做任何事，不重插，避免无谓刷新新旧顺序。
    pub fn mark(&mut self, hash: impl Into<String>) {
        let hash = hash.into();
        if self.contains(&hash) {
            return;
        }
        self.hashes.insert(0, hash);
        self.hashes.truncate(ANSWERED_CAP);
    }

    pub fn hashes(&self) -> &[String] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let q = "地球上最大的动物是什么？";
        assert_eq!(hash_question(q), hash_question(q));
    }

    #[test]
    fn distinct_questions_hash_differently() {
        assert_ne!(hash_question("第一题"), hash_question("第二题"));
        assert_ne!(hash_question("a"), hash_question("b"));
    }

    #[test]
    fn hash_round_trips() {
        let q = "What is 2+2? 你好";
        assert_eq!(decode_hash(&hash_question(q)).as_deref(), Some(q));
    }

    #[test]
    fn hash_has_no_separator_characters() {
        let h = hash_question("any / question = text?+");
        assert!(h.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn mark_is_idempotent() {
        let mut set = AnsweredSet::default();
        set.mark(hash_question("甲"));
        set.mark(hash_question("乙"));
        let before = set.hashes().to_vec();

        // 重复标记：大小与顺序都不变
        set.mark(hash_question("甲"));
        assert_eq!(set.hashes(), before.as_slice());
    }

    #[test]
    fn newest_first_eviction_beyond_cap() {
        let mut set = AnsweredSet::default();
        for i in 0..=ANSWERED_CAP {
            set.mark(format!("h{}", i));
        }
        assert_eq!(set.len(), ANSWERED_CAP);
        // 最新在前，最旧的 h0 已被淘汰
        assert_eq!(set.hashes()[0], format!("h{}", ANSWERED_CAP));
        assert!(!set.contains("h0"));
    }
}
