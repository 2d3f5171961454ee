/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题目之间的固定延迟（毫秒），避免压垮页面或 AI 服务
    pub question_delay_ms: u64,
    /// AI 调用失败时的最大尝试次数
    pub ai_retry_count: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 自定义配置档文件路径（TOML）
    pub profiles_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_delay_ms: 800,
            ai_retry_count: 3,
            verbose_logging: false,
            profiles_path: "profiles.toml".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            question_delay_ms: std::env::var("SMART_FILL_QUESTION_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.question_delay_ms),
            ai_retry_count: std::env::var("SMART_FILL_AI_RETRY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ai_retry_count),
            verbose_logging: std::env::var("SMART_FILL_VERBOSE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            profiles_path: std::env::var("SMART_FILL_PROFILES").unwrap_or(default.profiles_path),
        }
    }
}
