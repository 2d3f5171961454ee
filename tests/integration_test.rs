//! 端到端集成测试
//!
//! 用内存实现替代真实的页面桥与 AI 服务，走通完整的
//! 控制器 → 流程 → 能力层路径。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use smart_fill::{
    hash_question, AnswerProvider, Config, DomDriver, DomNode, ElementHandle, FillStore,
    LogProgress, MemoryStore, ProgressSink, RecordStatus, SessionController, SessionOutcome,
};

// ========== 模拟页面 ==========

/// 一道 Google 表单风格的题目
struct MockQuestion {
    title: &'static str,
    options: Vec<&'static str>,
    text_input: bool,
}

impl MockQuestion {
    fn choice(title: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            title,
            options,
            text_input: false,
        }
    }

    fn text(title: &'static str) -> Self {
        Self {
            title,
            options: Vec::new(),
            text_input: true,
        }
    }
}

/// 模拟 DOM 驱动：按 Google 表单的结构回应选择器查询，记录所有 DOM 动作
struct MockFormDriver {
    hostname: &'static str,
    questions: Vec<MockQuestion>,
    fail_clicks: bool,
    clicks: Mutex<Vec<String>>,
    fills: Mutex<Vec<(String, String)>>,
    classes: Mutex<Vec<String>>,
}

impl MockFormDriver {
    fn google_forms(questions: Vec<MockQuestion>) -> Self {
        Self {
            hostname: "docs.google.com",
            questions,
            fail_clicks: false,
            clicks: Mutex::new(Vec::new()),
            fills: Mutex::new(Vec::new()),
            classes: Mutex::new(Vec::new()),
        }
    }

    fn unsupported() -> Self {
        Self {
            hostname: "example.org",
            questions: Vec::new(),
            fail_clicks: false,
            clicks: Mutex::new(Vec::new()),
            fills: Mutex::new(Vec::new()),
            classes: Mutex::new(Vec::new()),
        }
    }

    /// 模拟页面在 AI 往返期间重渲染导致句柄失效
    fn with_failing_clicks(mut self) -> Self {
        self.fail_clicks = true;
        self
    }

    fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    fn fills(&self) -> Vec<(String, String)> {
        self.fills.lock().unwrap().clone()
    }

    fn classes(&self) -> Vec<String> {
        self.classes.lock().unwrap().clone()
    }
}

/// 从题目容器句柄 "item-{i}" 解析题目序号
fn scope_index(scope: Option<&ElementHandle>) -> Option<usize> {
    scope?.0.strip_prefix("item-")?.parse().ok()
}

#[async_trait]
impl DomDriver for MockFormDriver {
    fn hostname(&self) -> String {
        self.hostname.to_string()
    }

    fn page_title(&self) -> String {
        "模拟测验".to_string()
    }

    fn page_url(&self) -> String {
        format!("https://{}/forms/d/e/mock", self.hostname)
    }

    async fn query(&self, selector: &str, scope: Option<&ElementHandle>) -> Result<Vec<DomNode>> {
        match selector {
            "div[role='listitem']" => Ok((0..self.questions.len())
                .map(|i| DomNode::new(ElementHandle::new(format!("item-{}", i)), ""))
                .collect()),

            "div[role='heading']" => {
                let i = scope_index(scope).context("题干查询缺少容器")?;
                Ok(vec![DomNode::new(
                    ElementHandle::new(format!("item-{}-title", i)),
                    self.questions[i].title,
                )])
            }

            "div[role='radio']" => {
                let i = scope_index(scope).context("选项查询缺少容器")?;
                Ok(self.questions[i]
                    .options
                    .iter()
                    .enumerate()
                    .map(|(j, label)| {
                        DomNode::new(ElementHandle::new(format!("item-{}-opt-{}", i, j)), *label)
                    })
                    .collect())
            }

            "input[type='text'], textarea" => {
                let i = scope_index(scope).context("输入框查询缺少容器")?;
                if self.questions[i].text_input {
                    Ok(vec![DomNode::new(
                        ElementHandle::new(format!("item-{}-text", i)),
                        "",
                    )])
                } else {
                    Ok(Vec::new())
                }
            }

            // 复选框 / 下拉框在本测试页面中不出现
            _ => Ok(Vec::new()),
        }
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        if self.fail_clicks {
            return Err(anyhow!("元素已从文档中移除: {}", handle));
        }
        self.clicks.lock().unwrap().push(handle.0.clone());
        Ok(())
    }

    async fn fill_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.fills
            .lock()
            .unwrap()
            .push((handle.0.clone(), text.to_string()));
        Ok(())
    }

    async fn set_checked(&self, _handle: &ElementHandle, _checked: bool) -> Result<()> {
        Ok(())
    }

    async fn select_value(&self, _handle: &ElementHandle, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn add_class(&self, handle: &ElementHandle, class: &str) -> Result<()> {
        self.classes
            .lock()
            .unwrap()
            .push(format!("{}:{}", handle.0, class));
        Ok(())
    }

    async fn wait_for_change(&self) -> Result<()> {
        // 静态表单测试不会走到这里
        Err(anyhow!("页面已关闭"))
    }
}

// ========== 模拟 AI ==========

/// 按调用顺序返回预设答案；可选地在调用期间触发取消
struct ScriptedProvider {
    answers: Vec<&'static str>,
    calls: AtomicUsize,
    cancel_during_call: Mutex<Option<CancellationToken>>,
}

impl ScriptedProvider {
    fn new(answers: Vec<&'static str>) -> Self {
        Self {
            answers,
            calls: AtomicUsize::new(0),
            cancel_during_call: Mutex::new(None),
        }
    }

    fn cancel_during_call(&self, token: CancellationToken) {
        *self.cancel_during_call.lock().unwrap() = Some(token);
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerProvider for ScriptedProvider {
    async fn request_answer(&self, _prompt: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.cancel_during_call.lock().unwrap().as_ref() {
            token.cancel();
        }
        Ok(self
            .answers
            .get(n)
            .copied()
            .ok_or_else(|| anyhow!("预设答案已用尽"))?
            .to_string())
    }
}

/// 第一次收到 answered 状态后请求取消（模拟题目间隙的用户停止）
#[derive(Default)]
struct CancelAfterFirstAnswer {
    token: Mutex<Option<CancellationToken>>,
}

impl CancelAfterFirstAnswer {
    fn arm(&self, token: CancellationToken) {
        *self.token.lock().unwrap() = Some(token);
    }
}

impl ProgressSink for CancelAfterFirstAnswer {
    fn status(&self, status: &str, _detail: &str) {
        if status == "answered" {
            if let Some(token) = self.token.lock().unwrap().as_ref() {
                token.cancel();
            }
        }
    }

    fn progress(&self, _ratio: f64) {}

    fn finished(&self, _outcome: &SessionOutcome) {}
}

// ========== 测试辅助 ==========

fn test_config() -> Config {
    Config {
        question_delay_ms: 0,
        ai_retry_count: 1,
        ..Config::default()
    }
}

// ========== 测试 ==========

#[tokio::test]
async fn google_forms_end_to_end() {
    let driver = MockFormDriver::google_forms(vec![
        MockQuestion::choice("What is 2+2?", vec!["3", "4", "5"]),
        MockQuestion::choice("Pick a color", vec!["Red", "Green", "Blue"]),
    ]);
    // 第一题回答带标点，第二题大小写不同，都应匹配成功
    let provider = Arc::new(ScriptedProvider::new(vec!["4.", "green"]));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider.clone(),
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(provider.call_count(), 2);
    assert_eq!(
        driver.clicks(),
        vec!["item-0-opt-1".to_string(), "item-1-opt-1".to_string()]
    );

    // 历史最新在前
    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "Pick a color");
    assert_eq!(history[0].status, RecordStatus::Answered);
    assert_eq!(history[0].answer.as_deref(), Some("Green"));
    assert_eq!(history[1].question, "What is 2+2?");
    assert_eq!(history[1].answer.as_deref(), Some("4"));

    // 两道题的哈希都已加入已作答集合
    let answered = store.load_answered().await.unwrap();
    assert!(answered.contains(&hash_question("What is 2+2?")));
    assert!(answered.contains(&hash_question("Pick a color")));
}

#[tokio::test]
async fn text_question_fills_trimmed_answer() {
    let driver = MockFormDriver::google_forms(vec![MockQuestion::text("Capital of France?")]);
    let provider = Arc::new(ScriptedProvider::new(vec!["Paris "]));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider,
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    assert_eq!(outcome, SessionOutcome::Completed);
    assert!(driver.clicks().is_empty());
    assert_eq!(
        driver.fills(),
        vec![("item-0-text".to_string(), "Paris".to_string())]
    );

    let history = store.load_history().await.unwrap();
    assert_eq!(history[0].status, RecordStatus::AnsweredText);
}

#[tokio::test]
async fn no_match_is_terminal_and_leaves_dom_untouched() {
    let driver = MockFormDriver::google_forms(vec![MockQuestion::choice(
        "Favorite color?",
        vec!["Red", "Green", "Blue"],
    )]);
    let provider = Arc::new(ScriptedProvider::new(vec!["Purple"]));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider,
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    // 无匹配不是错误，会话照常完成；但不触碰 DOM
    assert_eq!(outcome, SessionOutcome::Completed);
    assert!(driver.clicks().is_empty());

    let history = store.load_history().await.unwrap();
    assert_eq!(history[0].status, RecordStatus::NoMatch);

    // 无匹配同样是终态，题目被标记为已处理，不会无限重试
    let answered = store.load_answered().await.unwrap();
    assert!(answered.contains(&hash_question("Favorite color?")));
}

#[tokio::test]
async fn unsupported_host_yields_no_handler() {
    let driver = MockFormDriver::unsupported();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider.clone(),
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    assert_eq!(outcome, SessionOutcome::NoHandler);
    assert_eq!(provider.call_count(), 0);
    assert!(store.load_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn rerun_skips_previously_answered_questions() {
    let questions = || {
        vec![
            MockQuestion::choice("What is 2+2?", vec!["3", "4", "5"]),
            MockQuestion::choice("Pick a color", vec!["Red", "Green", "Blue"]),
        ]
    };
    let store = Arc::new(MemoryStore::new());

    let driver = MockFormDriver::google_forms(questions());
    let provider = Arc::new(ScriptedProvider::new(vec!["4", "Blue"]));
    let controller = SessionController::new(
        test_config(),
        provider,
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    assert_eq!(controller.run(&driver).await, SessionOutcome::Completed);

    // 第二次运行：同一存储、全新控制器。两道题都应跳过，不再调用 AI
    let driver = MockFormDriver::google_forms(questions());
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let controller = SessionController::new(
        test_config(),
        provider.clone(),
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    assert_eq!(controller.run(&driver).await, SessionOutcome::Completed);

    assert_eq!(provider.call_count(), 0);
    assert!(driver.clicks().is_empty());
    // 跳过的题目获得"已作答"视觉标记
    assert_eq!(
        driver.classes(),
        vec![
            "item-0:smart-fill-answered".to_string(),
            "item-1:smart-fill-answered".to_string(),
        ]
    );
    // 历史不会因跳过而新增
    assert_eq!(store.load_history().await.unwrap().len(), 2);
}

#[tokio::test]
async fn cancel_between_questions_leaves_rest_untouched() {
    let driver = MockFormDriver::google_forms(vec![
        MockQuestion::choice("Q1", vec!["A", "B"]),
        MockQuestion::choice("Q2", vec!["A", "B"]),
        MockQuestion::choice("Q3", vec!["A", "B"]),
    ]);
    let provider = Arc::new(ScriptedProvider::new(vec!["A", "A", "A"]));
    let store = Arc::new(MemoryStore::new());

    let sink = Arc::new(CancelAfterFirstAnswer::default());
    let controller = SessionController::new(
        test_config(),
        provider.clone(),
        store.clone(),
        sink.clone(),
        Vec::new(),
    );
    sink.arm(controller.cancel_token());

    let outcome = controller.run(&driver).await;

    // 恰好处理了第一题，其余保持原样
    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(driver.clicks(), vec!["item-0-opt-0".to_string()]);

    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "Q1");

    assert_eq!(store.load_answered().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_during_ai_call_discards_answer() {
    let driver = MockFormDriver::google_forms(vec![MockQuestion::choice(
        "What is 2+2?",
        vec!["3", "4", "5"],
    )]);
    let provider = Arc::new(ScriptedProvider::new(vec!["4"]));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider.clone(),
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    // 取消请求在 AI 调用期间到达
    provider.cancel_during_call(controller.cancel_token());

    let outcome = controller.run(&driver).await;

    // AI 照常返回，但结果作废：不触碰 DOM，也不标记已作答
    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(provider.call_count(), 1);
    assert!(driver.clicks().is_empty());
    assert!(store.load_answered().await.unwrap().is_empty());

    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RecordStatus::Skipped);
}

#[tokio::test]
async fn dom_action_failure_finalizes_record_as_error() {
    let driver = MockFormDriver::google_forms(vec![MockQuestion::choice(
        "What is 2+2?",
        vec!["3", "4", "5"],
    )])
    .with_failing_clicks();
    let provider = Arc::new(ScriptedProvider::new(vec!["4"]));
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        provider,
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    assert!(matches!(outcome, SessionOutcome::Errored(_)));

    // 点击失败的题目也要以 error 状态留下历史记录
    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "What is 2+2?");
    assert_eq!(history[0].status, RecordStatus::Error);

    // 不标记已作答，下次运行可以重试
    assert!(store.load_answered().await.unwrap().is_empty());
}

#[tokio::test]
async fn ai_failure_finalizes_record_as_error() {
    /// 永远失败的 AI
    struct FailingProvider;

    #[async_trait]
    impl AnswerProvider for FailingProvider {
        async fn request_answer(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("上游服务 503"))
        }
    }

    let driver = MockFormDriver::google_forms(vec![
        MockQuestion::choice("Q1", vec!["A", "B"]),
        MockQuestion::choice("Q2", vec!["A", "B"]),
    ]);
    let store = Arc::new(MemoryStore::new());

    let controller = SessionController::new(
        test_config(),
        Arc::new(FailingProvider),
        store.clone(),
        Arc::new(LogProgress),
        Vec::new(),
    );
    let outcome = controller.run(&driver).await;

    // 第一题出错即终止本次运行，第二题不再处理
    assert!(matches!(outcome, SessionOutcome::Errored(_)));
    assert!(driver.clicks().is_empty());

    let history = store.load_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "Q1");
    assert_eq!(history[0].status, RecordStatus::Error);

    // 出错的题目不标记已作答，下次运行可以重试
    assert!(store.load_answered().await.unwrap().is_empty());
}
