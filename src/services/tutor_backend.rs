//! 基于 OpenAI 兼容接口的辅导后端
//!
//! 导入时提取文档文字并切块，之后每次请求按主题挑选相关片段拼进提示词。

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BackendError;
use crate::models::{extract_text, option_label, Difficulty, Document, Quiz};
use crate::services::backend::TutoringBackend;
use crate::services::llm_service::LlmService;
use crate::utils::logging::truncate_text;

const QUIZ_SYSTEM_MESSAGE: &str = "You are a meticulous tutor who writes multiple-choice questions \
strictly from the provided textbook excerpts. You always answer with a single JSON object and nothing else.";

const PLAN_SYSTEM_MESSAGE: &str = "You are a study coach. You design realistic, day-by-day study \
plans grounded in the provided textbook excerpts. Answer in Markdown.";

const ASK_SYSTEM_MESSAGE: &str = "You are a helpful tutor. Answer only from the provided textbook \
excerpts. If the excerpts do not contain the answer, say so plainly.";

fn fenced_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("fence regex is valid")
    })
}

/// OpenAI 辅导后端
pub struct OpenAiTutor {
    llm: LlmService,
    document: RwLock<Option<Document>>,
    max_context_chars: usize,
    chunk_chars: usize,
    plan_days: u8,
}

impl OpenAiTutor {
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmService::new(config),
            document: RwLock::new(None),
            max_context_chars: config.max_context_chars,
            chunk_chars: config.chunk_chars,
            plan_days: config.plan_days,
        }
    }

    /// 按查询挑选上下文；未导入文档时返回 `NotIngested`
    async fn context_for(&self, query: &str) -> Result<String, BackendError> {
        let guard = self.document.read().await;
        let doc = guard.as_ref().ok_or(BackendError::NotIngested)?;
        Ok(doc.select_context(query, self.max_context_chars))
    }

    async fn overview(&self) -> Result<String, BackendError> {
        let guard = self.document.read().await;
        let doc = guard.as_ref().ok_or(BackendError::NotIngested)?;
        Ok(doc.overview(self.max_context_chars))
    }
}

#[async_trait]
impl TutoringBackend for OpenAiTutor {
    fn name(&self) -> &str {
        self.llm.model_name()
    }

    async fn ingest(&self, document: &[u8]) -> Result<(), BackendError> {
        let text = extract_text(document)?;
        let doc = Document::from_text("document", &text, self.chunk_chars);
        if doc.is_empty() {
            return Err(BackendError::DocumentUnreadable {
                reason: "文档切块后为空".to_string(),
            });
        }

        info!(
            "📚 文档导入完成: {} 字符，{} 个片段",
            doc.char_count(),
            doc.chunks.len()
        );
        *self.document.write().await = Some(doc);
        Ok(())
    }

    async fn generate_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Option<Quiz>, BackendError> {
        let context = self.context_for(topic).await?;
        let prompt = build_quiz_prompt(&context, topic, difficulty);

        let response = self
            .llm
            .send_to_llm(&prompt, Some(QUIZ_SYSTEM_MESSAGE), 700)
            .await?;

        parse_quiz_response(&response, difficulty)
    }

    async fn generate_study_plan(&self) -> Result<String, BackendError> {
        let context = self.overview().await?;
        let prompt = build_plan_prompt(&context, self.plan_days);

        self.llm
            .send_to_llm(&prompt, Some(PLAN_SYSTEM_MESSAGE), 1500)
            .await
    }

    async fn answer_question(&self, query: &str) -> Result<String, BackendError> {
        let context = self.context_for(query).await?;
        let prompt = format!(
            "Textbook excerpts:\n\"\"\"\n{}\n\"\"\"\n\nStudent question: {}",
            context, query
        );

        self.llm
            .send_to_llm(&prompt, Some(ASK_SYSTEM_MESSAGE), 600)
            .await
    }
}

/// 构建出题提示词
fn build_quiz_prompt(context: &str, topic: &str, difficulty: Difficulty) -> String {
    format!(
        r#"Textbook excerpts:
"""
{context}
"""

Write ONE multiple-choice question on the topic "{topic}".
Difficulty: {name}. Make it {hint}.

Rules:
- Use only facts stated in the excerpts.
- Exactly 4 options, each formatted as "A) ...", "B) ...", "C) ...", "D) ...".
- "correct_answer" is the single letter of the right option.
- "explanation" says why that option is right, citing the excerpts.
- If the excerpts say nothing about the topic, return {{"question": null}}.

Return only this JSON object:
{{"question": "...", "options": ["A) ...", "B) ...", "C) ...", "D) ..."], "correct_answer": "A", "explanation": "..."}}"#,
        context = context,
        topic = topic,
        name = difficulty.name(),
        hint = difficulty.prompt_hint(),
    )
}

/// 构建学习计划提示词
fn build_plan_prompt(context: &str, days: u8) -> String {
    format!(
        r####"Textbook excerpts (sampled across the whole book):
"""
{context}
"""

Create a {days}-day mastery study plan for this material.
For each day use a heading "### Day N: <theme>", then list the sections to read,
one active-recall exercise, and a short self-check question.
Finish with a brief revision strategy for the last day."####
    )
}

/// 从响应中取出 JSON 对象文本（兼容代码块包裹和前后多余文字）
fn extract_json_object(response: &str) -> Option<&str> {
    if let Some(caps) = fenced_json().captures(response) {
        return caps.get(1).map(|m| m.as_str());
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// 解析出题响应
///
/// - `{"question": null}` → `Ok(None)`
/// - 无法解析或校验失败 → `Generation`
fn parse_quiz_response(response: &str, difficulty: Difficulty) -> Result<Option<Quiz>, BackendError> {
    let json = extract_json_object(response).ok_or_else(|| {
        warn!("LLM 响应中没有 JSON: '{}'", truncate_text(response, 120));
        BackendError::Generation {
            reason: "响应中没有 JSON 对象".to_string(),
        }
    })?;

    let value: JsonValue = serde_json::from_str(json).map_err(|e| BackendError::Generation {
        reason: format!("JSON 解析失败: {}", e),
    })?;

    match value.get("question") {
        Some(JsonValue::Null) => {
            debug!("LLM 表示文档中没有相关内容");
            return Ok(None);
        }
        None => {
            return Err(BackendError::Generation {
                reason: "缺少 question 字段".to_string(),
            })
        }
        Some(_) => {}
    }

    let mut quiz: Quiz = serde_json::from_value(value).map_err(|e| BackendError::Generation {
        reason: format!("题目字段不完整: {}", e),
    })?;

    // 有些模型会把完整选项 "B) ..." 当作答案返回
    quiz.correct_answer = option_label(&quiz.correct_answer).to_string();

    quiz.validate().map_err(|defect| BackendError::Generation {
        reason: defect.to_string(),
    })?;

    Ok(Some(quiz.with_difficulty(difficulty)))
}
