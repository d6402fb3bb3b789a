//! 学习流程 - 流程层
//!
//! 核心职责：把界面上的一次操作转发给后端，并据结果修改会话
//!
//! 规则：
//! 1. 未成功导入文档前，任何生成请求都不会到达后端
//! 2. 每次后端调用都有超时
//! 3. 后端返回的题目先校验再放进会话；校验失败不替换当前题目
//! 4. 调用被取消或超时时会话保持不变

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BackendError, SessionError};
use crate::models::{Difficulty, Quiz};
use crate::services::TutoringBackend;
use crate::utils::logging::truncate_text;
use crate::workflow::session_ctx::{AnswerOutcome, Session};

/// 主题留空时使用的默认主题
pub const DEFAULT_TOPIC: &str = "General Review";

/// 出题结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizResult {
    /// 生成成功，已成为当前题目
    Generated(Quiz),
    /// 后端表示没有可出的题，当前题目保持不变
    NoQuestion,
}

/// 学习流程
///
/// - 不持有会话，会话由调用方显式传入
/// - 不关心后端如何实现
pub struct StudyFlow {
    timeout: Duration,
}

impl StudyFlow {
    pub fn new(config: &Config) -> Self {
        Self::with_timeout(config.request_timeout())
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 给后端调用加上超时
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⏱️ 后端调用超时 ({:?})", self.timeout);
                Err(BackendError::Timeout {
                    secs: self.timeout.as_secs().max(1),
                })
            }
        }
    }

    /// 导入文档并启动会话
    ///
    /// 只有导入成功后后端才会挂到会话上；失败时会话仍处于未启动状态。
    pub async fn launch(
        &self,
        session: &mut Session,
        backend: Arc<dyn TutoringBackend>,
        document: &[u8],
        document_name: &str,
    ) -> AppResult<()> {
        if session.is_launched() {
            return Err(SessionError::AlreadyLaunched.into());
        }

        info!(
            "🚀 正在导入文档 {} ({} 字节)，后端: {}",
            document_name,
            document.len(),
            backend.name()
        );

        if let Err(e) = self.call(backend.ingest(document)).await {
            warn!("❌ 文档导入失败: {}", e);
            return Err(e.into());
        }

        session.attach_backend(backend, document_name);
        info!("✓ 系统上线: {}", document_name);
        Ok(())
    }

    /// 生成新题目
    pub async fn generate_quiz(
        &self,
        session: &mut Session,
        topic: &str,
        difficulty: Difficulty,
    ) -> AppResult<QuizResult> {
        let backend = session.backend()?;
        let topic = match topic.trim() {
            "" => DEFAULT_TOPIC,
            t => t,
        };

        info!("🎯 生成题目: 主题 '{}'，难度 {}", truncate_text(topic, 40), difficulty);

        let generated = self.call(backend.generate_quiz(topic, difficulty)).await?;
        let Some(quiz) = generated else {
            info!("📭 后端没有生成题目: '{}'", truncate_text(topic, 40));
            return Ok(QuizResult::NoQuestion);
        };

        if let Err(defect) = quiz.validate() {
            warn!("⚠️ 后端返回的题目不合法: {}", defect);
            return Err(AppError::generation_failed(defect.to_string()));
        }

        let quiz = match quiz.difficulty {
            Some(_) => quiz,
            None => quiz.with_difficulty(difficulty),
        };

        session.set_quiz(quiz.clone());
        info!("✓ 新题目已就绪 (第 {} 题)", session.quizzes_generated());
        Ok(QuizResult::Generated(quiz))
    }

    /// 锁定答案
    ///
    /// `input` 可以是选项标签、序号或完整选项文本。
    pub fn lock_answer(&self, session: &mut Session, input: &str) -> AppResult<AnswerOutcome> {
        let quiz = session.current_quiz().ok_or(SessionError::NoActiveQuiz)?;
        let choice = quiz
            .resolve_choice(input)
            .ok_or_else(|| SessionError::UnknownChoice {
                choice: input.trim().to_string(),
            })?
            .to_string();

        let outcome = session.lock_answer(&choice)?;
        match &outcome {
            AnswerOutcome::Correct { awarded, .. } => {
                info!("✅ 回答正确 +{} XP (总计 {})", awarded, session.xp())
            }
            AnswerOutcome::Incorrect { correct_answer, .. } => {
                info!("❌ 回答错误，正确答案 {}", correct_answer)
            }
        }
        Ok(outcome)
    }

    /// 生成学习计划
    pub async fn generate_study_plan(&self, session: &Session) -> AppResult<String> {
        let backend = session.backend()?;
        info!("📅 生成学习计划...");

        let plan = self.call(backend.generate_study_plan()).await?;
        if plan.trim().is_empty() {
            return Err(AppError::generation_failed("学习计划为空"));
        }
        Ok(plan)
    }

    /// 快速提问
    pub async fn ask(&self, session: &Session, query: &str) -> AppResult<String> {
        let backend = session.backend()?;
        info!("🤖 快速提问: {}", truncate_text(query, 60));

        let answer = self.call(backend.answer_question(query.trim())).await?;
        if answer.trim().is_empty() {
            return Err(AppError::generation_failed("回答为空"));
        }
        Ok(answer)
    }
}
