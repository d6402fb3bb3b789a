//! 辅导后端契约 - 业务能力层
//!
//! 界面层和流程层只依赖这个 trait，具体实现（OpenAI、本地模型、测试桩）可以随意替换。

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{Difficulty, Quiz};

/// 辅导后端
///
/// 约定：
/// - `ingest` 必须先于其他调用成功一次；之前的调用返回 `NotIngested`
/// - `generate_quiz` 返回 `Ok(None)` 表示"没有生成题目"（例如文档里没有这个主题），
///   与调用失败区分开
/// - 返回的 `Quiz` 必须通过 `Quiz::validate`
#[async_trait]
pub trait TutoringBackend: Send + Sync {
    /// 后端名称（仅用于日志）
    fn name(&self) -> &str;

    /// 导入文档
    async fn ingest(&self, document: &[u8]) -> Result<(), BackendError>;

    /// 按主题和难度生成一道选择题
    async fn generate_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Option<Quiz>, BackendError>;

    /// 生成多日学习计划（Markdown 文本）
    async fn generate_study_plan(&self) -> Result<String, BackendError>;

    /// 针对文档回答自由提问
    async fn answer_question(&self, query: &str) -> Result<String, BackendError>;
}
