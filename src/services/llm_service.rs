//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM 并把失败分类"，不关心提示词内容和流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BackendError;

/// LLM 服务
///
/// 职责：
/// - 发送单轮对话请求
/// - 把 `OpenAIError` 归类为 `BackendError`
/// - 不拼提示词、不解析业务结构
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `max_tokens`: 回复长度上限
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去掉首尾空白）；内容为空视为生成失败
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, BackendError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(classify_openai_error)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(classify_openai_error)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(classify_openai_error)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_openai_error(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(BackendError::Generation {
                reason: format!("LLM 返回内容为空 (模型: {})", self.model_name),
            });
        }

        Ok(content)
    }
}

/// 把 `async-openai` 的错误归类
pub fn classify_openai_error(err: OpenAIError) -> BackendError {
    match err {
        OpenAIError::ApiError(api) => classify_api_error(&api.message, api.r#type.as_deref()),
        OpenAIError::Reqwest(e) => BackendError::Unavailable {
            reason: e.to_string(),
        },
        other => BackendError::Generation {
            reason: other.to_string(),
        },
    }
}

/// 按服务端返回的错误类型和消息归类
fn classify_api_error(message: &str, kind: Option<&str>) -> BackendError {
    let lower = message.to_lowercase();
    let kind = kind.unwrap_or_default();

    let auth_kinds = ["authentication_error", "permission_error", "insufficient_quota"];
    let auth_words = ["api key", "unauthorized", "authentication", "permission", "quota"];
    if auth_kinds.contains(&kind) || auth_words.iter().any(|w| lower.contains(w)) {
        return BackendError::Unauthorized {
            message: message.to_string(),
        };
    }

    let busy_kinds = ["rate_limit_error", "server_error", "overloaded_error"];
    let busy_words = ["rate limit", "overloaded", "temporarily", "try again", "timed out"];
    if busy_kinds.contains(&kind) || busy_words.iter().any(|w| lower.contains(w)) {
        return BackendError::Unavailable {
            reason: message.to_string(),
        };
    }

    BackendError::Generation {
        reason: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 创建测试用的 LlmService（不发请求）
    fn create_test_service() -> LlmService {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            ..Config::default()
        };
        LlmService::new(&config)
    }

    #[test]
    fn test_classify_invalid_key() {
        let err = classify_api_error(
            "Incorrect API key provided: sk-xxx.",
            Some("invalid_request_error"),
        );
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[test]
    fn test_classify_rate_limit_and_server_errors() {
        assert!(matches!(
            classify_api_error("Rate limit reached for requests", Some("requests")),
            BackendError::Unavailable { .. }
        ));
        assert!(matches!(
            classify_api_error("The server had an error", Some("server_error")),
            BackendError::Unavailable { .. }
        ));
    }

    #[test]
    fn test_classify_other_api_errors_as_generation() {
        assert!(matches!(
            classify_api_error("max_tokens is too large", Some("invalid_request_error")),
            BackendError::Generation { .. }
        ));
        assert!(matches!(
            classify_api_error("something odd", None),
            BackendError::Generation { .. }
        ));
    }

    #[test]
    fn test_classify_quota_as_unauthorized() {
        assert!(matches!(
            classify_api_error("You exceeded your current quota", Some("insufficient_quota")),
            BackendError::Unauthorized { .. }
        ));
    }

    #[test]
    fn test_model_name() {
        assert_eq!(create_test_service().model_name(), "gpt-4o-mini");
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// OPENAI_API_KEY=sk-... cargo test test_send_to_llm_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let response = service
            .send_to_llm("Reply with the single word: ready", Some("Be terse."), 16)
            .await;

        match response {
            Ok(text) => {
                println!("LLM 响应: {}", text);
                assert!(!text.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
