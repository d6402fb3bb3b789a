use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 辅导后端错误
    #[error("后端错误: {0}")]
    Backend(#[from] BackendError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 辅导后端错误
///
/// 后端边界上的每一类失败都有独立的变体，界面层据此给出不同提示，
/// 而不是把缺失字段渲染成空白。
#[derive(Debug, Error)]
pub enum BackendError {
    /// 凭证无效或未授权
    #[error("凭证无效或未授权: {message}")]
    Unauthorized { message: String },
    /// 文档无法读取或格式不支持
    #[error("文档无法读取: {reason}")]
    DocumentUnreadable { reason: String },
    /// 生成结果缺失或格式错误
    #[error("生成失败: {reason}")]
    Generation { reason: String },
    /// 服务暂时不可用（网络、限流、服务端错误）
    #[error("服务暂时不可用: {reason}")]
    Unavailable { reason: String },
    /// 请求超时
    #[error("请求超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 用户取消了请求
    #[error("请求已取消")]
    Cancelled,
    /// 尚未导入文档
    #[error("尚未导入文档")]
    NotIngested,
}

impl BackendError {
    /// 给终端用户看的一行提示
    pub fn user_hint(&self) -> String {
        match self {
            BackendError::Unauthorized { .. } => {
                "Authorization failed. Check your API key and try again.".to_string()
            }
            BackendError::DocumentUnreadable { reason } => {
                format!("The document could not be read ({reason}). Try another PDF.")
            }
            BackendError::Generation { .. } => {
                "The tutor returned an unusable answer. Please generate again.".to_string()
            }
            BackendError::Unavailable { .. } => {
                "The tutor service is temporarily unavailable. Try again shortly.".to_string()
            }
            BackendError::Timeout { secs } => {
                format!("The tutor did not answer within {secs}s. Try again.")
            }
            BackendError::Cancelled => "Request cancelled.".to_string(),
            BackendError::NotIngested => {
                "No document is loaded yet. Use `launch <path>` first.".to_string()
            }
        }
    }

    /// 是否值得用户直接重试
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Unavailable { .. } | BackendError::Timeout { .. }
        )
    }
}

/// 会话状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 后端尚未启动
    #[error("后端尚未启动，请先导入文档")]
    NotLaunched,
    /// 后端已经启动
    #[error("后端已经启动，本会话不能再次导入")]
    AlreadyLaunched,
    /// 没有进行中的题目
    #[error("当前没有进行中的题目")]
    NoActiveQuiz,
    /// 选项不存在
    #[error("选项不存在: {choice}")]
    UnknownChoice { choice: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("缺少 API 密钥，请设置 OPENAI_API_KEY 或使用 --api-key")]
    MissingApiKey,
    /// 配置值非法
    #[error("配置项 {key} 的值 '{value}' 非法: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建生成失败错误
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        AppError::Backend(BackendError::Generation {
            reason: reason.into(),
        })
    }

    /// 取出后端错误（如果是的话）
    pub fn as_backend(&self) -> Option<&BackendError> {
        match self {
            AppError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_classes_have_distinct_hints() {
        let errors = [
            BackendError::Unauthorized {
                message: "bad key".into(),
            },
            BackendError::DocumentUnreadable {
                reason: "empty".into(),
            },
            BackendError::Generation {
                reason: "no json".into(),
            },
            BackendError::Unavailable {
                reason: "503".into(),
            },
        ];

        let hints: Vec<String> = errors.iter().map(BackendError::user_hint).collect();
        for (i, a) in hints.iter().enumerate() {
            for b in hints.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Timeout { secs: 5 }.is_transient());
        assert!(BackendError::Unavailable {
            reason: "rate limit".into()
        }
        .is_transient());
        assert!(!BackendError::Unauthorized {
            message: "x".into()
        }
        .is_transient());
        assert!(!BackendError::Cancelled.is_transient());
    }

    #[test]
    fn test_app_error_wraps_backend() {
        let err: AppError = BackendError::NotIngested.into();
        assert!(matches!(err.as_backend(), Some(BackendError::NotIngested)));
        assert!(err.to_string().contains("尚未导入文档"));
    }
}
