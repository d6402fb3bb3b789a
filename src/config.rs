use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 默认配置文件名（位于当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "edugenius.toml";

/// 程序配置
///
/// 优先级：默认值 < TOML 文件 < 环境变量 < 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度
    pub temperature: f32,
    /// 单次后端调用的超时时间（秒）
    pub request_timeout_secs: u64,
    // --- 文档配置 ---
    /// 送入提示词的文档上下文上限（字符）
    pub max_context_chars: usize,
    /// 文档切块的目标长度（字符）
    pub chunk_chars: usize,
    /// 学习计划天数
    pub plan_days: u8,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            request_timeout_secs: 60,
            max_context_chars: 12_000,
            chunk_chars: 1_500,
            plan_days: 7,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 只从环境变量加载（其余取默认值）
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// 加载完整配置：默认值 → TOML 文件 → 环境变量
    ///
    /// 显式传入的路径必须存在；未传入时仅在 `edugenius.toml` 存在时读取。
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(FileError::NotFound {
                        path: p.display().to_string(),
                    }
                    .into());
                }
                Self::from_toml_file(p)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_toml_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        let config = base.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|source| {
            FileError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into()
        })
    }

    /// 用进程环境变量覆盖配置
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// 用任意键值来源覆盖配置，无法解析的值保留原值
    pub fn apply_env_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            llm_api_key: lookup("OPENAI_API_KEY")
                .or_else(|| lookup("LLM_API_KEY"))
                .unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE").unwrap_or(self.temperature),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS")
                .unwrap_or(self.request_timeout_secs),
            max_context_chars: parse_var(&lookup, "MAX_CONTEXT_CHARS").unwrap_or(self.max_context_chars),
            chunk_chars: parse_var(&lookup, "CHUNK_CHARS").unwrap_or(self.chunk_chars),
            plan_days: parse_var(&lookup, "PLAN_DAYS").unwrap_or(self.plan_days),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    /// 校验数值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String, reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
            reason: reason.to_string(),
        };

        if self.llm_model_name.trim().is_empty() {
            return Err(invalid("llm_model_name", String::new(), "不能为空"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "0".into(), "必须大于 0"));
        }
        if self.chunk_chars == 0 {
            return Err(invalid("chunk_chars", "0".into(), "必须大于 0"));
        }
        if self.max_context_chars < self.chunk_chars {
            return Err(invalid(
                "max_context_chars",
                self.max_context_chars.to_string(),
                "不能小于 chunk_chars",
            ));
        }
        if !(1..=30).contains(&self.plan_days) {
            return Err(invalid("plan_days", self.plan_days.to_string(), "范围 1-30"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("temperature", self.temperature.to_string(), "范围 0-2"));
        }
        Ok(())
    }

    /// 应用命令行参数并重新校验
    ///
    /// 命令行优先级最高，覆盖后的值同样要满足 `validate` 的约束。
    pub fn with_cli_overrides(
        mut self,
        api_key: Option<String>,
        model: Option<String>,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(key) = api_key {
            self.llm_api_key = key;
        }
        if let Some(model) = model {
            self.llm_model_name = model;
        }
        self.verbose_logging |= verbose;

        self.validate()?;
        Ok(self)
    }

    /// 取出 API 密钥，未配置时报错
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.llm_api_key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 读取并解析单个变量，失败返回 None
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_partial_fields_keep_defaults() {
        let config: Config = toml::from_str(
            r#"
            llm_model_name = "gpt-4o"
            plan_days = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.llm_model_name, "gpt-4o");
        assert_eq!(config.plan_days, 5);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.llm_api_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_env_overrides_and_bad_values_fall_back() {
        let vars: HashMap<&str, &str> = [
            ("LLM_API_KEY", "sk-test"),
            ("REQUEST_TIMEOUT_SECS", "15"),
            ("PLAN_DAYS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().apply_env_with(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.plan_days, 7);
    }

    #[test]
    fn test_openai_key_wins_over_generic_key() {
        let config = Config::default().apply_env_with(|k| match k {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "LLM_API_KEY" => Some("sk-generic".into()),
            _ => None,
        });
        assert_eq!(config.llm_api_key, "sk-openai");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "request_timeout_secs"
        ));
    }

    #[test]
    fn test_cli_overrides_are_validated() {
        let config = Config::default()
            .with_cli_overrides(Some("sk-cli".into()), Some("gpt-4o".into()), true)
            .unwrap();
        assert_eq!(config.llm_api_key, "sk-cli");
        assert_eq!(config.llm_model_name, "gpt-4o");
        assert!(config.verbose_logging);

        assert!(matches!(
            Config::default().with_cli_overrides(None, Some("  ".into()), false),
            Err(ConfigError::InvalidValue { key, .. }) if key == "llm_model_name"
        ));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingApiKey)
        ));
        config.llm_api_key = "  sk-abc ".into();
        assert_eq!(config.require_api_key().unwrap(), "sk-abc");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
