use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::orchestrator::DEFAULT_WORKER_COUNT;
use crate::services::prompt_builder::PromptStrategy;

/// 程序配置文件
///
/// 原始配置值，需经过 [`Config::annotation_config`] / [`Config::client_settings`] 校验后才能使用
#[derive(Clone, Debug)]
pub struct Config {
    /// 模型选择（gemini / openai）
    pub model_choice: String,
    /// 提示词策略（vanilla / chain_of_thought / rule_guided）
    pub prompt_mode: String,
    /// 每个分组同时进行的模型调用数量
    pub max_workers: usize,
    /// 记录 TOML 文件存放目录
    pub records_folder: String,
    /// 结果输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    /// 为空时使用提供方默认地址
    pub llm_api_base_url: String,
    /// 为空时使用提供方默认模型
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_choice: "gemini".to_string(),
            prompt_mode: "vanilla".to_string(),
            max_workers: DEFAULT_WORKER_COUNT,
            records_folder: "input_toml".to_string(),
            output_dir: "output".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: String::new(),
            llm_model_name: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            model_choice: std::env::var("MODEL_CHOICE").unwrap_or(default.model_choice),
            prompt_mode: std::env::var("PROMPT_MODE").unwrap_or(default.prompt_mode),
            max_workers: parse_env("MAX_WORKERS", "usize")?.unwrap_or(default.max_workers),
            records_folder: std::env::var("RECORDS_FOLDER").unwrap_or(default.records_folder),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        })
    }

    /// 解析本次运行的标注配置
    ///
    /// 未知的模型或策略、并发数为 0 都会在任何分组开始前失败
    pub fn annotation_config(&self) -> Result<AnnotationConfig, ConfigError> {
        let provider: ModelProvider = self.model_choice.parse()?;
        let strategy: PromptStrategy = self.prompt_mode.parse()?;

        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }

        Ok(AnnotationConfig {
            provider,
            strategy,
            worker_count: self.max_workers,
        })
    }

    /// 解析模型客户端的连接参数
    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let provider: ModelProvider = self.model_choice.parse()?;

        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }

        Ok(ClientSettings {
            provider,
            model_name: non_empty_or(&self.llm_model_name, provider.default_model_name()),
            api_key: self.llm_api_key.clone(),
            api_base_url: non_empty_or(&self.llm_api_base_url, provider.default_base_url()),
        })
    }
}

/// 一次运行的不可变标注配置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationConfig {
    pub provider: ModelProvider,
    pub strategy: PromptStrategy,
    pub worker_count: usize,
}

impl AnnotationConfig {
    pub fn model_identifier(&self) -> &'static str {
        self.provider.as_str()
    }

    pub fn strategy_identifier(&self) -> &'static str {
        self.strategy.as_str()
    }

    /// 结果列名前缀，如 `gemini_vanilla`
    pub fn scale_type(&self) -> String {
        format!("{}_{}", self.model_identifier(), self.strategy_identifier())
    }
}

/// 模型客户端连接参数
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub provider: ModelProvider,
    pub model_name: String,
    pub api_key: String,
    pub api_base_url: String,
}

/// 模型提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelProvider {
    Gemini,
    OpenAi,
}

impl ModelProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelProvider::Gemini => "gemini",
            ModelProvider::OpenAi => "openai",
        }
    }

    pub fn default_model_name(self) -> &'static str {
        match self {
            ModelProvider::Gemini => "models/gemini-1.5-pro",
            ModelProvider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ModelProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ModelProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ModelProvider::Gemini),
            "openai" => Ok(ModelProvider::OpenAi),
            _ => Err(ConfigError::UnknownModel {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    let Ok(value) = std::env::var(var_name) else {
        return Ok(None);
    };

    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::env_parse_failed(var_name, value.as_str(), expected_type)),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.trim().to_string()
    }
}
