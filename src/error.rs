use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（启动阶段致命）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 提示词渲染错误
    #[error("提示词错误: {0}")]
    Prompt(#[from] PromptError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知的提示词策略
    #[error("未知的提示词策略: '{value}' (可选: vanilla, chain_of_thought, rule_guided)")]
    UnknownStrategy { value: String },
    /// 未知的模型选择
    #[error("未知的模型选择: '{value}' (可选: gemini, openai)")]
    UnknownModel { value: String },
    /// 并发数无效
    #[error("并发数必须大于 0")]
    InvalidWorkerCount,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 客户端构建失败
    #[error("无法构建 {provider} 客户端: {message}")]
    ClientBuildFailed { provider: String, message: String },
}

/// LLM 服务错误
///
/// 所有提供方的失败（鉴权、限流、网络、请求格式）统一收敛到这里
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回了非成功状态码
    #[error("LLM API返回错误状态 (模型: {model}): {status} {body}")]
    BadStatus {
        model: String,
        status: u16,
        body: String,
    },
    /// 请求频率限制
    #[error("LLM API请求频率限制 (模型: {model})")]
    RateLimited { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 提示词渲染错误
#[derive(Debug, Error)]
pub enum PromptError {
    /// 记录缺少必填字段
    #[error("记录缺少字段: {field}")]
    MissingField { field: &'static str },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
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
    /// 结果序列化失败
    #[error("结果序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

// ========== 便捷构造函数 ==========

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

impl ConfigError {
    /// 创建环境变量解析错误
    pub fn env_parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
