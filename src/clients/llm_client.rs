//! 模型客户端
//!
//! 封装"提示词 → 原始文本"这一次调用，屏蔽不同提供方的差异
//!
//! ## 技术栈
//! - OpenAI 兼容接口：`async-openai`
//! - Gemini：`reqwest` 直连 Generative Language REST 接口
//!
//! 所有提供方错误统一为 [`LlmError`]，调用方无需区分来源

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ClientSettings, ModelProvider};
use crate::error::{ConfigError, LlmError};

/// 固定温度，保证同一提示词的输出尽量稳定
pub const TEMPERATURE: f32 = 0.0;

const MAX_TOKENS: u32 = 2048;

/// 模型调用能力
///
/// 实现必须可以被多个任务同时调用（除固定配置外无状态）
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// 实际请求的模型名称
    fn model_name(&self) -> &str;

    /// 发送提示词，返回模型的原始文本响应
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}

/// 根据配置构建模型客户端
pub fn build_client(settings: &ClientSettings) -> Result<Arc<dyn ModelClient>, ConfigError> {
    let client: Arc<dyn ModelClient> = match settings.provider {
        ModelProvider::OpenAi => Arc::new(OpenAiClient::new(settings)) as Arc<dyn ModelClient>,
        ModelProvider::Gemini => Arc::new(GeminiClient::new(settings)?),
    };

    debug!(
        "已创建 {} 客户端，模型: {}",
        settings.provider,
        client.model_name()
    );

    Ok(client)
}

// ========== OpenAI 兼容客户端 ==========

/// OpenAI 兼容接口客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiClient {
    pub fn new(settings: &ClientSettings) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&settings.api_key)
            .with_api_base(&settings.api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: settings.model_name.clone(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| LlmError::api_call_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build()
            .map_err(|e| LlmError::api_call_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

// ========== Gemini 客户端 ==========

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// 拼接第一个候选的所有文本片段
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini REST 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_name: String,
}

impl GeminiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::ClientBuildFailed {
                provider: settings.provider.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: generate_content_url(&settings.api_base_url, &settings.model_name),
            api_key: settings.api_key.clone(),
            model_name: settings.model_name.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("调用 Gemini API，模型: {}", self.model_name);

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_TOKENS,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini API 请求失败: {}", e);
                LlmError::api_call_failed(&self.model_name, e)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API 请求频率限制");
            return Err(LlmError::RateLimited {
                model: self.model_name.clone(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API 返回错误状态: {}", status);
            return Err(LlmError::BadStatus {
                model: self.model_name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::api_call_failed(&self.model_name, e))?;

        debug!("Gemini API 调用成功");

        parsed
            .text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })
    }
}

/// `{base}/models/{model}:generateContent`，模型名可带或不带 `models/` 前缀
fn generate_content_url(base_url: &str, model_name: &str) -> String {
    let model_path = if model_name.starts_with("models/") {
        model_name.to_string()
    } else {
        format!("models/{}", model_name)
    };

    format!(
        "{}/{}:generateContent",
        base_url.trim_end_matches('/'),
        model_path
    )
}
