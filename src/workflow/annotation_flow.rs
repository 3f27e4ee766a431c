//! 单条记录标注流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整处理流程
//!
//! 流程顺序：
//! 1. 渲染提示词
//! 2. 调用模型
//! 3. 解析响应
//!
//! 任何一步失败都在这里转换为失败的 [`AnnotationResult`]，不会向上传播

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::ModelClient;
use crate::error::AppError;
use crate::models::{AnnotationResult, Record};
use crate::services::prompt_builder::PromptTemplate;
use crate::services::response_parser::{parse_response, ParsedResponse};
use crate::utils::logging::truncate_text;

/// 单条记录标注流程
///
/// - 不持有可变状态，可在多个任务间共享
/// - 只依赖模板、模型客户端和解析器
#[derive(Clone)]
pub struct AnnotationFlow {
    template: Arc<PromptTemplate>,
    client: Arc<dyn ModelClient>,
    verbose_logging: bool,
}

impl AnnotationFlow {
    pub fn new(template: PromptTemplate, client: Arc<dyn ModelClient>) -> Self {
        Self {
            template: Arc::new(template),
            client,
            verbose_logging: false,
        }
    }

    pub fn with_verbose_logging(mut self, verbose_logging: bool) -> Self {
        self.verbose_logging = verbose_logging;
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// 处理一条记录，总是返回恰好一个结果
    pub async fn run(&self, record: Record) -> AnnotationResult {
        match self.annotate(&record).await {
            Ok(parsed) => {
                debug!(
                    "[{}] ✓ {} → 评分 {:?}",
                    record.group, record.identity, parsed.rating
                );
                if self.verbose_logging {
                    debug!(
                        "[{}] 说明: {}",
                        record.group,
                        truncate_text(&parsed.explanation, 80)
                    );
                }
                AnnotationResult::succeeded(record, parsed)
            }
            Err(e) => {
                warn!("[{}] ❌ {} 标注失败: {}", record.group, record.identity, e);
                AnnotationResult::failed(record, e.to_string())
            }
        }
    }

    async fn annotate(&self, record: &Record) -> Result<ParsedResponse, AppError> {
        let prompt = self.template.render(&record.identity, &record.country)?;
        let raw = self.client.invoke(&prompt).await?;
        Ok(parse_response(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::services::prompt_builder::PromptStrategy;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelClient for EchoClient {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("identify as: Broken.") {
                return Err(LlmError::RateLimited {
                    model: "echo".to_string(),
                });
            }
            Ok("Rating: 2\nExplanation: minimal barriers".to_string())
        }
    }

    fn flow() -> (AnnotationFlow, Arc<EchoClient>) {
        let client = Arc::new(EchoClient {
            calls: AtomicUsize::new(0),
        });
        let flow = AnnotationFlow::new(PromptStrategy::Vanilla.template(), client.clone());
        (flow, client)
    }

    #[test]
    fn test_run_success() {
        let (flow, _) = flow();
        let record = Record::new("Basque", "Spain", "Spain");

        let result = tokio_test::block_on(flow.run(record.clone()));

        assert_eq!(result.record, record);
        assert_eq!(result.rating, Some(2));
        assert_eq!(result.explanation.as_deref(), Some("minimal barriers"));
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_invocation_failure_is_captured() {
        let (flow, _) = flow();

        let result = tokio_test::block_on(flow.run(Record::new("Broken", "Spain", "Spain")));

        assert_eq!(result.rating, None);
        assert_eq!(result.explanation, None);
        assert!(result.error.unwrap().contains("频率限制"));
    }

    #[test]
    fn test_blank_identity_fails_without_calling_client() {
        let (flow, client) = flow();

        let result = tokio_test::block_on(flow.run(Record::new("", "Spain", "Spain")));

        assert!(result.is_failed());
        assert!(result.error.unwrap().contains("identity"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
