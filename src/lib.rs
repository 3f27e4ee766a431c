//! # Identity Annotator
//!
//! 使用大语言模型为"身份标签 + 国家"记录批量标注压迫程度评分（1-5）
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 封装模型调用能力，屏蔽提供方差异
//! - `ModelClient` - 提示词 → 原始文本，可并发调用
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条数据
//! - `prompt_builder` - 策略 → 模板 → 渲染
//! - `response_parser` - 原始文本 → 评分 + 说明
//! - `ResultWriter` - 写出结果表
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整处理流程
//! - `AnnotationFlow` - 渲染 → 调用 → 解析，失败就地转换为结果
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 分组内有界并发
//! - `orchestrator/batch_processor` - 分组依次处理，汇总结果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{build_client, ModelClient};
pub use config::{AnnotationConfig, ClientSettings, Config, ModelProvider};
pub use error::{AppError, AppResult};
pub use models::{AnnotationResult, Record, RecordGroup, ResultTable, TableSummary};
pub use orchestrator::{App, BatchOrchestrator, Dispatcher};
pub use services::{parse_response, PromptStrategy, PromptTemplate};
pub use workflow::AnnotationFlow;
