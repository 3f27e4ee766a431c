//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和并发调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量标注处理器
//! - 管理应用生命周期（初始化、运行、写出结果）
//! - 依次遍历分组（Vec<RecordGroup>）
//! - 为结果打上分组标签并合并为 ResultTable
//! - 输出全局统计信息
//!
//! ### `dispatcher` - 分组并发分发器
//! - 每条记录一个任务，Semaphore 限制在途调用数
//! - 按完成顺序收集结果
//! - 等待所有任务结束后才返回
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RecordGroup>)
//!     ↓
//! dispatcher (处理 Vec<Record>)
//!     ↓
//! workflow::AnnotationFlow (处理单条 Record)
//!     ↓
//! services / clients (能力层：prompt / llm / parse)
//! ```

pub mod batch_processor;
pub mod dispatcher;

// 重新导出主要类型
pub use batch_processor::{App, BatchOrchestrator};
pub use dispatcher::{Dispatcher, DEFAULT_WORKER_COUNT};
