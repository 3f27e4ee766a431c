//! 批量标注处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责分组的依次处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、构建模型客户端与提示词模板（任何错误都在处理分组前暴露）
//! 2. **批量加载**：扫描并加载所有分组（`Vec<RecordGroup>`）
//! 3. **分组处理**：分组之间依次进行，组内交给 `Dispatcher` 并发处理
//! 4. **结果汇总**：为每条结果打上分组标签，合并为一张 `ResultTable`
//! 5. **全局统计**：输出评分 / 未评分 / 失败数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单条记录的细节
//! - **不可变配置**：`AnnotationConfig` 在构造时传入，运行中不修改
//! - **向下委托**：委托 dispatcher 处理单个分组

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::clients::{build_client, ModelClient};
use crate::config::{AnnotationConfig, Config};
use crate::error::AppResult;
use crate::models::{self, RecordGroup, ResultTable, TableSummary};
use crate::orchestrator::dispatcher::Dispatcher;
use crate::services::ResultWriter;
use crate::utils::logging;
use crate::workflow::AnnotationFlow;

/// 批量标注编排器
pub struct BatchOrchestrator {
    config: AnnotationConfig,
    dispatcher: Dispatcher,
}

impl BatchOrchestrator {
    /// 模板在这里构建一次，所有分组共享
    pub fn new(config: AnnotationConfig, client: Arc<dyn ModelClient>) -> Self {
        Self::with_verbose_logging(config, client, false)
    }

    pub fn with_verbose_logging(
        config: AnnotationConfig,
        client: Arc<dyn ModelClient>,
        verbose_logging: bool,
    ) -> Self {
        let flow = AnnotationFlow::new(config.strategy.template(), client)
            .with_verbose_logging(verbose_logging);

        Self {
            config,
            dispatcher: Dispatcher::new(flow, config.worker_count),
        }
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// 依次处理所有分组，返回合并后的结果表
    pub async fn run(&self, groups: Vec<RecordGroup>) -> ResultTable {
        let mut table = ResultTable::new(
            self.config.model_identifier(),
            self.config.strategy_identifier(),
        );
        let total_groups = groups.len();

        for (idx, group) in groups.into_iter().enumerate() {
            logging::log_group_start(idx + 1, total_groups, &group.name, group.records.len());

            let mut results = self.dispatcher.run_group(&group.name, group.records).await;
            for result in &mut results {
                result.record.group = group.name.clone();
            }

            logging::log_group_complete(&group.name, &TableSummary::from_results(&results));

            table.extend(results);
        }

        table
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: BatchOrchestrator,
    writer: ResultWriter,
}

impl App {
    /// 初始化应用
    ///
    /// 模型、策略、并发数或密钥无效时直接失败，不会处理任何分组
    pub fn initialize(config: Config) -> AppResult<Self> {
        let annotation_config = config.annotation_config()?;
        let settings = config.client_settings()?;
        let client = build_client(&settings)?;

        logging::log_startup(&annotation_config, client.model_name());

        let orchestrator = BatchOrchestrator::with_verbose_logging(
            annotation_config,
            client,
            config.verbose_logging,
        );
        let writer = ResultWriter::new(&config.output_dir);

        Ok(Self {
            config,
            orchestrator,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let groups = models::load_record_groups(&self.config.records_folder).await?;

        if groups.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(());
        }

        let total_records: usize = groups.iter().map(|g| g.records.len()).sum();
        logging::log_groups_loaded(groups.len(), total_records);

        let table = self.orchestrator.run(groups).await;

        let output_path = self.writer.write(&table).await?;

        logging::print_final_stats(&table.summary(), &output_path.display().to_string());

        Ok(())
    }
}
