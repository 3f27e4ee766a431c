//! 并发分发器 - 编排层
//!
//! 把一个分组的所有记录分发给有界的任务池：
//! - 每条记录一个 `tokio::spawn` 任务
//! - 任务持有 Semaphore 许可期间才会调用模型，同时在途的调用数不超过 `worker_count`
//! - 通过 `FuturesUnordered` 按完成顺序收集结果
//! - 任务 panic 也会转换成该记录的失败结果，保证每条记录恰好一个结果

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::models::{AnnotationResult, Record};
use crate::workflow::AnnotationFlow;

/// 默认并发数
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// 分组级并发分发器
#[derive(Clone)]
pub struct Dispatcher {
    flow: Arc<AnnotationFlow>,
    worker_count: usize,
}

impl Dispatcher {
    pub fn new(flow: AnnotationFlow, worker_count: usize) -> Self {
        Self {
            flow: Arc::new(flow),
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 并发处理一个分组
    ///
    /// 返回时所有任务都已结束；结果数量与输入相同，顺序为完成顺序
    pub async fn run_group(&self, group: &str, records: Vec<Record>) -> Vec<AnnotationResult> {
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let mut pending = FuturesUnordered::new();

        for record in records {
            let flow = Arc::clone(&self.flow);
            let semaphore = Arc::clone(&semaphore);
            let fallback = record.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return AnnotationResult::failed(record, format!("无法获取并发许可: {}", e)),
                };
                flow.run(record).await
            });

            pending.push(async move { (fallback, handle.await) });
        }

        let mut results = Vec::with_capacity(total);
        while let Some((fallback, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("[{}] {} 任务执行失败: {}", group, fallback.identity, e);
                    AnnotationResult::failed(fallback, format!("任务执行失败: {}", e))
                }
            };
            results.push(result);
            debug!("[{}] 进度 {}/{}", group, results.len(), total);
        }

        results
    }
}
