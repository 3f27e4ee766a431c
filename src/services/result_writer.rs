//! 结果写入服务 - 业务能力层
//!
//! 只负责把 ResultTable 落盘，不关心表是怎么产生的

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::FileError;
use crate::models::ResultTable;

/// 结果写入服务
///
/// 输出 `<output_dir>/<model>_<strategy>.jsonl`，每行一个 JSON 对象
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 该表对应的输出文件路径
    pub fn output_path(&self, table: &ResultTable) -> PathBuf {
        self.output_dir.join(format!("{}.jsonl", table.scale_type()))
    }

    /// 写入结果表，返回文件路径
    pub async fn write(&self, table: &ResultTable) -> Result<PathBuf, FileError> {
        let path = self.output_path(table);

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        let mut content = String::new();
        for row in table.rows() {
            content.push_str(&serde_json::to_string(&row)?);
            content.push('\n');
        }

        debug!("写入 {} 行结果到 {}", table.len(), path.display());

        write_file(&path, content.as_bytes()).await?;

        Ok(path)
    }
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), FileError> {
    fs::write(path, content)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
}
