use crate::error::FileError;
use crate::models::record::{Record, RecordGroup};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 分组文件的原始结构
///
/// 字段缺失不在加载时报错，而是留给单条记录的标注流程处理
#[derive(Debug, Deserialize)]
struct GroupFile {
    group: Option<String>,
    #[serde(default)]
    records: Vec<RecordRow>,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    identity: Option<String>,
    country: Option<String>,
}

/// 从单个 TOML 文件加载一个分组
///
/// 分组名优先取文件中的 `group`，否则使用文件名（不含扩展名）
pub async fn load_group_file(toml_file_path: &Path) -> Result<RecordGroup, FileError> {
    let path_display = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path_display.clone(),
            source,
        })?;

    let file: GroupFile = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: path_display,
        source,
    })?;

    let name = file
        .group
        .filter(|g| !g.trim().is_empty())
        .unwrap_or_else(|| {
            toml_file_path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string()
        });

    let records = file
        .records
        .into_iter()
        .map(|row| {
            Record::new(
                row.identity.unwrap_or_default(),
                row.country.unwrap_or_default(),
                name.clone(),
            )
        })
        .collect();

    Ok(RecordGroup { name, records })
}

/// 从文件夹中加载所有分组，按文件名排序
///
/// 无法读取或解析的文件会被跳过并记录警告
pub async fn load_record_groups(folder_path: &str) -> Result<Vec<RecordGroup>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FileError::ReadFailed {
            path: folder_path.to_string(),
            source,
        })?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }

    toml_files.sort();

    let mut groups = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_group_file(&path).await {
            Ok(group) => {
                tracing::info!("分组 {} 加载了 {} 条记录", group.name, group.records.len());
                groups.push(group);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_record_groups_sorted_and_named() {
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("b_france.toml"),
            r#"
group = "France"

[[records]]
identity = "French"
country = "France"

[[records]]
identity = "Roma"
country = "France"
"#,
        )
        .unwrap();

        std::fs::write(
            dir.path().join("a_brazil.toml"),
            r#"
[[records]]
identity = "Pardo"
"#,
        )
        .unwrap();

        std::fs::write(dir.path().join("broken.toml"), "records = [[[").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let groups = load_record_groups(dir.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "a_brazil");
        assert_eq!(groups[0].records[0].identity, "Pardo");
        assert_eq!(groups[0].records[0].country, "");
        assert_eq!(groups[1].name, "France");
        assert_eq!(
            groups[1].records,
            vec![
                Record::new("French", "France", "France"),
                Record::new("Roma", "France", "France"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let result = load_record_groups("/definitely/not/here").await;
        assert!(matches!(result, Err(FileError::DirectoryNotFound { .. })));
    }
}
