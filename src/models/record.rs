use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::services::response_parser::ParsedResponse;

/// 待标注的记录：一个身份标签 + 国家上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identity: String,
    pub country: String,
    /// 所属分组（如国家工作表名）
    #[serde(default)]
    pub group: String,
}

impl Record {
    pub fn new(
        identity: impl Into<String>,
        country: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            country: country.into(),
            group: group.into(),
        }
    }
}

/// 一个命名分组及其记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup {
    pub name: String,
    pub records: Vec<Record>,
}

impl RecordGroup {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// 单条记录的标注结果
///
/// 每条记录恰好产生一个结果，失败时 `error` 有值且评分与说明为空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub record: Record,
    pub rating: Option<u8>,
    pub explanation: Option<String>,
    pub error: Option<String>,
}

impl AnnotationResult {
    pub fn succeeded(record: Record, parsed: ParsedResponse) -> Self {
        Self {
            record,
            rating: parsed.rating,
            explanation: Some(parsed.explanation),
            error: None,
        }
    }

    pub fn failed(record: Record, error: impl Into<String>) -> Self {
        Self {
            record,
            rating: None,
            explanation: None,
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// 一次运行的全部结果，带模型与策略标识
///
/// 行顺序只是完成顺序，下游不应依赖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    pub model_identifier: String,
    pub strategy_identifier: String,
    pub results: Vec<AnnotationResult>,
}

impl ResultTable {
    pub fn new(model_identifier: impl Into<String>, strategy_identifier: impl Into<String>) -> Self {
        Self {
            model_identifier: model_identifier.into(),
            strategy_identifier: strategy_identifier.into(),
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = AnnotationResult>) {
        self.results.extend(results);
    }

    /// `<model>_<strategy>`
    pub fn scale_type(&self) -> String {
        format!("{}_{}", self.model_identifier, self.strategy_identifier)
    }

    pub fn rating_column(&self) -> String {
        format!("{}_rating", self.scale_type())
    }

    pub fn explanation_column(&self) -> String {
        format!("{}_explanation", self.scale_type())
    }

    /// 展平为表格行，评分/说明列名带上模型与策略前缀
    pub fn rows(&self) -> Vec<Map<String, JsonValue>> {
        let rating_column = self.rating_column();
        let explanation_column = self.explanation_column();

        self.results
            .iter()
            .map(|result| {
                let mut row = Map::new();
                row.insert("identity".to_string(), json!(result.record.identity));
                row.insert("country".to_string(), json!(result.record.country));
                row.insert("group".to_string(), json!(result.record.group));
                row.insert(rating_column.clone(), json!(result.rating));
                row.insert(explanation_column.clone(), json!(result.explanation));
                row.insert("error".to_string(), json!(result.error));
                row
            })
            .collect()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary::from_results(&self.results)
    }
}

/// 结果统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub total: usize,
    /// 得到 1-5 评分
    pub rated: usize,
    /// 模型拒绝评分或响应无评分标记
    pub unrated: usize,
    /// 渲染或调用失败
    pub failed: usize,
}

impl TableSummary {
    pub fn from_results(results: &[AnnotationResult]) -> Self {
        let mut summary = TableSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.is_failed() {
                summary.failed += 1;
            } else if result.rating.is_some() {
                summary.rated += 1;
            } else {
                summary.unrated += 1;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ResultTable {
        let mut table = ResultTable::new("gemini", "rule_guided");
        table.extend([
            AnnotationResult::succeeded(
                Record::new("French", "France", "France"),
                ParsedResponse {
                    rating: Some(1),
                    explanation: "dominant group".to_string(),
                },
            ),
            AnnotationResult::succeeded(
                Record::new("Parisian", "France", "France"),
                ParsedResponse {
                    rating: None,
                    explanation: "not an ethnicity".to_string(),
                },
            ),
            AnnotationResult::failed(Record::new("X", "France", "France"), "timeout"),
        ]);
        table
    }

    #[test]
    fn test_rows_use_prefixed_columns() {
        let table = sample_table();
        let rows = table.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["gemini_rule_guided_rating"], json!(1));
        assert_eq!(rows[0]["gemini_rule_guided_explanation"], json!("dominant group"));
        assert_eq!(rows[0]["group"], json!("France"));
        assert_eq!(rows[2]["gemini_rule_guided_rating"], JsonValue::Null);
        assert_eq!(rows[2]["gemini_rule_guided_explanation"], JsonValue::Null);
        assert_eq!(rows[2]["error"], json!("timeout"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample_table().summary();
        assert_eq!(
            summary,
            TableSummary {
                total: 3,
                rated: 1,
                unrated: 1,
                failed: 1,
            }
        );
    }
}
