//! 响应解析服务 - 业务能力层
//!
//! 从模型的自由文本中提取 `Rating:` 与 `Explanation:` 两个字段
//!
//! ## 语法
//! - `Rating:` + 空白 + (`1`..`5` | `None`)，取第一次出现，`None` 表示模型拒绝评分
//! - `Explanation:` + 空白 + 余下全部文本（可跨行）
//! - 标签区分大小写，两个字段互相独立
//!
//! 解析永不失败：缺少评分得到 `None`，缺少说明则整段原文作为说明

use std::sync::OnceLock;

use regex::Regex;

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// 1-5 的评分，模型拒绝或无法识别时为 `None`
    pub rating: Option<u8>,
    pub explanation: String,
}

/// 评分必须是完整的单个记号：`Rating: 35` 不算评分，
/// 第一个 `Rating:` 即使是 `None` 也不会再向后查找
fn rating_regex() -> &'static Regex {
    static RATING: OnceLock<Regex> = OnceLock::new();
    RATING.get_or_init(|| Regex::new(r"Rating:\s*([1-5]|None)\b").expect("评分正则无效"))
}

fn explanation_regex() -> &'static Regex {
    static EXPLANATION: OnceLock<Regex> = OnceLock::new();
    EXPLANATION.get_or_init(|| Regex::new(r"(?s)Explanation:\s*(.*)").expect("说明正则无效"))
}

/// 解析模型原始响应
pub fn parse_response(raw: &str) -> ParsedResponse {
    let rating = rating_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok());

    let explanation = explanation_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string());

    ParsedResponse {
        rating,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_table() {
        let cases: &[(&str, Option<u8>, &str)] = &[
            ("Rating: 3\nExplanation: foo", Some(3), "foo"),
            (
                "Rating: None\nExplanation: not an ethnicity",
                None,
                "not an ethnicity",
            ),
            ("Explanation: bar", None, "bar"),
            ("garbage text", None, "garbage text"),
            ("Rating: 5", Some(5), "Rating: 5"),
            ("Rating:4\nExplanation:   tight spacing  ", Some(4), "tight spacing"),
            ("Rating: 7\nExplanation: out of scale", None, "out of scale"),
            ("Rating: 35\nExplanation: two digits", None, "two digits"),
            ("rating: 2\nexplanation: lower case", None, "rating: 2\nexplanation: lower case"),
        ];

        for (raw, rating, explanation) in cases {
            let parsed = parse_response(raw);
            assert_eq!(parsed.rating, *rating, "rating for {:?}", raw);
            assert_eq!(parsed.explanation, *explanation, "explanation for {:?}", raw);
        }
    }

    #[test]
    fn test_multiline_explanation_is_captured_to_end() {
        let raw = "1. Yes, historically.\n2. Marginal.\n3. Yes.\n\nRating: 4\nExplanation: Long-term exclusion\nacross housing and education.";
        let parsed = parse_response(raw);

        assert_eq!(parsed.rating, Some(4));
        assert_eq!(
            parsed.explanation,
            "Long-term exclusion\nacross housing and education."
        );
    }

    #[test]
    fn test_first_rating_marker_wins() {
        let parsed = parse_response("Rating: 2\nExplanation: x\nRating: 5");
        assert_eq!(parsed.rating, Some(2));

        let parsed = parse_response("Rating: None\nExplanation: unsure\nRating: 4");
        assert_eq!(parsed.rating, None);
    }
}
