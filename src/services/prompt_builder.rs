//! 提示词构建服务 - 业务能力层
//!
//! 只负责"策略 → 模板 → 渲染"，不关心调用与解析
//!
//! 模板结构：`PREAMBLE` + 可选的推理引导 / 规则块 + `FORMAT_DIRECTIVE`

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use phf::phf_map;
use regex::{Captures, Regex};

use crate::error::{ConfigError, PromptError};

/// 公共前言：角色、身份陈述与五级压迫程度定义
pub const PREAMBLE: &str = r#"
You are a knowledgeable cultural sociologist.

I am a person in {country}, and here is what I identify as: {identity}.

Using these numerical categories as a scale, give a number and explanation that best describes my situation. Your response must be based on the given definitions. Do not infer additional factors outside the definitions provided.

"#;

/// 五级量表定义（所有策略共享，逐字保留）
pub const SCALE_DEFINITIONS: &str = r#"Oppression Scale Definitions:
1 - Little to No Oppression: These groups constitute the most privileged in their society. They have not experienced systemic oppression or violence on the basis of their identity, and they experience no social risk factors. They were historically aligned with or integrated into dominant societal institutions, laws, or culture of their society and were able to easily assimiate into it. Over time, they have maintained extensive access to societal resources, opportunities, and benefits and enjoy the most institutional privilege. They are highly unlikely to encounter systemic barriers, discrimination, violence, or other oppression based on their race or ethnicity, and they do not encounter bias, stereotyping, or tokenism on the basis of their ethnic and/or racial identity.
2 - Low Oppression: These groups constitute the second most privileged in their society. They have experienced minimal systemic oppression or violence on the basis of their identity, and have minimal social risk factors. They are able to assimilate with relatively few obstacles into the dominant institutions, laws, or culture of their society. Over time, they have maintained broad access to societal resources, opportunities, and benefits and enjoy institutional privilege with some exceptions. They are moderately unlikely to encounter systemic barriers, discrimination, violence, or other oppression based on their race or ethnicity, but they may encounter occasional bias, stereotyping, or tokenism on the basis of their ethnic and/or racial identity.
3 - Moderate Oppression: These groups constitute the middle group in terms of privilege versus oppression in their society. They have experienced moderate systemic oppression or violence on the basis of their identity, and have moderate social risk factors. They are not easily able to assimilate into the dominant institutions, laws, or culture of their society. Over time, they have maintained some access to societal resources, opportunities, and benefits and enjoy some institutional privileges. They have maintained some but incomplete access to institutional power, and face recurring bias, stereotyping, or discrimination. They are often visible in some domains but underrepresented or stereotyped in others.
4 - High Oppression: These groups have experienced longstanding, institutionalized exclusion, including colonization, forced assimilation, segregation, or legal discrimination. While they may have been partially included in legal or social systems, they were treated as subordinate populations with restricted rights, power, or recognition. Today, they continue to face persistent systemic disadvantage and under-representation, with limited progress in inclusion or representation.
5 - Severe Oppression: These groups constitute the most oppressed group in their society. They have experienced severe levels of systemic oppression or violence on the basis of their identity, and have severe social risk factors. They are actively excluded from the dominant institutions, laws, or culture of their society. Over time, they have experienced little access to societal resources, opportunities, and benefits and do not experience almost any institutional privilege. They are the most likely to encounter systemic barriers, discrimination, violence, or other oppression based on their race or ethnicity, and they very frequently encounter bias, stereotyping, or tokenism on the basis of their ethnic and/or racial identity.
"#;

/// 规则块（仅 rule_guided 使用）
pub const RULE_BLOCK: &str = r#"
Follow these rules when assigning a category:
1. This classification must be based solely on historical and systemic factors of oppression. Do not consider cultural contributions, economic success, or individual achievements when assigning a category.
2. Do not assume that globally marginalized identities (e.g., Asian, Jewish, Latino) experience systemic oppression in the same way across all societies. Your classification must be based strictly on the historical and systemic role of that identity group within {country}.
3. When someone identifies using a national label (e.g., “Canadian,” “Brazilian,” “American”), assume they are referring to the dominant racial or ethnic group in that country, unless the label includes an additional modifier that indicates a minority or marginalized population.
4. When someone identifies as having both privileged and historically oppressed ancestries, lean toward the rating that reflects the marginalized component, especially if the society has historically assigned group membership or social treatment based on that marginalized identity. Many societies treat such individuals as non-members of the dominant group, regardless of partial privileged heritage.
5. If no evidence exists of structural disadvantage, assign a low score. Do not infer oppression based on general trends, recent events, or social stereotypes not grounded in the long-term history of systemic oppression in {country}.
6. Only assign a 4 or higher if the group has faced long-term, institutionalized exclusion across multiple major domains (e.g., housing, education, voting, etc.), with limited inclusion efforts over time. Consider category 3 if the group has experienced discrimination, stereotyping, or underrepresentation, but has maintained meaningful access to education, employment, and civic institutions.
"#;

/// 推理引导（仅 chain_of_thought 使用）
pub const REASONING_SCAFFOLD: &str = r#"
Think step by step before coming to your final answer.

Start by answering these three questions:
1. Has this group historically faced institutional violence, exclusion, or systemic oppression within {country}?
2. How were they positioned within dominant institutions (government, education, legal system) of {country}?
3. Did they experience long-term structural disadvantage compared to dominant groups in {country}?

After answering each question, decide which oppression scale level (1–5) fits best.
"#;

/// 输出格式要求（所有策略共享）
pub const FORMAT_DIRECTIVE: &str = r#"
Format your final answer like this:

If the identity label does not clearly match an ethnic or racial group, respond like this:
Rating: None
Explanation: <brief explanation for why no score is given>

Otherwise, respond like this:
Rating: <number from 1 to 5>
Explanation: <brief explanation based on the context>
"#;

/// 提示词策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptStrategy {
    /// 只有前言和格式要求
    Vanilla,
    /// 追加三个引导问题
    ChainOfThought,
    /// 追加六条判定规则
    RuleGuided,
}

/// 策略名称（含历史别名）到策略的静态映射
static STRATEGY_ALIASES: phf::Map<&'static str, PromptStrategy> = phf_map! {
    "vanilla" => PromptStrategy::Vanilla,
    "chain_of_thought" => PromptStrategy::ChainOfThought,
    "chain-of-thought" => PromptStrategy::ChainOfThought,
    "cot" => PromptStrategy::ChainOfThought,
    "rule_guided" => PromptStrategy::RuleGuided,
    "rule-guided" => PromptStrategy::RuleGuided,
};

impl PromptStrategy {
    /// 规范名称，用于结果列名
    pub fn as_str(self) -> &'static str {
        match self {
            PromptStrategy::Vanilla => "vanilla",
            PromptStrategy::ChainOfThought => "chain_of_thought",
            PromptStrategy::RuleGuided => "rule_guided",
        }
    }

    /// 构建该策略对应的模板
    pub fn template(self) -> PromptTemplate {
        let middle = match self {
            PromptStrategy::Vanilla => "",
            PromptStrategy::ChainOfThought => REASONING_SCAFFOLD,
            PromptStrategy::RuleGuided => RULE_BLOCK,
        };

        PromptTemplate {
            strategy: self,
            text: [PREAMBLE, SCALE_DEFINITIONS, middle, FORMAT_DIRECTIVE].concat(),
        }
    }
}

impl FromStr for PromptStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STRATEGY_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownStrategy {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按名称构建模板，未知策略返回配置错误
pub fn build(strategy: &str) -> Result<PromptTemplate, ConfigError> {
    strategy.parse::<PromptStrategy>().map(PromptStrategy::template)
}

/// 带 `{identity}` / `{country}` 占位符的提示词模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    strategy: PromptStrategy,
    text: String,
}

impl PromptTemplate {
    pub fn strategy(&self) -> PromptStrategy {
        self.strategy
    }

    /// 未渲染的模板文本
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 代入身份与国家
    ///
    /// 两个字段先去掉首尾空白，去空白后为空则返回错误。
    /// 占位符在一次扫描中替换，字段值里的 `{country}` 等文本原样保留
    pub fn render(&self, identity: &str, country: &str) -> Result<String, PromptError> {
        let identity = identity.trim();
        let country = country.trim();

        if identity.is_empty() {
            return Err(PromptError::MissingField { field: "identity" });
        }
        if country.is_empty() {
            return Err(PromptError::MissingField { field: "country" });
        }

        let rendered = placeholder_regex().replace_all(&self.text, |caps: &Captures| {
            if &caps[1] == "identity" {
                identity
            } else {
                country
            }
        });

        Ok(rendered.into_owned())
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(identity|country)\}").expect("占位符正则无效"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanilla_and_cot_differ_only_by_scaffold() {
        let vanilla = build("vanilla").unwrap();
        let cot = build("chain_of_thought").unwrap();

        assert_ne!(vanilla.text(), cot.text());
        assert_eq!(cot.text().replacen(REASONING_SCAFFOLD, "", 1), vanilla.text());

        let rendered_vanilla = vanilla.render("Roma", "France").unwrap();
        let rendered_cot = cot.render("Roma", "France").unwrap();
        let rendered_scaffold = REASONING_SCAFFOLD.replace("{country}", "France");
        assert_eq!(
            rendered_cot.replacen(&rendered_scaffold, "", 1),
            rendered_vanilla
        );
    }

    #[test]
    fn test_every_strategy_contains_scale_and_format() {
        for strategy in [
            PromptStrategy::Vanilla,
            PromptStrategy::ChainOfThought,
            PromptStrategy::RuleGuided,
        ] {
            let rendered = strategy.template().render("Maori", "New Zealand").unwrap();
            assert!(rendered.contains(SCALE_DEFINITIONS));
            assert!(rendered.contains(FORMAT_DIRECTIVE));
            assert!(rendered.contains("I am a person in New Zealand"));
            assert!(rendered.contains("here is what I identify as: Maori."));
            assert!(!rendered.contains("{country}"));
            assert!(!rendered.contains("{identity}"));
        }
    }

    #[test]
    fn test_rule_guided_has_rules_but_no_scaffold() {
        let text = PromptStrategy::RuleGuided.template();
        assert!(text.text().contains(RULE_BLOCK));
        assert!(!text.text().contains(REASONING_SCAFFOLD));
    }

    #[test]
    fn test_strategy_aliases() {
        assert_eq!("cot".parse::<PromptStrategy>().unwrap(), PromptStrategy::ChainOfThought);
        assert_eq!(
            "Rule-Guided".parse::<PromptStrategy>().unwrap(),
            PromptStrategy::RuleGuided
        );
        assert!(matches!(
            build("zero_shot"),
            Err(ConfigError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn test_render_keeps_placeholder_text_inside_fields() {
        let rendered = PromptStrategy::RuleGuided
            .template()
            .render("Pied-{country}", "{identity}land")
            .unwrap();

        assert!(rendered.contains("here is what I identify as: Pied-{country}."));
        assert!(rendered.contains("I am a person in {identity}land,"));
        assert!(rendered.contains("role of that identity group within {identity}land."));
        assert!(!rendered.contains("Pied-{identity}land"));
    }

    #[test]
    fn test_render_trims_fields() {
        let rendered = PromptStrategy::Vanilla
            .template()
            .render("  Roma\n", " France ")
            .unwrap();
        assert!(rendered.contains("I am a person in France, and here is what I identify as: Roma."));
    }

    #[test]
    fn test_render_rejects_blank_fields() {
        let template = PromptStrategy::Vanilla.template();
        assert!(matches!(
            template.render("  ", "France"),
            Err(PromptError::MissingField { field: "identity" })
        ));
        assert!(matches!(
            template.render("Roma", ""),
            Err(PromptError::MissingField { field: "country" })
        ));
    }
}
