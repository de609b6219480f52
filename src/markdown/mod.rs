//! Markdown 预览渲染
//!
//! 不是解析器：每种渲染场景都是一条固定顺序的正则替换流水线，
//! 作用于整段原始文本，前面规则的输出会被后面的规则继续处理。
//!
//! - [`render_card_preview`] - 卡片预览（截断、单行、无块级结构）
//! - [`render_document`] - 完整文档视图（保留标题、引用、列表项、段落）
//!
//! 两个函数对任意输入都不会失败；未闭合的语法按原文透传。
//! 源文本中的 HTML 不做转义。

mod card;
mod document;

pub use card::{render_card_preview, truncate_for_card, CARD_PLACEHOLDER};
pub use document::render_document;

use regex::Regex;

/// 单条替换规则
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl SubstitutionRule {
    /// `replacement` uses `regex` syntax for captures (`${1}`).
    pub fn new(
        name: &'static str,
        pattern: &str,
        replacement: &'static str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            replacement,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement)
            .into_owned()
    }
}

/// 有序规则流水线
///
/// 每条规则在整段文本上只执行一次，顺序即声明顺序。
#[derive(Debug, Clone, Default)]
pub struct RulePipeline {
    rules: Vec<SubstitutionRule>,
}

impl RulePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(
        mut self,
        name: &'static str,
        pattern: &str,
        replacement: &'static str,
    ) -> Result<Self, regex::Error> {
        self.rules
            .push(SubstitutionRule::new(name, pattern, replacement)?);
        Ok(self)
    }

    pub fn apply(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, rule| rule.apply(&text))
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(SubstitutionRule::name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
