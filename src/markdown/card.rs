//! 卡片预览渲染

use super::RulePipeline;
use once_cell::sync::Lazy;

/// Shown instead of a preview when the content is blank.
pub const CARD_PLACEHOLDER: &str = "No content available.";

const CARD_MAX_CHARS: usize = 180;
/// A word-boundary cut is only taken when the last space lies past this offset.
const CARD_MIN_WORD_CUT: usize = 100;
const ELLIPSIS: &str = "...";

pub(super) static CARD_PIPELINE: Lazy<RulePipeline> = Lazy::new(|| {
    build_card_pipeline().expect("card preview rules are valid regexes")
});

fn build_card_pipeline() -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        // 代码块最先处理，避免内部的 ` 和 * 被后续规则误匹配
        .rule(
            "code_block",
            r"(?s)```.*?```",
            r#"<span class="inline-block bg-gray-800 text-white px-2 py-1 rounded text-xs font-mono mr-1">Code</span>"#,
        )?
        .rule(
            "heading_3",
            r"(?mR)^### (.*)$",
            r#"<span class="font-semibold text-gray-800">${1}</span>"#,
        )?
        .rule(
            "heading_2",
            r"(?mR)^## (.*)$",
            r#"<span class="font-semibold text-gray-800">${1}</span>"#,
        )?
        .rule(
            "heading_1",
            r"(?mR)^# (.*)$",
            r#"<span class="font-bold text-gray-800">${1}</span>"#,
        )?
        .rule(
            "bold",
            r"\*\*(.*?)\*\*",
            r#"<strong class="font-semibold text-gray-800">${1}</strong>"#,
        )?
        .rule(
            "italic",
            r"\*(.*?)\*",
            r#"<em class="italic text-gray-700">${1}</em>"#,
        )?
        .rule(
            "inline_code",
            r"`([^`]+)`",
            r#"<code class="bg-gray-100 text-gray-800 px-1 py-0.5 rounded text-xs font-mono">${1}</code>"#,
        )?
        .rule(
            "blockquote",
            r"(?mR)^> (.*)$",
            r#"<span class="text-blue-700 italic border-l-2 border-blue-300 pl-2">${1}</span>"#,
        )?
        .rule("unordered_item", r"(?mR)^- (.*)$", "• ${1}")?
        .rule("ordered_item", r"(?mR)^[0-9]+\. (.*)$", "${1}")?
        .rule(
            "link",
            r"\[([^\]]+)\]\([^)]+\)",
            r#"<span class="text-blue-600 font-medium">${1}</span>"#,
        )?
        .rule("paragraph_break", r"\n\n+", " ")?
        .rule("line_break", r"\n", " ")?
        .rule("whitespace", r"\s+", " ")
}

/// Cuts `text` down to the card length.
///
/// Texts of at most 180 characters are returned unchanged. Longer texts are
/// cut at 180 characters; if the cut contains a space past offset 100 the
/// text ends at the last such space, otherwise the raw cut is kept. Either
/// way `...` is appended.
pub fn truncate_for_card(text: &str) -> String {
    let Some((cut_at, _)) = text.char_indices().nth(CARD_MAX_CHARS) else {
        return text.to_string();
    };
    let cut = &text[..cut_at];

    match cut.rfind(' ') {
        Some(space) if cut[..space].chars().count() > CARD_MIN_WORD_CUT => {
            format!("{}{ELLIPSIS}", &cut[..space])
        }
        _ => format!("{cut}{ELLIPSIS}"),
    }
}

/// Renders a single-line HTML preview for a prompt card.
pub fn render_card_preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return CARD_PLACEHOLDER.to_string();
    }

    let truncated = truncate_for_card(trimmed);
    CARD_PIPELINE.apply(&truncated).trim().to_string()
}
