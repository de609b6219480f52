//! 完整文档渲染

use super::RulePipeline;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Fenced code is pulled out before the pipeline runs and put back afterwards.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("code fence regex is valid"));
static FENCE_SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x00([0-9]+)\x00").expect("fence slot regex is valid"));

pub(super) static DOCUMENT_PIPELINE: Lazy<RulePipeline> = Lazy::new(|| {
    build_document_pipeline().expect("document rules are valid regexes")
});

fn build_document_pipeline() -> Result<RulePipeline, regex::Error> {
    RulePipeline::new()
        .rule(
            "heading_3",
            r"(?mR)^### (.*)$",
            r#"<h3 class="text-lg font-semibold text-gray-800 mt-6 mb-3 border-b border-gray-200 pb-1">${1}</h3>"#,
        )?
        .rule(
            "heading_2",
            r"(?mR)^## (.*)$",
            r#"<h2 class="text-xl font-semibold text-gray-800 mt-6 mb-3 border-b border-gray-200 pb-2">${1}</h2>"#,
        )?
        .rule(
            "heading_1",
            r"(?mR)^# (.*)$",
            r#"<h1 class="text-2xl font-bold text-gray-800 mt-6 mb-4 border-b-2 border-gray-300 pb-2">${1}</h1>"#,
        )?
        .rule(
            "bold",
            r"\*\*(.*?)\*\*",
            r#"<strong class="font-semibold text-gray-900">${1}</strong>"#,
        )?
        .rule(
            "italic",
            r"\*(.*?)\*",
            r#"<em class="italic text-gray-700">${1}</em>"#,
        )?
        .rule(
            "inline_code",
            r"`([^`]+)`",
            r#"<code class="bg-gray-100 text-gray-800 px-2 py-1 rounded text-sm font-mono border">${1}</code>"#,
        )?
        .rule(
            "blockquote",
            r"(?mR)^> (.*)$",
            r#"<blockquote class="border-l-4 border-blue-500 bg-blue-50 pl-4 py-2 italic text-gray-700 my-3 rounded-r">${1}</blockquote>"#,
        )?
        .rule(
            "unordered_item",
            r"(?mR)^- (.*)$",
            r#"<li class="ml-6 mb-1 relative"><span class="absolute -left-4 text-blue-500">•</span>${1}</li>"#,
        )?
        .rule(
            "ordered_item",
            r"(?mR)^[0-9]+\. (.*)$",
            r#"<li class="ml-6 mb-1 list-decimal">${1}</li>"#,
        )?
        .rule(
            "link",
            r"\[([^\]]+)\]\(([^)]+)\)",
            r#"<a href="${2}" class="text-blue-600 hover:text-blue-800 underline hover:no-underline transition-colors" target="_blank" rel="noopener noreferrer">${1}</a>"#,
        )?
        .rule("paragraph_break", r"\n\n", r#"</p><p class="mb-4">"#)?
        .rule("line_break", r"\n", "<br>")
}

fn code_block_html(code: &str) -> String {
    format!(
        r#"<pre class="bg-gray-900 text-gray-100 p-4 rounded-lg overflow-x-auto my-4 border"><code class="text-sm font-mono whitespace-pre">{code}</code></pre>"#
    )
}

/// Renders the full-document HTML view of a prompt.
///
/// List items are emitted without an enclosing `<ul>`/`<ol>`. The body of a
/// fenced code block is emitted verbatim.
pub fn render_document(text: &str) -> String {
    let mut fences: Vec<String> = Vec::new();
    let shielded = CODE_FENCE.replace_all(text, |caps: &Captures| {
        fences.push(caps[1].to_string());
        format!("\u{0}{}\u{0}", fences.len() - 1)
    });

    let body = DOCUMENT_PIPELINE.apply(&shielded);
    let body = FENCE_SLOT.replace_all(&body, |caps: &Captures| {
        match caps[1].parse::<usize>().ok().and_then(|i| fences.get(i)) {
            Some(code) => code_block_html(code),
            None => caps[0].to_string(),
        }
    });

    format!(r#"<p class="mb-4">{body}</p>"#)
}
