//! Turns upstream result records into the combined document and raw contents.

use super::RawContent;
use super::api::ExaResult;

/// Used when a record carries neither text nor summary.
pub const NO_CONTENT: &str = "No content available";

/// Character budget for content blocks in preview documents.
pub const PREVIEW_CHARS: usize = 500;

/// How each record's content block is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStyle {
    /// Full text under a "Full Content" heading, never truncated.
    FullContent,
    /// Text cut to `max_chars` under a "Content Preview" heading, with similarity scores.
    Preview { max_chars: usize },
}

/// Combined document plus per-record contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub document: String,
    pub raw_contents: Vec<RawContent>,
    pub word_count: usize,
}

/// Renders every record in order.
pub fn normalize(results: &[ExaResult], style: DocumentStyle) -> Normalized {
    let mut document = String::new();
    let mut raw_contents = Vec::with_capacity(results.len());
    let mut word_count = 0;

    for result in results {
        let content = select_content(result);
        word_count += count_words(content);

        render_record(&mut document, result, content, style);

        raw_contents.push(RawContent {
            url: result.url.clone(),
            content: content.to_string(),
        });
    }

    Normalized {
        document,
        raw_contents,
        word_count,
    }
}

/// Full text, else summary, else [`NO_CONTENT`]. Empty strings count as absent.
pub fn select_content(result: &ExaResult) -> &str {
    non_empty(&result.text)
        .or_else(|| non_empty(&result.summary))
        .unwrap_or(NO_CONTENT)
}

pub fn count_words(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Keeps the first `max_chars` characters and appends `...` when anything was cut.
pub fn truncate(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn render_record(out: &mut String, result: &ExaResult, content: &str, style: DocumentStyle) {
    out.push_str(&format!(
        "## {}\n\n",
        non_empty(&result.title).unwrap_or("Untitled")
    ));
    if let Some(author) = non_empty(&result.author) {
        out.push_str(&format!("**Author:** {}\n", author));
    }
    if let Some(published) = non_empty(&result.published_date) {
        out.push_str(&format!("**Published:** {}\n", published));
    }
    if let DocumentStyle::Preview { .. } = style {
        if let Some(score) = result.score.filter(|s| *s != 0.0) {
            out.push_str(&format!("**Similarity Score:** {:.3}\n", score));
        }
    }
    out.push_str(&format!("**URL:** {}\n\n", result.url));

    if let Some(highlights) = result.highlights.as_ref().filter(|h| !h.is_empty()) {
        out.push_str("**Key Highlights:**\n");
        for highlight in highlights {
            out.push_str(&format!("- {}\n", highlight));
        }
        out.push('\n');
    }

    match (non_empty(&result.summary), non_empty(&result.text)) {
        (Some(summary), Some(text)) => {
            out.push_str(&format!("**Summary:** {}\n\n", summary));
            match style {
                DocumentStyle::FullContent => {
                    out.push_str(&format!("**Full Content:**\n{}\n\n", text));
                }
                DocumentStyle::Preview { max_chars } => {
                    out.push_str(&format!(
                        "**Content Preview:**\n{}\n\n",
                        truncate(text, max_chars)
                    ));
                }
            }
        }
        _ => match style {
            DocumentStyle::FullContent => out.push_str(&format!("{}\n\n", content)),
            DocumentStyle::Preview { max_chars } => {
                out.push_str(&format!("{}\n\n", truncate(content, max_chars)));
            }
        },
    }

    out.push_str("---\n\n");
}
