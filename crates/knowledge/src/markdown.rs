//! Block tree to Markdown conversion.
//!
//! Best effort: common text blocks are rendered, unsupported block types are
//! skipped. Nested children are indented under their parent.

use crate::title::plain_text;
use crate::types::Block;
use serde_json::Value;

const INDENT: &str = "    ";

/// Render a block tree as Markdown.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    render_blocks(blocks, 0)
}

fn render_blocks(blocks: &[Block], depth: usize) -> String {
    let mut output = String::new();
    let mut numbered = 0usize;
    let mut prev_was_list = false;

    for block in blocks {
        if block.kind == "numbered_list_item" {
            numbered += 1;
        } else {
            numbered = 0;
        }

        let Some(rendered) = render_block(block, numbered, depth) else {
            continue;
        };

        let is_list = is_list_item(&block.kind);
        if !output.is_empty() {
            // Keep consecutive list items tight; separate everything else.
            output.push_str(if is_list && prev_was_list { "\n" } else { "\n\n" });
        }
        output.push_str(&rendered);
        prev_was_list = is_list;
    }

    output
}

fn is_list_item(kind: &str) -> bool {
    matches!(kind, "bulleted_list_item" | "numbered_list_item" | "to_do")
}

/// Render one block (and its children) at the given nesting depth.
fn render_block(block: &Block, number: usize, depth: usize) -> Option<String> {
    let text = || rich_text_field(&block.data);

    let line = match block.kind.as_str() {
        "paragraph" => text(),
        "heading_1" => format!("# {}", text()),
        "heading_2" => format!("## {}", text()),
        "heading_3" => format!("### {}", text()),
        "bulleted_list_item" => format!("- {}", text()),
        "numbered_list_item" => format!("{}. {}", number, text()),
        "to_do" => {
            let checked = block
                .data
                .get("checked")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            format!("- [{}] {}", if checked { "x" } else { " " }, text())
        }
        "quote" => format!("> {}", text()),
        "callout" => {
            let icon = block
                .data
                .get("icon")
                .and_then(|i| i.get("emoji"))
                .and_then(Value::as_str);
            match icon {
                Some(emoji) => format!("> {} {}", emoji, text()),
                None => format!("> {}", text()),
            }
        }
        "toggle" => text(),
        "code" => {
            let language = block
                .data
                .get("language")
                .and_then(Value::as_str)
                .filter(|l| *l != "plain text")
                .unwrap_or("");
            let code = block
                .data
                .get("rich_text")
                .and_then(Value::as_array)
                .map(|segments| plain_text(segments))
                .unwrap_or_default();
            format!("```{}\n{}\n```", language, code)
        }
        "divider" => "---".to_string(),
        "bookmark" | "embed" | "link_preview" => {
            let url = block.data.get("url").and_then(Value::as_str)?;
            format!("[{}]({})", url, url)
        }
        "image" => {
            let url = file_url(&block.data)?;
            let caption = block
                .data
                .get("caption")
                .and_then(Value::as_array)
                .map(|segments| plain_text(segments))
                .unwrap_or_default();
            format!("![{}]({})", caption, url)
        }
        other => {
            tracing::trace!("Skipping unsupported block type: {}", other);
            return None;
        }
    };

    let mut rendered = indent(&line, depth);
    if !block.children.is_empty() {
        let children = render_blocks(&block.children, depth + 1);
        if !children.is_empty() {
            rendered.push('\n');
            rendered.push_str(&children);
        }
    }

    Some(rendered)
}

/// Prefix every line of `text` with `depth` levels of indentation.
fn indent(text: &str, depth: usize) -> String {
    if depth == 0 {
        return text.to_string();
    }
    let prefix = INDENT.repeat(depth);
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// URL of a hosted or external file object.
fn file_url(data: &Value) -> Option<&str> {
    let kind = data.get("type")?.as_str()?;
    data.get(kind)?.get("url")?.as_str()
}

/// Render the `rich_text` array of a block payload with annotations.
fn rich_text_field(data: &Value) -> String {
    data.get("rich_text")
        .and_then(Value::as_array)
        .map(|segments| rich_text_to_markdown(segments))
        .unwrap_or_default()
}

/// Render rich-text segments, applying inline annotations and links.
pub fn rich_text_to_markdown(segments: &[Value]) -> String {
    segments.iter().map(render_segment).collect()
}

fn render_segment(segment: &Value) -> String {
    let text = segment
        .get("plain_text")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return text.to_string();
    }

    let flag = |name: &str| {
        segment
            .get("annotations")
            .and_then(|a| a.get(name))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let mut out = text.to_string();
    if flag("code") {
        out = format!("`{}`", out);
    }
    if flag("bold") {
        out = format!("**{}**", out);
    }
    if flag("italic") {
        out = format!("_{}_", out);
    }
    if flag("strikethrough") {
        out = format!("~~{}~~", out);
    }
    if let Some(href) = segment.get("href").and_then(Value::as_str) {
        out = format!("[{}]({})", out, href);
    }

    out
}
