//! Structured text to HTML
//!
//! Renders the block list the CMS stores for rich-text fields. Consecutive
//! list items are grouped into one list, and inline spans that overlap are
//! closed and reopened so the markup stays well nested.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::helpers::{html_escape, post_url, safe_url, text_to_html};

fn paragraph() -> String {
    "paragraph".to_string()
}

/// One block of a rich-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type", default = "paragraph")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextNode {
    /// A plain paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: paragraph(),
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

/// Inline formatting over a character range of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn of(node: &RichTextNode) -> Option<Self> {
        match node.kind.as_str() {
            "list-item" => Some(ListKind::Unordered),
            "o-list-item" => Some(ListKind::Ordered),
            _ => None,
        }
    }

    fn open(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

/// Render a rich-text field; document links resolve to post routes under `root`
pub fn as_html(nodes: &[RichTextNode], root: &str) -> String {
    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    for node in nodes {
        let list = ListKind::of(node);
        if list != open_list {
            if let Some(kind) = open_list {
                html.push_str(kind.close());
            }
            if let Some(kind) = list {
                html.push_str(kind.open());
            }
            open_list = list;
        }
        html.push_str(&render_block(node, root));
    }

    if let Some(kind) = open_list {
        html.push_str(kind.close());
    }

    html
}

/// Plain text of a rich-text field, one block per line
pub fn as_text(nodes: &[RichTextNode]) -> String {
    nodes
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(node: &RichTextNode, root: &str) -> String {
    let kind = node.kind.as_str();

    if let Some(level) = heading_level(kind) {
        return format!(
            "<h{level}>{}</h{level}>",
            render_inline(&node.text, &node.spans, root)
        );
    }

    match kind {
        "paragraph" => format!("<p>{}</p>", render_inline(&node.text, &node.spans, root)),
        "preformatted" => format!("<pre>{}</pre>", html_escape(&node.text)),
        "list-item" | "o-list-item" => {
            format!("<li>{}</li>", render_inline(&node.text, &node.spans, root))
        }
        "image" => match node.url.as_deref().and_then(safe_url) {
            Some(src) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                src,
                html_escape(node.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        "embed" => match &node.oembed {
            Some(embed) => format!(
                r#"<div data-oembed="{}" data-oembed-type="{}">{}</div>"#,
                html_escape(embed.embed_url.as_deref().unwrap_or("")),
                html_escape(embed.kind.as_deref().unwrap_or("")),
                embed.html.as_deref().unwrap_or("")
            ),
            None => String::new(),
        },
        other => {
            tracing::debug!("Rendering unknown block type {:?} as a paragraph", other);
            format!("<p>{}</p>", render_inline(&node.text, &node.spans, root))
        }
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    kind.strip_prefix("heading")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
}

/// Opening and closing markup for a span, `None` for unsupported spans
fn span_tags(span: &Span, root: &str) -> Option<(String, String)> {
    match span.kind.as_str() {
        "strong" => Some(("<strong>".to_string(), "</strong>".to_string())),
        "em" => Some(("<em>".to_string(), "</em>".to_string())),
        "label" => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.get("label"))
                .and_then(|l| l.as_str())
                .unwrap_or("");
            Some((
                format!(r#"<span class="{}">"#, html_escape(label)),
                "</span>".to_string(),
            ))
        }
        "hyperlink" => {
            let data = span.data.as_ref();
            let href = data.and_then(|d| resolve_link(d, root));
            let blank = data
                .and_then(|d| d.get("target"))
                .and_then(|t| t.as_str())
                == Some("_blank");
            match href {
                Some(href) if blank => Some((
                    format!(r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#, href),
                    "</a>".to_string(),
                )),
                Some(href) => Some((format!(r#"<a href="{}">"#, href), "</a>".to_string())),
                None => Some(("<span>".to_string(), "</span>".to_string())),
            }
        }
        _ => None,
    }
}

fn resolve_link(data: &serde_json::Value, root: &str) -> Option<String> {
    match data.get("link_type").and_then(|t| t.as_str()) {
        Some("Document") => {
            let uid = data.get("uid").and_then(|u| u.as_str())?;
            Some(post_url(root, uid))
        }
        _ => data.get("url").and_then(|u| u.as_str()).and_then(safe_url),
    }
}

fn render_inline(text: &str, spans: &[Span], root: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    // (start, end, open, close), outer spans first
    let mut marks: Vec<(usize, usize, String, String)> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .filter_map(|s| {
            let (open, close) = span_tags(s, root)?;
            Some((s.start, s.end.min(len), open, close))
        })
        .collect();
    marks.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut points: BTreeSet<usize> = BTreeSet::new();
    points.insert(0);
    points.insert(len);
    for (start, end, _, _) in &marks {
        points.insert(*start);
        points.insert(*end);
    }
    let points: Vec<usize> = points.into_iter().collect();

    let mut out = String::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut next = 0;

    for window in points.windows(2) {
        let (from, to) = (window[0], window[1]);

        close_ending(&marks, &mut stack, from, &mut out);

        while next < marks.len() && marks[next].0 == from {
            out.push_str(&marks[next].2);
            stack.push(next);
            next += 1;
        }

        let segment: String = chars[from..to].iter().collect();
        out.push_str(&text_to_html(&segment));
    }

    while let Some(i) = stack.pop() {
        out.push_str(&marks[i].3);
    }

    out
}

/// Close every open span ending at `pos`, reopening spans closed on the way
fn close_ending(
    marks: &[(usize, usize, String, String)],
    stack: &mut Vec<usize>,
    pos: usize,
    out: &mut String,
) {
    let mut reopen = Vec::new();

    while stack.iter().any(|&i| marks[i].1 <= pos) {
        let Some(i) = stack.pop() else { break };
        out.push_str(&marks[i].3);
        if marks[i].1 > pos {
            reopen.push(i);
        }
    }

    for i in reopen.into_iter().rev() {
        out.push_str(&marks[i].2);
        stack.push(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes(value: serde_json::Value) -> Vec<RichTextNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let body = nodes(json!([
            { "type": "heading2", "text": "Intro", "spans": [] },
            { "type": "paragraph", "text": "Hello\nworld", "spans": [] }
        ]));
        assert_eq!(as_html(&body, "/"), "<h2>Intro</h2><p>Hello<br />world</p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let body = vec![RichTextNode::paragraph("<script>alert('x')</script>")];
        assert_eq!(
            as_html(&body, "/"),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_list_items_are_grouped() {
        let body = nodes(json!([
            { "type": "list-item", "text": "one" },
            { "type": "list-item", "text": "two" },
            { "type": "o-list-item", "text": "first" },
            { "type": "paragraph", "text": "after" }
        ]));
        assert_eq!(
            as_html(&body, "/"),
            "<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_nested_spans() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "bold and italic",
            "spans": [
                { "start": 0, "end": 15, "type": "strong" },
                { "start": 9, "end": 15, "type": "em" }
            ]
        }]));
        assert_eq!(
            as_html(&body, "/"),
            "<p><strong>bold and <em>italic</em></strong></p>"
        );
    }

    #[test]
    fn test_overlapping_spans_stay_well_nested() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "abcdef",
            "spans": [
                { "start": 0, "end": 4, "type": "strong" },
                { "start": 2, "end": 6, "type": "em" }
            ]
        }]));
        assert_eq!(
            as_html(&body, "/"),
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_hyperlinks() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "see docs and other post",
            "spans": [
                { "start": 4, "end": 8, "type": "hyperlink",
                  "data": { "link_type": "Web", "url": "https://reactjs.org", "target": "_blank" } },
                { "start": 13, "end": 23, "type": "hyperlink",
                  "data": { "link_type": "Document", "type": "posts", "uid": "other-post" } }
            ]
        }]));
        assert_eq!(
            as_html(&body, "/blog/"),
            concat!(
                r#"<p>see <a href="https://reactjs.org" target="_blank" rel="noopener noreferrer">docs</a>"#,
                r#" and <a href="/blog/post/other-post">other post</a></p>"#
            )
        );
    }

    #[test]
    fn test_unsafe_link_is_dropped() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "click",
            "spans": [{ "start": 0, "end": 5, "type": "hyperlink",
                        "data": { "link_type": "Web", "url": "javascript:alert(1)" } }]
        }]));
        assert_eq!(as_html(&body, "/"), "<p><span>click</span></p>");
    }

    #[test]
    fn test_image_and_preformatted() {
        let body = nodes(json!([
            { "type": "image", "url": "https://images.prismic.io/a.png", "alt": "A \"quote\"" },
            { "type": "preformatted", "text": "let x = 1 < 2;" }
        ]));
        assert_eq!(
            as_html(&body, "/"),
            r#"<p class="block-img"><img src="https://images.prismic.io/a.png" alt="A &quot;quote&quot;" /></p><pre>let x = 1 &lt; 2;</pre>"#
        );
    }

    #[test]
    fn test_span_offsets_count_characters() {
        let body = nodes(json!([{
            "type": "paragraph",
            "text": "ação rápida",
            "spans": [{ "start": 5, "end": 11, "type": "strong" }]
        }]));
        assert_eq!(as_html(&body, "/"), "<p>ação <strong>rápida</strong></p>");
    }

    #[test]
    fn test_as_text() {
        let body = vec![RichTextNode::paragraph("one"), RichTextNode::paragraph("two")];
        assert_eq!(as_text(&body), "one\ntwo");
    }
}
