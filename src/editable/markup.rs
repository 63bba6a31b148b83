//! Markup parsing and serialization for surface content.
//!
//! Parsing goes through tree-sitter's HTML grammar. Only what an inline
//! editable surface can hold survives:
//! - text (entities decoded, whitespace kept as-is)
//! - `<br>` as a line break
//! - non-editable elements (`contenteditable="false"` or `data-signal`) as atoms
//! - block wrappers (`div`, `p`) become a line break before their content
//! - any other element is unwrapped into its children

use std::ops::Range;

use thiserror::Error;
use tree_sitter::{Node as TsNode, Parser};

use super::node::{is_atomic_element, InlineElement, Node};

/// Errors from the markup layer
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("failed to load HTML grammar: {0}")]
    Language(String),
    #[error("markup could not be parsed")]
    Parse,
}

/// Parse an HTML fragment into surface nodes
pub fn parse_markup(source: &str) -> Result<Vec<Node>, MarkupError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_html::LANGUAGE.into())
        .map_err(|e| MarkupError::Language(e.to_string()))?;
    let tree = parser.parse(source, None).ok_or(MarkupError::Parse)?;

    let mut nodes = Vec::new();
    collect_content(tree.root_node(), source, 0..source.len(), &mut nodes);
    Ok(nodes)
}

/// Walk the children of `container` that lie within `range`, emitting the
/// gaps between child elements as text.
fn collect_content(container: TsNode, source: &str, range: Range<usize>, out: &mut Vec<Node>) {
    let mut pos = range.start;
    let mut cursor = container.walk();
    for child in container.children(&mut cursor) {
        // Skip the container's own start/end tags
        if child.start_byte() < range.start || child.end_byte() > range.end {
            continue;
        }
        match child.kind() {
            "element" => {
                push_text(slice(source, pos..child.start_byte()), out);
                collect_element(child, source, out);
                pos = child.end_byte();
            }
            "script_element" | "style_element" | "comment" | "doctype" | "erroneous_end_tag" => {
                push_text(slice(source, pos..child.start_byte()), out);
                pos = child.end_byte();
            }
            // Stray `<` and friends: keep the source text, recover nested elements
            "ERROR" => {
                push_text(slice(source, pos..child.start_byte()), out);
                collect_content(child, source, child.byte_range(), out);
                pos = child.end_byte();
            }
            // text and entity nodes are covered by the gap slices
            _ => {}
        }
    }
    push_text(slice(source, pos.min(range.end)..range.end), out);
}

fn collect_element(element: TsNode, source: &str, out: &mut Vec<Node>) {
    let mut cursor = element.walk();
    let children: Vec<TsNode> = element.children(&mut cursor).collect();

    let Some(open) = children
        .iter()
        .find(|c| c.kind() == "start_tag" || c.kind() == "self_closing_tag")
    else {
        collect_content(element, source, element.byte_range(), out);
        return;
    };

    // `1<2 and 3>` is text that happens to look like a tag
    if !is_real_tag(open, source) {
        push_text(slice(source, element.start_byte()..open.end_byte()), out);
        collect_content(element, source, open.end_byte()..element.end_byte(), out);
        return;
    }

    let tag = tag_name(open, source).to_ascii_lowercase();
    let attrs = attributes(open, source);

    let inner = if open.kind() == "self_closing_tag" {
        open.end_byte()..open.end_byte()
    } else {
        let close = children
            .iter()
            .find(|c| c.kind() == "end_tag")
            .map(|c| c.start_byte())
            .unwrap_or(element.end_byte());
        open.end_byte()..close.max(open.end_byte())
    };

    match tag.as_str() {
        "br" => out.push(Node::LineBreak),
        _ if is_atomic_element(&attrs) => {
            let mut inner_nodes = Vec::new();
            collect_content(element, source, inner, &mut inner_nodes);
            let mut text = String::new();
            for node in &inner_nodes {
                node.push_plain(&mut text);
            }
            out.push(Node::Inline(InlineElement { tag, attrs, text }));
        }
        "div" | "p" => {
            if !out.is_empty() && !matches!(out.last(), Some(Node::LineBreak)) {
                out.push(Node::LineBreak);
            }
            collect_content(element, source, inner, out);
        }
        _ => collect_content(element, source, inner, out),
    }
}

fn is_real_tag(open: &TsNode, source: &str) -> bool {
    let raw = slice(source, open.byte_range());
    let starts_with_name = raw
        .strip_prefix('<')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_name && raw.ends_with('>') && !open.has_error()
}

fn tag_name(open: &TsNode, source: &str) -> String {
    let mut cursor = open.walk();
    let name = open
        .children(&mut cursor)
        .find(|c| c.kind() == "tag_name")
        .map(|n| slice(source, n.byte_range()).to_string());
    name.unwrap_or_default()
}

fn attributes(open: &TsNode, source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut cursor = open.walk();
    for attr in open.children(&mut cursor) {
        if attr.kind() != "attribute" {
            continue;
        }
        let mut inner = attr.walk();
        let mut name = None;
        let mut value = String::new();
        for part in attr.children(&mut inner) {
            match part.kind() {
                "attribute_name" => name = Some(slice(source, part.byte_range()).to_string()),
                "quoted_attribute_value" => {
                    value = decode_entities(unquote(slice(source, part.byte_range())))
                }
                "attribute_value" => value = decode_entities(slice(source, part.byte_range())),
                _ => {}
            }
        }
        if let Some(name) = name {
            attrs.push((name.to_ascii_lowercase(), value));
        }
    }
    attrs
}

fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

fn slice(source: &str, range: Range<usize>) -> &str {
    source.get(range).unwrap_or("")
}

fn push_text(raw: &str, out: &mut Vec<Node>) {
    if raw.is_empty() {
        return;
    }
    let text = decode_entities(raw);
    if let Some(Node::Text(last)) = out.last_mut() {
        last.push_str(&text);
    } else {
        out.push(Node::Text(text));
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize nodes back to HTML
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(&escape_text(s)),
            Node::Inline(el) => write_inline(&mut out, el),
            Node::LineBreak => out.push_str("<br>"),
        }
    }
    out
}

/// Serialize a single inline element
pub fn inline_to_html(el: &InlineElement) -> String {
    let mut out = String::new();
    write_inline(&mut out, el);
    out
}

fn write_inline(out: &mut String, el: &InlineElement) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push('=');
        // JSON payloads read better single-quoted
        if value.contains('"') && !value.contains('\'') {
            out.push('\'');
            out.push_str(&value.replace('&', "&amp;"));
            out.push('\'');
        } else {
            out.push('"');
            out.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push('>');
    out.push_str(&escape_text(&el.text));
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Escape text content the way `innerHTML` serializes it
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode named and numeric character references. Unknown references are
/// kept literally.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let nodes = parse_markup("hello world").unwrap();
        assert_eq!(nodes, vec![Node::text("hello world")]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_markup("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_keeps_whitespace_around_elements() {
        let nodes =
            parse_markup(r#"hi <span contenteditable="false">@Bob</span> there"#).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::text("hi "));
        assert_eq!(nodes[2], Node::text(" there"));
        let el = nodes[1].as_inline().unwrap();
        assert_eq!(el.tag, "span");
        assert_eq!(el.text, "@Bob");
        assert_eq!(el.attr("contenteditable"), Some("false"));
    }

    #[test]
    fn test_parse_single_quoted_json_attribute() {
        let html = r#"<span data-signal="@" data-signal-props='{"user_id":"1"}'>@Alice</span>"#;
        let nodes = parse_markup(html).unwrap();
        let el = nodes[0].as_inline().unwrap();
        assert_eq!(el.attr("data-signal-props"), Some(r#"{"user_id":"1"}"#));
    }

    #[test]
    fn test_parse_line_breaks_and_blocks() {
        let nodes = parse_markup("one<br>two<div>three</div>").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::text("one"),
                Node::LineBreak,
                Node::text("two"),
                Node::LineBreak,
                Node::text("three"),
            ]
        );
    }

    #[test]
    fn test_parse_unwraps_formatting() {
        let nodes = parse_markup("a <b>bold</b> move").unwrap();
        assert_eq!(nodes, vec![Node::text("a bold move")]);
    }

    #[test]
    fn test_parse_decodes_entities() {
        let nodes = parse_markup("a &amp; b&nbsp;&lt;c&gt;").unwrap();
        assert_eq!(nodes, vec![Node::text("a & b\u{a0}<c>")]);
    }

    #[test]
    fn test_serialize_escapes_text() {
        let html = to_html(&[Node::text("a < b & c\u{a0}")]);
        assert_eq!(html, "a &lt; b &amp; c&nbsp;");
    }

    #[test]
    fn test_serialize_inline_quoting() {
        let el = InlineElement::new("span", "@Alice")
            .with_attr("data-signal", "@")
            .with_attr("data-signal-props", r#"{"user_id":"1"}"#);
        assert_eq!(
            inline_to_html(&el),
            r#"<span data-signal="@" data-signal-props='{"user_id":"1"}'>@Alice</span>"#
        );
    }

    #[test]
    fn test_serialize_value_with_both_quotes() {
        let el = InlineElement::new("span", "x").with_attr("title", r#"O'Neil "Jr""#);
        let html = inline_to_html(&el);
        assert_eq!(html, r#"<span title="O'Neil &quot;Jr&quot;">x</span>"#);

        let parsed = parse_markup(&html).unwrap();
        assert_eq!(parsed.len(), 1);
        // Not atomic, so it is unwrapped to text
        assert_eq!(parsed[0], Node::text("x"));
    }

    #[test]
    fn test_html_round_trip_with_token() {
        let nodes = vec![
            Node::text("hey "),
            Node::Inline(
                InlineElement::new("span", "@O'Brien")
                    .with_attr("contenteditable", "false")
                    .with_attr("data-signal", "@")
                    .with_attr("data-signal-props", r#"{"name":"O'Brien \"OB\""}"#),
            ),
            Node::LineBreak,
            Node::text("bye"),
        ];
        let html = to_html(&nodes);
        assert_eq!(parse_markup(&html).unwrap(), nodes);
    }

    #[test]
    fn test_parse_stray_angle_brackets_kept_as_text() {
        assert_eq!(parse_markup("a < b").unwrap(), vec![Node::text("a < b")]);
        assert_eq!(
            parse_markup("1<2 and 3>2").unwrap(),
            vec![Node::text("1<2 and 3>2")]
        );
    }

    #[test]
    fn test_decode_unknown_entity_kept() {
        assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
        assert_eq!(decode_entities("&#64;&#x41;"), "@A");
    }
}
