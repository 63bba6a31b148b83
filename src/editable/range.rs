//! Range algebra over cursor spans.
//!
//! Three primitives the signal engine is built on: read the text between two
//! spans, delete it (trigger character included), and insert markup with the
//! caret placed right after it. All arithmetic is done on linear offsets, so
//! spans anchored on text nodes and on the container behave the same.
//!
//! Routine edge cases (empty range, delete before offset 0) degrade to empty
//! results or no-ops rather than errors.

use super::content::EditableContent;
use super::cursor::Position;
use super::markup::{self, MarkupError};
use super::node::Node;
use super::selection::CursorSpan;

/// Plain text from the end of `start_span` to the end of `end_span`.
///
/// The live selection is left collapsed at the end of `end_span`, so a read
/// never leaves the caret inside the read region.
pub fn extract_text(
    content: &mut EditableContent,
    start_span: &CursorSpan,
    end_span: &CursorSpan,
) -> String {
    let from = content.linear_offset(&start_span.end);
    let to = content.linear_offset(&end_span.end);
    let text = content.slice_plain(from..to);
    content.collapse_to(end_span.end);
    text
}

/// Delete from one character before `start_span`'s start through the end of
/// `end_span`, consuming the trigger character that precedes the start span.
///
/// Returns the collapsed span at the deletion point, or `None` (content
/// untouched) when the start would be negative or the range is inverted.
pub fn delete_text(
    content: &mut EditableContent,
    start_span: &CursorSpan,
    end_span: &CursorSpan,
) -> Option<CursorSpan> {
    let origin = content.linear_offset(&start_span.start);
    let Some(from) = origin.checked_sub(1) else {
        tracing::trace!("delete_text: start offset would be negative, skipping");
        return None;
    };
    let to = content.linear_offset(&end_span.end);
    if to < from {
        tracing::trace!(from, to, "delete_text: inverted range, skipping");
        return None;
    }

    let from = content.remove_range(from..to);
    let at = CursorSpan::collapsed(content.position_at(from));
    content.set_selection(at);
    Some(at)
}

/// Parse `markup` and insert it at `at_span`, replacing the selected range.
///
/// Returns the caret position placed after the inserted content.
pub fn insert_markup(
    content: &mut EditableContent,
    markup: &str,
    at_span: &CursorSpan,
) -> Result<Position, MarkupError> {
    let nodes = markup::parse_markup(markup)?;
    Ok(insert_nodes(content, nodes, at_span))
}

/// Insert already-parsed nodes at `at_span`, replacing the selected range.
///
/// Exactly one text position follows the inserted nodes: the next sibling when
/// it is a text node, otherwise a new empty placeholder text node. The caret
/// goes there, so it can never end up inside a non-editable atom.
pub fn insert_nodes(content: &mut EditableContent, nodes: Vec<Node>, at_span: &CursorSpan) -> Position {
    let (from, to) = content.ordered(at_span);
    let from = content.remove_range(from..to);

    let index = content.split_at(from);
    let after = index + nodes.len();
    content.insert_nodes(index, nodes);

    if !matches!(content.nodes().get(after), Some(Node::Text(_))) {
        content.insert_nodes(after, vec![Node::text("")]);
    }
    let caret = Position::in_node(after, 0);
    content.collapse_to(caret);
    caret
}

#[cfg(test)]
mod tests {
    use super::super::node::InlineElement;
    use super::*;

    fn typed(text: &str) -> EditableContent {
        let mut content = EditableContent::new();
        content.type_text(text);
        content
    }

    #[test]
    fn test_extract_text_after_trigger() {
        let mut content = typed("hi @Al");
        let start = CursorSpan::collapsed(Position::in_node(0, 4));
        let live = content.selection().unwrap();
        assert_eq!(extract_text(&mut content, &start, &live), "Al");
        assert_eq!(content.selection(), Some(CursorSpan::collapsed(live.end)));
    }

    #[test]
    fn test_extract_text_empty_and_inverted() {
        let mut content = typed("@");
        let start = content.selection().unwrap();
        assert_eq!(extract_text(&mut content, &start, &start), "");

        let earlier = CursorSpan::collapsed(Position::in_node(0, 0));
        assert_eq!(extract_text(&mut content, &start, &earlier), "");
    }

    #[test]
    fn test_extract_text_root_vs_text_anchor() {
        let mut content = EditableContent::from_nodes(vec![
            Node::Inline(InlineElement::new("span", "@Bob").with_attr("contenteditable", "false")),
            Node::text("@jo"),
        ]);
        let end = CursorSpan::collapsed(Position::in_node(1, 3));
        let via_text = CursorSpan::collapsed(Position::in_node(1, 1));
        let via_root = CursorSpan::collapsed(Position::root(1));
        assert_eq!(extract_text(&mut content, &via_text, &end), "jo");
        assert_eq!(extract_text(&mut content, &via_root, &end), "@jo");
    }

    #[test]
    fn test_delete_text_consumes_trigger() {
        let mut content = typed("hi @Al");
        let start = CursorSpan::collapsed(Position::in_node(0, 4));
        let live = content.selection().unwrap();
        let at = delete_text(&mut content, &start, &live).unwrap();
        assert_eq!(content.plain_text(), "hi ");
        assert_eq!(content.linear_offset(&at.start), 3);
    }

    #[test]
    fn test_delete_text_negative_start_is_noop() {
        let mut content = typed("abc");
        let start = CursorSpan::collapsed(Position::in_node(0, 0));
        let live = content.selection().unwrap();
        assert_eq!(delete_text(&mut content, &start, &live), None);
        assert_eq!(content.plain_text(), "abc");
    }

    #[test]
    fn test_insert_markup_adds_placeholder_after_atom() {
        let mut content = typed("hi ");
        let at = content.selection().unwrap();
        let caret = insert_markup(
            &mut content,
            r#"<span contenteditable="false">@Bob</span>"#,
            &at,
        )
        .unwrap();
        assert_eq!(content.nodes().len(), 3);
        assert!(content.nodes()[1].is_atomic());
        assert_eq!(content.nodes()[2], Node::text(""));
        assert_eq!(caret, Position::in_node(2, 0));
        assert_eq!(content.selection(), Some(CursorSpan::collapsed(caret)));
    }

    #[test]
    fn test_insert_markup_reuses_following_text() {
        let mut content = typed("hi there");
        let at = CursorSpan::collapsed(Position::in_node(0, 3));
        let caret = insert_markup(
            &mut content,
            r#"<span contenteditable="false">@Bob</span>"#,
            &at,
        )
        .unwrap();
        assert_eq!(content.nodes().len(), 3);
        assert_eq!(content.nodes()[2], Node::text("there"));
        assert_eq!(caret, Position::in_node(2, 0));
        assert_eq!(content.plain_text(), "hi @Bobthere");
    }

    #[test]
    fn test_insert_markup_replaces_selected_range() {
        let mut content = typed("hello world");
        let at = CursorSpan::new(Position::in_node(0, 6), Position::in_node(0, 11));
        insert_markup(&mut content, "there", &at).unwrap();
        assert_eq!(content.plain_text(), "hello there");
    }

    #[test]
    fn test_typing_after_insert_lands_in_placeholder() {
        let mut content = typed("@");
        let at = CursorSpan::new(Position::in_node(0, 0), Position::in_node(0, 1));
        insert_markup(&mut content, r#"<span data-signal="@">@Bob</span>"#, &at).unwrap();
        content.type_text(" ok");
        assert_eq!(content.plain_text(), "@Bob ok");
        assert_eq!(content.nodes()[1], Node::text(" ok"));
    }
}
