//! Preview document model built from the comrak AST.
//!
//! comrak's arena AST borrows from its arena, so it is converted into owned
//! blocks and styled spans that the preview panel can keep between frames
//! and lay out directly.

use crate::preview::html::comrak_options;
use comrak::nodes::{AstNode, ListType as ComrakListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena};

/// Inline styling accumulated from enclosing emphasis nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
}

/// A run of inline text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
    /// Target URL when the span is (part of) a link.
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl From<TableAlignment> for Align {
    fn from(align: TableAlignment) -> Self {
        match align {
            TableAlignment::None => Align::None,
            TableAlignment::Left => Align::Left,
            TableAlignment::Center => Align::Center,
            TableAlignment::Right => Align::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// `Some(checked)` for task list items.
    pub task: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    CodeBlock { info: String, literal: String },
    Quote(Vec<Block>),
    List {
        /// Start number for ordered lists.
        start: Option<usize>,
        items: Vec<ListItem>,
    },
    Table {
        alignments: Vec<Align>,
        /// First row is the header.
        rows: Vec<Vec<Vec<Span>>>,
    },
    Rule,
    Html(String),
    Footnote { name: String, blocks: Vec<Block> },
}

/// Parse markdown into preview blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let arena = Arena::new();
    let options = comrak_options();
    let root = parse_document(&arena, markdown, &options);
    convert_children(root)
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<Block> {
    node.children().filter_map(convert_block).collect()
}

fn convert_block<'a>(node: &'a AstNode<'a>) -> Option<Block> {
    let value = node.data.borrow().value.clone();
    let block = match value {
        NodeValue::Heading(heading) => Block::Heading {
            level: heading.level,
            spans: inline_spans(node),
        },
        NodeValue::Paragraph => Block::Paragraph(inline_spans(node)),
        NodeValue::CodeBlock(code) => Block::CodeBlock {
            info: code.info,
            literal: code.literal,
        },
        NodeValue::BlockQuote => Block::Quote(convert_children(node)),
        NodeValue::List(list) => Block::List {
            start: match list.list_type {
                ComrakListType::Ordered => Some(list.start),
                ComrakListType::Bullet => None,
            },
            items: node.children().map(convert_item).collect(),
        },
        NodeValue::Table(table) => Block::Table {
            alignments: table.alignments.iter().map(|a| Align::from(*a)).collect(),
            rows: node
                .children()
                .map(|row| row.children().map(inline_spans).collect())
                .collect(),
        },
        NodeValue::ThematicBreak => Block::Rule,
        NodeValue::HtmlBlock(html) => Block::Html(html.literal),
        NodeValue::FootnoteDefinition(def) => Block::Footnote {
            name: def.name,
            blocks: convert_children(node),
        },
        _ => return None,
    };
    Some(block)
}

fn convert_item<'a>(node: &'a AstNode<'a>) -> ListItem {
    let task = match &node.data.borrow().value {
        NodeValue::TaskItem(mark) => Some(mark.map(|c| c == 'x' || c == 'X').unwrap_or(false)),
        _ => None,
    };
    ListItem {
        task,
        blocks: convert_children(node),
    }
}

/// Flatten the inline children of `node` into styled spans.
fn inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<Span> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_spans(child, SpanStyle::default(), None, &mut spans);
    }
    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, style: SpanStyle, link: Option<&str>) {
    if let Some(last) = spans.last_mut() {
        if last.style == style && last.link.as_deref() == link {
            last.text.push_str(text);
            return;
        }
    }
    spans.push(Span {
        text: text.to_string(),
        style,
        link: link.map(str::to_string),
    });
}

fn collect_spans<'a>(
    node: &'a AstNode<'a>,
    style: SpanStyle,
    link: Option<&str>,
    spans: &mut Vec<Span>,
) {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Text(text) => push_span(spans, &text, style, link),
        NodeValue::Code(code) => {
            let style = SpanStyle { code: true, ..style };
            push_span(spans, &code.literal, style, link);
        }
        NodeValue::SoftBreak => push_span(spans, " ", style, link),
        NodeValue::LineBreak => push_span(spans, "\n", style, link),
        NodeValue::HtmlInline(html) => push_span(spans, &html, style, link),
        NodeValue::FootnoteReference(reference) => {
            push_span(spans, &format!("[{}]", reference.name), style, link)
        }
        NodeValue::Emph => descend(node, SpanStyle { emphasis: true, ..style }, link, spans),
        NodeValue::Strong => descend(node, SpanStyle { strong: true, ..style }, link, spans),
        NodeValue::Strikethrough => descend(
            node,
            SpanStyle {
                strikethrough: true,
                ..style
            },
            link,
            spans,
        ),
        NodeValue::Link(target) => descend(node, style, Some(&target.url), spans),
        NodeValue::Image(image) => {
            let mut alt = Vec::new();
            descend(node, style, None, &mut alt);
            let alt: String = alt.into_iter().map(|s| s.text).collect();
            push_span(spans, &format!("[image: {}]", alt), style, Some(&image.url));
        }
        _ => descend(node, style, link, spans),
    }
}

fn descend<'a>(node: &'a AstNode<'a>, style: SpanStyle, link: Option<&str>, spans: &mut Vec<Span>) {
    for child in node.children() {
        collect_spans(child, style, link, spans);
    }
}

/// Plain text of a span list.
pub fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        assert!(parse_blocks("").is_empty());
    }

    #[test]
    fn test_heading_level() {
        let blocks = parse_blocks("## Section");
        match &blocks[0] {
            Block::Heading { level, spans } => {
                assert_eq!(*level, 2);
                assert_eq!(spans_text(spans), "Section");
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_emphasis_accumulates_style() {
        let blocks = parse_blocks("plain **bold *both*** end");
        let Block::Paragraph(spans) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let both = spans.iter().find(|s| s.text == "both").unwrap();
        assert!(both.style.strong && both.style.emphasis);
        let plain = &spans[0];
        assert_eq!(plain.text, "plain ");
        assert_eq!(plain.style, SpanStyle::default());
    }

    #[test]
    fn test_link_spans_carry_url() {
        let blocks = parse_blocks("see [the docs](https://example.com/docs)");
        let Block::Paragraph(spans) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let link = spans.iter().find(|s| s.link.is_some()).unwrap();
        assert_eq!(link.text, "the docs");
        assert_eq!(link.link.as_deref(), Some("https://example.com/docs"));
    }

    #[test]
    fn test_ordered_and_task_lists() {
        let blocks = parse_blocks("3. three\n4. four");
        let Block::List { start, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, Some(3));
        assert_eq!(items.len(), 2);

        let blocks = parse_blocks("- [x] done\n- [ ] todo");
        let Block::List { start, items } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, None);
        assert_eq!(items[0].task, Some(true));
        assert_eq!(items[1].task, Some(false));
    }

    #[test]
    fn test_table_rows() {
        let blocks = parse_blocks("| a | b |\n|:--|--:|\n| 1 | 2 |");
        let Block::Table { alignments, rows } = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(alignments, &vec![Align::Left, Align::Right]);
        assert_eq!(rows.len(), 2);
        assert_eq!(spans_text(&rows[1][1]), "2");
    }

    #[test]
    fn test_code_block_and_quote() {
        let blocks = parse_blocks("```rust\nfn main() {}\n```\n\n> quoted");
        assert_eq!(
            blocks[0],
            Block::CodeBlock {
                info: "rust".to_string(),
                literal: "fn main() {}\n".to_string()
            }
        );
        assert!(matches!(&blocks[1], Block::Quote(inner) if inner.len() == 1));
    }
}
