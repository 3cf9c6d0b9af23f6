//! Markdown to display blocks.
//!
//! Assistant replies are Markdown (GitHub flavour: tables, task lists, and
//! strikethrough).  [`parse_markdown`] flattens a reply into a list of
//! [`Block`]s that a renderer can lay out line by line.  Parsing is pure and
//! never fails; anything unrecognised degrades to plain text.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Inline styling applied to a run of text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SpanStyle {
    /// `**bold**`
    pub strong: bool,
    /// `*italic*`
    pub emphasis: bool,
    /// `` `code` ``
    pub code: bool,
    /// `~~struck~~`
    pub strikethrough: bool,
    /// Link text.
    pub link: bool,
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The text.
    pub text: String,
    /// Its style.
    pub style: SpanStyle,
}

/// The bullet in front of a list item.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListMarker {
    /// `-` or `*`
    Bullet,
    /// `1.`, `2.`, ...
    Ordered(u64),
    /// `- [ ]` or `- [x]`
    Task(bool),
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#` through `######`.
    Heading {
        /// 1 through 6.
        level: u8,
        /// Heading text.
        spans: Vec<Span>,
    },
    /// A paragraph of text.
    Paragraph {
        /// Paragraph text.
        spans: Vec<Span>,
    },
    /// A paragraph inside a block quote.
    Quote {
        /// Quoted text.
        spans: Vec<Span>,
    },
    /// A list item.  `marker` is `None` for a later paragraph of the same item.
    ListItem {
        /// Nesting depth, starting at 1.
        depth: usize,
        /// Bullet, number, or checkbox.
        marker: Option<ListMarker>,
        /// Item text.
        spans: Vec<Span>,
    },
    /// A fenced or indented code block.
    Code {
        /// Language from the fence's info string, if any.
        language: Option<String>,
        /// The code, without the trailing newline.
        code: String,
    },
    /// A table; cells are plain text.
    Table {
        /// Header cells.
        header: Vec<String>,
        /// Body rows.
        rows: Vec<Vec<String>>,
    },
    /// `---`
    Rule,
}

/// Concatenates the text of `spans`, dropping styles.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

/// Extracts the language from a fenced code block's info string.
///
/// Only the leading ASCII word characters of the first token count, so
/// `rust,ignore` is `rust` and `c++` is `c`.
pub fn language_tag(info: &str) -> Option<String> {
    let token = info.split_whitespace().next()?;
    let end = token
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(token.len(), |(i, _)| i);
    if end == 0 {
        None
    } else {
        Some(token[..end].to_string())
    }
}

/// Parses Markdown into display blocks.
pub fn parse_markdown(text: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(text, options) {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Default)]
struct TableBuilder {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: usize,
    heading: Option<u8>,
    quote_depth: usize,
    lists: Vec<Option<u64>>,
    marker: Option<ListMarker>,
    code: Option<(Option<String>, String)>,
    table: Option<TableBuilder>,
}

impl BlockBuilder {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            code: false,
            strikethrough: self.strikethrough > 0,
            link: self.link > 0,
        }
    }

    fn push_text(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.style == style
        {
            last.text.push_str(text);
            return;
        }
        self.spans.push(Span {
            text: text.to_string(),
            style,
        });
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let block = if let Some(level) = self.heading {
            Block::Heading { level, spans }
        } else if !self.lists.is_empty() {
            Block::ListItem {
                depth: self.lists.len(),
                marker: self.marker.take(),
                spans,
            }
        } else if self.quote_depth > 0 {
            Block::Quote { spans }
        } else {
            Block::Paragraph { spans }
        };
        self.blocks.push(block);
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some((_, code)) = self.code.as_mut() {
            match event {
                Event::Text(text) => code.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, mut code)) = self.code.take() {
                        while code.ends_with('\n') {
                            code.pop();
                        }
                        self.blocks.push(Block::Code { language, code });
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text, self.style()),
            Event::Code(text) => {
                let style = SpanStyle {
                    code: true,
                    ..self.style()
                };
                self.push_text(&text, style);
            }
            Event::InlineMath(text) | Event::DisplayMath(text) => {
                self.push_text(&text, self.style());
            }
            Event::SoftBreak => self.push_text(" ", self.style()),
            Event::HardBreak => self.push_text("\n", self.style()),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(checked) => self.marker = Some(ListMarker::Task(checked)),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(level as u8);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                self.marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = ListMarker::Ordered(*n);
                        *n += 1;
                        Some(marker)
                    }
                    _ => Some(ListMarker::Bullet),
                };
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => language_tag(&info),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(TableBuilder::default());
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { .. } => self.link += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = None;
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::TableCell => {
                let cell = plain_text(&std::mem::take(&mut self.spans));
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table {
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.link = self.link.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        if let Some((language, code)) = self.code.take() {
            self.blocks.push(Block::Code { language, code });
        }
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(block: &Block) -> String {
        match block {
            Block::Heading { spans, .. }
            | Block::Paragraph { spans }
            | Block::Quote { spans }
            | Block::ListItem { spans, .. } => plain_text(spans),
            Block::Code { code, .. } => code.clone(),
            Block::Table { .. } | Block::Rule => String::new(),
        }
    }

    #[test]
    fn language_tags() {
        assert_eq!(language_tag("rust"), Some("rust".to_string()));
        assert_eq!(language_tag("rust,ignore"), Some("rust".to_string()));
        assert_eq!(language_tag("  python title=x "), Some("python".to_string()));
        assert_eq!(language_tag("c++"), Some("c".to_string()));
        assert_eq!(language_tag(""), None);
        assert_eq!(language_tag("{.rust}"), None);
        assert_eq!(language_tag("snake_case-x"), Some("snake_case".to_string()));
        assert_eq!(language_tag("rüst"), Some("r".to_string()));
        assert_eq!(language_tag("日本"), None);
    }

    #[test]
    fn heading_and_paragraph() {
        let blocks = parse_markdown("## Setup\n\nRun **cargo** now.");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Heading { level: 2, .. }));
        assert_eq!(text(&blocks[0]), "Setup");
        let Block::Paragraph { spans } = &blocks[1] else {
            panic!("expected paragraph: {:?}", blocks[1]);
        };
        assert_eq!(plain_text(spans), "Run cargo now.");
        assert!(spans[1].style.strong);
        assert!(!spans[0].style.strong);
    }

    #[test]
    fn fenced_code_keeps_language() {
        let blocks = parse_markdown("```rust\nfn main() {}\n```\n");
        assert_eq!(
            blocks,
            vec![Block::Code {
                language: Some("rust".to_string()),
                code: "fn main() {}".to_string(),
            }]
        );
    }

    #[test]
    fn indented_code_has_no_language() {
        let blocks = parse_markdown("    let x = 1;\n");
        assert!(matches!(&blocks[0], Block::Code { language: None, code } if code == "let x = 1;"));
    }

    #[test]
    fn lists_number_and_nest() {
        let blocks = parse_markdown("1. one\n2. two\n   - inner\n- [x] done\n");
        let items: Vec<(usize, Option<ListMarker>, String)> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => Some((*depth, *marker, plain_text(spans))),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (1, Some(ListMarker::Ordered(1)), "one".to_string()),
                (1, Some(ListMarker::Ordered(2)), "two".to_string()),
                (2, Some(ListMarker::Bullet), "inner".to_string()),
                (1, Some(ListMarker::Task(true)), "done".to_string()),
            ]
        );
    }

    #[test]
    fn tables() {
        let blocks = parse_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | `4` |\n");
        assert_eq!(
            blocks,
            vec![Block::Table {
                header: vec!["a".to_string(), "b".to_string()],
                rows: vec![
                    vec!["1".to_string(), "2".to_string()],
                    vec!["3".to_string(), "4".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn quotes_rules_and_inline_styles() {
        let blocks = parse_markdown("> careful\n\n---\n\n`x` and ~~y~~ and *z*");
        assert!(matches!(&blocks[0], Block::Quote { .. }));
        assert_eq!(text(&blocks[0]), "careful");
        assert_eq!(blocks[1], Block::Rule);
        let Block::Paragraph { spans } = &blocks[2] else {
            panic!("expected paragraph: {:?}", blocks[2]);
        };
        assert!(spans[0].style.code);
        assert!(spans.iter().any(|s| s.style.strikethrough && s.text == "y"));
        assert!(spans.iter().any(|s| s.style.emphasis && s.text == "z"));
    }

    #[test]
    fn plain_text_passes_through() {
        let blocks = parse_markdown("just words");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text(&blocks[0]), "just words");
        assert!(parse_markdown("").is_empty());
    }
}
