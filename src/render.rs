//! Terminal rendering for chat entries.
//!
//! User entries print verbatim.  Assistant entries are parsed as Markdown and
//! laid out line by line, with ANSI styling and syntax-highlighted code blocks
//! when color is enabled.

use std::io::{self, Stdout, Write};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

use crate::chat::{ASSISTANT_LABEL, USER_LABEL};
use crate::markdown::{Block, ListMarker, Span, parse_markdown, plain_text};
use crate::types::ChatEntry;
use crate::view::ViewWindow;

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (busy indicator, quotes, fences).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text.
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for underlined text (links).
const ANSI_UNDERLINE: &str = "\x1b[4m";

/// ANSI escape code for struck-through text.
const ANSI_STRIKE: &str = "\x1b[9m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (assistant label).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (inline code).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (errors).
const ANSI_RED: &str = "\x1b[31m";

/// Busy indicator shown before anything is visible.
pub const BUSY_EMPTY: &str = "Analyzing..";

/// Busy indicator shown below existing entries.
pub const BUSY_MORE: &str = "...";

const CODE_INDENT: &str = "    ";
const RULE_WIDTH: usize = 40;

/// The busy indicator for a window with or without visible entries.
pub fn busy_indicator(window_empty: bool) -> &'static str {
    if window_empty { BUSY_EMPTY } else { BUSY_MORE }
}

/// Trait for rendering a chat session.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print one conversation entry.
    fn print_entry(&mut self, entry: &ChatEntry);

    /// Print the busy indicator.
    fn print_busy(&mut self, window_empty: bool);

    /// Tell the user that `hidden` entries are held back.
    fn print_more_hint(&mut self, hidden: usize);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Prints the entries of `window` from index `rendered` on, followed by a
/// hint if entries are held back.  Returns the new rendered count.
pub fn render_window(
    renderer: &mut dyn Renderer,
    window: ViewWindow<'_>,
    rendered: usize,
) -> usize {
    let start = rendered.min(window.len());
    for entry in &window.entries()[start..] {
        renderer.print_entry(entry);
    }
    if window.has_more() {
        renderer.print_more_hint(window.hidden_count());
    }
    window.len()
}

struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    fn load() -> Option<Self> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove("base16-ocean.dark")
            .or_else(|| themes.themes.remove("Solarized (dark)"))
            .or_else(|| themes.themes.into_values().next())?;
        Some(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(language)
            .or_else(|| self.syntaxes.find_syntax_by_extension(language))?;
        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::new();
        for line in LinesWithEndings::from(code) {
            let ranges = lines.highlight_line(line, &self.syntaxes).ok()?;
            out.push_str(CODE_INDENT);
            out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        out.push_str(ANSI_RESET);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Some(out)
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Writes to stdout unless constructed with [`PlainTextRenderer::with_writer`].
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    user_label: String,
    assistant_label: String,
    highlighter: Option<Highlighter>,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            user_label: USER_LABEL.to_string(),
            assistant_label: ASSISTANT_LABEL.to_string(),
            highlighter: if use_color { Highlighter::load() } else { None },
        }
    }

    /// Sets the labels printed before user and assistant entries.
    pub fn with_labels(mut self, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        self.user_label = user.into();
        self.assistant_label = assistant.into();
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn format_spans(&self, spans: &[Span]) -> String {
        let mut out = String::new();
        for span in spans {
            let style = span.style;
            if !self.use_color {
                if style.code {
                    out.push('`');
                    out.push_str(&span.text);
                    out.push('`');
                } else {
                    out.push_str(&span.text);
                }
                continue;
            }
            let mut codes = String::new();
            if style.strong {
                codes.push_str(ANSI_BOLD);
            }
            if style.emphasis {
                codes.push_str(ANSI_ITALIC);
            }
            if style.strikethrough {
                codes.push_str(ANSI_STRIKE);
            }
            if style.link {
                codes.push_str(ANSI_UNDERLINE);
            }
            if style.code {
                codes.push_str(ANSI_YELLOW);
            }
            if codes.is_empty() {
                out.push_str(&span.text);
            } else {
                out.push_str(&codes);
                out.push_str(&span.text);
                out.push_str(ANSI_RESET);
            }
        }
        out
    }

    fn format_code(&self, language: Option<&str>, code: &str) -> String {
        if let Some(language) = language
            && let Some(highlighter) = &self.highlighter
            && let Some(highlighted) = highlighter.highlight(language, code)
        {
            return format!("{}\n{highlighted}", self.styled(ANSI_DIM, language));
        }
        if self.use_color {
            let mut out = String::new();
            if let Some(language) = language {
                out.push_str(&self.styled(ANSI_DIM, language));
                out.push('\n');
            }
            for line in code.lines() {
                out.push_str(CODE_INDENT);
                out.push_str(line);
                out.push('\n');
            }
            out
        } else {
            format!("```{}\n{code}\n```\n", language.unwrap_or(""))
        }
    }

    fn format_table(&self, header: &[String], rows: &[Vec<String>]) -> String {
        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![3usize; columns];
        for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        let format_row = |row: &[String]| {
            let mut line = String::from("|");
            for (i, width) in widths.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = width - cell.chars().count();
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(pad));
                line.push_str(" |");
            }
            line.push('\n');
            line
        };
        let mut out = String::new();
        out.push_str(&self.styled(ANSI_BOLD, format_row(header).trim_end()));
        out.push('\n');
        out.push('|');
        for width in &widths {
            out.push_str(&"-".repeat(width + 2));
            out.push('|');
        }
        out.push('\n');
        for row in rows {
            out.push_str(&format_row(row.as_slice()));
        }
        out
    }

    fn format_block(&self, block: &Block) -> String {
        match block {
            Block::Heading { level, spans } => {
                if self.use_color {
                    format!("{}\n", self.styled(ANSI_BOLD, &plain_text(spans)))
                } else {
                    let hashes = "#".repeat(usize::from(*level));
                    format!("{hashes} {}\n", self.format_spans(spans))
                }
            }
            Block::Paragraph { spans } => format!("{}\n", self.format_spans(spans)),
            Block::Quote { spans } => {
                let bar = self.styled(ANSI_DIM, "> ");
                let mut out = String::new();
                for line in self.format_spans(spans).lines() {
                    out.push_str(&bar);
                    out.push_str(line);
                    out.push('\n');
                }
                out
            }
            Block::ListItem {
                depth,
                marker,
                spans,
            } => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = match marker {
                    Some(ListMarker::Bullet) => "- ".to_string(),
                    Some(ListMarker::Ordered(n)) => format!("{n}. "),
                    Some(ListMarker::Task(true)) => "[x] ".to_string(),
                    Some(ListMarker::Task(false)) => "[ ] ".to_string(),
                    None => "  ".to_string(),
                };
                format!("{indent}{marker}{}\n", self.format_spans(spans))
            }
            Block::Code { language, code } => self.format_code(language.as_deref(), code),
            Block::Table { header, rows } => self.format_table(header, rows),
            Block::Rule => format!("{}\n", self.styled(ANSI_DIM, &"-".repeat(RULE_WIDTH))),
        }
    }

    /// Formats an assistant reply.
    pub fn format_markdown(&self, text: &str) -> String {
        let blocks = parse_markdown(text);
        let mut out = String::new();
        let mut previous: Option<&Block> = None;
        for block in &blocks {
            let tight = matches!(
                (previous, block),
                (Some(Block::ListItem { .. }), Block::ListItem { .. })
            );
            if previous.is_some() && !tight {
                out.push('\n');
            }
            out.push_str(&self.format_block(block));
            previous = Some(block);
        }
        out
    }

    /// Formats one entry: its label line, then its content.
    pub fn format_entry(&self, entry: &ChatEntry) -> String {
        let (label, color) = if entry.is_user() {
            (&self.user_label, ANSI_CYAN)
        } else {
            (&self.assistant_label, ANSI_GREEN)
        };
        let mut out = String::new();
        if self.use_color {
            out.push_str(&format!("{ANSI_BOLD}{color}{label}:{ANSI_RESET}\n"));
        } else {
            out.push_str(&format!("{label}:\n"));
        }
        if entry.is_user() {
            out.push_str(entry.content());
            out.push('\n');
        } else {
            out.push_str(&self.format_markdown(entry.content()));
        }
        out.push('\n');
        out
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_entry(&mut self, entry: &ChatEntry) {
        let text = self.format_entry(entry);
        self.emit(&text);
    }

    fn print_busy(&mut self, window_empty: bool) {
        let text = format!("{}\n", self.styled(ANSI_DIM, busy_indicator(window_empty)));
        self.emit(&text);
    }

    fn print_more_hint(&mut self, hidden: usize) {
        let noun = if hidden == 1 { "entry" } else { "entries" };
        let text = format!(
            "{}\n",
            self.styled(ANSI_DIM, &format!("[{hidden} more {noun}; /more to show]"))
        );
        self.emit(&text);
    }

    fn print_error(&mut self, error: &str) {
        let text = format!("{}\n", self.styled(ANSI_RED, &format!("Error: {error}")));
        self.emit(&text);
    }

    fn print_info(&mut self, info: &str) {
        let text = format!("{info}\n");
        self.emit(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;
    use crate::types::SessionStatus;
    use crate::view::{ViewState, derive_view};

    fn plain() -> PlainTextRenderer<Vec<u8>> {
        PlainTextRenderer::with_writer(Vec::new(), false)
    }

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn busy_indicator_depends_on_window() {
        assert_eq!(busy_indicator(true), "Analyzing..");
        assert_eq!(busy_indicator(false), "...");
    }

    #[test]
    fn user_entries_print_verbatim() {
        let mut renderer = plain();
        renderer.print_entry(&ChatEntry::user("**not** markdown"));
        assert_eq!(output(renderer), "You:\n**not** markdown\n\n");
    }

    #[test]
    fn assistant_entries_render_markdown() {
        let renderer = plain().with_labels("Nash", "WILL-LM");
        let text = renderer.format_entry(&ChatEntry::assistant(
            "## Plan\n\n1. read\n2. write\n\n```rust\nfn main() {}\n```",
        ));
        assert_eq!(
            text,
            "WILL-LM:\n## Plan\n\n1. read\n2. write\n\n```rust\nfn main() {}\n```\n\n"
        );
    }

    #[test]
    fn tables_align() {
        let renderer = plain();
        let text = renderer.format_markdown("| name | n |\n|---|---|\n| a | 10 |\n");
        assert_eq!(text, "| name | n   |\n|------|-----|\n| a    | 10  |\n");
    }

    #[test]
    fn inline_code_keeps_backticks_without_color() {
        let renderer = plain();
        assert_eq!(renderer.format_markdown("use `Vec`"), "use `Vec`\n");
    }

    #[test]
    fn color_output_highlights_known_languages() {
        let renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        let text = renderer.format_markdown("```rust\nlet x = 1;\n```");
        assert!(text.contains("\x1b[38;2;"));
        assert!(text.contains("let"));
        let text = renderer.format_markdown("```nosuchlang\nplain\n```");
        assert!(text.contains("    plain\n"));
    }

    #[test]
    fn window_renders_new_entries_and_hint() {
        let mut conversation = Conversation::new();
        conversation.append((0..12).map(|i| ChatEntry::user(format!("m{i}"))));
        let view = ViewState::default();
        let window = derive_view(&conversation, &view, SessionStatus::Idle);

        let mut renderer = plain();
        let rendered = render_window(&mut renderer, window, 8);
        assert_eq!(rendered, 10);
        let text = output(renderer);
        assert!(text.starts_with("You:\nm8\n\nYou:\nm9\n\n"));
        assert!(text.ends_with("[2 more entries; /more to show]\n"));
    }

    #[test]
    fn errors_and_info() {
        let mut renderer = plain();
        renderer.print_error("quota exceeded");
        renderer.print_info("ok");
        renderer.print_busy(true);
        assert_eq!(output(renderer), "Error: quota exceeded\nok\nAnalyzing..\n");
    }
}
