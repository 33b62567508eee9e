//! Markdown → ratatui Lines renderer.
//!
//! Used for RuleMaster answers and the simplified rule tiers. Handles
//! headings, emphasis, ordered and unordered lists, block quotes, tables
//! and syntect-highlighted code blocks.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use syntect::easy::HighlightLines;
use syntect::util::LinesWithEndings;

use crate::core::logging::{get_syntax_set, get_theme_set};
use crate::tui::theme;

const CODE_BG: Color = Color::Rgb(43, 48, 59);
const CODE_THEME: &str = "base16-ocean.dark";

/// Convert markdown text to ratatui Lines.
pub fn markdown_to_lines(md: &str) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(md, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct CodeBlock {
    lang: String,
    source: String,
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// One entry per open list: the next number for ordered lists.
    lists: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    in_heading: bool,
    cells_in_row: usize,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.source.push_str(&text),
                None => self.push(text.to_string()),
            },
            Event::Code(code) => self.spans.push(Span::styled(
                format!(" {code} "),
                Style::default().fg(theme::TEXT).bg(theme::BG_SURFACE),
            )),
            Event::SoftBreak => self.spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::styled("─".repeat(40), theme::dim()));
                self.lines.push(Line::raw(""));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.styles.push(heading_style(level));
                self.in_heading = true;
            }
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { .. } => self.styles.push(
                Style::default()
                    .fg(theme::INFO)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    source: String::new(),
                });
            }
            Tag::List(start) => self.lists.push(start),
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.spans
                    .push(Span::styled(marker, Style::default().fg(theme::PRIMARY_LIGHT)));
            }
            Tag::BlockQuote => {
                self.flush();
                let base = self.style();
                self.styles
                    .push(base.fg(theme::TEXT_MUTED).add_modifier(Modifier::ITALIC));
                self.spans.push(Span::styled("│ ", theme::dim()));
            }
            Tag::TableHead => {
                self.cells_in_row = 0;
                self.push_modifier(Modifier::BOLD);
            }
            Tag::TableRow => self.cells_in_row = 0,
            Tag::TableCell => {
                if self.cells_in_row > 0 {
                    self.spans.push(Span::styled(" │ ", theme::dim()));
                }
                self.cells_in_row += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush();
                self.in_heading = false;
            }
            TagEnd::Strong
            | TagEnd::Emphasis
            | TagEnd::Strikethrough
            | TagEnd::Link => {
                self.styles.pop();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    highlight_code(&code, &mut self.lines);
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.lines.push(Line::raw(""));
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::BlockQuote => {
                self.flush();
                self.styles.pop();
            }
            TagEnd::Paragraph => {
                self.flush();
                if !self.in_heading && self.lists.is_empty() {
                    self.lines.push(Line::raw(""));
                }
            }
            TagEnd::TableHead => {
                self.styles.pop();
                self.flush();
                self.lines.push(Line::styled("─".repeat(40), theme::dim()));
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.lines.push(Line::raw("")),
            _ => {}
        }
    }

    fn push(&mut self, text: String) {
        let style = self.style();
        self.spans.push(Span::styled(text, style));
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let base = self.style();
        self.styles.push(base.add_modifier(modifier));
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.to_string().is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => theme::title(),
        HeadingLevel::H2 => theme::heading(),
        HeadingLevel::H3 => Style::default().fg(theme::SUCCESS),
        _ => Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
    }
}

fn highlight_code(code: &CodeBlock, lines: &mut Vec<Line<'static>>) {
    let ss = get_syntax_set();
    let syntax = ss
        .find_syntax_by_token(&code.lang)
        .unwrap_or_else(|| ss.find_syntax_plain_text());
    let Some(code_theme) = get_theme_set().themes.get(CODE_THEME) else {
        lines.extend(code.source.lines().map(|l| plain_code_line(l.to_string())));
        return;
    };
    let mut highlighter = HighlightLines::new(syntax, code_theme);

    for line in LinesWithEndings::from(&code.source) {
        match highlighter.highlight_line(line, ss) {
            Ok(ranges) => lines.push(Line::from(
                ranges
                    .into_iter()
                    .map(|(style, text)| {
                        let fg = style.foreground;
                        Span::styled(
                            text.trim_end_matches('\n').to_string(),
                            Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)).bg(CODE_BG),
                        )
                    })
                    .collect::<Vec<_>>(),
            )),
            Err(_) => lines.push(plain_code_line(line.trim_end_matches('\n').to_string())),
        }
    }
}

fn plain_code_line(text: String) -> Line<'static> {
    Line::styled(text, Style::default().fg(theme::TEXT).bg(CODE_BG))
}
