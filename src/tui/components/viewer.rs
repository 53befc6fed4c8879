use crate::core::Reply;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockKind {
    Heading,
    Paragraph,
    /// List item with its marker, already indented for nesting.
    Item(String),
    Code,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TextBlock {
    kind: BlockKind,
    text: String,
}

/// Scrollable view of a `Reply`, rendering the body as Markdown wrapped to
/// the viewport.
pub struct ResultViewer {
    title: String,
    blocks: Vec<TextBlock>,
    note: Option<String>,
    failed: bool,
    lines: Vec<Line<'static>>,
    wrapped_at: usize,
    page: usize,
    pub scroll: usize,
}

impl ResultViewer {
    pub fn from_reply(reply: &Reply) -> Self {
        match reply {
            Reply::Success { title, body, note } => Self {
                title: title.trim_end_matches(':').to_string(),
                blocks: markdown_blocks(body),
                note: note.clone(),
                failed: false,
                lines: Vec::new(),
                wrapped_at: 0,
                page: 1,
                scroll: 0,
            },
            Reply::Failure { .. } => Self {
                title: "Error".to_string(),
                blocks: reply
                    .to_string()
                    .lines()
                    .map(|line| TextBlock {
                        kind: BlockKind::Paragraph,
                        text: line.to_string(),
                    })
                    .collect(),
                note: None,
                failed: true,
                lines: Vec::new(),
                wrapped_at: 0,
                page: 1,
                scroll: 0,
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll += 1,
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(self.page),
            KeyCode::PageDown => self.scroll += self.page,
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll = usize::MAX,
            _ => return false,
        }
        self.clamp_scroll();
        true
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(3),
            MouseEventKind::ScrollDown => self.scroll += 3,
            _ => return false,
        }
        self.clamp_scroll();
        true
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(2).max(1) as usize;
        self.page = area.height.saturating_sub(2).max(1) as usize;
        if width != self.wrapped_at {
            self.lines = self.layout(width);
            self.wrapped_at = width;
        }
        self.clamp_scroll();

        let total = self.lines.len();
        let scroll_info = if total > self.page {
            format!(
                " (lines {}-{} of {})",
                self.scroll + 1,
                (self.scroll + self.page).min(total),
                total
            )
        } else {
            String::new()
        };

        let border = if self.failed { Color::Red } else { Color::Gray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!("{}{scroll_info}", self.title));

        let visible: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(self.page)
            .cloned()
            .collect();

        f.render_widget(Paragraph::new(visible).block(block), area);
    }

    fn clamp_scroll(&mut self) {
        let max = self.lines.len().saturating_sub(self.page);
        self.scroll = self.scroll.min(max);
    }

    fn layout(&self, width: usize) -> Vec<Line<'static>> {
        let base = if self.failed {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let mut lines = wrap_blocks(&self.blocks, width, base);

        if let Some(note) = &self.note {
            lines.push(Line::default());
            let style = Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC);
            lines.extend(
                textwrap::wrap(note, width)
                    .into_iter()
                    .map(|piece| Line::from(Span::styled(piece.into_owned(), style))),
            );
        }
        lines
    }
}

/// Flatten Markdown into headings, paragraphs, list items and code blocks.
/// Inline markup is reduced to its text.
fn markdown_blocks(markdown: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<TextBlock> = None;
    let mut lists: Vec<Option<u64>> = Vec::new();

    fn flush(current: &mut Option<TextBlock>, blocks: &mut Vec<TextBlock>) {
        if let Some(mut block) = current.take() {
            let trimmed = block.text.trim_end();
            if !trimmed.is_empty() {
                block.text.truncate(trimmed.len());
                blocks.push(block);
            }
        }
    }

    fn start(current: &mut Option<TextBlock>, kind: BlockKind) {
        *current = Some(TextBlock {
            kind,
            text: String::new(),
        });
    }

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                flush(&mut current, &mut blocks);
                start(&mut current, BlockKind::Heading);
            }
            Event::Start(Tag::Paragraph) => {
                // Loose list items wrap their text in a paragraph.
                let in_fresh_item = matches!(
                    &current,
                    Some(TextBlock { kind: BlockKind::Item(_), text }) if text.is_empty()
                );
                if !in_fresh_item {
                    flush(&mut current, &mut blocks);
                    start(&mut current, BlockKind::Paragraph);
                }
            }
            Event::Start(Tag::List(first)) => {
                flush(&mut current, &mut blocks);
                lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut current, &mut blocks);
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut blocks);
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                start(&mut current, BlockKind::Item(format!("{indent}{marker}")));
            }
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut current, &mut blocks);
                start(&mut current, BlockKind::Code);
            }
            Event::End(
                TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock,
            ) => flush(&mut current, &mut blocks),
            Event::Rule => {
                flush(&mut current, &mut blocks);
                blocks.push(TextBlock {
                    kind: BlockKind::Rule,
                    text: String::new(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                current
                    .get_or_insert_with(|| TextBlock {
                        kind: BlockKind::Paragraph,
                        text: String::new(),
                    })
                    .text
                    .push_str(&text);
            }
            Event::SoftBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push(' ');
                }
            }
            Event::HardBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push('\n');
                }
            }
            _ => {}
        }
    }
    flush(&mut current, &mut blocks);
    blocks
}

fn wrap_blocks(blocks: &[TextBlock], width: usize, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        let list_continues = matches!(
            (blocks.get(i.wrapping_sub(1)).map(|b| &b.kind), &block.kind),
            (Some(BlockKind::Item(_)), BlockKind::Item(_))
        );
        if i > 0 && !list_continues {
            lines.push(Line::default());
        }

        match &block.kind {
            BlockKind::Heading => {
                let style = base.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                push_wrapped(&mut lines, &block.text, textwrap::Options::new(width), style);
            }
            BlockKind::Paragraph => {
                push_wrapped(&mut lines, &block.text, textwrap::Options::new(width), base);
            }
            BlockKind::Item(marker) => {
                let hanging = " ".repeat(marker.width());
                let options = textwrap::Options::new(width)
                    .initial_indent(marker)
                    .subsequent_indent(&hanging);
                push_wrapped(&mut lines, &block.text, options, base.fg(Color::Green));
            }
            BlockKind::Code => {
                let style = base.fg(Color::Cyan);
                lines.extend(
                    block
                        .text
                        .lines()
                        .map(|line| Line::from(Span::styled(line.to_string(), style))),
                );
            }
            BlockKind::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(width),
                    base.fg(Color::DarkGray),
                )));
            }
        }
    }
    lines
}

fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    options: textwrap::Options<'_>,
    style: Style,
) {
    lines.extend(
        textwrap::wrap(text, options)
            .into_iter()
            .map(|piece| Line::from(Span::styled(piece.into_owned(), style))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockKind, text: &str) -> TextBlock {
        TextBlock {
            kind,
            text: text.to_string(),
        }
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn flattens_markdown_structure() {
        let blocks = markdown_blocks(
            "# Overview\n\nThe talk covers **three** points.\n\n- speed\n- safety\n\n1. first\n2. second\n",
        );

        assert_eq!(
            blocks,
            vec![
                block(BlockKind::Heading, "Overview"),
                block(BlockKind::Paragraph, "The talk covers three points."),
                block(BlockKind::Item("• ".into()), "speed"),
                block(BlockKind::Item("• ".into()), "safety"),
                block(BlockKind::Item("1. ".into()), "first"),
                block(BlockKind::Item("2. ".into()), "second"),
            ]
        );
    }

    #[test]
    fn nested_items_are_indented() {
        let blocks = markdown_blocks("- outer\n  - inner\n");
        assert_eq!(
            blocks,
            vec![
                block(BlockKind::Item("• ".into()), "outer"),
                block(BlockKind::Item("  • ".into()), "inner"),
            ]
        );
    }

    #[test]
    fn list_items_wrap_under_their_text() {
        let blocks = vec![block(BlockKind::Item("• ".into()), "alpha beta gamma")];
        let lines = wrap_blocks(&blocks, 12, Style::default());
        assert_eq!(plain(&lines), vec!["• alpha beta", "  gamma"]);
    }

    #[test]
    fn blocks_are_separated_except_within_lists() {
        let blocks = vec![
            block(BlockKind::Heading, "Title"),
            block(BlockKind::Item("• ".into()), "a"),
            block(BlockKind::Item("• ".into()), "b"),
        ];
        let lines = wrap_blocks(&blocks, 40, Style::default());
        assert_eq!(plain(&lines), vec!["Title", "", "• a", "• b"]);
    }

    #[test]
    fn failures_render_their_message() {
        let viewer = ResultViewer::from_reply(&Reply::invalid_url());
        assert!(viewer.failed);
        let lines = plain(&viewer.layout(200));
        assert!(lines[0].starts_with("Error: Invalid YouTube URL"));
        assert!(lines.iter().any(|line| line.starts_with("Supported formats")));
    }

    #[test]
    fn note_follows_the_body() {
        let reply = Reply::Success {
            title: "Video Summary:".into(),
            body: "Short.".into(),
            note: Some("Translation unavailable; showing original summary.".into()),
        };
        let viewer = ResultViewer::from_reply(&reply);
        assert_eq!(viewer.title, "Video Summary");
        let lines = plain(&viewer.layout(80));
        assert_eq!(
            lines,
            vec!["Short.", "", "Translation unavailable; showing original summary."]
        );
    }

    #[test]
    fn scrolling_stops_at_the_last_page() {
        let reply = Reply::success("Transcript:", "one\n\ntwo\n\nthree\n\nfour");
        let mut viewer = ResultViewer::from_reply(&reply);
        viewer.lines = viewer.layout(20);
        viewer.page = 3;

        viewer.scroll = usize::MAX;
        viewer.clamp_scroll();
        assert_eq!(viewer.scroll, viewer.lines.len() - 3);
    }
}
