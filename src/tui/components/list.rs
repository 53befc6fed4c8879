use crate::core::{TranscriptCache, VideoId};
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// One row of the cached-transcript browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub video_id: VideoId,
    pub detail: String,
    pub available: bool,
}

impl CachedEntry {
    pub fn from_cache(cache: &TranscriptCache) -> Vec<Self> {
        cache
            .ids()
            .into_iter()
            .filter_map(|id| {
                let entry = match cache.get(id)? {
                    Ok(text) => Self {
                        video_id: id.clone(),
                        detail: format!("{} words", text.split_whitespace().count()),
                        available: true,
                    },
                    Err(err) => Self {
                        video_id: id.clone(),
                        detail: err.to_string(),
                        available: false,
                    },
                };
                Some(entry)
            })
            .collect()
    }
}

pub struct CachedList {
    pub items: Vec<CachedEntry>,
    pub state: ListState,
    viewport_size: usize,
}

impl CachedList {
    pub fn new(items: Vec<CachedEntry>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            items,
            state,
            viewport_size: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                self.previous();
                true
            }
            KeyCode::Down => {
                self.next();
                true
            }
            KeyCode::PageDown => {
                self.page_down();
                true
            }
            KeyCode::PageUp => {
                self.page_up();
                true
            }
            KeyCode::Home => {
                self.go_home();
                true
            }
            KeyCode::End => {
                self.go_end();
                true
            }
            _ => false,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.step_clamped(-1);
                true
            }
            MouseEventKind::ScrollDown => {
                self.step_clamped(1);
                true
            }
            _ => false,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.state.select(Some(i));
        self.adjust_offset();
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        self.adjust_offset();
    }

    fn page_down(&mut self) {
        let step = self.viewport_size.max(1) as isize;
        self.step_clamped(step);
    }

    fn page_up(&mut self) {
        let step = self.viewport_size.max(1) as isize;
        self.step_clamped(-step);
    }

    fn go_home(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.state.select(Some(0));
        self.adjust_offset();
    }

    fn go_end(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.state.select(Some(self.items.len() - 1));
        self.adjust_offset();
    }

    /// Move the selection without wrapping around either end.
    fn step_clamped(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let last = self.items.len() - 1;
        let target = current.saturating_add_signed(delta).min(last);
        self.state.select(Some(target));
        self.adjust_offset();
    }

    pub fn get_selected(&self) -> Option<&CachedEntry> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str) {
        self.viewport_size = (area.height.saturating_sub(2) as usize).max(1);
        self.adjust_offset();

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|entry| {
                let (icon, detail_style) = if entry.available {
                    ("📄", Style::default().fg(Color::Gray))
                } else {
                    ("⚠", Style::default().fg(Color::Red))
                };

                let line = Line::from(vec![
                    Span::raw(icon),
                    Span::raw(" "),
                    Span::styled(entry.video_id.as_str(), Style::default().fg(Color::White)),
                    Span::styled(format!("  {}", entry.detail), detail_style),
                ]);

                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn update_items(&mut self, new_items: Vec<CachedEntry>) {
        let current_selected = self.state.selected();
        self.items = new_items;

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(selected) = current_selected {
            if selected >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }

        self.adjust_offset();
    }

    fn adjust_offset(&mut self) {
        if self.items.is_empty() {
            *self.state.offset_mut() = 0;
            return;
        }

        let viewport = self.viewport_size.max(1);
        let max_index = self.items.len() - 1;
        let selected = self
            .state
            .selected()
            .map(|idx| idx.min(max_index))
            .unwrap_or(0);
        self.state.select(Some(selected));

        let max_offset = self.items.len().saturating_sub(viewport);
        let offset = self.state.offset().min(max_offset);
        *self.state.offset_mut() = offset;

        if selected < offset {
            *self.state.offset_mut() = selected;
        } else if selected >= offset + viewport {
            *self.state.offset_mut() = selected + 1 - viewport;
        }
    }
}
